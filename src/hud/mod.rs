mod context;
mod horizon;
mod markers;
mod projector;
mod sampler;
mod solver;

pub use context::HudContext;
pub use horizon::HorizonFrame;
pub use markers::{BlendCurve, MarkerKind, MarkerRotation, MarkerSet, MarkerState};
pub use projector::{
    Admissibility, CLIP_SLACK, MarkerProjector, in_plane_rotation, ndc_to_screen, ndc_to_viewport,
    project_direction,
};
pub use sampler::{
    CameraMode, CameraSample, FrameSampler, FrameSnapshot, HostFrame, SpeedDisplayMode,
    TargetVessel, VesselLife, VesselSample, corrected_rotation, select_velocity,
};
pub use solver::{
    Orientation, OrientationSolver, SPEED_DRAW_THRESHOLD, cross_product_horizon_up, is_moving,
    to_camera_space,
};
