mod camera;
mod components;
mod flight;

pub use camera::{ChaseCamera, camera_follow_system, camera_look_system, camera_mode_system};
pub use components::{AttitudeControl, ControlledVessel, Planet, SurfaceAnchored, VesselBody};
pub use flight::{
    planet_spin_system, vessel_control_system, vessel_motion_system, vessel_physics_system,
};
