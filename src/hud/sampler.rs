use bevy::math::{Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::hud::horizon::HorizonFrame;

/// Camera modes reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CameraMode {
    /// Chase/orbit camera around the vessel.
    #[default]
    Flight,
    /// Fixed camera inside or on the vessel hull.
    Internal,
    /// Crew-eye cockpit view.
    Iva,
    /// Map overview.
    Map,
    /// Any other host camera (editors, cut-scenes).
    External,
}

impl CameraMode {
    /// Whether the HUD may draw in this mode.
    pub const fn is_admissible(self) -> bool {
        matches!(self, CameraMode::Flight | CameraMode::Internal | CameraMode::Iva)
    }
}

/// Which velocity the host's speed display is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SpeedDisplayMode {
    /// Inertial velocity.
    Orbit,
    /// Velocity relative to the rotating surface.
    #[default]
    Surface,
    /// Velocity relative to the navigation target.
    Target,
}

impl SpeedDisplayMode {
    /// Next mode in display-cycle order.
    pub const fn next(self) -> Self {
        match self {
            SpeedDisplayMode::Orbit => SpeedDisplayMode::Surface,
            SpeedDisplayMode::Surface => SpeedDisplayMode::Target,
            SpeedDisplayMode::Target => SpeedDisplayMode::Orbit,
        }
    }
}

/// Simulation state of a vessel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VesselLife {
    /// Controlled and simulated.
    #[default]
    Active,
    /// Loaded but not under control.
    Inactive,
    /// Destroyed; nothing to draw.
    Dead,
}

/// Vessel state read from the host for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VesselSample {
    /// Host identifier; a change resets smoothing history.
    pub id: u64,
    /// Simulation state.
    pub life: VesselLife,
    /// Raw vessel transform rotation, nose along local `+Y`.
    pub rotation: Quat,
    /// Rotation of the control reference part, preferred over `rotation`.
    pub reference_rotation: Option<Quat>,
    /// Local up (away from the main body).
    pub up_axis: Vec3,
    /// Inertial velocity.
    pub orbital_velocity: Vec3,
    /// Surface-relative velocity.
    pub surface_velocity: Vec3,
    /// Host's own target-relative velocity.
    pub target_velocity: Vec3,
}

/// Navigation target, when it is itself a vessel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetVessel {
    /// Target sits on the ground or in water.
    pub landed_or_splashed: bool,
    /// Target is within physics range and fully simulated.
    pub loaded: bool,
    /// Target surface-relative velocity.
    pub surface_velocity: Vec3,
}

/// Viewing camera state read from the host for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSample {
    /// Current host camera mode.
    pub mode: CameraMode,
    /// World rotation; local `+Z` is the view direction.
    pub rotation: Quat,
    /// Perspective matrix mapping camera space to clip space.
    pub projection: Mat4,
    /// Viewport size in logical pixels.
    pub viewport_size: Vec2,
}

/// Everything the core reads from the host in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HostFrame {
    /// Active vessel, if any.
    pub vessel: Option<VesselSample>,
    /// Main viewing camera, if any.
    pub camera: Option<CameraSample>,
    /// Speed display selection.
    pub speed_mode: SpeedDisplayMode,
    /// Navigation target vessel, if any.
    pub target: Option<TargetVessel>,
    /// Attitude indicator's vessel-to-horizon rotation.
    pub relative_gimbal: Option<Quat>,
}

/// Validated and smoothed per-frame input to the orientation solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Smoothed vessel rotation, nose along local `+Z`.
    pub vessel_rotation: Quat,
    /// Local up axis.
    pub up_axis: Vec3,
    /// Smoothed velocity for the selected speed mode.
    pub velocity: Vec3,
    /// Camera world rotation.
    pub camera_rotation: Quat,
    /// Camera projection matrix.
    pub projection: Mat4,
    /// Viewport size in logical pixels.
    pub viewport_size: Vec2,
    /// Local horizon frame under the vessel.
    pub horizon: HorizonFrame,
}

/// Previous raw sample kept for smoothing.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SampleHistory {
    vessel_id: u64,
    velocity: Vec3,
    rotation: Quat,
}

/// Turns host state into snapshots, failing closed and damping jitter.
#[derive(Clone, Debug, Default)]
pub struct FrameSampler {
    history: Option<SampleHistory>,
}

impl FrameSampler {
    /// Build a sampler with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget smoothing history.
    pub fn reset(&mut self) {
        self.history = None;
    }

    /// Validate `frame` and produce this frame's snapshot.
    ///
    /// Returns `None` whenever the HUD should not draw at all.
    pub fn sample(&mut self, frame: &HostFrame) -> Option<FrameSnapshot> {
        let vessel = frame.vessel.as_ref()?;
        if vessel.life == VesselLife::Dead {
            return None;
        }
        let camera = frame.camera.as_ref()?;
        if !camera.mode.is_admissible() {
            return None;
        }
        let gimbal = frame.relative_gimbal?;

        let current_rotation = corrected_rotation(vessel);
        let current_velocity = select_velocity(vessel, frame.speed_mode, frame.target.as_ref());
        let horizon = HorizonFrame::from_gimbal(current_rotation, gimbal, vessel.up_axis)?;

        let previous = match self.history {
            Some(history) if history.vessel_id == vessel.id => history,
            _ => SampleHistory {
                vessel_id: vessel.id,
                velocity: current_velocity,
                rotation: current_rotation,
            },
        };
        let velocity = 0.5 * (current_velocity + previous.velocity);
        let vessel_rotation = current_rotation.slerp(previous.rotation, 0.5);
        self.history = Some(SampleHistory {
            vessel_id: vessel.id,
            velocity: current_velocity,
            rotation: current_rotation,
        });

        Some(FrameSnapshot {
            vessel_rotation,
            up_axis: vessel.up_axis,
            velocity,
            camera_rotation: camera.rotation,
            projection: camera.projection,
            viewport_size: camera.viewport_size,
            horizon,
        })
    }
}

/// Vessel rotation with the nose moved from local `+Y` to local `+Z`.
pub fn corrected_rotation(vessel: &VesselSample) -> Quat {
    let raw = vessel.reference_rotation.unwrap_or(vessel.rotation);
    (raw * Quat::from_rotation_x(-FRAC_PI_2)).normalize()
}

/// Velocity shown for `mode`, with the landed-target correction applied.
///
/// The host reports a meaningless target velocity when the target is an
/// unloaded landed vessel, so surface velocities are differenced instead.
pub fn select_velocity(
    vessel: &VesselSample,
    mode: SpeedDisplayMode,
    target: Option<&TargetVessel>,
) -> Vec3 {
    match mode {
        SpeedDisplayMode::Orbit => vessel.orbital_velocity,
        SpeedDisplayMode::Surface => vessel.surface_velocity,
        SpeedDisplayMode::Target => match target {
            Some(target) if target.landed_or_splashed => {
                if target.loaded {
                    vessel.surface_velocity - target.surface_velocity
                } else {
                    vessel.surface_velocity
                }
            }
            _ => vessel.target_velocity,
        },
    }
}
