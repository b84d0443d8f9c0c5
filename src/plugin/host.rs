use bevy::camera::{Camera, PerspectiveProjection, Projection};
use bevy::prelude::*;

use crate::hud::{
    CameraMode, CameraSample, HostFrame, SpeedDisplayMode, TargetVessel, VesselLife, VesselSample,
    corrected_rotation,
};

/// Identity and status of a vessel the HUD may read.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct HudVessel {
    /// Stable id; a change of active id resets smoothing.
    pub id: u64,
    /// Simulation state.
    pub life: VesselLife,
    /// Resting on ground or water.
    pub landed_or_splashed: bool,
    /// Within physics range.
    pub loaded: bool,
    /// World rotation of the control reference, if not the vessel root.
    pub control_reference: Option<Quat>,
}

impl HudVessel {
    /// Active, airborne, loaded vessel with no separate control reference.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            life: VesselLife::Active,
            landed_or_splashed: false,
            loaded: true,
            control_reference: None,
        }
    }
}

/// Host-maintained motion state, in Bevy world axes.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct VesselMotion {
    /// Local up, away from the main body.
    pub up: Vec3,
    /// Inertial velocity.
    pub orbital_velocity: Vec3,
    /// Velocity relative to the rotating surface.
    pub surface_velocity: Vec3,
    /// Host's own velocity relative to the navigation target.
    pub target_velocity: Vec3,
}

/// Viewing camera the HUD is drawn for.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct HudCamera {
    /// Current host camera mode.
    pub mode: CameraMode,
}

/// Vessel whose markers are shown.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct ActiveVessel(pub Option<Entity>);

/// Navigation target, if it is a vessel.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct NavTarget(pub Option<Entity>);

/// Velocity frame selected by the player.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct SpeedDisplay(pub SpeedDisplayMode);

/// Attitude indicator reference maintained by the host.
///
/// `relative_gimbal` is in Bevy world axes: the indicator's horizon
/// orientation equals the vessel transform rotation times this value, with
/// the horizon's `-Z` pointing north and `+Y` up.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct AttitudeIndicator {
    /// Vessel-to-horizon rotation, `None` while the indicator is not ready.
    pub relative_gimbal: Option<Quat>,
}

/// Conversion from Bevy's right-handed, `-Z` forward axes into the HUD core's
/// left-handed, `+Z` forward axes by mirroring the Z axis.
pub struct HostSpace;

impl HostSpace {
    /// Mirror a direction.
    pub fn vector(v: Vec3) -> Vec3 {
        Vec3::new(v.x, v.y, -v.z)
    }

    /// Mirror a rotation so that it acts on mirrored vectors.
    pub fn rotation(q: Quat) -> Quat {
        Quat::from_xyzw(-q.x, -q.y, q.z, q.w)
    }

    /// Left-handed perspective matching a Bevy perspective camera.
    pub fn projection(perspective: &PerspectiveProjection, viewport_size: Vec2) -> Mat4 {
        let aspect = if viewport_size.y > 0.0 {
            viewport_size.x / viewport_size.y
        } else {
            perspective.aspect_ratio
        };
        Mat4::perspective_lh(perspective.fov, aspect, perspective.near, perspective.far)
    }

    /// Vessel sample from a vessel's components and world rotation.
    pub fn vessel(vessel: &HudVessel, motion: &VesselMotion, rotation: Quat) -> VesselSample {
        VesselSample {
            id: vessel.id,
            life: vessel.life,
            rotation: Self::rotation(rotation),
            reference_rotation: vessel.control_reference.map(Self::rotation),
            up_axis: Self::vector(motion.up),
            orbital_velocity: Self::vector(motion.orbital_velocity),
            surface_velocity: Self::vector(motion.surface_velocity),
            target_velocity: Self::vector(motion.target_velocity),
        }
    }

    /// Target summary from a target vessel's components.
    pub fn target(vessel: &HudVessel, motion: &VesselMotion) -> TargetVessel {
        TargetVessel {
            landed_or_splashed: vessel.landed_or_splashed,
            loaded: vessel.loaded,
            surface_velocity: Self::vector(motion.surface_velocity),
        }
    }

    /// Camera sample; `None` for orthographic or viewport-less cameras.
    pub fn camera(
        hud_camera: &HudCamera,
        camera: &Camera,
        projection: &Projection,
        rotation: Quat,
    ) -> Option<CameraSample> {
        let Projection::Perspective(perspective) = projection else {
            return None;
        };
        let viewport_size = camera.logical_viewport_size()?;
        Some(CameraSample {
            mode: hud_camera.mode,
            rotation: Self::rotation(rotation),
            projection: Self::projection(perspective, viewport_size),
            viewport_size,
        })
    }

    /// Gimbal relative to the corrected host-space vessel rotation.
    ///
    /// The core composes `corrected * gimbal` to get the horizon, so the Bevy
    /// gimbal is re-expressed against the nose-corrected frame.
    pub fn gimbal(vessel: &VesselSample, vessel_world: Quat, relative_gimbal: Quat) -> Quat {
        let horizon = Self::rotation(vessel_world * relative_gimbal);
        corrected_rotation(vessel).inverse() * horizon
    }
}

/// Read-only views of the host state used to build a [`HostFrame`].
pub struct HostView<'a> {
    /// Active vessel components and world rotation.
    pub vessel: Option<(&'a HudVessel, &'a VesselMotion, Quat)>,
    /// Viewing camera components and world rotation.
    pub camera: Option<(&'a HudCamera, &'a Camera, &'a Projection, Quat)>,
    /// Navigation target components.
    pub target: Option<(&'a HudVessel, &'a VesselMotion)>,
    /// Speed display selection.
    pub speed_mode: SpeedDisplayMode,
    /// Attitude indicator state.
    pub indicator: AttitudeIndicator,
}

impl HostView<'_> {
    /// Convert everything into a core frame.
    pub fn frame(&self) -> HostFrame {
        let vessel = self
            .vessel
            .map(|(vessel, motion, rotation)| (HostSpace::vessel(vessel, motion, rotation), rotation));
        let relative_gimbal = match (vessel, self.indicator.relative_gimbal) {
            (Some((sample, world)), Some(gimbal)) => Some(HostSpace::gimbal(&sample, world, gimbal)),
            _ => None,
        };
        HostFrame {
            vessel: vessel.map(|(sample, _)| sample),
            camera: self.camera.and_then(|(hud_camera, camera, projection, rotation)| {
                HostSpace::camera(hud_camera, camera, projection, rotation)
            }),
            speed_mode: self.speed_mode,
            target: self
                .target
                .map(|(vessel, motion)| HostSpace::target(vessel, motion)),
            relative_gimbal,
        }
    }
}
