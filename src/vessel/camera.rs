use std::f32::consts::FRAC_PI_2;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;
use flight_hud::hud::CameraMode;
use flight_hud::plugin::HudCamera;

use crate::vessel::components::{ControlledVessel, Planet};

/// Camera orbiting the controlled vessel, or riding in its nose.
#[derive(Component)]
pub struct ChaseCamera {
    /// Mouse-look sensitivity factor.
    pub sensitivity: f32,
    /// Yaw around local up in radians.
    pub yaw: f32,
    /// Elevation angle in radians.
    pub pitch: f32,
    /// Distance from the vessel in chase mode.
    pub distance: f32,
    /// Vessel followed by this camera.
    pub target: Entity,
}

impl ChaseCamera {
    /// Pitch clamp keeping the camera off the up axis.
    const PITCH_LIMIT: f32 = 1.5;
    /// Closest chase distance.
    const DISTANCE_MIN: f32 = 4.0;
    /// Farthest chase distance.
    const DISTANCE_MAX: f32 = 400.0;
    /// Relative zoom per scroll unit.
    const ZOOM_STEP: f32 = 0.1;
    /// Eye offset along the nose in internal mode.
    const INTERNAL_EYE_OFFSET: f32 = 1.2;

    /// Build chase camera state.
    pub fn new(sensitivity: f32, pitch: f32, yaw: f32, distance: f32, target: Entity) -> Self {
        Self {
            sensitivity,
            yaw,
            pitch,
            distance,
            target,
        }
    }

    /// Apply mouse delta to yaw/pitch with sensitivity and clamp pitch.
    pub fn apply_mouse_look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.sensitivity;
        self.pitch -= delta.y * self.sensitivity;
        self.pitch = self.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Zoom in for positive scroll, out for negative.
    pub fn apply_zoom(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * Self::ZOOM_STEP))
            .clamp(Self::DISTANCE_MIN, Self::DISTANCE_MAX);
    }

    /// Look rotation from yaw and pitch.
    fn look_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Orbit position around `target`, level with the local horizon and looking at it.
    pub fn chase_transform(&self, target: Vec3, up: Vec3) -> Transform {
        let frame = Quat::from_rotation_arc(Vec3::Y, up);
        let offset = frame * (self.look_rotation() * Vec3::Z) * self.distance;
        Transform::from_translation(target + offset).looking_at(target, up)
    }

    /// Eye in the vessel nose, looking along it with mouse-look offsets.
    pub fn internal_transform(&self, vessel: &Transform) -> Transform {
        let nose_forward = vessel.rotation * Quat::from_rotation_x(FRAC_PI_2);
        Transform {
            translation: vessel.translation + vessel.rotation * Vec3::Y * Self::INTERNAL_EYE_OFFSET,
            rotation: nose_forward * self.look_rotation(),
            ..default()
        }
    }
}

/// Update camera angles from mouse motion and zoom from the wheel.
pub fn camera_look_system(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mut query: Query<&mut ChaseCamera>,
) {
    for mut camera in &mut query {
        camera.apply_mouse_look(mouse_motion.delta);
        camera.apply_zoom(mouse_scroll.delta.y);
    }
}

/// `C` swaps chase and internal views, `M` toggles the map view.
pub fn camera_mode_system(
    input: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut HudCamera, &mut ChaseCamera)>,
) {
    for (mut hud_camera, mut camera) in &mut query {
        let next = if input.just_pressed(KeyCode::KeyC) {
            match hud_camera.mode {
                CameraMode::Internal => CameraMode::Flight,
                _ => CameraMode::Internal,
            }
        } else if input.just_pressed(KeyCode::KeyM) {
            match hud_camera.mode {
                CameraMode::Map => CameraMode::Flight,
                _ => CameraMode::Map,
            }
        } else {
            continue;
        };
        if next == CameraMode::Internal {
            camera.yaw = 0.0;
            camera.pitch = 0.0;
        }
        info!("Camera mode {:?}", next);
        hud_camera.mode = next;
    }
}

/// Place the camera for its current mode.
pub fn camera_follow_system(
    planets: Query<&Planet>,
    vessels: Query<&Transform, (With<ControlledVessel>, Without<ChaseCamera>)>,
    mut cameras: Query<(&mut Transform, &ChaseCamera, &HudCamera)>,
) {
    let Ok(planet) = planets.single() else {
        return;
    };
    for (mut transform, camera, hud_camera) in &mut cameras {
        let Ok(vessel) = vessels.get(camera.target) else {
            continue;
        };
        *transform = match hud_camera.mode {
            CameraMode::Internal | CameraMode::Iva => camera.internal_transform(vessel),
            CameraMode::Map => {
                let up = planet.up_at(vessel.translation);
                let eye = vessel.translation + up * planet.radius * 2.0;
                Transform::from_translation(eye).looking_at(vessel.translation, Vec3::Y)
            }
            _ => camera.chase_transform(vessel.translation, planet.up_at(vessel.translation)),
        };
    }
}
