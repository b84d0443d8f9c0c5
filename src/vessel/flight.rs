use bevy::prelude::*;
use flight_hud::plugin::{ActiveVessel, HudVessel, NavTarget, VesselMotion};

use crate::LOAD_DISTANCE;
use crate::vessel::components::{
    AttitudeControl, ControlledVessel, Planet, SurfaceAnchored, VesselBody,
};

/// Pitch, yaw and roll input from the keyboard.
fn attitude_input(input: &ButtonInput<KeyCode>) -> Vec3 {
    let axis = |negative: KeyCode, positive: KeyCode| {
        input.pressed(positive) as i32 as f32 - input.pressed(negative) as i32 as f32
    };
    Vec3::new(
        axis(KeyCode::KeyS, KeyCode::KeyW),
        axis(KeyCode::KeyA, KeyCode::KeyD),
        axis(KeyCode::KeyQ, KeyCode::KeyE),
    )
}

/// Apply attitude and throttle input to the controlled vessel.
pub fn vessel_control_system(
    time: Res<Time>,
    input: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut Transform, &mut VesselBody, &AttitudeControl), With<ControlledVessel>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut body, control) in &mut query {
        let turn = attitude_input(&input);
        if turn != Vec3::ZERO {
            transform.rotation = (transform.rotation * control.rotation_step(turn, dt)).normalize();
        }
        if input.pressed(KeyCode::ShiftLeft) {
            body.adjust_throttle(VesselBody::THROTTLE_RATE * dt);
        }
        if input.pressed(KeyCode::ControlLeft) {
            body.adjust_throttle(-VesselBody::THROTTLE_RATE * dt);
        }
        if input.just_pressed(KeyCode::KeyZ) {
            body.throttle = 1.0;
        }
        if input.just_pressed(KeyCode::KeyX) {
            body.throttle = 0.0;
        }
    }
}

/// Integrate gravity and thrust for free-flying vessels.
pub fn vessel_physics_system(
    time: Res<Time>,
    planets: Query<&Planet>,
    mut query: Query<(&mut Transform, &mut VesselBody)>,
) {
    let Ok(planet) = planets.single() else {
        return;
    };
    let dt = time.delta_secs();
    for (mut transform, mut body) in &mut query {
        let rotation = transform.rotation;
        body.step(&mut transform.translation, rotation, planet, dt);
    }
}

/// Turn the planet; anchored vessels follow as its children.
pub fn planet_spin_system(time: Res<Time>, mut planets: Query<(&Planet, &mut Transform)>) {
    for (planet, mut transform) in &mut planets {
        transform.rotation = planet.rotation_after(time.elapsed_secs());
    }
}

/// Refresh every vessel's HUD-facing motion and status.
pub fn vessel_motion_system(
    planets: Query<&Planet>,
    active: Res<ActiveVessel>,
    target: Res<NavTarget>,
    mut vessels: Query<(
        &GlobalTransform,
        &mut HudVessel,
        &mut VesselMotion,
        Option<&VesselBody>,
        Has<SurfaceAnchored>,
    )>,
) {
    let Ok(planet) = planets.single() else {
        return;
    };
    for (global, mut vessel, mut motion, body, anchored) in &mut vessels {
        let position = global.translation();
        let surface_frame = planet.surface_velocity_at(position);
        motion.up = planet.up_at(position);
        motion.orbital_velocity = match body {
            Some(body) => body.velocity,
            None => surface_frame,
        };
        motion.surface_velocity = motion.orbital_velocity - surface_frame;
        vessel.landed_or_splashed = anchored || body.is_some_and(|body| body.landed);
    }

    let Some(active_entity) = active.0 else {
        return;
    };
    let Ok((active_global, ..)) = vessels.get(active_entity) else {
        return;
    };
    let active_position = active_global.translation();
    let target_state = target
        .0
        .and_then(|entity| vessels.get(entity).ok())
        .map(|(global, _, motion, ..)| (global.translation(), motion.orbital_velocity));

    if let (Some((target_position, _)), Some(entity)) = (target_state, target.0) {
        if let Ok((_, mut target_vessel, ..)) = vessels.get_mut(entity) {
            target_vessel.loaded = target_position.distance(active_position) <= LOAD_DISTANCE;
        }
    }

    if let Ok((_, _, mut motion, ..)) = vessels.get_mut(active_entity) {
        motion.target_velocity = match target_state {
            Some((_, target_velocity)) => motion.orbital_velocity - target_velocity,
            None => Vec3::ZERO,
        };
    }
}
