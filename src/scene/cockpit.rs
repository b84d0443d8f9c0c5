use bevy::prelude::*;
use flight_hud::HudSettings;
use flight_hud::hud::select_velocity;
use flight_hud::plugin::{
    ActiveVessel, AttitudeIndicator, HostSpace, HudCamera, HudVessel, NavTarget, SpeedDisplay,
    VesselMotion,
};

use crate::vessel::{Planet, VesselBody};

/// Text node showing speed, throttle and HUD state.
#[derive(Component)]
pub struct FlightReadout;

/// Vessel kept as navigation target while targeting is toggled off.
#[derive(Resource, Default)]
pub struct ParkedTarget(pub Option<Entity>);

/// Keep the attitude indicator's horizon under the active vessel.
pub fn attitude_indicator_system(
    planets: Query<&Planet>,
    active: Res<ActiveVessel>,
    vessels: Query<&GlobalTransform>,
    mut indicator: ResMut<AttitudeIndicator>,
) {
    let reference = planets
        .single()
        .ok()
        .zip(active.0.and_then(|entity| vessels.get(entity).ok()));
    indicator.relative_gimbal = reference.map(|(planet, global)| {
        let (_, vessel_rotation, position) = global.to_scale_rotation_translation();
        vessel_rotation.inverse() * planet.horizon_rotation(position)
    });
}

/// `F1` toggles the HUD, `F2` cycles speed modes, `T` toggles the target.
pub fn cockpit_toggle_system(
    input: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<HudSettings>,
    mut speed: ResMut<SpeedDisplay>,
    mut target: ResMut<NavTarget>,
    mut parked: ResMut<ParkedTarget>,
) {
    if input.just_pressed(KeyCode::F1) {
        settings.active = !settings.active;
        info!("Flight HUD {}", if settings.active { "on" } else { "off" });
    }
    if input.just_pressed(KeyCode::F2) {
        speed.0 = speed.0.next();
        info!("Speed display {:?}", speed.0);
    }
    if input.just_pressed(KeyCode::KeyT) {
        std::mem::swap(&mut target.0, &mut parked.0);
        info!("Navigation target {:?}", target.0);
    }
}

/// Refresh the text readout.
pub fn readout_system(
    settings: Res<HudSettings>,
    speed: Res<SpeedDisplay>,
    active: Res<ActiveVessel>,
    target: Res<NavTarget>,
    vessels: Query<(&HudVessel, &VesselMotion, Option<&VesselBody>)>,
    cameras: Query<&HudCamera>,
    mut readouts: Query<&mut Text, With<FlightReadout>>,
) {
    let Ok(mut text) = readouts.single_mut() else {
        return;
    };
    let Some((vessel, motion, body)) = active.0.and_then(|entity| vessels.get(entity).ok()) else {
        text.0 = "No active vessel".to_string();
        return;
    };
    let nav_target = target
        .0
        .and_then(|entity| vessels.get(entity).ok())
        .map(|(vessel, motion, _)| HostSpace::target(vessel, motion));
    let sample = HostSpace::vessel(vessel, motion, Quat::IDENTITY);
    let velocity = select_velocity(&sample, speed.0, nav_target.as_ref());
    let throttle = body.map_or(0.0, |body| body.throttle * 100.0);
    let camera = cameras.single().map_or("none".to_string(), |camera| format!("{:?}", camera.mode));
    text.0 = format!(
        "{:?} {:.1} m/s | throttle {:.0}% | target {} | camera {} | HUD {}\n\
         WASD/QE steer, Shift/Ctrl throttle, Z/X full/cut, C view, M map, F1 HUD, F2 speed, T target",
        speed.0,
        velocity.length(),
        throttle,
        if target.0.is_some() { "set" } else { "none" },
        camera,
        if settings.active { "on" } else { "off" },
    );
}
