use bevy::prelude::*;
use bevy::transform::TransformSystems;
use flight_hud::{FlightHudPlugin, FlightHudSystems, HudSettings};

mod scene;
mod vessel;

use scene::{
    ParkedTarget, attitude_indicator_system, cockpit_toggle_system, readout_system, setup_cursor,
    setup_scene,
};
use vessel::{
    camera_follow_system, camera_look_system, camera_mode_system, planet_spin_system,
    vessel_control_system, vessel_motion_system, vessel_physics_system,
};

// Planet surface radius in world units.
const PLANET_RADIUS: f32 = 600.0;
// Gravity acceleration at the planet surface.
const SURFACE_GRAVITY: f32 = 9.81;
// Planet spin in radians per second.
const PLANET_SPIN_RATE: f32 = 0.02;
// Distance within which the navigation target counts as loaded.
const LOAD_DISTANCE: f32 = 2_000.0;
// Distance from a vessel's origin to its base.
const VESSEL_HALF_HEIGHT: f32 = 1.5;
// Vessel acceleration at full throttle.
const VESSEL_MAX_THRUST: f32 = 25.0;
// Vessel attitude turn rate in radians per second.
const VESSEL_TURN_RATE: f32 = 1.2;

// App entry point and system registration.
fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(FlightHudPlugin::new(HudSettings::default()))
        .init_resource::<ParkedTarget>()
        .add_systems(Startup, (setup_scene, setup_cursor))
        .add_systems(
            Update,
            (
                vessel_control_system,
                vessel_physics_system,
                planet_spin_system,
                camera_look_system,
                camera_mode_system,
                camera_follow_system,
                cockpit_toggle_system,
                readout_system,
            )
                .chain(),
        )
        .add_systems(
            PostUpdate,
            (vessel_motion_system, attitude_indicator_system)
                .chain()
                .after(TransformSystems::Propagate)
                .before(FlightHudSystems),
        )
        .run();
}
