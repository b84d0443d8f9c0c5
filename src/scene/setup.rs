use bevy::camera::{PerspectiveProjection, Projection};
use bevy::prelude::*;
use bevy::ui::{Node, PositionType, Val};
use flight_hud::hud::{CameraMode, VesselLife};
use flight_hud::plugin::{ActiveVessel, HudCamera, HudVessel, NavTarget, VesselMotion};

use crate::scene::FlightReadout;
use crate::vessel::{
    AttitudeControl, ChaseCamera, ControlledVessel, Planet, SurfaceAnchored, VesselBody,
};
use crate::{
    PLANET_RADIUS, PLANET_SPIN_RATE, SURFACE_GRAVITY, VESSEL_HALF_HEIGHT, VESSEL_MAX_THRUST,
    VESSEL_TURN_RATE,
};

/// Launch site direction from the planet center.
const LAUNCH_SITE: Vec3 = Vec3::new(0.0, 0.5, 0.866);
/// Surface distance from the launch site to the landed target.
const TARGET_OFFSET: f32 = 60.0;
/// Id of the player's vessel.
const PLAYER_VESSEL_ID: u64 = 1;
/// Id of the landed target vessel.
const TARGET_VESSEL_ID: u64 = 2;
/// Chase camera mouse sensitivity.
const CAMERA_SENSITIVITY: f32 = 0.002;
/// Initial chase camera elevation.
const CAMERA_INITIAL_PITCH: f32 = -0.35;
/// Initial chase camera yaw.
const CAMERA_INITIAL_YAW: f32 = 0.6;
/// Initial chase camera distance.
const CAMERA_INITIAL_DISTANCE: f32 = 18.0;
/// Far clip plane of the main camera.
const CAMERA_FAR: f32 = 20_000.0;
/// Clear-color used for the sky background.
const SKY_COLOR: Color = Color::srgb(0.05, 0.07, 0.12);
/// Directional-light illuminance used for the sun.
const SUN_ILLUMINANCE: f32 = 12_000.0;
/// World-space sun position used for light direction.
const SUN_POSITION: Vec3 = Vec3::new(3_000.0, 2_000.0, 1_000.0);
/// Readout inset from the window corner in pixels.
const READOUT_INSET: f32 = 8.0;

/// Build planet, vessels, lighting, camera and readout.
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ClearColor(SKY_COLOR));
    commands.insert_resource(bevy::light::GlobalAmbientLight {
        color: Color::srgb(0.7, 0.75, 0.85),
        brightness: 120.0,
        affects_lightmapped_meshes: true,
    });
    commands.spawn((
        DirectionalLight {
            illuminance: SUN_ILLUMINANCE,
            ..default()
        },
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let planet = Planet::new(PLANET_RADIUS, SURFACE_GRAVITY, PLANET_SPIN_RATE);
    let planet_entity = spawn_planet(&mut commands, &mut meshes, &mut materials, planet);
    let vessel = spawn_player_vessel(&mut commands, &mut meshes, &mut materials);
    let target = spawn_target(&mut commands, &mut meshes, &mut materials, planet_entity);
    commands.insert_resource(ActiveVessel(Some(vessel)));
    commands.insert_resource(NavTarget(Some(target)));

    spawn_camera(&mut commands, vessel);
    spawn_readout(&mut commands);
}

/// Spawn the spinning planet sphere.
fn spawn_planet(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    planet: Planet,
) -> Entity {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.25, 0.45, 0.3),
        perceptual_roughness: 0.9,
        ..default()
    });
    commands
        .spawn((
            Name::new("Planet"),
            Mesh3d(meshes.add(Sphere::new(planet.radius).mesh().uv(96, 48))),
            MeshMaterial3d(material),
            Transform::IDENTITY,
            planet,
        ))
        .id()
}

/// Vessel mesh: a capsule hull along `+Y` with a dorsal fin on `+Z`.
fn vessel_visual(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    material: Handle<StandardMaterial>,
    parent: Entity,
) {
    let hull = meshes.add(Capsule3d::new(0.5, 2.0 * VESSEL_HALF_HEIGHT - 1.0));
    let fin = meshes.add(Cuboid::new(0.1, 0.8, 0.6));
    commands.entity(parent).with_children(|vessel| {
        vessel.spawn((Mesh3d(hull), MeshMaterial3d(material.clone())));
        vessel.spawn((
            Mesh3d(fin),
            MeshMaterial3d(material),
            Transform::from_xyz(0.0, -0.6, 0.7),
        ));
    });
}

/// Spawn the controllable vessel standing on the launch site.
fn spawn_player_vessel(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) -> Entity {
    let up = LAUNCH_SITE.normalize();
    let position = up * (PLANET_RADIUS + VESSEL_HALF_HEIGHT);
    let entity = commands
        .spawn((
            Name::new("Vessel"),
            Transform::from_translation(position).with_rotation(Quat::from_rotation_arc(Vec3::Y, up)),
            Visibility::default(),
            ControlledVessel,
            VesselBody::new(VESSEL_HALF_HEIGHT, VESSEL_MAX_THRUST),
            AttitudeControl::new(VESSEL_TURN_RATE),
            HudVessel::new(PLAYER_VESSEL_ID),
            VesselMotion::default(),
        ))
        .id();
    let material = materials.add(Color::srgb(0.85, 0.85, 0.9));
    vessel_visual(commands, meshes, material, entity);
    entity
}

/// Spawn the landed target as a child of the planet so it turns with the surface.
fn spawn_target(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    planet: Entity,
) -> Entity {
    let site = LAUNCH_SITE.normalize();
    let east = Vec3::Y.cross(site).normalize_or(Vec3::X);
    let up = (site + east * TARGET_OFFSET / PLANET_RADIUS).normalize();
    let position = up * (PLANET_RADIUS + VESSEL_HALF_HEIGHT);
    let entity = commands
        .spawn((
            Name::new("Target"),
            Transform::from_translation(position).with_rotation(Quat::from_rotation_arc(Vec3::Y, up)),
            Visibility::default(),
            SurfaceAnchored,
            HudVessel {
                life: VesselLife::Inactive,
                landed_or_splashed: true,
                ..HudVessel::new(TARGET_VESSEL_ID)
            },
            VesselMotion::default(),
            ChildOf(planet),
        ))
        .id();
    let material = materials.add(Color::srgb(0.9, 0.5, 0.2));
    vessel_visual(commands, meshes, material, entity);
    entity
}

/// Spawn the main camera chasing `vessel`.
fn spawn_camera(commands: &mut Commands, vessel: Entity) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::IDENTITY,
        bevy::ui::IsDefaultUiCamera,
        HudCamera {
            mode: CameraMode::Flight,
        },
        ChaseCamera::new(
            CAMERA_SENSITIVITY,
            CAMERA_INITIAL_PITCH,
            CAMERA_INITIAL_YAW,
            CAMERA_INITIAL_DISTANCE,
            vessel,
        ),
    ));
}

/// Spawn the top-left text readout.
fn spawn_readout(commands: &mut Commands) {
    commands.spawn((
        Text::new(""),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(READOUT_INSET),
            left: Val::Px(READOUT_INSET),
            ..default()
        },
        FlightReadout,
    ));
}

/// Lock and hide cursor for mouse-look controls.
pub fn setup_cursor(
    mut windows: Query<&mut bevy::window::CursorOptions, With<bevy::window::PrimaryWindow>>,
) {
    let Ok(mut cursor_options) = windows.single_mut() else {
        return;
    };
    cursor_options.grab_mode = bevy::window::CursorGrabMode::Locked;
    cursor_options.visible = false;
}
