use bevy::camera::visibility::RenderLayers;
use bevy::camera::{ClearColorConfig, Projection};
use bevy::prelude::*;

use crate::glyphs::{ColorGroup, GlyphAtlas};
use crate::hud::{HudContext, MarkerKind, MarkerSet, MarkerState};
use crate::plugin::host::{
    ActiveVessel, AttitudeIndicator, HostView, HudCamera, HudVessel, NavTarget, SpeedDisplay,
    VesselMotion,
};
use crate::settings::HudSettings;

/// Render layer reserved for HUD sprites.
pub const HUD_RENDER_LAYER: usize = 30;
/// Overlay camera order when drawing over the cockpit.
const ORDER_IN_FRONT: isize = 10;
/// Overlay camera order when cockpit geometry may cover the HUD.
const ORDER_BEHIND: isize = 1;

/// Marker sprite for one [`MarkerKind`].
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudMarker(
    /// Kind this sprite displays.
    pub MarkerKind,
);

/// The 2D camera that draws HUD sprites.
#[derive(Component)]
pub struct HudOverlayCamera;

/// Runtime HUD state owned by the app.
#[derive(Resource)]
pub struct FlightHud {
    /// Projection core.
    pub context: HudContext,
    /// Glyph table used for sprite sizes.
    pub glyphs: GlyphAtlas,
    /// Markers computed this frame.
    pub markers: MarkerSet,
    /// Active vessel seen last frame, for change detection.
    last_vessel: Option<Entity>,
}

impl FlightHud {
    /// Build the HUD state from settings.
    pub fn new(settings: &HudSettings) -> Self {
        Self {
            context: HudContext::new(settings.admissibility()),
            glyphs: GlyphAtlas::with_overrides(&settings.glyph_rects),
            markers: MarkerSet::hidden(),
            last_vessel: None,
        }
    }
}

/// Overlay camera order for the configured cockpit draw mode.
pub fn overlay_order(draw_in_front: bool) -> isize {
    if draw_in_front { ORDER_IN_FRONT } else { ORDER_BEHIND }
}

/// Sprite-space translation of a marker; normalized coordinates scaled to half the viewport.
pub fn marker_translation(state: &MarkerState, viewport_size: Vec2, layer: f32) -> Vec3 {
    (state.position * viewport_size * 0.5).extend(layer)
}

/// Spawn the overlay camera and one hidden sprite per marker kind.
pub fn spawn_overlay(
    mut commands: Commands,
    settings: Res<HudSettings>,
    hud: Res<FlightHud>,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
) {
    let atlas: Handle<Image> = match &settings.atlas_path {
        Some(path) => asset_server.load(path.clone()),
        None => images.add(hud.glyphs.build_texture()),
    };
    let layer = RenderLayers::layer(HUD_RENDER_LAYER);

    commands.spawn((
        Name::new("FlightHud-Camera"),
        Camera2d,
        Camera {
            order: overlay_order(settings.draw_in_front),
            clear_color: ClearColorConfig::None,
            is_active: settings.active,
            ..default()
        },
        layer.clone(),
        HudOverlayCamera,
    ));

    for kind in MarkerKind::ALL {
        let group = ColorGroup::of(kind);
        commands.spawn((
            Name::new(format!("FlightHud-{}", kind.name())),
            Sprite {
                image: atlas.clone(),
                rect: Some(hud.glyphs.rect(kind).to_rect()),
                custom_size: Some(hud.glyphs.sprite_size(kind, settings.display_scale)),
                color: group.color(&settings),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, group.draw_layer()),
            Visibility::Hidden,
            layer.clone(),
            HudMarker(kind),
        ));
    }

    info!(
        "Flight HUD overlay ready (atlas: {}, order {})",
        settings.atlas_path.as_deref().unwrap_or("built-in"),
        overlay_order(settings.draw_in_front)
    );
}

/// Hide every marker at the start of the frame.
pub fn hide_markers(mut hud: ResMut<FlightHud>, mut markers: Query<&mut Visibility, With<HudMarker>>) {
    hud.markers = MarkerSet::hidden();
    for mut visibility in &mut markers {
        *visibility = Visibility::Hidden;
    }
}

/// Reset smoothing when the active vessel changes.
pub fn track_active_vessel(mut hud: ResMut<FlightHud>, active: Res<ActiveVessel>) {
    if hud.last_vessel == active.0 {
        return;
    }
    hud.last_vessel = active.0;
    hud.context.reset();
    info!("Flight HUD following vessel {:?}", active.0);
}

/// Sample the host, run the core and store this frame's markers.
#[allow(clippy::too_many_arguments)]
pub fn update_markers(
    mut hud: ResMut<FlightHud>,
    settings: Res<HudSettings>,
    active: Res<ActiveVessel>,
    target: Res<NavTarget>,
    speed: Res<SpeedDisplay>,
    indicator: Res<AttitudeIndicator>,
    vessels: Query<(&HudVessel, &VesselMotion, &GlobalTransform)>,
    cameras: Query<(&HudCamera, &Camera, &Projection, &GlobalTransform)>,
) {
    if !settings.active {
        hud.markers = MarkerSet::hidden();
        return;
    }
    let vessel = active.0.and_then(|entity| vessels.get(entity).ok());
    let target = target.0.and_then(|entity| vessels.get(entity).ok());
    let camera = cameras.single().ok();

    let view = HostView {
        vessel: vessel.map(|(vessel, motion, global)| (vessel, motion, global.rotation())),
        camera: camera.map(|(hud_camera, camera, projection, global)| {
            (hud_camera, camera, projection, global.rotation())
        }),
        target: target.map(|(vessel, motion, _)| (vessel, motion)),
        speed_mode: speed.0,
        indicator: *indicator,
    };

    let was_ready = hud.context.is_ready();
    hud.markers = hud.context.update(&view.frame());
    let ready = hud.context.is_ready();
    if ready && !was_ready {
        let shown: Vec<_> = hud.markers.enabled_kinds().map(MarkerKind::name).collect();
        debug!("Flight HUD ready, showing {shown:?}");
    } else if was_ready && !ready {
        debug!("Flight HUD not ready");
    }
}

/// Push this frame's markers into sprite transforms, tint and visibility.
pub fn apply_markers(
    hud: Res<FlightHud>,
    settings: Res<HudSettings>,
    mut overlay: Query<&mut Camera, (With<HudOverlayCamera>, Without<HudCamera>)>,
    cameras: Query<&Camera, (With<HudCamera>, Without<HudOverlayCamera>)>,
    mut markers: Query<(&HudMarker, &mut Sprite, &mut Transform, &mut GlobalTransform, &mut Visibility)>,
) {
    if let Ok(mut overlay_camera) = overlay.single_mut() {
        if overlay_camera.is_active != settings.active {
            overlay_camera.is_active = settings.active;
        }
    }
    let Some(viewport_size) = cameras
        .single()
        .ok()
        .and_then(|camera| camera.logical_viewport_size())
    else {
        return;
    };

    draw_markers(&hud.markers, &settings, viewport_size, &mut markers);
}

/// Write each sprite from its marker state; disabled markers are only hidden.
pub(crate) fn draw_markers(
    states: &MarkerSet,
    settings: &HudSettings,
    viewport_size: Vec2,
    markers: &mut Query<(&HudMarker, &mut Sprite, &mut Transform, &mut GlobalTransform, &mut Visibility)>,
) {
    for (marker, mut sprite, mut transform, mut global, mut visibility) in markers.iter_mut() {
        let state = &states[marker.0];
        if !state.enabled {
            *visibility = Visibility::Hidden;
            continue;
        }
        let group = ColorGroup::of(marker.0);
        transform.translation = marker_translation(state, viewport_size, group.draw_layer());
        transform.rotation = state.rotation.to_quat();
        *global = GlobalTransform::from(*transform);
        sprite.color = group.color(settings).with_alpha(state.alpha);
        *visibility = Visibility::Visible;
    }
}
