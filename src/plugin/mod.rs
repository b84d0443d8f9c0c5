use bevy::camera::visibility::VisibilitySystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

mod host;
mod overlay;

pub use host::{
    ActiveVessel, AttitudeIndicator, HostSpace, HostView, HudCamera, HudVessel, NavTarget,
    SpeedDisplay, VesselMotion,
};
pub use overlay::{
    FlightHud, HUD_RENDER_LAYER, HudMarker, HudOverlayCamera, marker_translation, overlay_order,
};

use crate::settings::HudSettings;

/// Systems that compute and draw markers; hosts update their interface
/// components before this set.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlightHudSystems;

/// Draws the flight HUD for the entity in [`ActiveVessel`] as seen by the
/// camera tagged [`HudCamera`].
///
/// Markers are hidden in `First` and recomputed in `PostUpdate` once
/// transforms are final, so a frame without a valid snapshot shows nothing.
#[derive(Default)]
pub struct FlightHudPlugin {
    /// Initial configuration, inserted as a resource.
    pub settings: HudSettings,
}

impl FlightHudPlugin {
    /// Plugin with the given configuration.
    pub fn new(settings: HudSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for FlightHudPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .insert_resource(FlightHud::new(&self.settings))
            .init_resource::<ActiveVessel>()
            .init_resource::<NavTarget>()
            .init_resource::<SpeedDisplay>()
            .init_resource::<AttitudeIndicator>()
            .add_systems(Startup, overlay::spawn_overlay)
            .add_systems(First, overlay::hide_markers)
            .add_systems(
                PostUpdate,
                (
                    overlay::track_active_vessel,
                    overlay::update_markers,
                    overlay::apply_markers,
                )
                    .chain()
                    .in_set(FlightHudSystems),
            )
            .configure_sets(
                PostUpdate,
                FlightHudSystems
                    .after(TransformSystems::Propagate)
                    .before(VisibilitySystems::VisibilityPropagate),
            );
    }
}
