//! Flight HUD: attitude and velocity markers projected onto the camera view.

pub mod glyphs;
pub mod hud;
pub mod plugin;
pub mod settings;

pub use glyphs::{GlyphAtlas, GlyphRect};
pub use plugin::{FlightHudPlugin, FlightHudSystems};
pub use settings::{HudSettings, SettingsError};
