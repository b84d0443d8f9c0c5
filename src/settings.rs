use std::collections::HashMap;

use bevy::color::Color;
use bevy::log::warn;
use bevy::prelude::Resource;
use thiserror::Error;

use crate::glyphs::GlyphRect;
use crate::hud::{Admissibility, MarkerKind};

/// Default tint for every marker group.
const DEFAULT_MARKER_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);
/// Default glyph scale relative to atlas pixels.
const DEFAULT_DISPLAY_SCALE: f32 = 1.0;
/// Prefix of per-marker atlas rectangle keys.
const RECT_KEY_PREFIX: &str = "rect";

/// Failure to interpret one settings entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    /// Key is not recognized.
    #[error("unknown settings key `{0}`")]
    UnknownKey(String),
    /// Wrong number of comma-separated components.
    #[error("`{key}` expects {expected} comma-separated values, got {found}")]
    WrongArity {
        /// Settings key.
        key: String,
        /// Accepted component counts.
        expected: &'static str,
        /// Components present in the value.
        found: usize,
    },
    /// Component is not a number.
    #[error("`{key}`: cannot parse `{value}` as a number")]
    InvalidNumber {
        /// Settings key.
        key: String,
        /// Offending component.
        value: String,
    },
    /// Value is not `true` or `false`.
    #[error("`{key}`: cannot parse `{value}` as a boolean")]
    InvalidBool {
        /// Settings key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Rectangle with `right <= left` or `bottom <= top`.
    #[error("`{key}`: rectangle `{value}` is empty")]
    EmptyRect {
        /// Settings key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Scale factor that is zero, negative or not finite.
    #[error("`{key}`: scale `{value}` must be positive")]
    InvalidScale {
        /// Settings key.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// User-facing HUD configuration.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct HudSettings {
    /// On/off switch for the whole overlay.
    pub active: bool,
    /// Tint of the horizon and vertical glyphs.
    pub horizon_color: Color,
    /// Tint of the prograde and retrograde glyphs.
    pub prograde_color: Color,
    /// Tint of the heading, reverse and level guide glyphs.
    pub attitude_color: Color,
    /// Multiplier applied to atlas pixel sizes on screen.
    pub display_scale: f32,
    /// Draw the overlay after cockpit geometry instead of before it.
    pub draw_in_front: bool,
    /// Asset path of a replacement atlas; `None` uses the built-in one.
    pub atlas_path: Option<String>,
    /// Per-marker atlas rectangles replacing the defaults.
    pub glyph_rects: HashMap<MarkerKind, GlyphRect>,
    /// Clip in screen pixels instead of normalized coordinates.
    pub screen_space_clip: bool,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            active: true,
            horizon_color: DEFAULT_MARKER_COLOR,
            prograde_color: DEFAULT_MARKER_COLOR,
            attitude_color: DEFAULT_MARKER_COLOR,
            display_scale: DEFAULT_DISPLAY_SCALE,
            draw_in_front: true,
            atlas_path: None,
            glyph_rects: HashMap::new(),
            screen_space_clip: false,
        }
    }
}

impl HudSettings {
    /// Apply one `key = value` entry; the previous value survives on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if let Some(kind) = key
            .strip_prefix(RECT_KEY_PREFIX)
            .and_then(MarkerKind::from_name)
        {
            self.glyph_rects.insert(kind, parse_rect(key, value)?);
            return Ok(());
        }
        match key {
            "active" => self.active = parse_bool(key, value)?,
            "horizonColor" => self.horizon_color = parse_color(key, value)?,
            "progradeColor" => self.prograde_color = parse_color(key, value)?,
            "attitudeColor" => self.attitude_color = parse_color(key, value)?,
            "displayScaleFactor" => self.display_scale = parse_scale(key, value)?,
            "drawInFrontOfCockpit" => self.draw_in_front = parse_bool(key, value)?,
            "screenSpaceClip" => self.screen_space_clip = parse_bool(key, value)?,
            "atlasTexture" => self.atlas_path = Some(value.trim().to_string()),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Apply a batch of already-read entries, logging and returning failures.
    pub fn apply_overrides<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Vec<SettingsError> {
        let mut errors = Vec::new();
        for (key, value) in entries {
            if let Err(err) = self.apply(key, value) {
                warn!("Ignoring HUD setting: {err}");
                errors.push(err);
            }
        }
        errors
    }

    /// Clip rule matching [`HudSettings::screen_space_clip`].
    pub fn admissibility(&self) -> Admissibility {
        if self.screen_space_clip {
            Admissibility::ScreenMargin
        } else {
            Admissibility::default()
        }
    }
}

/// Split a comma-separated value into trimmed components.
fn components(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

/// Parse `"r,g,b"` or `"r,g,b,a"` with components in `[0, 1]`; alpha defaults to 1.
pub fn parse_color(key: &str, value: &str) -> Result<Color, SettingsError> {
    let parts = components(value);
    if !(3..=4).contains(&parts.len()) {
        return Err(SettingsError::WrongArity {
            key: key.to_string(),
            expected: "3 or 4",
            found: parts.len(),
        });
    }
    let mut rgba = [1.0_f32; 4];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SettingsError::InvalidNumber {
                key: key.to_string(),
                value: part.to_string(),
            })?;
    }
    Ok(Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3]))
}

/// Parse `"left,right,top,bottom"` atlas pixel coordinates.
pub fn parse_rect(key: &str, value: &str) -> Result<GlyphRect, SettingsError> {
    let parts = components(value);
    if parts.len() != 4 {
        return Err(SettingsError::WrongArity {
            key: key.to_string(),
            expected: "4",
            found: parts.len(),
        });
    }
    let mut edges = [0_u32; 4];
    for (slot, part) in edges.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| SettingsError::InvalidNumber {
            key: key.to_string(),
            value: part.to_string(),
        })?;
    }
    let [left, right, top, bottom] = edges;
    if right <= left || bottom <= top {
        return Err(SettingsError::EmptyRect {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(GlyphRect::new(left, right, top, bottom))
}

/// Case-insensitive `true` / `false`.
fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(SettingsError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Strictly positive finite scale factor.
fn parse_scale(key: &str, value: &str) -> Result<f32, SettingsError> {
    let scale: f32 = value.trim().parse().map_err(|_| SettingsError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })?;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SettingsError::InvalidScale {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(scale)
}
