use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::color::Color;
use bevy::image::{Image, ImageSampler};
use bevy::math::{Rect, UVec2, Vec2};
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};

use crate::hud::MarkerKind;
use crate::settings::HudSettings;

/// Width of the built-in atlas in pixels.
pub const ATLAS_WIDTH: u32 = 512;
/// Height of the built-in atlas in pixels.
pub const ATLAS_HEIGHT: u32 = 128;
/// Stroke width of procedurally painted glyphs, in pixels.
const STROKE_WIDTH: f32 = 3.0;
/// Reference glyph size the stroke layouts are drawn for.
const LAYOUT_UNIT: f32 = 64.0;

/// Pixel rectangle of one glyph inside the atlas, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphRect {
    /// First column.
    pub left: u32,
    /// One past the last column.
    pub right: u32,
    /// First row.
    pub top: u32,
    /// One past the last row.
    pub bottom: u32,
}

impl GlyphRect {
    /// Build a rectangle from its edges.
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Pixel rectangle as used by sprite texture sampling.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }
}

/// Which configured tint a marker uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorGroup {
    /// Heading, reverse heading and level guide.
    Attitude,
    /// Prograde and retrograde.
    Prograde,
    /// Horizon and vertical.
    Horizon,
}

impl ColorGroup {
    /// Group of `kind`.
    pub const fn of(kind: MarkerKind) -> Self {
        match kind {
            MarkerKind::Heading | MarkerKind::Reverse | MarkerKind::LevelGuide => {
                ColorGroup::Attitude
            }
            MarkerKind::Prograde | MarkerKind::Retrograde => ColorGroup::Prograde,
            MarkerKind::Vertical | MarkerKind::Horizon => ColorGroup::Horizon,
        }
    }

    /// Configured tint of this group.
    pub fn color(self, settings: &HudSettings) -> Color {
        match self {
            ColorGroup::Attitude => settings.attitude_color,
            ColorGroup::Prograde => settings.prograde_color,
            ColorGroup::Horizon => settings.horizon_color,
        }
    }

    /// Overlay depth; attitude glyphs draw over velocity glyphs, which draw over the horizon.
    pub const fn draw_layer(self) -> f32 {
        match self {
            ColorGroup::Attitude => 0.2,
            ColorGroup::Prograde => 0.1,
            ColorGroup::Horizon => 0.0,
        }
    }
}

/// Read-only table of glyph rectangles in the shared marker texture.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphAtlas {
    rects: [GlyphRect; MarkerKind::COUNT],
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self {
            rects: Self::DEFAULT_RECTS,
        }
    }
}

impl GlyphAtlas {
    /// Built-in layout, in [`MarkerKind`] order.
    pub const DEFAULT_RECTS: [GlyphRect; MarkerKind::COUNT] = [
        GlyphRect::new(0, 64, 64, 128),
        GlyphRect::new(64, 128, 64, 128),
        GlyphRect::new(128, 192, 64, 128),
        GlyphRect::new(192, 256, 64, 128),
        GlyphRect::new(256, 384, 64, 128),
        GlyphRect::new(412, 508, 28, 124),
        GlyphRect::new(0, 512, 12, 20),
    ];

    /// Default layout with individual rectangles replaced.
    pub fn with_overrides(overrides: &HashMap<MarkerKind, GlyphRect>) -> Self {
        let mut atlas = Self::default();
        for (kind, rect) in overrides {
            atlas.rects[kind.index()] = *rect;
        }
        atlas
    }

    /// Rectangle of `kind`.
    pub fn rect(&self, kind: MarkerKind) -> GlyphRect {
        self.rects[kind.index()]
    }

    /// On-screen size of `kind` at `scale` logical pixels per atlas pixel.
    pub fn sprite_size(&self, kind: MarkerKind, scale: f32) -> Vec2 {
        let rect = self.rect(kind);
        Vec2::new(rect.width() as f32, rect.height() as f32) * scale
    }

    /// Smallest image holding every rectangle, at least the built-in size.
    pub fn image_size(&self) -> UVec2 {
        self.rects.iter().fold(
            UVec2::new(ATLAS_WIDTH, ATLAS_HEIGHT),
            |size, rect| size.max(UVec2::new(rect.right, rect.bottom)),
        )
    }

    /// Paint white glyphs on a transparent background.
    ///
    /// Glyph colors come from sprite tints, so only coverage is stored.
    pub fn render_image(&self) -> RgbaImage {
        let size = self.image_size();
        let mut image = RgbaImage::new(size.x, size.y);
        for kind in MarkerKind::ALL {
            let rect = self.rect(kind);
            let strokes = GlyphStrokes::layout(kind, rect);
            GlyphStrokes::paint(&mut image, rect, &strokes);
        }
        image
    }

    /// Painted atlas as a texture ready for `Assets<Image>`.
    pub fn build_texture(&self) -> Image {
        let painted = self.render_image();
        let size = Extent3d {
            width: painted.width(),
            height: painted.height(),
            depth_or_array_layers: 1,
        };
        let mut image = Image::new_fill(
            size,
            TextureDimension::D2,
            &[0, 0, 0, 0],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        image.data = Some(painted.into_raw());
        image.sampler = ImageSampler::linear();
        image
    }
}

/// One vector primitive of a glyph, in rectangle-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Stroke {
    Ring { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2 },
}

impl Stroke {
    /// Distance from `point` to the stroke's center line.
    fn distance(&self, point: Vec2) -> f32 {
        match *self {
            Stroke::Ring { center, radius } => (point.distance(center) - radius).abs(),
            Stroke::Line { from, to } => {
                let along = to - from;
                let t = if along.length_squared() > 0.0 {
                    ((point - from).dot(along) / along.length_squared()).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                point.distance(from + along * t)
            }
        }
    }
}

/// Stroke layouts and rasterization for the built-in glyph shapes.
struct GlyphStrokes;

impl GlyphStrokes {
    /// Strokes for `kind`, scaled to fit `rect`.
    fn layout(kind: MarkerKind, rect: GlyphRect) -> Vec<Stroke> {
        let size = Vec2::new(rect.width() as f32, rect.height() as f32);
        let c = size * 0.5;
        let s = size.min_element() / LAYOUT_UNIT;
        let ring = |radius: f32| Stroke::Ring {
            center: c,
            radius: radius * s,
        };
        let line = |from: Vec2, to: Vec2| Stroke::Line {
            from: c + from * s,
            to: c + to * s,
        };
        match kind {
            MarkerKind::Heading => vec![
                ring(8.0),
                line(Vec2::new(-26.0, 0.0), Vec2::new(-12.0, 0.0)),
                line(Vec2::new(12.0, 0.0), Vec2::new(26.0, 0.0)),
                line(Vec2::new(0.0, -12.0), Vec2::new(0.0, -20.0)),
            ],
            MarkerKind::Prograde => vec![
                ring(12.0),
                line(Vec2::new(-14.0, 0.0), Vec2::new(-26.0, 0.0)),
                line(Vec2::new(14.0, 0.0), Vec2::new(26.0, 0.0)),
                line(Vec2::new(0.0, -14.0), Vec2::new(0.0, -24.0)),
            ],
            MarkerKind::Retrograde => vec![
                ring(12.0),
                line(Vec2::new(-8.5, -8.5), Vec2::new(8.5, 8.5)),
                line(Vec2::new(-8.5, 8.5), Vec2::new(8.5, -8.5)),
                line(Vec2::new(-10.0, 10.0), Vec2::new(-18.0, 18.0)),
                line(Vec2::new(10.0, 10.0), Vec2::new(18.0, 18.0)),
                line(Vec2::new(0.0, 14.0), Vec2::new(0.0, 24.0)),
            ],
            MarkerKind::Reverse => vec![
                ring(10.0),
                line(Vec2::new(-7.0, -7.0), Vec2::new(7.0, 7.0)),
                line(Vec2::new(-7.0, 7.0), Vec2::new(7.0, -7.0)),
            ],
            MarkerKind::LevelGuide => vec![
                line(Vec2::new(-60.0, 0.0), Vec2::new(-20.0, 0.0)),
                line(Vec2::new(20.0, 0.0), Vec2::new(60.0, 0.0)),
                line(Vec2::new(-20.0, 0.0), Vec2::new(-20.0, 8.0)),
                line(Vec2::new(20.0, 0.0), Vec2::new(20.0, 8.0)),
            ],
            MarkerKind::Vertical => vec![
                ring(26.0),
                line(Vec2::new(-16.0, 0.0), Vec2::new(16.0, 0.0)),
                line(Vec2::new(0.0, -16.0), Vec2::new(0.0, 16.0)),
                line(Vec2::new(0.0, -26.0), Vec2::new(0.0, -31.0)),
            ],
            MarkerKind::Horizon => vec![Stroke::Line {
                from: Vec2::new(2.0, c.y),
                to: Vec2::new(size.x - 2.0, c.y),
            }],
        }
    }

    /// Rasterize `strokes` into `rect` with a smooth one-pixel edge.
    fn paint(image: &mut RgbaImage, rect: GlyphRect, strokes: &[Stroke]) {
        let half_width = (STROKE_WIDTH * 0.5).min(rect.height() as f32 * 0.5);
        for y in rect.top..rect.bottom.min(image.height()) {
            for x in rect.left..rect.right.min(image.width()) {
                let local = Vec2::new((x - rect.left) as f32 + 0.5, (y - rect.top) as f32 + 0.5);
                let distance = strokes
                    .iter()
                    .map(|stroke| stroke.distance(local))
                    .fold(f32::INFINITY, f32::min);
                let t = (half_width + 0.5 - distance).clamp(0.0, 1.0);
                let alpha = (t * t * (3.0 - 2.0 * t) * 255.0) as u8;
                let pixel = image.get_pixel_mut(x, y);
                if alpha > pixel[3] {
                    *pixel = Rgba([255, 255, 255, alpha]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default rectangles fit inside the built-in atlas.
    #[test]
    fn default_rects_fit_atlas() {
        let atlas = GlyphAtlas::default();
        for kind in MarkerKind::ALL {
            let rect = atlas.rect(kind);
            assert!(rect.width() > 0 && rect.height() > 0);
            assert!(rect.right <= ATLAS_WIDTH && rect.bottom <= ATLAS_HEIGHT);
        }
        assert_eq!(atlas.image_size(), UVec2::new(ATLAS_WIDTH, ATLAS_HEIGHT));
    }

    /// Sprite size is the atlas pixel size times the display scale.
    #[test]
    fn sprite_size_scales() {
        let atlas = GlyphAtlas::default();
        assert_eq!(atlas.sprite_size(MarkerKind::Heading, 1.5), Vec2::new(96.0, 96.0));
        assert_eq!(atlas.sprite_size(MarkerKind::LevelGuide, 1.0), Vec2::new(128.0, 64.0));
        assert_eq!(atlas.sprite_size(MarkerKind::Horizon, 1.0), Vec2::new(512.0, 8.0));
    }

    /// Overrides replace single entries and can grow the painted image.
    #[test]
    fn overrides_replace_rects() {
        let mut overrides = HashMap::new();
        overrides.insert(MarkerKind::Prograde, GlyphRect::new(0, 40, 130, 170));
        let atlas = GlyphAtlas::with_overrides(&overrides);
        assert_eq!(atlas.rect(MarkerKind::Prograde), GlyphRect::new(0, 40, 130, 170));
        assert_eq!(atlas.rect(MarkerKind::Heading), GlyphAtlas::DEFAULT_RECTS[0]);
        assert_eq!(atlas.image_size(), UVec2::new(ATLAS_WIDTH, 170));
    }

    /// Sprite rectangles use atlas pixels with the origin at the top-left.
    #[test]
    fn sprite_rect_is_in_pixels() {
        let rect = GlyphAtlas::default().rect(MarkerKind::Heading).to_rect();
        assert_eq!(rect.min, Vec2::new(0.0, 64.0));
        assert_eq!(rect.max, Vec2::new(64.0, 128.0));
    }

    /// Color groups and layers follow the attitude/prograde/horizon split.
    #[test]
    fn color_groups_and_layers() {
        assert_eq!(ColorGroup::of(MarkerKind::LevelGuide), ColorGroup::Attitude);
        assert_eq!(ColorGroup::of(MarkerKind::Retrograde), ColorGroup::Prograde);
        assert_eq!(ColorGroup::of(MarkerKind::Vertical), ColorGroup::Horizon);
        assert!(ColorGroup::Attitude.draw_layer() > ColorGroup::Prograde.draw_layer());
        assert!(ColorGroup::Prograde.draw_layer() > ColorGroup::Horizon.draw_layer());

        let mut settings = HudSettings::default();
        settings.prograde_color = Color::WHITE;
        assert_eq!(ColorGroup::Prograde.color(&settings), Color::WHITE);
    }

    /// Painted glyphs are opaque on their strokes and clear elsewhere.
    #[test]
    fn render_image_paints_strokes() {
        let image = GlyphAtlas::default().render_image();
        assert_eq!(image.dimensions(), (ATLAS_WIDTH, ATLAS_HEIGHT));
        // Heading ring, right side.
        assert_eq!(image.get_pixel(40, 96)[3], 255);
        // Heading corner.
        assert_eq!(image.get_pixel(1, 65)[3], 0);
        // Horizon line middle row.
        assert!(image.get_pixel(256, 16)[3] > 200);
        // Gap between the glyph rows.
        assert_eq!(image.get_pixel(100, 40)[3], 0);
    }

    /// Segment distance clamps to the end points.
    #[test]
    fn segment_distance() {
        let line = Stroke::Line {
            from: Vec2::ZERO,
            to: Vec2::new(10.0, 0.0),
        };
        assert_eq!(line.distance(Vec2::new(5.0, 3.0)), 3.0);
        assert_eq!(line.distance(Vec2::new(13.0, 4.0)), 5.0);
    }

    /// The texture carries the painted RGBA bytes.
    #[test]
    fn texture_matches_painted_image() {
        let atlas = GlyphAtlas::default();
        let texture = atlas.build_texture();
        assert_eq!(texture.width(), ATLAS_WIDTH);
        assert_eq!(texture.height(), ATLAS_HEIGHT);
        assert_eq!(texture.data, Some(atlas.render_image().into_raw()));
    }
}
