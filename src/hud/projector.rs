use bevy::math::{Mat4, Vec2, Vec3};

use crate::hud::markers::{BlendCurve, MarkerKind, MarkerRotation, MarkerSet, MarkerState};
use crate::hud::solver::Orientation;

/// Default slack on the normalized `[-1, 1]` range before a glyph is dropped.
pub const CLIP_SLACK: f32 = 1.5;

/// Cosine above which a glyph is treated as unrotated.
const IDENTITY_COS: f64 = 1.0 - 1.0e-10;

/// Squared 2D length below which an up vector carries no direction.
const MIN_UP_LENGTH_SQ: f64 = 1.0e-12;

/// Rule deciding whether a projected position may be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Admissibility {
    /// Both normalized coordinates within `[-slack, slack]`.
    Normalized {
        /// Multiple of the visible half-range.
        slack: f32,
    },
    /// Screen position within one viewport size beyond each edge.
    ScreenMargin,
}

impl Default for Admissibility {
    fn default() -> Self {
        Admissibility::Normalized { slack: CLIP_SLACK }
    }
}

impl Admissibility {
    /// Test a projected position; NaN and infinities never pass.
    pub fn admits(&self, ndc: Vec3, viewport_size: Vec2) -> bool {
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return false;
        }
        match *self {
            Admissibility::Normalized { slack } => {
                (-slack..=slack).contains(&ndc.x) && (-slack..=slack).contains(&ndc.y)
            }
            Admissibility::ScreenMargin => {
                let screen = ndc_to_screen(ndc.truncate(), viewport_size);
                let (w, h) = (viewport_size.x, viewport_size.y);
                (-w..=2.0 * w).contains(&screen.x) && (-h..=2.0 * h).contains(&screen.y)
            }
        }
    }
}

/// Perspective-project a camera-space direction to normalized device coordinates.
pub fn project_direction(projection: &Mat4, direction: Vec3) -> Vec3 {
    projection.project_point3(direction)
}

/// Normalized device position to `[0, 1]` viewport coordinates, origin bottom-left.
pub fn ndc_to_viewport(ndc: Vec2) -> Vec2 {
    (ndc + Vec2::ONE) * 0.5
}

/// Normalized device position to pixels, origin top-left, y down.
pub fn ndc_to_screen(ndc: Vec2, viewport_size: Vec2) -> Vec2 {
    let viewport = ndc_to_viewport(ndc);
    Vec2::new(viewport.x, 1.0 - viewport.y) * viewport_size
}

/// Rotation that turns an upright glyph so its up axis follows `up`.
///
/// Only the x/y components of `up` are used. Built from the half-angle
/// identities, so no inverse trigonometry is needed.
pub fn in_plane_rotation(up: Vec3) -> MarkerRotation {
    let (x, y) = (up.x as f64, up.y as f64);
    let length_sq = x * x + y * y;
    if !length_sq.is_finite() || length_sq < MIN_UP_LENGTH_SQ {
        return MarkerRotation::IDENTITY;
    }
    let norm = length_sq.sqrt();
    let cos = y / norm;
    let sin = -x / norm;
    if cos >= IDENTITY_COS {
        return MarkerRotation::IDENTITY;
    }
    let z = ((1.0 - cos) * 0.5).sqrt();
    let w = sin / z * 0.5;
    MarkerRotation {
        z: z as f32,
        w: w as f32,
    }
}

/// Maps solver output to per-marker screen records.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MarkerProjector {
    /// Clip tolerance rule.
    pub admissibility: Admissibility,
}

impl MarkerProjector {
    /// Build a projector with the given clip tolerance rule.
    pub fn new(admissibility: Admissibility) -> Self {
        Self { admissibility }
    }

    /// Project every marker; anything failing its checks stays disabled.
    pub fn project(&self, orientation: &Orientation, projection: &Mat4, viewport_size: Vec2) -> MarkerSet {
        let mut markers = MarkerSet::hidden();
        let place = |direction: Vec3| -> Option<Vec2> {
            let ndc = project_direction(projection, direction);
            self.admissibility
                .admits(ndc, viewport_size)
                .then(|| ndc.truncate())
        };

        if let Some(position) = place(orientation.horizon_tangent) {
            markers[MarkerKind::Horizon] = blended(
                position,
                orientation.horizon_up_vector,
                orientation.blend_horizon,
                BlendCurve::HORIZON,
            );
        }

        if let Some(position) = place(orientation.up_in_cam) {
            markers[MarkerKind::Vertical] = blended(
                position,
                orientation.north_in_cam,
                orientation.blend_vertical,
                BlendCurve::VERTICAL,
            );
        }

        if orientation.is_moving {
            if let Some(position) = place(orientation.velocity_in_cam) {
                let kind = if orientation.velocity_in_cam.z >= 0.0 {
                    MarkerKind::Prograde
                } else {
                    MarkerKind::Retrograde
                };
                markers[kind] = opaque(position, Vec3::Y);
            }
        }

        if let Some(position) = place(orientation.heading) {
            let kind = if orientation.heading.z >= 0.0 {
                MarkerKind::Heading
            } else {
                MarkerKind::Reverse
            };
            markers[kind] = opaque(position, orientation.vessel_up);
            markers[MarkerKind::LevelGuide] = blended(
                position,
                orientation.level_guide_up_vector,
                orientation.blend_level_guide,
                BlendCurve::LEVEL_GUIDE,
            );
        }

        markers
    }
}

/// Always fully visible marker.
fn opaque(position: Vec2, up: Vec3) -> MarkerState {
    MarkerState {
        enabled: true,
        position,
        rotation: in_plane_rotation(up),
        alpha: 1.0,
        blend_value: 1.0,
    }
}

/// Marker faded by `curve`; disabled once fully transparent.
fn blended(position: Vec2, up: Vec3, blend_value: f32, curve: BlendCurve) -> MarkerState {
    let alpha = curve.alpha(blend_value);
    MarkerState {
        enabled: alpha > 0.0,
        position,
        rotation: in_plane_rotation(up),
        alpha,
        blend_value,
    }
}
