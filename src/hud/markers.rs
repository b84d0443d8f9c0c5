use bevy::math::{Quat, Vec2};
use std::ops::{Index, IndexMut};

/// Indicator glyphs drawn by the HUD, in atlas/table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Vessel nose direction, in front of the camera.
    Heading,
    /// Velocity direction, in front of the camera.
    Prograde,
    /// Velocity direction, behind the camera.
    Retrograde,
    /// Vessel nose direction, behind the camera.
    Reverse,
    /// Zero-roll reference line drawn over the heading marker.
    LevelGuide,
    /// Local vertical, shown when pointing nearly straight up or down.
    Vertical,
    /// Horizon line crossing under the heading.
    Horizon,
}

impl MarkerKind {
    /// Number of marker kinds.
    pub const COUNT: usize = 7;

    /// All kinds in table order.
    pub const ALL: [MarkerKind; Self::COUNT] = [
        MarkerKind::Heading,
        MarkerKind::Prograde,
        MarkerKind::Retrograde,
        MarkerKind::Reverse,
        MarkerKind::LevelGuide,
        MarkerKind::Vertical,
        MarkerKind::Horizon,
    ];

    /// Table index of this kind.
    pub const fn index(self) -> usize {
        match self {
            MarkerKind::Heading => 0,
            MarkerKind::Prograde => 1,
            MarkerKind::Retrograde => 2,
            MarkerKind::Reverse => 3,
            MarkerKind::LevelGuide => 4,
            MarkerKind::Vertical => 5,
            MarkerKind::Horizon => 6,
        }
    }

    /// Name used by settings keys (`rect<Name>`) and entity names.
    pub const fn name(self) -> &'static str {
        match self {
            MarkerKind::Heading => "Heading",
            MarkerKind::Prograde => "Prograde",
            MarkerKind::Retrograde => "Retrograde",
            MarkerKind::Reverse => "Reverse",
            MarkerKind::LevelGuide => "LevelGuide",
            MarkerKind::Vertical => "Vertical",
            MarkerKind::Horizon => "Horizon",
        }
    }

    /// Resolve a kind from its settings name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Screen-plane rotation of a glyph, stored as the z/w half of a quaternion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRotation {
    /// `sin(angle / 2)`.
    pub z: f32,
    /// `cos(angle / 2)`.
    pub w: f32,
}

impl MarkerRotation {
    /// No rotation.
    pub const IDENTITY: Self = Self { z: 0.0, w: 1.0 };

    /// Full quaternion about the screen normal.
    pub fn to_quat(self) -> Quat {
        Quat::from_xyzw(0.0, 0.0, self.z, self.w)
    }
}

impl Default for MarkerRotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-frame output record for one marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerState {
    /// Whether the glyph should be drawn this frame.
    pub enabled: bool,
    /// Normalized device position; `[-1, 1]` is the visible range, y up.
    pub position: Vec2,
    /// Screen-plane glyph rotation.
    pub rotation: MarkerRotation,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Alignment value the alpha was derived from.
    pub blend_value: f32,
}

impl MarkerState {
    /// Disabled record with neutral values.
    pub const HIDDEN: Self = Self {
        enabled: false,
        position: Vec2::ZERO,
        rotation: MarkerRotation::IDENTITY,
        alpha: 0.0,
        blend_value: 0.0,
    };
}

impl Default for MarkerState {
    fn default() -> Self {
        Self::HIDDEN
    }
}

/// One state per marker kind, indexed by [`MarkerKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerSet(pub [MarkerState; MarkerKind::COUNT]);

impl MarkerSet {
    /// All markers disabled.
    pub const fn hidden() -> Self {
        Self([MarkerState::HIDDEN; MarkerKind::COUNT])
    }

    /// Iterate `(kind, state)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerKind, &MarkerState)> {
        MarkerKind::ALL.into_iter().zip(self.0.iter())
    }

    /// Kinds that are enabled this frame.
    pub fn enabled_kinds(&self) -> impl Iterator<Item = MarkerKind> + '_ {
        self.iter()
            .filter(|(_, state)| state.enabled)
            .map(|(kind, _)| kind)
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::hidden()
    }
}

impl Index<MarkerKind> for MarkerSet {
    type Output = MarkerState;

    fn index(&self, kind: MarkerKind) -> &MarkerState {
        &self.0[kind.index()]
    }
}

impl IndexMut<MarkerKind> for MarkerSet {
    fn index_mut(&mut self, kind: MarkerKind) -> &mut MarkerState {
        &mut self.0[kind.index()]
    }
}

/// Linear fade between a fully visible and an invisible alignment value.
///
/// The two thresholds may be given in either order; the ramp direction
/// follows from which one is `visible`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendCurve {
    /// Input at which alpha reaches 1 (C0).
    pub visible: f32,
    /// Input at which alpha reaches 0 (C1).
    pub invisible: f32,
}

impl BlendCurve {
    /// Horizon line: fades out as the heading nears vertical.
    pub const HORIZON: Self = Self::new(0.259, 0.342);
    /// Vertical marker: fades in as the heading nears vertical.
    pub const VERTICAL: Self = Self::new(0.966, 0.94);
    /// Level guide: fades out in a narrow band just short of vertical.
    pub const LEVEL_GUIDE: Self = Self::new(0.984, 0.996);

    /// Build a curve from its `(C0, C1)` breakpoints.
    pub const fn new(visible: f32, invisible: f32) -> Self {
        Self { visible, invisible }
    }

    /// Map an alignment value to an alpha in `[0, 1]`.
    ///
    /// Non-finite input yields 0 so a bad value never shows a glyph.
    pub fn alpha(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return 0.0;
        }
        let slope = 1.0 / (self.invisible - self.visible);
        1.0 - ((value - self.visible) * slope).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every kind maps to a unique index and round-trips through its name.
    #[test]
    fn marker_kind_table_is_consistent() {
        for (i, kind) in MarkerKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(MarkerKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(MarkerKind::from_name("Navball"), None);
    }

    /// Alpha stays in range and hits both ends of each curve.
    #[test]
    fn blend_curves_reach_both_ends() {
        for curve in [BlendCurve::HORIZON, BlendCurve::VERTICAL, BlendCurve::LEVEL_GUIDE] {
            assert_eq!(curve.alpha(curve.visible), 1.0);
            assert!(curve.alpha(curve.invisible) < 1e-6);
            for step in 0..=100 {
                let a = curve.alpha(step as f32 / 100.0);
                assert!((0.0..=1.0).contains(&a), "alpha {a} out of range");
            }
        }
    }

    /// Horizon and vertical ramps run in opposite directions.
    #[test]
    fn horizon_and_vertical_are_complementary() {
        assert_eq!(BlendCurve::HORIZON.alpha(0.0), 1.0);
        assert_eq!(BlendCurve::VERTICAL.alpha(0.0), 0.0);
        assert_eq!(BlendCurve::HORIZON.alpha(1.0), 0.0);
        assert_eq!(BlendCurve::VERTICAL.alpha(1.0), 1.0);
    }

    /// Small input steps never produce a jump in alpha.
    #[test]
    fn blend_curves_are_continuous() {
        for curve in [BlendCurve::HORIZON, BlendCurve::VERTICAL, BlendCurve::LEVEL_GUIDE] {
            let steps = 10_000;
            let slope = 1.0 / (curve.invisible - curve.visible).abs();
            let dx = 1.0 / steps as f32;
            let mut previous = curve.alpha(0.0);
            for step in 1..=steps {
                let current = curve.alpha(step as f32 * dx);
                assert!((current - previous).abs() <= slope * dx * 1.01 + 1e-6);
                previous = current;
            }
        }
    }

    /// Midpoint of the horizon ramp is half visible.
    #[test]
    fn blend_curve_interpolates_linearly() {
        let mid = (BlendCurve::HORIZON.visible + BlendCurve::HORIZON.invisible) * 0.5;
        assert!((BlendCurve::HORIZON.alpha(mid) - 0.5).abs() < 1e-4);
        assert_eq!(BlendCurve::LEVEL_GUIDE.alpha(f32::NAN), 0.0);
    }

    /// The z/w pair rebuilds the screen-normal quaternion.
    #[test]
    fn marker_rotation_rebuilds_quat() {
        let q = Quat::from_rotation_z(0.7);
        let rotation = MarkerRotation { z: q.z, w: q.w };
        assert!(rotation.to_quat().abs_diff_eq(q, 1e-6));
        assert_eq!(MarkerRotation::IDENTITY.to_quat(), Quat::IDENTITY);
    }

    /// The hidden set reports no enabled kinds.
    #[test]
    fn hidden_set_has_nothing_enabled() {
        let mut set = MarkerSet::hidden();
        assert_eq!(set.enabled_kinds().count(), 0);
        set[MarkerKind::Vertical].enabled = true;
        assert_eq!(set.enabled_kinds().collect::<Vec<_>>(), vec![MarkerKind::Vertical]);
    }
}
