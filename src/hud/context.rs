use crate::hud::markers::MarkerSet;
use crate::hud::projector::{Admissibility, MarkerProjector};
use crate::hud::sampler::{FrameSampler, HostFrame};
use crate::hud::solver::{Orientation, OrientationSolver};

/// All per-HUD state: smoothing history and projection configuration.
///
/// One context is created at start-up and driven once per frame with
/// [`HudContext::update`]. Nothing here touches the engine.
#[derive(Clone, Debug, Default)]
pub struct HudContext {
    sampler: FrameSampler,
    projector: MarkerProjector,
    ready: bool,
    last_orientation: Option<Orientation>,
}

impl HudContext {
    /// Build a context using `admissibility` for clip tests.
    pub fn new(admissibility: Admissibility) -> Self {
        Self {
            projector: MarkerProjector::new(admissibility),
            ..Self::default()
        }
    }

    /// Compute this frame's markers; everything is hidden when not ready.
    pub fn update(&mut self, frame: &HostFrame) -> MarkerSet {
        let Some(snapshot) = self.sampler.sample(frame) else {
            self.ready = false;
            self.last_orientation = None;
            return MarkerSet::hidden();
        };
        let orientation = OrientationSolver::solve(&snapshot);
        self.ready = true;
        self.last_orientation = Some(orientation);
        self.projector
            .project(&orientation, &snapshot.projection, snapshot.viewport_size)
    }

    /// Whether the last [`update`](Self::update) produced a snapshot.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Solver output of the last ready frame.
    pub fn last_orientation(&self) -> Option<&Orientation> {
        self.last_orientation.as_ref()
    }

    /// Current clip tolerance rule.
    pub fn admissibility(&self) -> Admissibility {
        self.projector.admissibility
    }

    /// Swap the clip tolerance rule.
    pub fn set_admissibility(&mut self, admissibility: Admissibility) {
        self.projector.admissibility = admissibility;
    }

    /// Drop smoothing history, e.g. after the active vessel changed.
    pub fn reset(&mut self) {
        self.sampler.reset();
        self.ready = false;
        self.last_orientation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::markers::{MarkerKind, MarkerRotation};
    use crate::hud::sampler::tests::ready_frame;
    use bevy::math::{Quat, Vec2, Vec3};
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Level vessel seen from straight behind, standing still.
    #[test]
    fn heading_forward_scenario() {
        let mut hud = HudContext::default();
        let markers = hud.update(&ready_frame(Vec3::ZERO));
        assert!(hud.is_ready());

        let heading = markers[MarkerKind::Heading];
        assert!(heading.enabled);
        assert!(heading.position.abs_diff_eq(Vec2::ZERO, 1e-5));
        assert_eq!(heading.alpha, 1.0);
        assert_eq!(heading.rotation, MarkerRotation::IDENTITY);

        assert!(!markers[MarkerKind::Prograde].enabled);
        assert!(!markers[MarkerKind::Retrograde].enabled);
        assert!(!markers[MarkerKind::Reverse].enabled);

        let guide = markers[MarkerKind::LevelGuide];
        assert!(guide.blend_value.abs() < 1e-5);
        assert!(guide.enabled);
        assert_eq!(guide.position, heading.position);

        assert!(!markers[MarkerKind::Vertical].enabled);
        let horizon = markers[MarkerKind::Horizon];
        assert!(horizon.enabled);
        assert_eq!(horizon.alpha, 1.0);
    }

    /// Nose and velocity straight up: vertical marker fully shown, horizon hidden.
    #[test]
    fn nose_up_scenario() {
        let mut frame = ready_frame(Vec3::Y * 5.0);
        if let Some(vessel) = frame.vessel.as_mut() {
            vessel.rotation = Quat::IDENTITY;
        }
        if let Some(camera) = frame.camera.as_mut() {
            camera.rotation = Quat::from_rotation_x(-FRAC_PI_2);
        }
        let mut hud = HudContext::default();
        let markers = hud.update(&frame);

        let orientation = hud.last_orientation().copied().unwrap();
        assert!((orientation.heading_dot_up.abs() - 1.0).abs() < 1e-5);

        let vertical = markers[MarkerKind::Vertical];
        assert!(vertical.enabled);
        assert!((vertical.alpha - 1.0).abs() < 1e-5);
        assert!(vertical.position.abs_diff_eq(Vec2::ZERO, 1e-5));
        assert!(!markers[MarkerKind::Horizon].enabled);
    }

    /// A vessel pitched up on the pad keeps its horizon line fully visible.
    #[test]
    fn stationary_pitched_vessel_shows_horizon() {
        let mut frame = ready_frame(Vec3::ZERO);
        if let Some(vessel) = frame.vessel.as_mut() {
            vessel.rotation = Quat::from_rotation_x(10.0_f32.to_radians());
        }
        let mut hud = HudContext::default();
        let markers = hud.update(&frame);

        let orientation = hud.last_orientation().copied().unwrap();
        assert!(!orientation.is_moving);
        assert!(orientation.heading_dot_up > 0.98);

        let horizon = markers[MarkerKind::Horizon];
        assert!(horizon.enabled);
        assert_eq!(horizon.alpha, 1.0);
        assert_eq!(horizon.blend_value, 0.0);
        assert!(horizon.position.abs_diff_eq(Vec2::ZERO, 1e-4));
    }

    /// Velocity markers need motion; direction picks prograde or retrograde.
    #[test]
    fn velocity_markers_follow_motion() {
        let slow = HudContext::default().update(&ready_frame(Vec3::Z * 0.05));
        assert!(!slow[MarkerKind::Prograde].enabled);
        assert!(!slow[MarkerKind::Retrograde].enabled);

        let forward = HudContext::default().update(&ready_frame(Vec3::Z * 5.0));
        assert!(forward[MarkerKind::Prograde].enabled);
        assert!(!forward[MarkerKind::Retrograde].enabled);
        assert!(forward[MarkerKind::Prograde].position.abs_diff_eq(Vec2::ZERO, 1e-5));

        let backward = HudContext::default().update(&ready_frame(Vec3::NEG_Z * 5.0));
        assert!(!backward[MarkerKind::Prograde].enabled);
        assert!(backward[MarkerKind::Retrograde].enabled);
    }

    /// Looking back at the vessel swaps heading for reverse heading.
    #[test]
    fn camera_facing_backwards_shows_reverse() {
        let mut frame = ready_frame(Vec3::ZERO);
        if let Some(camera) = frame.camera.as_mut() {
            camera.rotation = Quat::from_rotation_y(PI);
        }
        let markers = HudContext::default().update(&frame);
        assert!(markers[MarkerKind::Reverse].enabled);
        assert!(!markers[MarkerKind::Heading].enabled);
        assert!(markers[MarkerKind::LevelGuide].enabled);
    }

    /// Losing the vessel hides everything and clears readiness.
    #[test]
    fn not_ready_hides_all_markers() {
        let mut hud = HudContext::default();
        hud.update(&ready_frame(Vec3::ZERO));
        assert!(hud.is_ready());

        let mut frame = ready_frame(Vec3::ZERO);
        frame.vessel = None;
        let markers = hud.update(&frame);
        assert_eq!(markers, MarkerSet::hidden());
        assert!(!hud.is_ready());
        assert!(hud.last_orientation().is_none());
    }

    /// Every alpha stays in range for a sweep of attitudes.
    #[test]
    fn alphas_stay_in_range_across_attitudes() {
        let mut hud = HudContext::default();
        for step in 0..36 {
            let angle = step as f32 * 10.0_f32.to_radians();
            let mut frame = ready_frame(Vec3::new(1.0, 2.0, 3.0));
            if let Some(vessel) = frame.vessel.as_mut() {
                vessel.rotation = Quat::from_rotation_x(angle) * Quat::from_rotation_z(angle * 0.5);
            }
            hud.reset();
            for (_, state) in hud.update(&frame).iter() {
                assert!((0.0..=1.0).contains(&state.alpha));
                if state.enabled {
                    assert!(state.alpha > 0.0);
                }
            }
        }
    }

    /// The pixel-margin rule can replace the normalized band.
    #[test]
    fn admissibility_is_configurable() {
        let mut hud = HudContext::new(Admissibility::ScreenMargin);
        assert_eq!(hud.admissibility(), Admissibility::ScreenMargin);
        let markers = hud.update(&ready_frame(Vec3::ZERO));
        assert!(markers[MarkerKind::Heading].enabled);

        hud.set_admissibility(Admissibility::default());
        assert_eq!(hud.admissibility(), Admissibility::default());
    }
}
