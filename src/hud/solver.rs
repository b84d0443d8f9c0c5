use bevy::math::{Quat, Vec3};

use crate::hud::sampler::FrameSnapshot;

/// Speed below which velocity markers are not drawn.
pub const SPEED_DRAW_THRESHOLD: f32 = 1.0e-1;

/// Camera-space directions and alignment scalars for one frame.
///
/// Produced by [`OrientationSolver::solve`]; values may be non-finite for
/// degenerate input and are filtered by the projector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Vessel nose.
    pub heading: Vec3,
    /// Vessel dorsal axis, the roll reference for heading glyphs.
    pub vessel_up: Vec3,
    /// Local vertical.
    pub up_in_cam: Vec3,
    /// Normalized velocity, zero when standing still.
    pub velocity_in_cam: Vec3,
    /// Heading with its vertical component removed.
    pub horizon_tangent: Vec3,
    /// Horizon frame up axis (roll reference for the horizon glyph).
    pub horizon_up_vector: Vec3,
    /// Vessel dorsal axis with roll removed.
    pub level_guide_up_vector: Vec3,
    /// Horizon frame forward (roll reference for the vertical glyph).
    pub north_in_cam: Vec3,
    /// `dot(up, heading)`.
    pub heading_dot_up: f32,
    /// `dot(up, velocity direction)`.
    pub speed_dot_up: f32,
    /// Speed above [`SPEED_DRAW_THRESHOLD`].
    pub is_moving: bool,
    /// Input to the vertical marker's blend curve.
    pub blend_vertical: f32,
    /// Input to the horizon marker's blend curve.
    pub blend_horizon: f32,
    /// Input to the level guide's blend curve.
    pub blend_level_guide: f32,
}

/// Stateless solver from snapshot to camera-space geometry.
pub struct OrientationSolver;

impl OrientationSolver {
    /// Compute all camera-space vectors and blend inputs for `snapshot`.
    pub fn solve(snapshot: &FrameSnapshot) -> Orientation {
        let camera = snapshot.camera_rotation;
        let vessel = snapshot.vessel_rotation;
        let horizon = &snapshot.horizon;

        let heading = to_camera_space(camera, vessel * Vec3::Z);
        let vessel_up = to_camera_space(camera, vessel * Vec3::Y);
        let up_in_cam = to_camera_space(camera, snapshot.up_axis);
        let velocity_in_cam = to_camera_space(camera, snapshot.velocity.normalize_or_zero());
        let is_moving = is_moving(snapshot.velocity);

        let horizon_tangent = heading - heading.project_onto(up_in_cam);
        let horizon_up_vector = to_camera_space(camera, horizon.up());
        let level_guide_up_vector =
            to_camera_space(camera, horizon.level_attitude(vessel) * Vec3::Y);
        let north_in_cam = to_camera_space(camera, horizon.forward());

        let heading_dot_up = up_in_cam.dot(heading);
        let speed_dot_up = up_in_cam.dot(velocity_in_cam);
        let speed_term = if is_moving { speed_dot_up.abs() } else { 0.0 };

        let blend_vertical = heading_dot_up.abs().max(speed_term);
        let blend_horizon = heading_dot_up.abs().min(speed_term);
        let blend_level_guide = heading_dot_up.abs();

        Orientation {
            heading,
            vessel_up,
            up_in_cam,
            velocity_in_cam,
            horizon_tangent,
            horizon_up_vector,
            level_guide_up_vector,
            north_in_cam,
            heading_dot_up,
            speed_dot_up,
            is_moving,
            blend_vertical,
            blend_horizon,
            blend_level_guide,
        }
    }
}

/// Strict threshold test on squared speed.
pub fn is_moving(velocity: Vec3) -> bool {
    velocity.length_squared() > SPEED_DRAW_THRESHOLD * SPEED_DRAW_THRESHOLD
}

/// Component of `up` perpendicular to `heading`, built from cross products.
///
/// Earlier alternative to the horizon frame's up axis; it degenerates when
/// the heading is parallel to up.
pub fn cross_product_horizon_up(heading: Vec3, up: Vec3) -> Vec3 {
    heading.cross(up.cross(heading))
}

/// Camera-space image of a world direction.
pub fn to_camera_space(camera_rotation: Quat, world: Vec3) -> Vec3 {
    camera_rotation.inverse() * world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::sampler::FrameSampler;
    use crate::hud::sampler::tests::ready_frame;

    /// Snapshot for a level vessel flying along the camera axis.
    fn snapshot(surface_velocity: Vec3) -> FrameSnapshot {
        FrameSampler::new().sample(&ready_frame(surface_velocity)).unwrap()
    }

    /// Level flight straight ahead: heading forward, vertical up, no blend.
    #[test]
    fn level_flight_geometry() {
        let o = OrientationSolver::solve(&snapshot(Vec3::ZERO));
        assert!(o.heading.abs_diff_eq(Vec3::Z, 1e-5));
        assert!(o.vessel_up.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(o.up_in_cam.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(o.horizon_tangent.abs_diff_eq(Vec3::Z, 1e-5));
        assert!(o.horizon_up_vector.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(o.level_guide_up_vector.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(!o.is_moving);
        assert_eq!(o.velocity_in_cam, Vec3::ZERO);
        assert!(o.blend_vertical.abs() < 1e-5);
        assert!(o.blend_level_guide.abs() < 1e-5);
    }

    /// The horizon tangent never has a vertical component.
    #[test]
    fn horizon_tangent_is_perpendicular_to_up() {
        let mut snap = snapshot(Vec3::ZERO);
        snap.vessel_rotation = Quat::from_rotation_x(-0.6) * Quat::from_rotation_y(0.4);
        snap.camera_rotation = Quat::from_rotation_z(0.3) * Quat::from_rotation_y(-0.2);
        let o = OrientationSolver::solve(&snap);
        assert!(o.horizon_tangent.dot(o.up_in_cam).abs() < 1e-5);
        assert!((o.heading_dot_up - o.up_in_cam.dot(o.heading)).abs() < 1e-7);
    }

    /// Horizon frame up matches the cross-product construction away from vertical.
    #[test]
    fn horizon_up_variants_agree_in_direction() {
        let mut snap = snapshot(Vec3::ZERO);
        snap.vessel_rotation = Quat::from_rotation_x(-0.5);
        let o = OrientationSolver::solve(&snap);
        let crossed = cross_product_horizon_up(o.heading, o.up_in_cam);
        assert!(crossed.dot(o.horizon_up_vector) > 0.0);
        assert!(crossed.dot(o.heading).abs() < 1e-5);
    }

    /// Rolling the vessel moves its dorsal axis but not the level guide.
    #[test]
    fn level_guide_ignores_roll() {
        let mut snap = snapshot(Vec3::ZERO);
        snap.vessel_rotation = Quat::from_rotation_z(0.7);
        let o = OrientationSolver::solve(&snap);
        assert!(o.level_guide_up_vector.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(!o.vessel_up.abs_diff_eq(Vec3::Y, 1e-2));
    }

    /// Nose and velocity straight up saturate the vertical and horizon blends.
    #[test]
    fn nose_up_blends() {
        let mut snap = snapshot(Vec3::Y * 5.0);
        snap.vessel_rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let o = OrientationSolver::solve(&snap);
        assert!(o.is_moving);
        assert!((o.heading_dot_up.abs() - 1.0).abs() < 1e-5);
        assert!((o.blend_vertical - 1.0).abs() < 1e-5);
        assert!((o.blend_horizon - 1.0).abs() < 1e-5);
    }

    /// Standing still, the horizon blend is zero whatever the pitch.
    #[test]
    fn stationary_horizon_blend_is_zero() {
        let mut snap = snapshot(Vec3::ZERO);
        snap.vessel_rotation = Quat::from_rotation_x(-80.0_f32.to_radians());
        let o = OrientationSolver::solve(&snap);
        assert!(!o.is_moving);
        assert!(o.heading_dot_up.abs() > 0.98);
        assert_eq!(o.blend_horizon, 0.0);
        assert!((o.blend_vertical - o.heading_dot_up.abs()).abs() < 1e-6);
    }

    /// Velocity only contributes to blends above the speed threshold.
    #[test]
    fn velocity_terms_gated_by_motion() {
        let climbing = OrientationSolver::solve(&snapshot(Vec3::Y * 5.0));
        assert!(climbing.is_moving);
        assert!((climbing.speed_dot_up - 1.0).abs() < 1e-5);
        assert!((climbing.blend_vertical - 1.0).abs() < 1e-5);
        assert!(climbing.blend_horizon.abs() < 1e-5);

        let drifting = OrientationSolver::solve(&snapshot(Vec3::Y * 0.05));
        assert!(!drifting.is_moving);
        assert!(drifting.blend_vertical.abs() < 1e-5);
    }

    /// Speed exactly at the threshold does not count as moving.
    #[test]
    fn threshold_is_strict() {
        assert!(!is_moving(Vec3::X * SPEED_DRAW_THRESHOLD));
        assert!(is_moving(Vec3::X * SPEED_DRAW_THRESHOLD * 1.001));
        assert!(!is_moving(Vec3::ZERO));
    }

    /// Solving twice gives bit-identical output.
    #[test]
    fn solve_is_pure() {
        let mut snap = snapshot(Vec3::new(3.0, 1.0, 4.0));
        snap.camera_rotation = Quat::from_rotation_y(1.1);
        assert_eq!(OrientationSolver::solve(&snap), OrientationSolver::solve(&snap));
    }

    /// Camera-space conversion undoes the camera rotation.
    #[test]
    fn camera_space_conversion() {
        let camera = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let forward_world = camera * Vec3::Z;
        assert!(to_camera_space(camera, forward_world).abs_diff_eq(Vec3::Z, 1e-6));
    }
}
