use bevy::prelude::*;

/// Central body the demo vessels fly around; spins about world `+Y`.
#[derive(Component, Clone, Copy, Debug)]
pub struct Planet {
    /// Surface radius in world units.
    pub radius: f32,
    /// Gravitational acceleration at the surface.
    pub surface_gravity: f32,
    /// Angular speed about `+Y` in radians per second.
    pub spin_rate: f32,
}

impl Planet {
    /// Squared length below which a position has no meaningful direction.
    const MIN_DIRECTION_SQ: f32 = 1.0e-8;

    /// Build a planet centered at the world origin.
    pub fn new(radius: f32, surface_gravity: f32, spin_rate: f32) -> Self {
        Self {
            radius,
            surface_gravity,
            spin_rate,
        }
    }

    /// Angular velocity vector.
    pub fn spin(&self) -> Vec3 {
        Vec3::Y * self.spin_rate
    }

    /// Radial up direction at `position`.
    pub fn up_at(&self, position: Vec3) -> Vec3 {
        position.normalize_or(Vec3::Y)
    }

    /// Inverse-square gravity at `position`.
    pub fn gravity_at(&self, position: Vec3) -> Vec3 {
        let distance_sq = position.length_squared().max(self.radius * self.radius);
        -self.up_at(position) * self.surface_gravity * self.radius * self.radius / distance_sq
    }

    /// Velocity of the co-rotating surface frame at `position`.
    pub fn surface_velocity_at(&self, position: Vec3) -> Vec3 {
        self.spin().cross(position)
    }

    /// Direction toward the spin axis' north pole along the local tangent plane.
    ///
    /// Falls back to world `-Z` projected the same way at the poles.
    pub fn north_at(&self, position: Vec3) -> Vec3 {
        let up = self.up_at(position);
        [Vec3::Y, Vec3::NEG_Z]
            .into_iter()
            .map(|axis| axis - up * axis.dot(up))
            .find(|tangent| tangent.length_squared() > Self::MIN_DIRECTION_SQ)
            .map_or(Vec3::X, Vec3::normalize)
    }

    /// Horizon orientation at `position`: `-Z` north, `+Y` up.
    pub fn horizon_rotation(&self, position: Vec3) -> Quat {
        Transform::IDENTITY
            .looking_to(self.north_at(position), self.up_at(position))
            .rotation
    }

    /// Rotation of the planet mesh after `elapsed` seconds.
    pub fn rotation_after(&self, elapsed: f32) -> Quat {
        Quat::from_rotation_y(self.spin_rate * elapsed)
    }
}

/// Marker for the vessel the player flies.
#[derive(Component)]
pub struct ControlledVessel;

/// Marker for vessels fixed to the planet surface.
#[derive(Component)]
pub struct SurfaceAnchored;

/// Point-mass flight state of a vessel; the nose is local `+Y`.
#[derive(Component, Clone, Copy, Debug)]
pub struct VesselBody {
    /// Inertial velocity.
    pub velocity: Vec3,
    /// Throttle in `[0, 1]`.
    pub throttle: f32,
    /// Resting on the surface.
    pub landed: bool,
    /// Distance from the vessel origin to its base.
    pub half_height: f32,
    /// Acceleration at full throttle.
    pub max_thrust: f32,
}

impl VesselBody {
    /// Throttle change per second while a throttle key is held.
    pub const THROTTLE_RATE: f32 = 0.5;

    /// Landed vessel at rest with the throttle closed.
    pub fn new(half_height: f32, max_thrust: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            throttle: 0.0,
            landed: true,
            half_height,
            max_thrust,
        }
    }

    /// Change the throttle, clamped to `[0, 1]`.
    pub fn adjust_throttle(&mut self, delta: f32) {
        self.throttle = (self.throttle + delta).clamp(0.0, 1.0);
    }

    /// Thrust acceleration for the current throttle.
    pub fn thrust(&self, rotation: Quat) -> Vec3 {
        rotation * Vec3::Y * self.throttle * self.max_thrust
    }

    /// Integrate one step of gravity and thrust, then resolve ground contact.
    pub fn step(&mut self, position: &mut Vec3, rotation: Quat, planet: &Planet, dt: f32) {
        self.velocity += (planet.gravity_at(*position) + self.thrust(rotation)) * dt;
        *position += self.velocity * dt;

        let ground = planet.radius + self.half_height;
        let up = planet.up_at(*position);
        if position.length() >= ground {
            self.landed = false;
            return;
        }
        *position = up * ground;
        let surface = planet.surface_velocity_at(*position);
        let relative = self.velocity - surface;
        if relative.dot(up) <= 0.0 {
            self.velocity = surface;
            self.landed = true;
        }
    }
}

/// Attitude control authority of a vessel.
#[derive(Component, Clone, Copy, Debug)]
pub struct AttitudeControl {
    /// Maximum turn rate in radians per second.
    pub turn_rate: f32,
}

impl AttitudeControl {
    /// Build control authority with the given turn rate.
    pub fn new(turn_rate: f32) -> Self {
        Self { turn_rate }
    }

    /// Local rotation for one step of `input` (pitch, yaw, roll in `[-1, 1]`).
    ///
    /// Pitch turns about local `X`, yaw about local `Z` and roll about the
    /// nose (`Y`).
    pub fn rotation_step(&self, input: Vec3, dt: f32) -> Quat {
        let angle = input.clamp(Vec3::NEG_ONE, Vec3::ONE) * self.turn_rate * dt;
        Quat::from_rotation_x(angle.x) * Quat::from_rotation_z(angle.y) * Quat::from_rotation_y(angle.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test planet without spin.
    fn still_planet() -> Planet {
        Planet::new(100.0, 10.0, 0.0)
    }

    /// Gravity points down with surface strength and weakens with distance.
    #[test]
    fn gravity_follows_inverse_square() {
        let planet = still_planet();
        let surface = planet.gravity_at(Vec3::new(100.0, 0.0, 0.0));
        assert!(surface.abs_diff_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-4));
        let high = planet.gravity_at(Vec3::new(0.0, 200.0, 0.0));
        assert!(high.abs_diff_eq(Vec3::new(0.0, -2.5, 0.0), 1e-4));
    }

    /// North is tangent to the surface and falls back at the poles.
    #[test]
    fn north_is_tangent() {
        let planet = still_planet();
        let position = Vec3::new(60.0, 30.0, -50.0);
        let north = planet.north_at(position);
        assert!(north.dot(planet.up_at(position)).abs() < 1e-5);
        assert!(north.y > 0.0);
        let pole = planet.north_at(Vec3::new(0.0, 100.0, 0.0));
        assert!(pole.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    /// The horizon rotation's axes match up and north.
    #[test]
    fn horizon_rotation_axes() {
        let planet = still_planet();
        let position = Vec3::new(100.0, 0.0, 0.0);
        let rotation = planet.horizon_rotation(position);
        assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::X, 1e-5));
        assert!((rotation * Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    /// Surface velocity is the spin crossed with the position.
    #[test]
    fn surface_velocity_from_spin() {
        let planet = Planet::new(100.0, 10.0, 0.5);
        let velocity = planet.surface_velocity_at(Vec3::new(100.0, 0.0, 0.0));
        assert!(velocity.abs_diff_eq(Vec3::new(0.0, 0.0, -50.0), 1e-4));
    }

    /// A falling vessel stops on the ground and reports landed.
    #[test]
    fn vessel_lands_on_surface() {
        let planet = still_planet();
        let mut body = VesselBody::new(1.0, 20.0);
        body.landed = false;
        body.velocity = Vec3::new(0.0, -30.0, 0.0);
        let mut position = Vec3::new(0.0, 101.5, 0.0);
        body.step(&mut position, Quat::IDENTITY, &planet, 0.1);
        assert!(body.landed);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!((position.length() - 101.0).abs() < 1e-4);
    }

    /// Full throttle along the nose lifts off against surface gravity.
    #[test]
    fn thrust_lifts_off() {
        let planet = still_planet();
        let mut body = VesselBody::new(1.0, 20.0);
        body.adjust_throttle(2.0);
        assert_eq!(body.throttle, 1.0);
        let mut position = Vec3::new(0.0, 101.0, 0.0);
        for _ in 0..10 {
            body.step(&mut position, Quat::IDENTITY, &planet, 0.05);
        }
        assert!(!body.landed);
        assert!(position.y > 101.0);
        body.adjust_throttle(-5.0);
        assert_eq!(body.throttle, 0.0);
    }

    /// Control input turns about the documented axes.
    #[test]
    fn control_axes() {
        let control = AttitudeControl::new(1.0);
        let pitch = control.rotation_step(Vec3::X, 0.5);
        assert!(pitch.abs_diff_eq(Quat::from_rotation_x(0.5), 1e-6));
        let roll = control.rotation_step(Vec3::Z * 4.0, 0.5);
        assert!(roll.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
        assert!((roll * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-6));
    }
}
