use bevy::math::{EulerRot, Mat3, Quat, Vec3};

/// Squared length below which a rejected reference is treated as parallel to up.
const DEGENERATE_SQ: f32 = 1.0e-9;

/// Local tangent-plane frame beneath the vessel.
///
/// `+Y` is the vessel's local up, `+Z` points north-ish along the surface and
/// `+X` completes the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizonFrame {
    rotation: Quat,
    up: Vec3,
    forward: Vec3,
}

impl HorizonFrame {
    /// Build the frame around `up`, aligning forward with `reference` projected
    /// onto the tangent plane.
    ///
    /// Falls back to world `+Y` and then `+X` when a candidate is parallel to
    /// `up`. Returns `None` only if `up` itself is unusable.
    pub fn from_up_and_reference(up: Vec3, reference: Vec3) -> Option<Self> {
        let up = up.try_normalize()?;
        let forward = [reference, Vec3::Y, Vec3::X]
            .into_iter()
            .map(|candidate| candidate - up * candidate.dot(up))
            .find(|rejected| rejected.is_finite() && rejected.length_squared() >= DEGENERATE_SQ)?
            .normalize();
        let right = up.cross(forward);
        let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize();
        Some(Self {
            rotation,
            up,
            forward,
        })
    }

    /// Build the frame from the attitude indicator's relative gimbal.
    ///
    /// `vessel * gimbal` gives the indicator's idea of the horizon; its forward
    /// axis becomes the reference, while `up` is taken verbatim from the vessel.
    pub fn from_gimbal(vessel: Quat, relative_gimbal: Quat, up: Vec3) -> Option<Self> {
        let reference = (vessel * relative_gimbal) * Vec3::Z;
        Self::from_up_and_reference(up, reference)
    }

    /// Frame orientation in host space.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Exact local up vector the frame was built from.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// North-ish tangent direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Vessel attitude relative to this frame.
    pub fn relative(&self, vessel: Quat) -> Quat {
        self.rotation.inverse() * vessel
    }

    /// Orientation the vessel would have with its roll removed.
    pub fn level_attitude(&self, vessel: Quat) -> Quat {
        let (yaw, pitch, _roll) = self.relative(vessel).to_euler(EulerRot::YXZ);
        self.rotation * Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
    }
}
