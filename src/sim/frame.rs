use super::math::{Float3, Quaternion};

/// Orthonormal coordinate frame for track orientation.
///
/// Right-handed: `normal = direction x lateral`.
/// - `direction`: forward along the track
/// - `lateral`: to the rider's right
/// - `normal`: from the track toward the rider's feet ("down" when upright)
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub direction: Float3,
    pub normal: Float3,
    pub lateral: Float3,
}

impl Frame {
    pub const fn new(direction: Float3, normal: Float3, lateral: Float3) -> Self {
        Self {
            direction,
            normal,
            lateral,
        }
    }

    /// Re-orthonormalizes the frame using the Gram-Schmidt process.
    ///
    /// Preserves direction exactly, orthogonalizes lateral to direction,
    /// then recomputes normal as direction x lateral.
    pub fn reorthonormalize(self) -> Self {
        let dir = self.direction.normalize();
        let lat = (self.lateral - dir * dir.dot(self.lateral)).normalize();
        let norm = dir.cross(lat).normalize();
        Self::new(dir, norm, lat)
    }

    /// Roll in radians, zero when upright.
    pub fn roll(self) -> f32 {
        self.lateral.y.atan2(-self.normal.y)
    }

    pub fn pitch(self) -> f32 {
        let mag =
            (self.direction.x * self.direction.x + self.direction.z * self.direction.z).sqrt();
        self.direction.y.atan2(mag)
    }

    pub fn yaw(self) -> f32 {
        (-self.direction.x).atan2(-self.direction.z)
    }

    /// Axis for a nose-up pitch change, horizontal and perpendicular to `direction`.
    ///
    /// Falls back to `lateral` when the track points straight up or down.
    pub fn pitch_axis(self) -> Float3 {
        let up = if self.normal.y >= 0.0 {
            Float3::UP
        } else {
            -Float3::UP
        };
        let axis = up.cross(self.direction).normalize();
        if axis == Float3::ZERO {
            self.lateral
        } else {
            axis
        }
    }

    /// Rolls the frame about its own direction by `delta_roll` radians.
    pub fn with_roll(self, delta_roll: f32) -> Self {
        let q = Quaternion::from_axis_angle(self.direction, -delta_roll);
        let new_lateral = q.mul_vec(self.lateral).normalize();
        let new_normal = self.direction.cross(new_lateral).normalize();
        Self::new(self.direction, new_normal, new_lateral).reorthonormalize()
    }

    pub const DEFAULT: Self = Self::new(Float3::BACK, Float3::DOWN, Float3::RIGHT);
}

impl Default for Frame {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_default_frame_is_upright_and_level() {
        let frame = Frame::DEFAULT;
        assert_relative_eq!(frame.roll(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(frame.pitch(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(frame.yaw(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_default_frame_right_handed() {
        let frame = Frame::DEFAULT;
        let derived = frame.direction.cross(frame.lateral);
        assert_relative_eq!(derived.x, frame.normal.x, epsilon = 1e-6);
        assert_relative_eq!(derived.y, frame.normal.y, epsilon = 1e-6);
        assert_relative_eq!(derived.z, frame.normal.z, epsilon = 1e-6);
    }

    #[test]
    fn test_frame_with_roll() {
        let rolled = Frame::DEFAULT.with_roll(PI / 4.0);
        assert_relative_eq!(rolled.roll(), PI / 4.0, epsilon = 1e-6);
        assert_eq!(rolled.direction, Frame::DEFAULT.direction);
    }

    #[test]
    fn test_pitch_axis_rotates_nose_up() {
        let frame = Frame::DEFAULT;
        let q = Quaternion::from_axis_angle(frame.pitch_axis(), 0.2);
        let pitched = q.mul_vec(frame.direction);
        assert!(pitched.y > 0.0);
    }

    #[test]
    fn test_pitch_axis_vertical_track_uses_lateral() {
        let frame = Frame::new(Float3::UP, Float3::new(0.0, 0.0, 1.0), Float3::RIGHT);
        assert_eq!(frame.pitch_axis(), Float3::RIGHT);
    }

    #[test]
    fn test_reorthonormalize_corrects_drift() {
        let drifted = Frame::new(
            Float3::new(0.0, 0.0, -1.0001).normalize(),
            Float3::new(0.0001, -1.0, 0.0).normalize(),
            Float3::new(1.0, 0.0001, 0.0).normalize(),
        );

        let frame = drifted.reorthonormalize();

        assert_relative_eq!(frame.direction.dot(frame.normal), 0.0, epsilon = 1e-6);
        assert_relative_eq!(frame.direction.dot(frame.lateral), 0.0, epsilon = 1e-6);
        assert_relative_eq!(frame.normal.dot(frame.lateral), 0.0, epsilon = 1e-6);
    }
}
