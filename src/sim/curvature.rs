use super::frame::Frame;
use super::physics::wrap_degrees;

/// Orientation change between two consecutive frames, in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Curvature {
    pub delta_pitch: f32,
    pub delta_yaw: f32,
    /// `cos(|pitch|)`: yaw contributes less curvature as the track steepens.
    pub yaw_scale: f32,
    pub total_angle: f32,
}

impl Curvature {
    pub const fn new(delta_pitch: f32, delta_yaw: f32, yaw_scale: f32, total_angle: f32) -> Self {
        Self {
            delta_pitch,
            delta_yaw,
            yaw_scale,
            total_angle,
        }
    }

    pub fn from_frames(curr: Frame, prev: Frame, epsilon: f32) -> Self {
        let pitch = curr.pitch().to_degrees();
        let yaw_scale = pitch.to_radians().abs().cos();

        if (curr.direction - prev.direction).magnitude() < epsilon {
            return Self::new(0.0, 0.0, yaw_scale, 0.0);
        }

        let delta_pitch = wrap_degrees(pitch - prev.pitch().to_degrees());
        let delta_yaw = wrap_degrees(curr.yaw().to_degrees() - prev.yaw().to_degrees());
        let scaled_yaw = yaw_scale * delta_yaw;
        let total_angle = (scaled_yaw * scaled_yaw + delta_pitch * delta_pitch).sqrt();

        Self::new(delta_pitch, delta_yaw, yaw_scale, total_angle)
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 1.0, 0.0);
}

impl Default for Curvature {
    fn default() -> Self {
        Self::ZERO
    }
}
