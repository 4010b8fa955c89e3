use super::curvature::Curvature;
use super::frame::Frame;
use super::math::Float3;
use super::physics::PhysicsConstants;

/// Realized normal and lateral forces, in g.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Forces {
    pub normal: f32,
    pub lateral: f32,
}

impl Forces {
    pub const fn new(normal: f32, lateral: f32) -> Self {
        Self { normal, lateral }
    }

    /// Reconstructs forces from one step's orientation change.
    ///
    /// Small-angle approximation: each angular rate contributes a centripetal
    /// term along the rolled frame axes, gravity adds 1g up.
    pub fn compute(
        curvature: Curvature,
        frame: Frame,
        roll: f32,
        velocity: f32,
        heart_distance: f32,
        hz: f32,
        constants: &PhysicsConstants,
    ) -> Self {
        if curvature.total_angle.abs() < constants.epsilon {
            return Self::new(
                -Float3::UP.dot(frame.normal),
                -Float3::UP.dot(frame.lateral),
            );
        }

        let (sin_roll, cos_roll) = roll.to_radians().sin_cos();
        let delta_pitch = curvature.delta_pitch.to_radians();
        let delta_yaw = curvature.delta_yaw.to_radians();

        let normal_angle = -delta_pitch * cos_roll - curvature.yaw_scale * delta_yaw * sin_roll;
        let lateral_angle = delta_pitch * sin_roll - curvature.yaw_scale * delta_yaw * cos_roll;

        let force_vec = Float3::UP
            + frame.lateral * (velocity * hz * lateral_angle / constants.g)
            + frame.normal * (heart_distance * hz * hz * normal_angle / constants.g);

        Self::new(-force_vec.dot(frame.normal), -force_vec.dot(frame.lateral))
    }

    pub const ONE_G: Self = Self::new(1.0, 0.0);
}

impl Default for Forces {
    fn default() -> Self {
        Self::ONE_G
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Quaternion;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;

    fn pitched(frame: Frame, degrees: f32) -> Frame {
        let q = Quaternion::from_axis_angle(frame.pitch_axis(), degrees.to_radians());
        Frame::new(
            q.mul_vec(frame.direction),
            q.mul_vec(frame.normal),
            q.mul_vec(frame.lateral),
        )
        .reorthonormalize()
    }

    #[test]
    fn zero_curvature_is_one_g_normal() {
        let constants = PhysicsConstants::default();
        let forces = Forces::compute(
            Curvature::ZERO,
            Frame::DEFAULT,
            0.0,
            10.0,
            0.1,
            constants.hz,
            &constants,
        );

        assert_relative_eq!(forces.normal, 1.0, epsilon = TOLERANCE);
        assert_relative_eq!(forces.lateral, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn zero_curvature_on_banked_frame_splits_gravity() {
        let constants = PhysicsConstants::default();
        let banked = Frame::DEFAULT.with_roll(90.0_f32.to_radians());
        let forces = Forces::compute(
            Curvature::ZERO,
            banked,
            90.0,
            10.0,
            0.1,
            constants.hz,
            &constants,
        );

        assert_relative_eq!(forces.normal, 0.0, epsilon = TOLERANCE);
        assert_relative_eq!(forces.lateral.abs(), 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn pulling_up_increases_normal_force() {
        let constants = PhysicsConstants::default();
        let prev = Frame::DEFAULT;
        let curr = pitched(prev, 0.5);
        let curvature = Curvature::from_frames(curr, prev, constants.epsilon);
        let forces = Forces::compute(curvature, curr, 0.0, 20.0, 0.2, constants.hz, &constants);

        assert!(forces.normal > 1.0);
        assert_relative_eq!(forces.lateral, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn pushing_over_reduces_normal_force() {
        let constants = PhysicsConstants::default();
        let prev = Frame::DEFAULT;
        let curr = pitched(prev, -0.5);
        let curvature = Curvature::from_frames(curr, prev, constants.epsilon);
        let forces = Forces::compute(curvature, curr, 0.0, 20.0, 0.2, constants.hz, &constants);

        assert!(forces.normal < 1.0);
    }

    #[test]
    fn zero_velocity_stays_finite() {
        let constants = PhysicsConstants::default();
        let prev = Frame::DEFAULT;
        let curr = pitched(prev, 0.3);
        let curvature = Curvature::from_frames(curr, prev, constants.epsilon);
        let forces = Forces::compute(curvature, curr, 0.0, 0.0, 0.0, constants.hz, &constants);

        assert!(forces.normal.is_finite());
        assert!(forces.lateral.is_finite());
    }
}
