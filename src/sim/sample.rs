use super::frame::Frame;
use super::math::Float3;
use super::physics::PhysicsConstants;

/// One oriented cross-section of the track.
///
/// Angles (`roll`, `*_from_last`, `roll_speed`) are in degrees, forces in g.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub position: Float3,
    pub direction: Float3,
    pub lateral: Float3,
    pub normal: Float3,
    pub roll: f32,
    pub velocity: f32,
    /// Specific mechanical energy, J/kg.
    pub energy: f32,
    pub normal_force: f32,
    pub lateral_force: f32,
    /// Arc length of the heart line since the previous sample.
    pub distance_from_last: f32,
    /// Arc length of the centerline since the previous sample.
    pub heart_distance_from_last: f32,
    pub angle_from_last: f32,
    pub pitch_from_last: f32,
    pub yaw_from_last: f32,
    /// Roll rate target used for the step that produced this sample.
    pub roll_speed: f32,
    pub total_length: f32,
    pub total_heart_length: f32,
    pub tie_distance: f32,
}

impl Sample {
    /// Seed sample: default frame, reference speed, energy from speed and height.
    pub fn anchor(position: Float3, constants: &PhysicsConstants) -> Self {
        let frame = Frame::DEFAULT;
        let mut anchor = Self {
            position,
            direction: frame.direction,
            lateral: frame.lateral,
            normal: frame.normal,
            roll: 0.0,
            velocity: constants.reference_velocity,
            energy: 0.0,
            normal_force: -Float3::UP.dot(frame.normal),
            lateral_force: -Float3::UP.dot(frame.lateral),
            distance_from_last: 0.0,
            heart_distance_from_last: 0.0,
            angle_from_last: 0.0,
            pitch_from_last: 0.0,
            yaw_from_last: 0.0,
            roll_speed: 0.0,
            total_length: 0.0,
            total_heart_length: 0.0,
            tie_distance: 0.0,
        };
        anchor.energy =
            0.5 * anchor.velocity * anchor.velocity + anchor.potential_energy(constants);
        anchor
    }

    /// Point offset from `position` along the frame normal.
    pub fn heart_position(&self, offset: f32) -> Float3 {
        self.position + self.normal * offset
    }

    pub fn frame(&self) -> Frame {
        Frame::new(self.direction, self.normal, self.lateral)
    }

    /// Gravity plus friction, modeled as height lost in proportion to distance.
    pub fn potential_energy(&self, constants: &PhysicsConstants) -> f32 {
        constants.g
            * (self.heart_position(constants.center).y + self.total_length * constants.friction)
    }

    /// Kinetic energy implied by the current speed.
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.velocity * self.velocity
    }
}
