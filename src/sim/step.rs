use serde::{Deserialize, Serialize};

use super::curvature::Curvature;
use super::forces::Forces;
use super::frame::Frame;
use super::math::{Float3, Quaternion};
use super::physics::{finite_or_zero, wrap_degrees, PhysicsConstants};
use super::sample::Sample;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    /// Curves are keyed in seconds.
    #[default]
    Time = 0,
    /// Curves are keyed in meters of heart-line length.
    Distance = 1,
}

/// Per-step targets, already sampled from the keyframe curves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StepInput {
    /// Orientation change for this step, in degrees, already scaled to one step.
    Geometric {
        delta_pitch: f32,
        delta_yaw: f32,
        roll_speed: f32,
    },
    /// Target forces in g.
    Force {
        normal_force: f32,
        lateral_force: f32,
        roll_speed: f32,
    },
}

impl StepInput {
    pub fn roll_speed(&self) -> f32 {
        match *self {
            StepInput::Geometric { roll_speed, .. } | StepInput::Force { roll_speed, .. } => {
                roll_speed
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepConfig {
    /// Recurrence rate. Coarse progressive passes run at `hz / stride`.
    pub hz: f32,
    pub duration_type: DurationType,
    pub fixed_velocity: bool,
}

impl StepConfig {
    pub const fn new(hz: f32, duration_type: DurationType, fixed_velocity: bool) -> Self {
        Self {
            hz,
            duration_type,
            fixed_velocity,
        }
    }
}

/// Advances the track by one sample.
///
/// Pure: the result depends only on `prev`, the targets and the constants.
/// Degenerate speeds are floored at `epsilon` and 0/0 ratios become 0, so the
/// step never fails; callers decide what a collapsed velocity means.
pub fn step(
    prev: &Sample,
    input: StepInput,
    config: &StepConfig,
    constants: &PhysicsConstants,
) -> Sample {
    let oriented = match input {
        StepInput::Geometric {
            delta_pitch,
            delta_yaw,
            ..
        } => orient_geometric(prev, finite_or_zero(delta_pitch), finite_or_zero(delta_yaw)),
        StepInput::Force {
            normal_force,
            lateral_force,
            ..
        } => orient_by_forces(prev, normal_force, lateral_force, config.hz, constants),
    };

    let roll_speed = input.roll_speed();
    let delta_roll = finite_or_zero(match config.duration_type {
        DurationType::Time => roll_speed / config.hz,
        DurationType::Distance => roll_speed * prev.velocity / config.hz,
    });

    finish_step(prev, oriented, delta_roll, roll_speed, config, constants)
}

fn orient_geometric(prev: &Sample, delta_pitch: f32, delta_yaw: f32) -> Frame {
    let prev_frame = prev.frame();
    let q_yaw = Quaternion::from_axis_angle(Float3::UP, delta_yaw.to_radians());
    let q_pitch = Quaternion::from_axis_angle(prev_frame.pitch_axis(), delta_pitch.to_radians());

    let direction = (q_yaw * q_pitch).mul_vec(prev.direction).normalize();
    let lateral = q_yaw.mul_vec(prev.lateral).normalize();
    let normal = direction.cross(lateral).normalize();

    Frame::new(direction, normal, lateral).reorthonormalize()
}

fn orient_by_forces(
    prev: &Sample,
    normal_force: f32,
    lateral_force: f32,
    hz: f32,
    constants: &PhysicsConstants,
) -> Frame {
    let force_vec = prev.normal * (-normal_force) + prev.lateral * (-lateral_force) + Float3::DOWN;
    let normal_accel = -force_vec.dot(prev.normal) * constants.g;
    let lateral_accel = -force_vec.dot(prev.lateral) * constants.g;

    let estimated_velocity = if prev.heart_distance_from_last.abs() < constants.epsilon {
        prev.velocity
    } else {
        prev.heart_distance_from_last * hz
    };
    let estimated_velocity = estimated_velocity.abs().max(constants.epsilon);
    let velocity = prev.velocity.abs().max(constants.epsilon);

    let normal_angle = finite_or_zero(normal_accel / estimated_velocity / hz);
    let lateral_angle = finite_or_zero(-lateral_accel / velocity / hz);

    let q_normal = Quaternion::from_axis_angle(prev.lateral, normal_angle);
    let q_lateral = Quaternion::from_axis_angle(prev.normal, lateral_angle);

    let direction = (q_normal * q_lateral).mul_vec(prev.direction).normalize();
    let lateral = q_lateral.mul_vec(prev.lateral).normalize();
    let normal = direction.cross(lateral).normalize();

    Frame::new(direction, normal, lateral).reorthonormalize()
}

fn finish_step(
    prev: &Sample,
    oriented: Frame,
    delta_roll: f32,
    roll_speed: f32,
    config: &StepConfig,
    constants: &PhysicsConstants,
) -> Sample {
    let hz = config.hz;
    let heart = constants.heart;

    let rolled = oriented.with_roll(delta_roll.to_radians());
    let mut curr = *prev;
    curr.direction = rolled.direction;
    curr.lateral = rolled.lateral;
    curr.normal = rolled.normal;
    curr.roll = wrap_degrees(rolled.roll().to_degrees());
    curr.roll_speed = roll_speed;

    // Trapezoid advance, corrected so the heart line moves at the commanded rate.
    let half_step = prev.velocity / (2.0 * hz);
    let prev_heart = prev.heart_position(heart);
    let heart_if_static = prev.position + curr.normal * heart;
    curr.position = prev.position
        + curr.direction * half_step
        + prev.direction * half_step
        + (prev_heart - heart_if_static);

    curr.distance_from_last = curr.heart_position(heart).distance(prev_heart);
    curr.total_length = prev.total_length + curr.distance_from_last;
    curr.heart_distance_from_last = curr.position.distance(prev.position);
    curr.total_heart_length = prev.total_heart_length + curr.heart_distance_from_last;

    let curvature = Curvature::from_frames(curr.frame(), prev.frame(), constants.epsilon);
    curr.pitch_from_last = curvature.delta_pitch;
    curr.yaw_from_last = curvature.delta_yaw;
    curr.angle_from_last = curvature.total_angle;

    let potential = curr.potential_energy(constants);
    if config.fixed_velocity {
        curr.velocity = constants.reference_velocity;
        curr.energy = curr.kinetic_energy() + potential;
    } else {
        let v = prev.velocity;
        curr.energy = prev.energy - v * v * v * constants.resistance / hz;
        curr.velocity = (2.0 * (curr.energy - potential)).max(0.0).sqrt();
    }

    let forces = Forces::compute(
        curvature,
        curr.frame(),
        curr.roll,
        curr.velocity,
        curr.heart_distance_from_last,
        hz,
        constants,
    );
    curr.normal_force = forces.normal;
    curr.lateral_force = forces.lateral;

    curr.tie_distance = if prev.tie_distance > constants.tie_spacing {
        0.0
    } else {
        prev.tie_distance + curr.distance_from_last
    };

    curr
}
