use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{
    DurationType, Float3, Keyframe, KeyframeCursor, PhysicsConstants, Sample, StepConfig, StepInput,
};

/// What the second and third curves of a build mean.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Pitch and yaw speed, degrees per second (or per meter).
    #[default]
    Geometric = 0,
    /// Normal and lateral force, in g.
    Force = 1,
}

/// Everything a caller supplies for one build.
///
/// Treated as immutable while a build is running; builders hold it behind
/// an `Arc` and swap in replacements between units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildParameters {
    pub mode: Mode,
    pub duration_type: DurationType,
    /// Seconds or meters, per `duration_type`.
    pub duration: f32,
    pub fixed_velocity: bool,
    pub anchor_position: Float3,
    pub roll_speed: Vec<Keyframe>,
    pub pitch_or_normal_force: Vec<Keyframe>,
    pub yaw_or_lateral_force: Vec<Keyframe>,
}

impl BuildParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        Ok(())
    }

    pub fn anchor(&self, constants: &PhysicsConstants) -> Sample {
        Sample::anchor(self.anchor_position, constants)
    }

    pub fn step_config(&self, hz: f32) -> StepConfig {
        StepConfig::new(hz, self.duration_type, self.fixed_velocity)
    }

    /// Samples in a time-mode build, anchor included.
    pub fn sample_count(&self, hz: f32) -> usize {
        (hz * self.duration).floor().max(0.0) as usize
    }
}

impl Default for BuildParameters {
    fn default() -> Self {
        Self {
            mode: Mode::Geometric,
            duration_type: DurationType::Time,
            duration: 1.0,
            fixed_velocity: false,
            anchor_position: Float3::new(0.0, 3.0, 0.0),
            roll_speed: Vec::new(),
            pitch_or_normal_force: Vec::new(),
            yaw_or_lateral_force: Vec::new(),
        }
    }
}

/// Turns the three curves into per-step targets.
///
/// One sampler serves one sequential pass; its cursors assume the curve
/// parameter mostly increases.
pub struct TargetSampler<'a> {
    params: &'a BuildParameters,
    roll: KeyframeCursor,
    pitch_or_normal: KeyframeCursor,
    yaw_or_lateral: KeyframeCursor,
}

impl<'a> TargetSampler<'a> {
    pub fn new(params: &'a BuildParameters) -> Self {
        Self {
            params,
            roll: KeyframeCursor::new(),
            pitch_or_normal: KeyframeCursor::new(),
            yaw_or_lateral: KeyframeCursor::new(),
        }
    }

    /// Curve parameter for the step after `prev` in a distance build.
    pub fn distance_parameter(prev: &Sample, hz: f32) -> f32 {
        prev.total_length + prev.velocity / hz
    }

    /// Targets at curve parameter `at` for a step of rate `hz` leaving `prev`.
    pub fn sample(&mut self, at: f32, prev: &Sample, hz: f32) -> StepInput {
        let params = self.params;
        let roll_speed = self.roll.evaluate(&params.roll_speed, at);
        let first = self
            .pitch_or_normal
            .evaluate(&params.pitch_or_normal_force, at);
        let second = self
            .yaw_or_lateral
            .evaluate(&params.yaw_or_lateral_force, at);

        match params.mode {
            Mode::Geometric => {
                let scale = match params.duration_type {
                    DurationType::Time => 1.0 / hz,
                    DurationType::Distance => prev.velocity / hz,
                };
                StepInput::Geometric {
                    delta_pitch: first * scale,
                    delta_yaw: second * scale,
                    roll_speed,
                }
            }
            Mode::Force => StepInput::Force {
                normal_force: first,
                lateral_force: second,
                roll_speed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn default_parameters_are_valid_time_geometric() {
        let params = BuildParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.mode, Mode::Geometric);
        assert_eq!(params.duration_type, DurationType::Time);
        assert_eq!(params.sample_count(100.0), 100);
    }

    #[test]
    fn validate_rejects_negative_and_nan_duration() {
        let negative = BuildParameters {
            duration: -1.0,
            ..BuildParameters::default()
        };
        assert_eq!(negative.validate(), Err(ConfigError::InvalidDuration(-1.0)));

        let nan = BuildParameters {
            duration: f32::NAN,
            ..BuildParameters::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn sample_count_floors_partial_steps() {
        let params = BuildParameters {
            duration: 0.259,
            ..BuildParameters::default()
        };
        assert_eq!(params.sample_count(100.0), 25);
    }

    #[test]
    fn geometric_time_targets_are_per_step() {
        let params = BuildParameters {
            pitch_or_normal_force: vec![Keyframe::linear(0.0, 50.0)],
            yaw_or_lateral_force: vec![Keyframe::linear(0.0, -20.0)],
            roll_speed: vec![Keyframe::linear(0.0, 30.0)],
            ..BuildParameters::default()
        };
        let prev = params.anchor(&PhysicsConstants::default());
        let input = TargetSampler::new(&params).sample(0.5, &prev, 100.0);

        match input {
            StepInput::Geometric {
                delta_pitch,
                delta_yaw,
                roll_speed,
            } => {
                assert_relative_eq!(delta_pitch, 0.5, epsilon = TOLERANCE);
                assert_relative_eq!(delta_yaw, -0.2, epsilon = TOLERANCE);
                assert_relative_eq!(roll_speed, 30.0, epsilon = TOLERANCE);
            }
            other => panic!("expected geometric input, got {other:?}"),
        }
    }

    #[test]
    fn geometric_distance_targets_scale_by_velocity() {
        let params = BuildParameters {
            duration_type: DurationType::Distance,
            pitch_or_normal_force: vec![Keyframe::linear(0.0, 2.0)],
            ..BuildParameters::default()
        };
        let prev = params.anchor(&PhysicsConstants::default());
        let input = TargetSampler::new(&params).sample(0.0, &prev, 100.0);

        // 2 deg/m at 10 m/s over 0.01 s
        assert!(matches!(
            input,
            StepInput::Geometric { delta_pitch, .. } if (delta_pitch - 0.2).abs() < TOLERANCE
        ));
    }

    #[test]
    fn force_targets_pass_through() {
        let params = BuildParameters {
            mode: Mode::Force,
            pitch_or_normal_force: vec![Keyframe::linear(0.0, 1.0), Keyframe::linear(1.0, 3.0)],
            yaw_or_lateral_force: vec![Keyframe::linear(0.0, 0.25)],
            ..BuildParameters::default()
        };
        let prev = params.anchor(&PhysicsConstants::default());
        let input = TargetSampler::new(&params).sample(0.5, &prev, 100.0);

        assert_eq!(
            input,
            StepInput::Force {
                normal_force: 2.0,
                lateral_force: 0.25,
                roll_speed: 0.0,
            }
        );
    }

    #[test]
    fn distance_parameter_looks_one_step_ahead() {
        let constants = PhysicsConstants::default();
        let mut prev = Sample::anchor(Float3::ZERO, &constants);
        prev.total_length = 12.0;
        assert_relative_eq!(
            TargetSampler::distance_parameter(&prev, 100.0),
            12.1,
            epsilon = TOLERANCE
        );
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let params = BuildParameters {
            mode: Mode::Force,
            duration_type: DurationType::Distance,
            duration: 42.0,
            fixed_velocity: true,
            roll_speed: vec![Keyframe::simple(0.0, 10.0), Keyframe::constant(5.0, 0.0)],
            ..BuildParameters::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let decoded: BuildParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, params);
    }
}
