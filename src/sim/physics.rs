use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const G: f32 = 9.80665;
pub const HZ: f32 = 100.0;
pub const HIGH_RATE_HZ: f32 = 1000.0;
pub const EPSILON: f32 = 1.192_093e-7;
pub const HEART: f32 = 1.1;
pub const CENTER: f32 = 0.99;
pub const FRICTION: f32 = 0.021;
pub const RESISTANCE: f32 = 2e-5;
pub const TIE_SPACING: f32 = 0.8;
pub const REFERENCE_VELOCITY: f32 = 10.0;
pub const MIN_DURATION: f32 = 0.01;

/// Physical constants shared by every step of a build.
///
/// Passed explicitly to the recurrence and the builders; there is no global
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConstants {
    /// Gravitational acceleration, m/s^2.
    pub g: f32,
    /// Simulation rate, samples per second.
    pub hz: f32,
    pub epsilon: f32,
    /// Heart-line offset along the frame normal, m.
    pub heart: f32,
    /// Center-of-mass offset along the frame normal, m.
    pub center: f32,
    /// Friction as effective height lost per meter traveled.
    pub friction: f32,
    /// Air resistance coefficient (cubic in velocity).
    pub resistance: f32,
    pub tie_spacing: f32,
    /// Anchor speed, and the pinned speed in fixed-velocity builds, m/s.
    pub reference_velocity: f32,
    /// Section builds shorter than this produce an empty curve.
    pub min_duration: f32,
}

impl PhysicsConstants {
    /// Same constants at the track builder's 1 kHz rate.
    pub fn high_rate() -> Self {
        Self {
            hz: HIGH_RATE_HZ,
            ..Self::default()
        }
    }

    /// Friction and drag disabled; mechanical energy is conserved exactly.
    pub fn lossless(self) -> Self {
        Self {
            friction: 0.0,
            resistance: 0.0,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("g", self.g)?;
        positive("hz", self.hz)?;
        positive("epsilon", self.epsilon)?;
        positive("reference_velocity", self.reference_velocity)?;
        non_negative("heart", self.heart)?;
        non_negative("center", self.center)?;
        non_negative("friction", self.friction)?;
        non_negative("resistance", self.resistance)?;
        non_negative("tie_spacing", self.tie_spacing)?;
        non_negative("min_duration", self.min_duration)?;
        Ok(())
    }
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            g: G,
            hz: HZ,
            epsilon: EPSILON,
            heart: HEART,
            center: CENTER,
            friction: FRICTION,
            resistance: RESISTANCE,
            tie_spacing: TIE_SPACING,
            reference_velocity: REFERENCE_VELOCITY,
            min_duration: MIN_DURATION,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidConstant { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidConstant { name, value })
    }
}

/// Wraps an angle in degrees into [-180, 180).
pub fn wrap_degrees(degrees: f32) -> f32 {
    (degrees + 540.0).rem_euclid(360.0) - 180.0
}

/// Coerces 0/0 and other non-finite ratios to zero.
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
