//! Pure physics/math primitives for FVD track generation.
//!
//! Everything here is a value type or a pure function: the keyframe
//! evaluator, the oriented `Sample`, and the `step` recurrence that turns
//! one sample into the next.

mod curvature;
mod forces;
mod frame;
mod keyframe;
mod math;
mod sample;
mod step;

pub mod physics;

pub use curvature::Curvature;
pub use forces::Forces;
pub use frame::Frame;
pub use keyframe::{evaluate, evaluate_segment, Interpolation, Keyframe, KeyframeCursor};
pub use math::{Float3, Quaternion};
pub use physics::{finite_or_zero, wrap_degrees, PhysicsConstants};
pub use sample::Sample;
pub use step::{step, DurationType, StepConfig, StepInput};
