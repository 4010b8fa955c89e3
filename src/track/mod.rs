//! Section and progressive track builders.
//!
//! Both run the `sim::step` recurrence over the keyframed inputs in
//! [`BuildParameters`]; builds happen on background threads and readers only
//! ever see published buffers.

mod job;
mod params;
mod progressive;
mod schedule;
mod section;

pub use crate::sim::DurationType;
pub use job::BuildJob;
pub use params::{BuildParameters, Mode, TargetSampler};
pub use progressive::{RefinementPass, TrackBuilder, TrackConfig, TrackState, DEFAULT_BUDGET};
pub use schedule::{max_stride, Refinement};
pub use section::{
    build_section, BuildWarning, SectionBuilder, SectionOutput, MAX_DISTANCE_ITERATIONS,
};
