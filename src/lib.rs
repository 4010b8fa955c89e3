//! fvdtrack - Force Vector Design track generation.
//!
//! # Architecture
//!
//! Two layers with inward-only dependencies:
//!
//! - **sim**: Physics/math primitives (Float3, Frame, Sample, Keyframe) and
//!   the per-step recurrence
//! - **track**: Section builds at 100 Hz and progressive, budgeted track
//!   builds at 1 kHz, both on background threads
//!
//! # Usage
//!
//! ```ignore
//! use fvdtrack::{BuildParameters, PhysicsConstants, SectionBuilder};
//!
//! let mut builder = SectionBuilder::new(BuildParameters::default(), PhysicsConstants::default())?;
//! builder.request_build();
//! builder.force_complete()?;
//! let samples = builder.samples();
//! ```

pub mod error;
pub mod sim;
pub mod track;

// Re-export commonly used types at crate root
pub use error::{BuildError, BuildResult, ConfigError};
pub use sim::{Float3, Frame, Keyframe, PhysicsConstants, Quaternion, Sample};
pub use track::{BuildParameters, Mode, SectionBuilder, TrackBuilder, TrackConfig};
