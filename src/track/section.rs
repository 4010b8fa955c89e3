use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{BuildResult, ConfigError};
use crate::sim::{step, DurationType, PhysicsConstants, Sample};

use super::job::BuildJob;
use super::params::{BuildParameters, TargetSampler};

/// Upper bound on steps in a distance-mode build.
pub const MAX_DISTANCE_ITERATIONS: usize = 1_000_000;

/// A distance build that stopped before reaching its duration.
///
/// The samples produced up to that point are still returned.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BuildWarning {
    VelocityCollapsed {
        index: usize,
        total_length: f32,
    },
    IterationLimit {
        iterations: usize,
        total_length: f32,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VelocityCollapsed {
                index,
                total_length,
            } => write!(
                f,
                "velocity collapsed at sample {index} ({total_length:.3} m)"
            ),
            Self::IterationLimit {
                iterations,
                total_length,
            } => write!(f, "stopped after {iterations} steps at {total_length:.3} m"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionOutput {
    pub samples: Vec<Sample>,
    pub warning: Option<BuildWarning>,
}

/// Builds a whole section sequentially at `constants.hz`.
///
/// Time mode produces `floor(hz * duration)` samples, anchor included.
/// Distance mode steps until the heart-line length reaches the duration.
pub fn build_section(params: &BuildParameters, constants: &PhysicsConstants) -> SectionOutput {
    build_section_capped(params, constants, MAX_DISTANCE_ITERATIONS)
}

/// [`build_section`] with an explicit distance-mode step cap.
pub(crate) fn build_section_capped(
    params: &BuildParameters,
    constants: &PhysicsConstants,
    max_iterations: usize,
) -> SectionOutput {
    if params.duration < constants.min_duration {
        return SectionOutput::default();
    }

    let hz = constants.hz;
    let config = params.step_config(hz);
    let mut targets = TargetSampler::new(params);
    let mut prev = params.anchor(constants);
    let mut samples = vec![prev];
    let mut warning = None;

    match params.duration_type {
        DurationType::Time => {
            let count = params.sample_count(hz);
            samples.reserve(count.saturating_sub(1));
            for i in 1..count {
                let input = targets.sample(i as f32 / hz, &prev, hz);
                prev = step(&prev, input, &config, constants);
                samples.push(prev);
            }
        }
        DurationType::Distance => {
            let mut iterations = 0;
            while prev.total_length < params.duration {
                if !params.fixed_velocity && prev.velocity < constants.epsilon {
                    warning = Some(BuildWarning::VelocityCollapsed {
                        index: samples.len() - 1,
                        total_length: prev.total_length,
                    });
                    break;
                }
                if iterations >= max_iterations {
                    warning = Some(BuildWarning::IterationLimit {
                        iterations,
                        total_length: prev.total_length,
                    });
                    break;
                }
                iterations += 1;

                let at = TargetSampler::distance_parameter(&prev, hz);
                let input = targets.sample(at, &prev, hz);
                prev = step(&prev, input, &config, constants);
                samples.push(prev);
            }
        }
    }

    SectionOutput { samples, warning }
}

/// Double-buffered section build on a background thread.
///
/// Readers always see the last published buffer. A build writes only the
/// back buffer; publishing copies it forward.
pub struct SectionBuilder {
    params: Arc<BuildParameters>,
    constants: PhysicsConstants,
    write: Vec<Sample>,
    read: Vec<Sample>,
    job: Option<BuildJob<SectionOutput>>,
    last_warning: Option<BuildWarning>,
}

impl SectionBuilder {
    pub fn new(params: BuildParameters, constants: PhysicsConstants) -> Result<Self, ConfigError> {
        constants.validate()?;
        params.validate()?;
        let anchor = params.anchor(&constants);
        Ok(Self {
            params: Arc::new(params),
            constants,
            write: vec![anchor],
            read: vec![anchor],
            job: None,
            last_warning: None,
        })
    }

    /// Replaces the inputs used by the next build.
    ///
    /// A build already in flight keeps the parameters it started with.
    pub fn set_parameters(&mut self, params: BuildParameters) -> Result<(), ConfigError> {
        params.validate()?;
        self.params = Arc::new(params);
        Ok(())
    }

    /// Starts a background build. Returns false if one is already running.
    pub fn request_build(&mut self) -> bool {
        if self.job.is_some() {
            debug!("section build already in flight, request ignored");
            return false;
        }

        self.publish();

        if self.params.duration < self.constants.min_duration {
            debug!(
                "section duration {} below minimum, clearing",
                self.params.duration
            );
            self.write.clear();
            self.last_warning = None;
            return true;
        }

        let params = Arc::clone(&self.params);
        let constants = self.constants;
        debug!(
            "section build scheduled: {:?} {:?}, duration {}",
            params.mode, params.duration_type, params.duration
        );
        self.job = Some(BuildJob::spawn(move || build_section(&params, &constants)));
        true
    }

    /// Collects a finished build without blocking. Returns true if a new
    /// buffer was published.
    pub fn poll(&mut self) -> BuildResult<bool> {
        if !self.job.as_ref().is_some_and(BuildJob::is_finished) {
            return Ok(false);
        }
        self.collect()?;
        Ok(true)
    }

    /// Blocks until any in-flight build finishes, then publishes.
    pub fn force_complete(&mut self) -> BuildResult<()> {
        if self.job.is_some() {
            self.collect()?;
        } else {
            self.publish();
        }
        Ok(())
    }

    /// Waits out any in-flight build, then rebuilds on the calling thread.
    pub fn rebuild_now(&mut self) -> BuildResult<()> {
        if self.job.is_some() {
            self.collect()?;
        }
        let output = build_section(&self.params, &self.constants);
        self.accept(output);
        self.publish();
        Ok(())
    }

    fn collect(&mut self) -> BuildResult<()> {
        if let Some(job) = self.job.take() {
            let output = job.wait()?;
            self.accept(output);
            self.publish();
        }
        Ok(())
    }

    fn accept(&mut self, output: SectionOutput) {
        if let Some(warning) = output.warning {
            warn!("section build stopped early: {warning}");
        }
        debug!(
            "section build finished with {} samples",
            output.samples.len()
        );
        self.write = output.samples;
        self.last_warning = output.warning;
    }

    fn publish(&mut self) {
        self.read.clone_from(&self.write);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.read
    }

    pub fn sample_count(&self) -> usize {
        self.read.len()
    }

    pub fn is_building(&self) -> bool {
        self.job.is_some()
    }

    pub fn last_warning(&self) -> Option<BuildWarning> {
        self.last_warning
    }

    pub fn parameters(&self) -> &BuildParameters {
        &self.params
    }

    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }
}
