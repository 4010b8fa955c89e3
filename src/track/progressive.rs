use std::ops::Range;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{BuildResult, ConfigError};
use crate::sim::{step, DurationType, PhysicsConstants, Sample};

use super::job::BuildJob;
use super::params::{BuildParameters, TargetSampler};
use super::schedule::{max_stride, Refinement};

pub const DEFAULT_BUDGET: usize = 10_000;

/// Marks an index that no pass has computed yet.
const UNRESOLVED: u32 = u32::MAX;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Target sample evaluations per unit of work.
    pub budget: usize,
}

impl TrackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(())
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
        }
    }
}

/// What one refinement unit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementPass {
    pub refinement: Refinement,
    pub stride: u32,
    pub range: Range<usize>,
    /// Indices stepped by this unit; skipped ones are not counted.
    pub evaluated: usize,
}

/// Working buffer of a progressive build.
///
/// Owned by exactly one side at a time: the builder while idle, the worker
/// while a unit runs.
#[derive(Debug, Clone)]
pub struct TrackState {
    samples: Vec<Sample>,
    /// Finest stride each index was stepped at since the last reset.
    resolved: Vec<u32>,
    counter: u64,
    max_stride: u32,
    published: Option<u32>,
}

impl TrackState {
    pub fn new(
        params: &BuildParameters,
        constants: &PhysicsConstants,
        config: &TrackConfig,
    ) -> Self {
        let mut state = Self {
            samples: Vec::new(),
            resolved: Vec::new(),
            counter: 0,
            max_stride: 1,
            published: None,
        };
        state.reset(params, constants, config);
        state
    }

    /// Restarts the schedule, reusing the buffers.
    pub fn reset(
        &mut self,
        params: &BuildParameters,
        constants: &PhysicsConstants,
        config: &TrackConfig,
    ) {
        let len = params.sample_count(constants.hz);
        let anchor = params.anchor(constants);

        self.samples.clear();
        self.samples.resize(len, anchor);
        self.resolved.clear();
        self.resolved.resize(len, UNRESOLVED);
        if let Some(first) = self.resolved.first_mut() {
            *first = 1;
        }
        self.counter = 0;
        self.max_stride = max_stride(len, config.budget);
        self.published = None;
    }

    /// Runs the next unit of the schedule.
    pub fn refine(
        &mut self,
        params: &BuildParameters,
        constants: &PhysicsConstants,
    ) -> RefinementPass {
        let refinement = Refinement::decode(self.counter);
        self.counter += 1;
        self.refine_unit(refinement, params, constants)
    }

    /// Runs one specific unit. Rerunning a unit leaves the buffer unchanged.
    pub fn refine_unit(
        &mut self,
        refinement: Refinement,
        params: &BuildParameters,
        constants: &PhysicsConstants,
    ) -> RefinementPass {
        let len = self.samples.len();
        let stride = refinement.stride(self.max_stride);
        let range = refinement.range(len);
        let k = stride as usize;

        if len > 0 {
            self.samples[0] = params.anchor(constants);
        }

        let hz = constants.hz;
        let config = params.step_config(hz / stride as f32);
        let mut targets = TargetSampler::new(params);
        let mut evaluated = 0;

        let first = range.start.div_ceil(k).max(1) * k;
        for i in (first..range.end).step_by(k) {
            if self.resolved[i] <= stride {
                continue;
            }
            let prev = self.samples[i - k];
            let input = targets.sample(i as f32 / hz, &prev, config.hz);
            self.samples[i] = step(&prev, input, &config, constants);
            self.resolved[i] = stride;
            evaluated += 1;
        }

        if k > 1 {
            self.fill_placeholders(range.clone(), k, hz);
        }

        if range.end >= len {
            self.published = Some(stride);
        }

        RefinementPass {
            refinement,
            stride,
            range,
            evaluated,
        }
    }

    /// Positions unresolved indices between their stride neighbors so the
    /// published curve is continuous while coarse.
    fn fill_placeholders(&mut self, range: Range<usize>, k: usize, hz: f32) {
        let len = self.samples.len();
        for i in range {
            if self.resolved[i] != UNRESOLVED {
                continue;
            }
            let lo = i / k * k;
            let hi = lo + k;
            let from = self.samples[lo];
            let offset = (i - lo) as f32;

            let position = if hi < len && self.resolved[hi] != UNRESOLVED {
                let to = self.samples[hi].position;
                from.position.lerp(to, offset / k as f32)
            } else {
                from.position + from.direction * (from.velocity * offset / hz)
            };

            let placeholder = &mut self.samples[i];
            *placeholder = from;
            placeholder.position = position;
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn max_stride(&self) -> u32 {
        self.max_stride
    }

    /// Stride of the last full sweep, `None` until one completes.
    pub fn published(&self) -> Option<u32> {
        self.published
    }

    pub fn is_converged(&self) -> bool {
        self.published == Some(1)
    }
}

/// Progressive, budgeted track builder driven by repeated [`poll`] calls.
///
/// Each poll collects a finished unit, publishes its buffer, and schedules
/// the next unit on a background thread. Readers see a coarse curve after
/// the first unit and the exact 1 kHz curve once converged.
///
/// [`poll`]: TrackBuilder::poll
pub struct TrackBuilder {
    params: Arc<BuildParameters>,
    pending: Option<BuildParameters>,
    constants: PhysicsConstants,
    config: TrackConfig,
    state: Option<TrackState>,
    job: Option<BuildJob<TrackState>>,
    snapshot: Vec<Sample>,
    published: Option<u32>,
    dirty: bool,
}

impl TrackBuilder {
    pub fn new(
        params: BuildParameters,
        constants: PhysicsConstants,
        config: TrackConfig,
    ) -> Result<Self, ConfigError> {
        constants.validate()?;
        config.validate()?;
        validate_track_params(&params)?;

        let state = TrackState::new(&params, &constants, &config);
        let snapshot = vec![params.anchor(&constants)];
        Ok(Self {
            params: Arc::new(params),
            pending: None,
            constants,
            config,
            state: Some(state),
            job: None,
            snapshot,
            published: None,
            dirty: false,
        })
    }

    /// Replaces the inputs and restarts the schedule.
    ///
    /// While a unit is in flight the swap waits until it is collected.
    pub fn set_parameters(&mut self, params: BuildParameters) -> Result<(), ConfigError> {
        validate_track_params(&params)?;
        self.pending = Some(params);
        self.request_rebuild();
        Ok(())
    }

    /// Marks the inputs dirty. The published resolution is invalidated now;
    /// the schedule restarts before the next unit is scheduled.
    pub fn request_rebuild(&mut self) {
        self.dirty = true;
        self.published = None;
    }

    /// Collects a finished unit if there is one, then schedules the next.
    /// Returns true if a new snapshot was published.
    pub fn poll(&mut self) -> BuildResult<bool> {
        if self.job.as_ref().is_some_and(|job| !job.is_finished()) {
            return Ok(false);
        }
        let published = self.collect()?;
        self.schedule();
        Ok(published)
    }

    /// Blocks on the in-flight unit, if any, and publishes it.
    pub fn force_complete(&mut self) -> BuildResult<bool> {
        if self.job.is_none() {
            return Ok(false);
        }
        self.collect()
    }

    fn collect(&mut self) -> BuildResult<bool> {
        let Some(job) = self.job.take() else {
            return Ok(false);
        };

        match job.wait() {
            Ok(state) => {
                self.state = Some(state);
                if self.dirty {
                    debug!("discarding track unit built from stale inputs");
                    self.reset();
                    return Ok(false);
                }
                if let Some(state) = &self.state {
                    self.snapshot.clone_from(&state.samples);
                    self.published = state.published();
                }
                Ok(true)
            }
            Err(err) => {
                warn!("track unit failed, restarting schedule: {err}");
                self.state = None;
                self.reset();
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        if let Some(params) = self.pending.take() {
            self.params = Arc::new(params);
        }
        if let Some(state) = self.state.as_mut() {
            state.reset(&self.params, &self.constants, &self.config);
        } else {
            self.state = Some(TrackState::new(&self.params, &self.constants, &self.config));
        }
        self.published = None;
        self.dirty = false;
    }

    fn schedule(&mut self) {
        if self.job.is_some() {
            return;
        }
        if self.dirty {
            self.reset();
        }
        if self.published == Some(1) {
            return;
        }
        let Some(mut state) = self.state.take() else {
            return;
        };

        let params = Arc::clone(&self.params);
        let constants = self.constants;
        self.job = Some(BuildJob::spawn(move || {
            let pass = state.refine(&params, &constants);
            debug!(
                "track unit level {} segment {}/{} stride {}: {} evaluations over {:?}",
                pass.refinement.level,
                pass.refinement.segment,
                pass.refinement.segment_count,
                pass.stride,
                pass.evaluated,
                pass.range
            );
            state
        }));
    }

    pub fn samples(&self) -> &[Sample] {
        &self.snapshot
    }

    pub fn sample_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Stride of the published curve; `None` until a full sweep has landed.
    pub fn published_resolution(&self) -> Option<u32> {
        self.published
    }

    pub fn is_converged(&self) -> bool {
        self.published == Some(1) && !self.dirty
    }

    pub fn is_scheduled(&self) -> bool {
        self.job.is_some()
    }

    pub fn parameters(&self) -> &BuildParameters {
        &self.params
    }
}

fn validate_track_params(params: &BuildParameters) -> Result<(), ConfigError> {
    params.validate()?;
    if params.duration_type != DurationType::Time {
        return Err(ConfigError::UnsupportedDurationType(params.duration_type));
    }
    Ok(())
}
