use std::any::Any;
use std::thread::{self, JoinHandle};

use crate::error::{BuildError, BuildResult};

/// One unit of build work running on its own thread.
///
/// The worker owns everything it touches; results come back only through
/// [`BuildJob::wait`].
pub struct BuildJob<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> BuildJob<T> {
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: thread::spawn(work),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the worker returns.
    pub fn wait(self) -> BuildResult<T> {
        self.handle
            .join()
            .map_err(|payload| BuildError::WorkerPanicked(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_returns_worker_result() {
        let job = BuildJob::spawn(|| (1..=10).sum::<u32>());
        assert_eq!(job.wait().unwrap(), 55);
    }

    #[test]
    fn finished_job_reports_finished() {
        let job = BuildJob::spawn(|| 7);
        while !job.is_finished() {
            thread::yield_now();
        }
        assert_eq!(job.wait().unwrap(), 7);
    }

    #[test]
    fn panic_becomes_build_error() {
        let job: BuildJob<()> = BuildJob::spawn(|| panic!("segment out of range"));
        match job.wait() {
            Err(BuildError::WorkerPanicked(message)) => {
                assert_eq!(message, "segment out of range");
            }
            other => panic!("expected worker panic, got {other:?}"),
        }
    }
}
