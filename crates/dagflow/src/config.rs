//! Executor tuning knobs.

use std::time::Duration;

/// Tuning knobs for an [`crate::executor::Executor`] run.
///
/// Mirrors the shape of the teacher's `PipelineRunConfig`: a small, `Default`-derived struct
/// whose default worker count follows host parallelism rather than a hardcoded constant.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
	/// The number of OS threads in the worker pool.
	pub max_workers: usize,
	/// How long the loop may sit idle with pending port-queue data before declaring deadlock.
	pub timeout: Duration,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		Self {
			max_workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
			timeout: Duration::from_secs(20),
		}
	}
}

impl ExecutorConfig {
	/// Start from the default config, overriding `max_workers`.
	pub fn with_max_workers(mut self, max_workers: usize) -> Self {
		self.max_workers = max_workers;
		self
	}

	/// Start from the default config, overriding `timeout`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}
