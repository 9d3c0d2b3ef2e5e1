//! The bounded worker pool nodes are dispatched to.
//!
//! Realizes the spec's "isolated execution contexts" as a bounded OS-thread pool
//! (`threadpool::ThreadPool`) with move-only ownership transfer of each node instance into the
//! worker closure and back over a `crossbeam::channel`, the same shape as the teacher's
//! `PipelineSingleJob` handing node instances to its own `threadpool::ThreadPool` and recovering
//! them via a `crossbeam::channel::Sender`. A node panic is caught at the worker-closure boundary
//! so it cannot poison the executor thread; see `NodeError::Panicked`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crossbeam::channel::{unbounded, Receiver, Sender};
use threadpool::ThreadPool;

use crate::error::NodeError;
use crate::graph::NodeIdx;
use crate::node::{Node, PortValues};

/// One finished firing, as reported back to the executor.
pub struct TaskResult {
	/// The node that ran.
	pub idx: NodeIdx,
	/// The node's instance, returned regardless of outcome so the executor can always hand it
	/// back to the graph (§4.4: "reassign `graph.nodes[id]` from the worker's returned
	/// snapshot"). On a non-panicking failure `execute` only ever borrowed this instance, so it
	/// is returned unchanged; on a panic the instance survives the caught unwind as-is.
	pub node: Box<dyn Node>,
	/// The node's outputs, or the error it raised.
	pub outcome: Result<PortValues, NodeError>,
}

/// A bounded pool of worker threads that run node firings and report results back to the
/// executor's single driver thread.
pub struct WorkerPool {
	pool: ThreadPool,
	sender: Sender<TaskResult>,
	receiver: Receiver<TaskResult>,
}

impl WorkerPool {
	/// Build a pool with `max_workers` OS threads.
	pub fn new(max_workers: usize) -> Self {
		let (sender, receiver) = unbounded();
		Self { pool: ThreadPool::new(max_workers.max(1)), sender, receiver }
	}

	/// Submit a node firing: `node` is moved into the worker, executed with `inputs`, and the
	/// result (along with the node instance, win or lose) is sent back over this pool's channel.
	pub fn submit(&self, idx: NodeIdx, mut node: Box<dyn Node>, inputs: PortValues) {
		let sender = self.sender.clone();
		self.pool.execute(move || {
			let result = catch_unwind(AssertUnwindSafe(|| node.execute(inputs)));
			let outcome = match result {
				Ok(outcome) => outcome,
				Err(panic) => Err(NodeError::Panicked(panic_message(panic))),
			};
			// The receiver outlives every sender clone for the pool's lifetime; a send error
			// here would mean the executor dropped the pool while a task was still in flight,
			// which `Executor`'s teardown order never does.
			let _ = sender.send(TaskResult { idx, node, outcome });
		});
	}

	/// Poll for a finished task, waiting up to `timeout`.
	pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<TaskResult> {
		self.receiver.recv_timeout(timeout).ok()
	}

	/// Poll for a finished task without blocking, for draining the channel after the first hit.
	pub fn try_recv(&self) -> Option<TaskResult> {
		self.receiver.try_recv().ok()
	}
}

impl Drop for WorkerPool {
	fn drop(&mut self) {
		self.pool.join();
	}
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
