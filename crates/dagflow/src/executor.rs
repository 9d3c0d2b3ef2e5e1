//! The scheduler: the event loop that drives a [`Graph`] to quiescence or deadlock.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::ExecutorConfig;
use crate::graph::{Graph, NodeIdx};
use crate::labels::{NodeId, PortName};
use crate::node::{FiringStrategy, PortValues};
use crate::pool::WorkerPool;
use crate::value::Value;

/// How long the event loop waits on the worker pool's result channel per iteration before
/// re-checking dispatch and termination. Matches the spec's "~100ms" bounded poll.
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The lifecycle status of one node firing, as delivered to the run's status callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
	/// The node was just submitted to the worker pool.
	Running,
	/// The node's firing returned successfully.
	Completed,
	/// The node's firing raised or panicked.
	Error,
}

impl RunStatus {
	fn as_str(self) -> &'static str {
		match self {
			RunStatus::Running => "running",
			RunStatus::Completed => "completed",
			RunStatus::Error => "error",
		}
	}
}

/// Why an [`Executor::run`] call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
	/// No in-flight tasks and no pending port-queue data: the graph ran to completion.
	Finished,
	/// The loop sat idle with pending port-queue data longer than the configured timeout.
	Deadlocked,
}

/// The initial values to seed into port queues before a run begins: `node_id → (input_port →
/// value)`. Validity of `node_id`/`input_port` is not checked; unknown entries are harmless but
/// dead, per the spec's external-interface contract.
pub type InitialInputs = BTreeMap<NodeId, BTreeMap<PortName, Value>>;

/// A single-threaded event loop that owns port queues and the in-flight set for one run of a
/// [`Graph`], dispatching ready nodes to a bounded [`WorkerPool`].
///
/// An `Executor` is built fresh for each run over a [`Graph`]; port queues and in-flight state do
/// not persist across runs (§3 "Lifecycles"), but the `Graph` itself — and the node instances it
/// owns, including any state they mutated during the run — does.
pub struct Executor<'g> {
	graph: &'g mut Graph,
	config: ExecutorConfig,
}

impl<'g> Executor<'g> {
	/// Build an executor over `graph` with `config`.
	pub fn new(graph: &'g mut Graph, config: ExecutorConfig) -> Self {
		Self { graph, config }
	}

	/// Run the graph to quiescence or deadlock.
	///
	/// `initial_inputs` is seeded into port queues before the first iteration. `status_callback`,
	/// if present, is invoked on the driver thread for every `running`/`completed`/`error`
	/// transition; it must be cheap, since the loop does not proceed while it runs.
	pub fn run(
		&mut self,
		initial_inputs: InitialInputs,
		mut status_callback: Option<Box<dyn FnMut(&NodeId, RunStatus) + Send>>,
	) -> RunOutcome {
		let node_count = self.graph.node_count();
		let mut queues: Vec<BTreeMap<PortName, VecDeque<Value>>> = vec![BTreeMap::new(); node_count];
		let mut in_flight: BTreeSet<NodeIdx> = BTreeSet::new();
		let mut executed_sources: BTreeSet<NodeIdx> = BTreeSet::new();

		for (node_id, inputs) in initial_inputs {
			let Some(idx) = self.graph.index_of(&node_id) else {
				continue;
			};
			for (port, value) in inputs {
				queues[idx_usize(idx)].entry(port).or_default().push_back(value);
			}
		}

		let pool = WorkerPool::new(self.config.max_workers);
		let cap = self.config.max_workers.saturating_mul(2).max(1);
		let mut last_event = Instant::now();

		info!(source = "executor", summary = "Starting run", nodes = node_count, max_workers = self.config.max_workers);

		loop {
			let mut progressed = false;

			// 1. Reap completions.
			if !in_flight.is_empty() {
				if let Some(result) = pool.recv_timeout(REAP_POLL_INTERVAL) {
					self.reap(result, &mut queues, &mut in_flight, &mut status_callback);
					last_event = Instant::now();
					progressed = true;
					while let Some(result) = pool.try_recv() {
						self.reap(result, &mut queues, &mut in_flight, &mut status_callback);
						last_event = Instant::now();
					}
				}
			}

			// 2. Dispatch.
			for i in 0..node_count {
				if in_flight.len() >= cap {
					break;
				}
				let idx = NodeIdx::from_usize(i);
				if in_flight.contains(&idx) {
					continue;
				}
				if let Some(inputs) = self.try_ready(idx, &mut queues, &mut executed_sources) {
					let node = self.graph.take_node(idx);
					let node_id = self.graph.id_of(idx).clone();
					debug!(source = "executor", summary = "Dispatching node", node = %node_id);
					if let Some(cb) = status_callback.as_mut() {
						cb(&node_id, RunStatus::Running);
					}
					pool.submit(idx, node, inputs);
					in_flight.insert(idx);
					last_event = Instant::now();
					progressed = true;
				}
			}

			// 3. Termination check.
			let idle = in_flight.is_empty();
			let pending = queues.iter().any(|q| q.values().any(|v| !v.is_empty()));

			if idle && !pending {
				info!(source = "executor", summary = "Execution finished", nodes = node_count);
				return RunOutcome::Finished;
			}

			if idle && pending && last_event.elapsed() > self.config.timeout {
				warn!(
					source = "executor",
					summary = "Deadlock detected? No ready node but data is pending",
					timeout_secs = self.config.timeout.as_secs_f64(),
				);
				return RunOutcome::Deadlocked;
			}

			if idle && !progressed {
				// Nothing to reap, nothing to dispatch: pace the loop instead of busy-spinning
				// while we wait for the deadlock timeout.
				std::thread::sleep(REAP_POLL_INTERVAL);
			}
		}
	}

	fn reap(
		&mut self,
		result: crate::pool::TaskResult,
		queues: &mut [BTreeMap<PortName, VecDeque<Value>>],
		in_flight: &mut BTreeSet<NodeIdx>,
		status_callback: &mut Option<Box<dyn FnMut(&NodeId, RunStatus) + Send>>,
	) {
		let crate::pool::TaskResult { idx, node, outcome } = result;
		in_flight.remove(&idx);
		self.graph.set_node(idx, node);
		let node_id = self.graph.id_of(idx).clone();

		match outcome {
			Ok(outputs) => {
				debug!(source = "executor", summary = "Node completed", node = %node_id);
				if let Some(cb) = status_callback.as_mut() {
					cb(&node_id, RunStatus::Completed);
				}
				self.distribute(idx, &outputs, queues);
			}
			Err(err) => {
				error!(source = "executor", summary = "Error executing node", node = %node_id, error = %err);
				if let Some(cb) = status_callback.as_mut() {
					cb(&node_id, RunStatus::Error);
				}
			}
		}
	}

	fn distribute(&self, idx: NodeIdx, outputs: &PortValues, queues: &mut [BTreeMap<PortName, VecDeque<Value>>]) {
		for link in self.graph.get_outgoing(idx) {
			let Some(value) = outputs.get(&link.from_output) else {
				continue;
			};
			let Some(to_idx) = self.graph.index_of(&link.to_node) else {
				continue;
			};
			queues[idx_usize(to_idx)].entry(link.to_input.clone()).or_default().push_back(value.clone());
		}
	}

	/// If node `idx` is ready to fire, pop its inputs from `queues` and return them. Mutates
	/// `executed_sources` for sourceless nodes so they are never considered ready twice.
	fn try_ready(
		&self,
		idx: NodeIdx,
		queues: &mut [BTreeMap<PortName, VecDeque<Value>>],
		executed_sources: &mut BTreeSet<NodeIdx>,
	) -> Option<PortValues> {
		let input_ports = self.graph.input_ports(idx);

		if input_ports.is_empty() {
			if executed_sources.contains(&idx) {
				return None;
			}
			executed_sources.insert(idx);
			return Some(PortValues::new());
		}

		let wired: BTreeSet<PortName> = self.graph.get_incoming(idx).map(|link| link.to_input.clone()).collect();
		let node_queues = &mut queues[idx_usize(idx)];

		match self.graph.firing_strategy(idx) {
			FiringStrategy::Any => {
				let has_any = wired.iter().any(|p| node_queues.get(p).is_some_and(|q| !q.is_empty()));
				if !has_any {
					return None;
				}
				let mut inputs = PortValues::new();
				for port in &wired {
					if let Some(q) = node_queues.get_mut(port) {
						if let Some(value) = q.pop_front() {
							inputs.insert(port.clone(), value);
						}
					}
				}
				Some(inputs)
			}
			FiringStrategy::All => {
				let wired_required: Vec<PortName> = input_ports.keys().filter(|p| wired.contains(*p)).cloned().collect();
				// A node with at least one linked input runs partially-wired: unlinked declared
				// inputs are simply not required (see DESIGN.md's "unwired ALL inputs" entry).
				// But a node with *no* linked inputs at all has no other way to ever make
				// progress, so every declared input falls back to being required — it can still
				// fire if the caller seeds all of them directly, and otherwise blocks until the
				// deadlock timeout, matching the boundary behavior in the design notes.
				let required = if wired_required.is_empty() { input_ports.keys().cloned().collect() } else { wired_required };
				let all_ready = required.iter().all(|p| node_queues.get(p).is_some_and(|q| !q.is_empty()));
				if !all_ready {
					return None;
				}
				let mut inputs = PortValues::new();
				for port in required {
					let value = node_queues.get_mut(&port).and_then(VecDeque::pop_front).expect("checked non-empty above");
					inputs.insert(port, value);
				}
				Some(inputs)
			}
		}
	}
}

fn idx_usize(idx: NodeIdx) -> usize {
	idx.into()
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap as Map;

	use super::*;
	use crate::description::{GraphDescription, NodeDescription};
	use crate::error::ParamError;
	use crate::node::{NodeFactory, PortSchema};
	use crate::registry::NodeRegistry;
	use crate::value::TypeTag;

	struct NoopFactory {
		inputs: PortSchema,
		strategy: FiringStrategy,
	}

	struct Noop;

	impl crate::node::Node for Noop {
		fn execute(&mut self, _inputs: PortValues) -> Result<PortValues, crate::error::NodeError> {
			Ok(PortValues::new())
		}
	}

	impl NodeFactory for NoopFactory {
		fn input_ports(&self) -> PortSchema {
			self.inputs.clone()
		}

		fn output_ports(&self) -> PortSchema {
			PortSchema::new()
		}

		fn firing_strategy(&self) -> FiringStrategy {
			self.strategy
		}

		fn build_validated(&self, _params: &Map<crate::labels::ParamName, Value>) -> Result<Box<dyn crate::node::Node>, ParamError> {
			Ok(Box::new(Noop))
		}
	}

	fn lone_node_graph(declared_inputs: &[&str]) -> Graph {
		let mut registry = NodeRegistry::new();
		let inputs = declared_inputs.iter().map(|p| (PortName::from(*p), TypeTag::new("Int"))).collect();
		registry.register("noop", Box::new(NoopFactory { inputs, strategy: FiringStrategy::All }));
		let description = GraphDescription {
			nodes: vec![NodeDescription { id: "n".into(), node_type: "noop".into(), params: Map::new() }],
			links: vec![],
		};
		Graph::load(&description, &registry).unwrap()
	}

	#[test]
	fn unwired_all_node_fires_once_fully_seeded() {
		let mut graph = lone_node_graph(&["a", "b"]);
		let mut executor = Executor::new(&mut graph, ExecutorConfig::default().with_timeout(Duration::from_millis(100)));
		let mut initial = InitialInputs::new();
		initial.insert("n".into(), Map::from([(PortName::from("a"), Value::Int(1)), (PortName::from("b"), Value::Int(2))]));
		assert_eq!(executor.run(initial, None), RunOutcome::Finished);
	}

	#[test]
	fn unwired_all_node_deadlocks_when_partially_seeded() {
		let mut graph = lone_node_graph(&["a", "b"]);
		let mut executor = Executor::new(&mut graph, ExecutorConfig::default().with_timeout(Duration::from_millis(100)));
		let mut initial = InitialInputs::new();
		initial.insert("n".into(), Map::from([(PortName::from("a"), Value::Int(1))]));
		assert_eq!(executor.run(initial, None), RunOutcome::Deadlocked);
	}

	#[test]
	fn partially_wired_node_does_not_require_unwired_declared_inputs() {
		// Two producers, but only one is linked; the unlinked declared input must not block
		// readiness, per the "image-node library" semantics preserved from the design notes.
		let mut registry = NodeRegistry::new();
		registry.register(
			"source",
			Box::new(NoopFactoryWithOutput),
		);
		let inputs: PortSchema = [("x", "Int"), ("y", "Int")].iter().map(|(p, t)| (PortName::from(*p), TypeTag::new(*t))).collect();
		registry.register("noop", Box::new(NoopFactory { inputs, strategy: FiringStrategy::All }));

		let description = GraphDescription {
			nodes: vec![
				NodeDescription { id: "src".into(), node_type: "source".into(), params: Map::new() },
				NodeDescription { id: "n".into(), node_type: "noop".into(), params: Map::new() },
			],
			links: vec![crate::description::LinkDescription {
				from_node: "src".into(),
				from_output: "out".into(),
				to_node: "n".into(),
				to_input: "x".into(),
			}],
		};
		let mut graph = Graph::load(&description, &registry).unwrap();
		let mut executor = Executor::new(&mut graph, ExecutorConfig::default().with_timeout(Duration::from_millis(100)));
		assert_eq!(executor.run(InitialInputs::new(), None), RunOutcome::Finished);
	}

	struct NoopFactoryWithOutput;

	struct Source;

	impl crate::node::Node for Source {
		fn execute(&mut self, _inputs: PortValues) -> Result<PortValues, crate::error::NodeError> {
			let mut out = PortValues::new();
			out.insert("out".into(), Value::Int(1));
			Ok(out)
		}
	}

	impl NodeFactory for NoopFactoryWithOutput {
		fn input_ports(&self) -> PortSchema {
			PortSchema::new()
		}

		fn output_ports(&self) -> PortSchema {
			[(PortName::from("out"), TypeTag::new("Int"))].into_iter().collect()
		}

		fn build_validated(&self, _params: &Map<crate::labels::ParamName, Value>) -> Result<Box<dyn crate::node::Node>, ParamError> {
			Ok(Box::new(Source))
		}
	}
}
