//! The node contract: the trait every graph vertex implements.

use std::collections::BTreeMap;

use crate::error::{NodeError, ParamError};
use crate::labels::{ParamName, PortName};
use crate::value::{TypeTag, Value};

/// When a node is allowed to fire, given the contents of its wired input port queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FiringStrategy {
	/// Fire only once every wired input port has a value waiting.
	#[default]
	All,
	/// Fire as soon as any one wired input port has a value waiting.
	Any,
}

/// A port or parameter schema: name to declared type, in declaration order.
pub type PortSchema = BTreeMap<PortName, TypeTag>;

/// A parameter schema: name to declared type, in declaration order.
pub type ParamSchema = BTreeMap<ParamName, TypeTag>;

/// The values bound to a node's ports for one firing, or returned from one.
pub type PortValues = BTreeMap<PortName, Value>;

/// A single vertex in a graph.
///
/// Implementors declare their port and parameter schemas through [`NodeFactory`]; `Node` itself
/// is the runtime half, invoked by the executor once a node becomes ready. A node instance is
/// moved into the worker pool for the duration of one firing and moved back out on completion,
/// so implementations own whatever mutable state they need to carry between firings (loop
/// counters, accumulators) as ordinary fields.
pub trait Node: Send {
	/// Run this node on the inputs selected by the executor's readiness check, producing zero or
	/// more output values.
	///
	/// `inputs` contains exactly the wired ports that were ready: for an [`FiringStrategy::All`]
	/// node, every wired input; for an [`FiringStrategy::Any`] node, every wired input that had a
	/// value queued at the moment of dispatch, which may be one or several.
	fn execute(&mut self, inputs: PortValues) -> Result<PortValues, NodeError>;
}

/// Describes a node type and builds instances of it.
///
/// This is the registration-time half of the node contract, kept separate from [`Node`] so that
/// schema information can be queried (by the graph, for link validation) without constructing an
/// instance, mirroring the stub/instance split used throughout the teacher's pipeline crate.
pub trait NodeFactory: Send + Sync {
	/// The input ports this node type declares.
	fn input_ports(&self) -> PortSchema;

	/// The output ports this node type declares.
	fn output_ports(&self) -> PortSchema;

	/// The parameters this node type declares.
	fn params(&self) -> ParamSchema {
		ParamSchema::new()
	}

	/// The firing strategy instances of this node type use.
	fn firing_strategy(&self) -> FiringStrategy {
		FiringStrategy::default()
	}

	/// Validate `params` against [`NodeFactory::params`] and build a runtime instance.
	///
	/// The default implementation checks that every declared parameter is present (no type
	/// coercion is attempted beyond presence, since [`Value`] is already typed); node types with
	/// richer validation should override this.
	fn build(&self, params: &BTreeMap<ParamName, Value>) -> Result<Box<dyn Node>, ParamError> {
		for name in self.params().keys() {
			if !params.contains_key(name) {
				return Err(ParamError::Missing(name.clone()));
			}
		}
		self.build_validated(params)
	}

	/// Construct a node instance from parameters already known to satisfy the schema.
	///
	/// Called by the default [`NodeFactory::build`] after presence-checking.
	fn build_validated(&self, params: &BTreeMap<ParamName, Value>) -> Result<Box<dyn Node>, ParamError>;
}
