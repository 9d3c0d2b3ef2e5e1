//! Directed edges between node ports.

use crate::labels::{NodeId, PortName};

/// A directed connection from one node's output port to another node's input port.
///
/// Multiple links may target the same input port and multiple links may originate from the same
/// output port; the graph enforces no uniqueness constraint beyond the endpoint-existence and
/// type-compatibility checks performed at load time (see [`crate::graph::Graph::load`]).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
	/// The node producing the value.
	pub from_node: NodeId,
	/// The output port on `from_node` the value is read from.
	pub from_output: PortName,
	/// The node receiving the value.
	pub to_node: NodeId,
	/// The input port on `to_node` the value is delivered to.
	pub to_input: PortName,
}
