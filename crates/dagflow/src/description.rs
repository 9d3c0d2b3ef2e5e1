//! The wire format a [`crate::graph::Graph`] is loaded from.
//!
//! This is a plain `serde`-derived struct, not a format-specific parser, so callers may obtain it
//! from JSON (via `serde_json`), TOML, or anything else with a `serde` frontend without the core
//! depending on a particular wire format — mirroring how the teacher's `PipelineSpec` is a bare
//! `serde::Deserialize` struct that `Pipeline::from_file` happens to feed through `toml`.

use std::collections::BTreeMap;

use crate::labels::{NodeId, NodeTypeName, ParamName, PortName};
use crate::value::Value;

/// One entry in a [`GraphDescription`]'s node list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeDescription {
	/// The node's id, unique within the graph.
	pub id: NodeId,
	/// The registered type name used to look up a [`crate::node::NodeFactory`].
	#[serde(rename = "type")]
	pub node_type: NodeTypeName,
	/// Parameter values passed through to the node factory verbatim.
	#[serde(default)]
	pub params: BTreeMap<ParamName, Value>,
}

/// One entry in a [`GraphDescription`]'s link list.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinkDescription {
	/// The source node id.
	pub from_node: NodeId,
	/// The source output port name.
	pub from_output: PortName,
	/// The target node id.
	pub to_node: NodeId,
	/// The target input port name.
	pub to_input: PortName,
}

/// A structured, not-yet-validated graph description: the input to [`crate::graph::Graph::load`].
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct GraphDescription {
	/// The nodes to instantiate, in order.
	#[serde(default)]
	pub nodes: Vec<NodeDescription>,
	/// The links to validate and wire up, in order.
	#[serde(default)]
	pub links: Vec<LinkDescription>,
}
