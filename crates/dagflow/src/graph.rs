//! The typed graph: node registry lookups, link validation, and incidence indices.

use std::collections::BTreeMap;

use crate::description::GraphDescription;
use crate::error::GraphError;
use crate::labels::NodeId;
use crate::link::Link;
use crate::node::{FiringStrategy, Node, PortSchema};
use crate::registry::NodeRegistry;
use crate::value::TypeTag;

/// A dense, zero-based index assigned to a node at load time, in insertion order.
///
/// This is purely an internal bookkeeping device for the executor's port-queue and in-flight
/// vectors and deterministic tie-breaking (§4.4 of the design notes); it is never exposed as a
/// stable cross-run identity. [`NodeId`] remains the only identity callers ever need to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdx(usize);

impl NodeIdx {
	fn as_usize(self) -> usize {
		self.0
	}

	/// Construct an index from a raw dense position. Only meaningful paired with a particular
	/// [`Graph`]; used by the executor to iterate `0..node_count`.
	pub(crate) fn from_usize(i: usize) -> Self {
		Self(i)
	}
}

impl From<NodeIdx> for usize {
	fn from(idx: NodeIdx) -> Self {
		idx.0
	}
}

struct NodeEntry {
	id: NodeId,
	input_ports: PortSchema,
	output_ports: PortSchema,
	firing_strategy: FiringStrategy,
	/// `None` only while the executor has this node's instance on loan to a worker.
	node: Option<Box<dyn Node>>,
}

/// A validated, loaded graph: a typed container of node instances and the links between them.
///
/// A `Graph` is built once via [`Graph::load`] and may then be handed to many successive
/// [`crate::executor::Executor`] runs; its topology is immutable after load. Node instances
/// (their parameters and internal state) are mutated in place by the executor between runs, by
/// reassignment through [`Graph::set_node`] — the graph itself never mutates them.
pub struct Graph {
	entries: Vec<NodeEntry>,
	index_of: BTreeMap<NodeId, NodeIdx>,
	links: Vec<Link>,
	/// Link indices keyed by source [`NodeIdx`].
	outgoing: Vec<Vec<usize>>,
	/// Link indices keyed by target [`NodeIdx`].
	incoming: Vec<Vec<usize>>,
}

impl Graph {
	/// Validate and instantiate a graph from a structured description.
	///
	/// This is all-or-nothing: if any node or link fails validation, no partial state is
	/// retained — the error is returned and nothing about `registry` or `description` is
	/// consumed until the whole description has been checked.
	pub fn load(description: &GraphDescription, registry: &NodeRegistry) -> Result<Self, GraphError> {
		let mut entries = Vec::with_capacity(description.nodes.len());
		let mut index_of = BTreeMap::new();

		for node_desc in &description.nodes {
			if index_of.contains_key(&node_desc.id) {
				return Err(GraphError::DuplicateNodeId(node_desc.id.clone()));
			}

			let factory = registry.get(node_desc.node_type.as_str()).ok_or_else(|| GraphError::UnknownNodeType {
				node_id: node_desc.id.clone(),
				node_type: node_desc.node_type.clone(),
			})?;

			let node = factory.build(&node_desc.params).map_err(|source| GraphError::InvalidParameter {
				node_id: node_desc.id.clone(),
				source,
			})?;

			let idx = NodeIdx(entries.len());
			index_of.insert(node_desc.id.clone(), idx);
			entries.push(NodeEntry {
				id: node_desc.id.clone(),
				input_ports: factory.input_ports(),
				output_ports: factory.output_ports(),
				firing_strategy: factory.firing_strategy(),
				node: Some(node),
			});
		}

		let mut outgoing = vec![Vec::new(); entries.len()];
		let mut incoming = vec![Vec::new(); entries.len()];
		let mut links = Vec::with_capacity(description.links.len());

		for link_desc in &description.links {
			let from_idx = *index_of
				.get(&link_desc.from_node)
				.ok_or_else(|| GraphError::UnknownSourceNode(link_desc.from_node.clone()))?;
			let to_idx = *index_of
				.get(&link_desc.to_node)
				.ok_or_else(|| GraphError::UnknownTargetNode(link_desc.to_node.clone()))?;

			let from_type = entries[from_idx.as_usize()]
				.output_ports
				.get(&link_desc.from_output)
				.ok_or_else(|| GraphError::UnknownOutputPort {
					node_id: link_desc.from_node.clone(),
					port: link_desc.from_output.clone(),
				})?
				.clone();
			let to_type = entries[to_idx.as_usize()]
				.input_ports
				.get(&link_desc.to_input)
				.ok_or_else(|| GraphError::UnknownInputPort {
					node_id: link_desc.to_node.clone(),
					port: link_desc.to_input.clone(),
				})?
				.clone();

			if !from_type.compatible(&to_type) {
				return Err(GraphError::IncompatibleLink {
					from_node: link_desc.from_node.clone(),
					from_port: link_desc.from_output.clone(),
					from_type: type_tag_display(&from_type),
					to_node: link_desc.to_node.clone(),
					to_port: link_desc.to_input.clone(),
					to_type: type_tag_display(&to_type),
				});
			}

			let link_idx = links.len();
			outgoing[from_idx.as_usize()].push(link_idx);
			incoming[to_idx.as_usize()].push(link_idx);
			links.push(Link {
				from_node: link_desc.from_node.clone(),
				from_output: link_desc.from_output.clone(),
				to_node: link_desc.to_node.clone(),
				to_input: link_desc.to_input.clone(),
			});
		}

		Ok(Self { entries, index_of, links, outgoing, incoming })
	}

	/// The number of nodes in this graph.
	pub fn node_count(&self) -> usize {
		self.entries.len()
	}

	/// Look up a node's dense index by its id.
	pub fn index_of(&self, id: &NodeId) -> Option<NodeIdx> {
		self.index_of.get(id).copied()
	}

	/// Iterate over node ids and their dense indices, in insertion (load) order.
	pub fn node_ids(&self) -> impl Iterator<Item = (NodeIdx, &NodeId)> {
		self.entries.iter().enumerate().map(|(i, e)| (NodeIdx(i), &e.id))
	}

	/// Borrow a node instance by id.
	///
	/// Returns `None` if `id` is unknown, or if the executor currently has this node's instance
	/// on loan to a worker (between dispatch and reap).
	pub fn get_node(&self, id: &NodeId) -> Option<&dyn Node> {
		let idx = self.index_of(id)?;
		self.entries[idx.as_usize()].node.as_deref()
	}

	/// The input port schema declared by a node, by index.
	pub fn input_ports(&self, idx: NodeIdx) -> &PortSchema {
		&self.entries[idx.as_usize()].input_ports
	}

	/// The output port schema declared by a node, by index.
	pub fn output_ports(&self, idx: NodeIdx) -> &PortSchema {
		&self.entries[idx.as_usize()].output_ports
	}

	/// The firing strategy declared by a node, by index.
	pub fn firing_strategy(&self, idx: NodeIdx) -> FiringStrategy {
		self.entries[idx.as_usize()].firing_strategy
	}

	/// The node id at a dense index.
	pub fn id_of(&self, idx: NodeIdx) -> &NodeId {
		&self.entries[idx.as_usize()].id
	}

	/// Outgoing links from a node, by index.
	pub fn get_outgoing(&self, idx: NodeIdx) -> impl Iterator<Item = &Link> {
		self.outgoing[idx.as_usize()].iter().map(move |&i| &self.links[i])
	}

	/// Incoming links to a node, by index.
	pub fn get_incoming(&self, idx: NodeIdx) -> impl Iterator<Item = &Link> {
		self.incoming[idx.as_usize()].iter().map(move |&i| &self.links[i])
	}

	/// Take a node instance out of the graph for the duration of one firing.
	///
	/// Panics if the node's instance is already on loan; the executor's own in-flight
	/// bookkeeping is what must prevent this (see invariant 4 in the design notes).
	pub fn take_node(&mut self, idx: NodeIdx) -> Box<dyn Node> {
		self.entries[idx.as_usize()].node.take().expect("node instance already on loan")
	}

	/// Return an updated node instance to the graph after a firing completes.
	pub fn set_node(&mut self, idx: NodeIdx, node: Box<dyn Node>) {
		self.entries[idx.as_usize()].node = Some(node);
	}
}

fn type_tag_display(tag: &TypeTag) -> String {
	tag.as_str().to_string()
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap as Map;

	use super::*;
	use crate::description::{LinkDescription, NodeDescription};
	use crate::error::ParamError;
	use crate::labels::ParamName;
	use crate::node::{NodeFactory, PortValues};
	use crate::value::Value;

	struct EchoFactory {
		inputs: PortSchema,
		outputs: PortSchema,
	}

	struct Echo;

	impl Node for Echo {
		fn execute(&mut self, inputs: PortValues) -> Result<PortValues, crate::error::NodeError> {
			Ok(inputs)
		}
	}

	impl NodeFactory for EchoFactory {
		fn input_ports(&self) -> PortSchema {
			self.inputs.clone()
		}

		fn output_ports(&self) -> PortSchema {
			self.outputs.clone()
		}

		fn build_validated(&self, _params: &Map<ParamName, Value>) -> Result<Box<dyn Node>, ParamError> {
			Ok(Box::new(Echo))
		}
	}

	fn registry() -> NodeRegistry {
		let mut reg = NodeRegistry::new();
		let mut inputs = PortSchema::new();
		inputs.insert("x".into(), TypeTag::new("Int"));
		let mut outputs = PortSchema::new();
		outputs.insert("out".into(), TypeTag::new("Int"));
		reg.register("echo", Box::new(EchoFactory { inputs, outputs }));
		reg
	}

	#[test]
	fn loads_a_valid_linear_graph() {
		let desc = GraphDescription {
			nodes: vec![
				NodeDescription { id: "a".into(), node_type: "echo".into(), params: Map::new() },
				NodeDescription { id: "b".into(), node_type: "echo".into(), params: Map::new() },
			],
			links: vec![LinkDescription {
				from_node: "a".into(),
				from_output: "out".into(),
				to_node: "b".into(),
				to_input: "x".into(),
			}],
		};
		let graph = Graph::load(&desc, &registry()).unwrap();
		assert_eq!(graph.node_count(), 2);
		let a = graph.index_of(&"a".into()).unwrap();
		assert_eq!(graph.get_outgoing(a).count(), 1);
	}

	#[test]
	fn rejects_unknown_node_type() {
		let desc = GraphDescription {
			nodes: vec![NodeDescription { id: "a".into(), node_type: "nope".into(), params: Map::new() }],
			links: vec![],
		};
		let err = Graph::load(&desc, &registry()).unwrap_err();
		assert!(matches!(err, GraphError::UnknownNodeType { .. }));
	}

	#[test]
	fn rejects_duplicate_node_id() {
		let desc = GraphDescription {
			nodes: vec![
				NodeDescription { id: "a".into(), node_type: "echo".into(), params: Map::new() },
				NodeDescription { id: "a".into(), node_type: "echo".into(), params: Map::new() },
			],
			links: vec![],
		};
		let err = Graph::load(&desc, &registry()).unwrap_err();
		assert!(matches!(err, GraphError::DuplicateNodeId(_)));
	}

	#[test]
	fn rejects_link_to_unknown_port() {
		let desc = GraphDescription {
			nodes: vec![
				NodeDescription { id: "a".into(), node_type: "echo".into(), params: Map::new() },
				NodeDescription { id: "b".into(), node_type: "echo".into(), params: Map::new() },
			],
			links: vec![LinkDescription {
				from_node: "a".into(),
				from_output: "missing".into(),
				to_node: "b".into(),
				to_input: "x".into(),
			}],
		};
		let err = Graph::load(&desc, &registry()).unwrap_err();
		assert!(matches!(err, GraphError::UnknownOutputPort { .. }));
	}

	#[test]
	fn rejects_incompatible_link_types() {
		let mut reg = registry();
		let mut inputs = PortSchema::new();
		inputs.insert("x".into(), TypeTag::new("Text"));
		reg.register("textsink", Box::new(EchoFactory { inputs, outputs: PortSchema::new() }));

		let desc = GraphDescription {
			nodes: vec![
				NodeDescription { id: "a".into(), node_type: "echo".into(), params: Map::new() },
				NodeDescription { id: "b".into(), node_type: "textsink".into(), params: Map::new() },
			],
			links: vec![LinkDescription {
				from_node: "a".into(),
				from_output: "out".into(),
				to_node: "b".into(),
				to_input: "x".into(),
			}],
		};
		let err = Graph::load(&desc, &reg).unwrap_err();
		assert!(matches!(err, GraphError::IncompatibleLink { .. }));
	}

	#[test]
	fn load_is_all_or_nothing_on_failure() {
		let desc = GraphDescription {
			nodes: vec![NodeDescription { id: "a".into(), node_type: "nope".into(), params: Map::new() }],
			links: vec![],
		};
		assert!(Graph::load(&desc, &registry()).is_err());
	}

	#[test]
	fn any_type_tag_matches_a_concrete_tag() {
		let mut reg = registry();
		let mut outputs = PortSchema::new();
		outputs.insert("out".into(), TypeTag::new("Any"));
		reg.register("anysource", Box::new(EchoFactory { inputs: PortSchema::new(), outputs }));

		let desc = GraphDescription {
			nodes: vec![
				NodeDescription { id: "a".into(), node_type: "anysource".into(), params: Map::new() },
				NodeDescription { id: "b".into(), node_type: "echo".into(), params: Map::new() },
			],
			links: vec![LinkDescription {
				from_node: "a".into(),
				from_output: "out".into(),
				to_node: "b".into(),
				to_input: "x".into(),
			}],
		};
		assert!(Graph::load(&desc, &reg).is_ok());
	}
}
