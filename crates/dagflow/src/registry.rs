//! The node type registry: a string-keyed map of node factories supplied by the caller.

use std::collections::BTreeMap;

use crate::labels::NodeTypeName;
use crate::node::NodeFactory;

/// A caller-populated map from registered type name to the factory that builds instances of it.
///
/// The registry is opaque to the core: [`crate::graph::Graph::load`] only ever calls
/// [`NodeRegistry::get`] by the type name found in a [`crate::description::NodeDescription`].
#[derive(Default)]
pub struct NodeRegistry {
	factories: BTreeMap<NodeTypeName, Box<dyn NodeFactory>>,
}

impl NodeRegistry {
	/// Build an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a node type under `name`, replacing any previous registration with that name.
	pub fn register(&mut self, name: impl Into<NodeTypeName>, factory: Box<dyn NodeFactory>) -> &mut Self {
		self.factories.insert(name.into(), factory);
		self
	}

	/// Look up a registered factory by type name.
	pub fn get(&self, name: &str) -> Option<&dyn NodeFactory> {
		self.factories.get(name).map(|boxed| boxed.as_ref())
	}

	/// True if a type name is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}
}
