//! A dataflow graph execution engine.
//!
//! Users wire opaque, user-supplied [`Node`] implementations together into a [`Graph`]: typed
//! output ports feed typed input ports across [`Link`]s. An [`Executor`] then drives the graph to
//! quiescence, firing each node as its readiness predicate (§4.4 of the design notes — [`ALL` or
//! `ANY`](FiringStrategy)) is satisfied, dispatching firings to a bounded thread pool, and routing
//! each node's outputs to the port queues of every node downstream of it.
//!
//! ```
//! use std::collections::BTreeMap;
//! use dagflow::{
//! 	Executor, ExecutorConfig, Graph, GraphDescription, Node, NodeDescription, NodeError,
//! 	NodeFactory, ParamError, PortSchema, PortValues, NodeRegistry, TypeTag, Value,
//! };
//!
//! struct Source;
//! impl Node for Source {
//! 	fn execute(&mut self, _inputs: PortValues) -> Result<PortValues, NodeError> {
//! 		let mut out = PortValues::new();
//! 		out.insert("out".into(), Value::Int(1));
//! 		Ok(out)
//! 	}
//! }
//! struct SourceFactory;
//! impl NodeFactory for SourceFactory {
//! 	fn input_ports(&self) -> PortSchema {
//! 		PortSchema::new()
//! 	}
//! 	fn output_ports(&self) -> PortSchema {
//! 		[("out".into(), TypeTag::new("Int"))].into_iter().collect()
//! 	}
//! 	fn build_validated(
//! 		&self,
//! 		_params: &BTreeMap<dagflow::ParamName, Value>,
//! 	) -> Result<Box<dyn Node>, ParamError> {
//! 		Ok(Box::new(Source))
//! 	}
//! }
//!
//! let mut registry = NodeRegistry::new();
//! registry.register("source", Box::new(SourceFactory));
//!
//! let description = GraphDescription {
//! 	nodes: vec![NodeDescription { id: "src".into(), node_type: "source".into(), params: BTreeMap::new() }],
//! 	links: vec![],
//! };
//! let mut graph = Graph::load(&description, &registry).unwrap();
//! let mut executor = Executor::new(&mut graph, ExecutorConfig::default());
//! executor.run(BTreeMap::new(), None);
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod executor;
pub mod graph;
pub mod labels;
pub mod link;
pub mod node;
pub mod pool;
pub mod registry;
pub mod value;

pub use config::ExecutorConfig;
pub use description::{GraphDescription, LinkDescription, NodeDescription};
pub use error::{GraphError, NodeError, ParamError};
pub use executor::{Executor, InitialInputs, RunOutcome, RunStatus};
pub use graph::Graph;
pub use labels::{NodeId, NodeTypeName, ParamName, PortName};
pub use link::Link;
pub use node::{FiringStrategy, Node, NodeFactory, ParamSchema, PortSchema, PortValues};
pub use registry::NodeRegistry;
pub use value::{TypeTag, Value};
