//! Error types produced while building and running a graph.

use std::sync::Arc;

use crate::labels::{NodeId, NodeTypeName, ParamName, PortName};

/// An error encountered while validating or constructing a graph from a
/// [`crate::description::GraphDescription`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
	/// A node description referenced a type that isn't in the registry.
	#[error("unknown node type `{node_type}` for node `{node_id}`")]
	UnknownNodeType {
		/// The node that named the unknown type.
		node_id: NodeId,
		/// The offending type name.
		node_type: NodeTypeName,
	},

	/// Two nodes in the same description shared an id.
	#[error("duplicate node id `{0}`")]
	DuplicateNodeId(NodeId),

	/// A link's source node does not exist.
	#[error("link from unknown node `{0}`")]
	UnknownSourceNode(NodeId),

	/// A link's target node does not exist.
	#[error("link to unknown node `{0}`")]
	UnknownTargetNode(NodeId),

	/// A link's source output port is not declared by the source node.
	#[error("node `{node_id}` has no output port `{port}`")]
	UnknownOutputPort {
		/// The node missing the port.
		node_id: NodeId,
		/// The requested port name.
		port: PortName,
	},

	/// A link's target input port is not declared by the target node.
	#[error("node `{node_id}` has no input port `{port}`")]
	UnknownInputPort {
		/// The node missing the port.
		node_id: NodeId,
		/// The requested port name.
		port: PortName,
	},

	/// A link's source and target ports have incompatible type tags.
	#[error(
		"cannot link {from_node}.{from_port} to {to_node}.{to_port}: incompatible types \
		 `{from_type}` and `{to_type}`"
	)]
	IncompatibleLink {
		/// The link's source node.
		from_node: NodeId,
		/// The link's source port.
		from_port: PortName,
		/// The source port's declared type.
		from_type: String,
		/// The link's target node.
		to_node: NodeId,
		/// The link's target port.
		to_port: PortName,
		/// The target port's declared type.
		to_type: String,
	},

	/// A node's parameters failed validation at construction time.
	#[error("invalid parameters for node `{node_id}`: {source}")]
	InvalidParameter {
		/// The node whose parameters were rejected.
		node_id: NodeId,
		/// The underlying parameter error.
		#[source]
		source: ParamError,
	},
}

/// An error encountered while validating a single node's parameters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamError {
	/// A required parameter was not supplied.
	#[error("missing parameter `{0}`")]
	Missing(ParamName),

	/// A parameter's value did not match its declared type.
	#[error("parameter `{name}` expected type `{expected}`")]
	WrongType {
		/// The parameter name.
		name: ParamName,
		/// The declared type.
		expected: String,
	},

	/// A catch-all for node-specific parameter validation.
	#[error("parameter `{name}`: {message}")]
	Other {
		/// The parameter name.
		name: ParamName,
		/// A human-readable description of the problem.
		message: String,
	},
}

/// An error raised by a node's `execute` while the executor runs it.
///
/// Holds an `Arc`-wrapped boxed error rather than the error itself, so a [`NodeError`] can be
/// cloned into a status callback and into log fields without requiring every node error type to
/// implement `Clone`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NodeError {
	/// The node's `execute` returned an error.
	#[error("{0}")]
	Failed(Arc<Box<dyn std::error::Error + Send + Sync>>),

	/// The node panicked while executing.
	#[error("node panicked: {0}")]
	Panicked(String),
}

impl NodeError {
	/// Wrap an arbitrary error as a node failure.
	pub fn from_error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		NodeError::Failed(Arc::new(Box::new(err)))
	}
}
