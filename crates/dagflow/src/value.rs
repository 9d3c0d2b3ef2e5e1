//! The value type carried on edges between node ports.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use smartstring::{LazyCompact, SmartString};

/// A type tag attached to a port or parameter.
///
/// Tags are caller-defined strings; the single reserved value `"Any"` matches every other tag
/// when checking link or parameter compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TypeTag(SmartString<LazyCompact>);

impl TypeTag {
	/// The reserved tag that is compatible with every other tag.
	pub const ANY: &'static str = "Any";

	/// Build a tag from any string-like value.
	pub fn new(tag: impl AsRef<str>) -> Self {
		Self(SmartString::from(tag.as_ref()))
	}

	/// True if `self` and `other` may be linked together: either tag is `Any`, or the tags are
	/// equal.
	pub fn compatible(&self, other: &TypeTag) -> bool {
		self.0 == Self::ANY || other.0 == Self::ANY || self.0 == other.0
	}

	/// Borrow the tag text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl<T: AsRef<str>> From<T> for TypeTag {
	fn from(value: T) -> Self {
		Self::new(value)
	}
}

impl Display for TypeTag {
	fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A value carried between node ports.
///
/// Variants cover the small set of primitive shapes a generic graph runtime needs to move
/// between nodes; domain-specific payloads (image buffers, database handles, and the like) are
/// expected to travel as [`Value::Bytes`] or as an opaque [`Value::List`] of tagged fields, kept
/// outside this crate's concern.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
	/// No value. Distinct from a missing/unset port.
	Null,
	/// A boolean.
	Bool(bool),
	/// A signed 64-bit integer.
	Int(i64),
	/// A 64-bit float.
	Float(f64),
	/// Text, reference-counted so fan-out to multiple links is cheap.
	Text(Arc<str>),
	/// Binary data, reference-counted so fan-out to multiple links is cheap.
	Bytes(Arc<Vec<u8>>),
	/// An ordered list of values.
	List(Arc<Vec<Value>>),
}

impl Value {
	/// The tag this value would carry if it were a port's declared type, for ad-hoc construction
	/// in tests and examples. Graphs do not use this to validate links; link validation is
	/// purely in terms of declared [`TypeTag`]s (see [`crate::node::Node`]).
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "Null",
			Value::Bool(_) => "Bool",
			Value::Int(_) => "Int",
			Value::Float(_) => "Float",
			Value::Text(_) => "Text",
			Value::Bytes(_) => "Bytes",
			Value::List(_) => "List",
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(Arc::from(value))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(Arc::from(value.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn any_is_compatible_with_everything() {
		let any = TypeTag::new("Any");
		let int = TypeTag::new("Int");
		let text = TypeTag::new("Text");
		assert!(any.compatible(&int));
		assert!(int.compatible(&any));
		assert!(!int.compatible(&text));
	}

	#[test]
	fn equal_tags_are_compatible() {
		let a = TypeTag::new("Int");
		let b = TypeTag::new("Int");
		assert!(a.compatible(&b));
	}
}
