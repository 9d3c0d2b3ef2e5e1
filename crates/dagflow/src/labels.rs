//! Newtype string identifiers used throughout a graph.

use std::fmt::{Display, Formatter};

use smartstring::{LazyCompact, SmartString};

macro_rules! string_label {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
		pub struct $name(SmartString<LazyCompact>);

		impl $name {
			/// Borrow this label as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl<T: AsRef<str>> From<T> for $name {
			fn from(value: T) -> Self {
				Self(SmartString::from(value.as_ref()))
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

string_label!(NodeId, "The unique, user-assigned id of a node within a graph.");
string_label!(PortName, "The name of an input or output port declared by a node.");
string_label!(ParamName, "The name of a parameter declared by a node.");

/// A node type name, as registered in a [`crate::registry::NodeRegistry`].
pub type NodeTypeName = SmartString<LazyCompact>;
