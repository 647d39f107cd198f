//! Foundation types for the Cairn content store.
//!
//! Cairn stores a tree of named nodes, each carrying a set of named
//! properties. Every other Cairn crate depends on `cairn-types`.
//!
//! # Key Types
//!
//! - [`NodeId`] -- Arena handle addressing one node of a workspace tree
//! - [`SessionId`] -- UUID v7 identifier of a unit-of-work session
//! - [`NodePath`] -- Absolute, validated path from the workspace root
//! - [`NodeType`] -- Type tag carried by every node (`nt:unstructured`, ...)
//! - [`PropertyValue`] -- Value stored under a property name

pub mod error;
pub mod id;
pub mod names;
pub mod node_type;
pub mod path;
pub mod value;

pub use error::TypeError;
pub use id::{NodeId, SessionId};
pub use names::{validate_node_name, validate_property_name};
pub use node_type::NodeType;
pub use path::NodePath;
pub use value::PropertyValue;
