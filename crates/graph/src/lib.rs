//! Program graph node model.
//!
//! Language frontends translate source files into arena-allocated [`Node`]s
//! that live in a per-file [`Unit`]. Every node is addressable through a
//! [`NodeId`] that is globally unique once units are assigned distinct ids,
//! which allows independently built units to be combined into a single
//! [`Graph`] without rewriting identities.
//!
//! The semantic layer (scope tree, symbol resolution, inference) only reads
//! and tags nodes through the [`NodeStore`] / [`NodeStoreMut`] traits; it
//! never changes their structure.

pub mod language;
pub mod location;
pub mod name;
pub mod nodes;
pub mod types;

pub use language::LanguageConfig;
pub use location::Location;
pub use name::Name;
pub use nodes::{
    CallExpr, Declaration, FunctionDecl, FunctionKind, Graph, Node, NodeId, NodeKind, NodeStore,
    NodeStoreMut, RecordDecl, RecordKind, TemplateArgument, TemplateDecl, Unit,
};
pub use types::Type;
