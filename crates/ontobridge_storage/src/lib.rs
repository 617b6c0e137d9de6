//! Graph storage and schema introspection for ontobridge.
//!
//! This crate provides:
//! - [`Graph`] - In-memory triple store with persistent indices
//! - [`UnionView`] - Read-only flattening of several graphs
//! - [`SchemaOracle`] - Hierarchy, union, and domain/range questions
//! - [`ClassMembership`] - Cached transitive attribute sets of groupings
//! - [`Ontology`] - A schema graph bundled with its membership cache

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod membership;
pub mod schema;
pub mod view;

pub use graph::{Graph, GraphStore, GraphView};
pub use membership::{ClassMembership, Ontology};
pub use schema::SchemaOracle;
pub use view::UnionView;
