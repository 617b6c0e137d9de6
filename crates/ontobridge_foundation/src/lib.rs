//! Core terms, datatypes, and errors for ontobridge.
//!
//! This crate provides:
//! - [`Term`] - Identifiers, blank nodes, and literals that make up graphs
//! - [`Triple`] - A single subject/predicate/object fact
//! - [`ValueType`] - Type descriptors and the promotion lattice
//! - [`Error`] - Rich error types with context and suppressed causes
//! - [`vocab`] - Well-known identifiers shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod term;
pub mod types;
pub mod vocab;

pub use error::{Error, ErrorContext, ErrorKind, Result, SemanticLimit};
pub use term::{BlankNode, Iri, Literal, Term, Triple};
pub use types::{Datatype, ValueType, is_compatible};
