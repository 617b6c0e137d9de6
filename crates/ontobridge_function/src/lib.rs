//! Functions, calls, and expression evaluation for ontobridge.
//!
//! This crate provides:
//! - [`FunctionSignature`] - Immutable descriptors of callable functions
//! - [`FunctionRegistry`] - Copy-on-write registry with snapshots
//! - [`BuilderArena`] - Mutable call builders behind generational handles
//! - [`Call`] - Immutable, validated call trees
//! - [`evaluate`] - Evaluation against explicit slot bindings
//! - [`Synonym`] - Calls saved as user-defined functions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod call;
pub mod eval;
mod native;
pub mod registry;
pub mod signature;
pub mod synonym;

pub use builder::{ArgInput, BuilderArena, BuilderId};
pub use call::{ArgumentKey, Call, CallValue, validate};
pub use eval::{Arguments, EvalContext, IdMinter, evaluate, passes};
pub use registry::{FunctionRegistry, Functions, Implementation, NativeFn, RegistrySnapshot};
pub use signature::{
    Argument, FunctionOrigin, FunctionRole, FunctionSignature, SignatureBuilder, is_structural,
};
pub use synonym::Synonym;
