//! Ontobridge - Declarative mapping rules between typed graph datasets
//!
//! This crate re-exports all layers of the ontobridge system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: ontobridge_engine     — Mapping model, rule templates, inference engine
//! Layer 2: ontobridge_function   — Signatures, registry, call builders, evaluation
//! Layer 1: ontobridge_storage    — Graph store, union views, class membership
//! Layer 0: ontobridge_foundation — Core types (Term, Triple, ValueType, Error)
//! ```

pub use ontobridge_engine as engine;
pub use ontobridge_foundation as foundation;
pub use ontobridge_function as function;
pub use ontobridge_storage as storage;
