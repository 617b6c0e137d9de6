//! Mapping contexts, rule templates, and forward-chaining inference for ontobridge.
//!
//! This crate provides:
//! - [`MappingModel`] - Contexts, class rules, and property bridges
//! - [`BridgeValidator`] - Schema-aware checks of rule calls
//! - [`TemplateCache`] - Shape-keyed rule template synthesis
//! - [`QueryFacility`] - The seam template execution plugs into
//! - [`InferenceEngine`] - Selection, ordering, execution, and propagation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod inference;
pub mod link;
pub mod model;
pub mod query;
pub mod rule;
pub mod template;
pub mod validate;

pub use config::EngineConfig;
pub use context::{
    BridgeId, BridgeMapping, ClassMapping, ClassRule, Context, ContextId, Link, LinkDirection,
    PropertyBridge,
};
pub use inference::{AbortHandle, InferenceEngine, RunReport, TraceEntry};
pub use link::{candidate_links, check_link, discover_link};
pub use model::MappingModel;
pub use query::{NativeQueryFacility, QueryFacility, TemplateBindings};
pub use rule::{CompiledRule, RuleBody, RuleCompiler, RuleId, Slot};
pub use template::{RuleTemplate, TemplateCache, TemplateKind, TemplateOutput, TemplateShape};
pub use validate::{AttributeRole, BridgeValidator};
