//! Bridge validation against the schema.
//!
//! Calls are structurally valid once built; this module checks what only
//! the schema knows: whether each resource reference is a source attribute,
//! a target attribute, or a constant, and whether its type fits the argument
//! it is bound to. Checks stop at the first problem.

use std::collections::BTreeSet;
use std::sync::Arc;

use ontobridge_foundation::{Error, Iri, Result, ValueType};
use ontobridge_function::{Call, CallValue, is_structural, validate};
use ontobridge_storage::{Ontology, SchemaOracle};

/// How a resource reference inside a rule is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeRole {
    /// Read from the source individual.
    Source,
    /// Read from the target individual.
    Target,
    /// Passed through as a constant resource.
    Constant,
}

/// Validates rules of one context.
pub struct BridgeValidator<'a> {
    ontology: &'a Ontology,
    source_attributes: Arc<BTreeSet<Iri>>,
    target_attributes: Arc<BTreeSet<Iri>>,
    target: &'a Iri,
}

impl<'a> BridgeValidator<'a> {
    /// Creates a validator for a source/target grouping pair.
    #[must_use]
    pub fn new(ontology: &'a Ontology, source: &Iri, target: &'a Iri) -> Self {
        Self {
            ontology,
            source_attributes: ontology.attributes_of(source),
            target_attributes: ontology.attributes_of(target),
            target,
        }
    }

    /// Classifies a reference by membership; source wins over target.
    #[must_use]
    pub fn role(&self, reference: &Iri) -> AttributeRole {
        if self.source_attributes.contains(reference) {
            AttributeRole::Source
        } else if self.target_attributes.contains(reference) {
            AttributeRole::Target
        } else {
            AttributeRole::Constant
        }
    }

    /// Value type an attribute's facts carry, from its declared range.
    #[must_use]
    pub fn attribute_type(&self, attribute: &Iri) -> ValueType {
        let schema = self.ontology.graph();
        if let Some(range) = schema.ranges(attribute).first() {
            return if schema.is_datatype(range) {
                ValueType::from_iri(range.as_str())
            } else {
                ValueType::Resource
            };
        }
        match schema.property_kind(attribute) {
            Some(ValueType::DatatypeProperty) => ValueType::Literal,
            Some(ValueType::ObjectProperty) => ValueType::Resource,
            _ => ValueType::Any,
        }
    }

    /// Checks a class rule.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the filter is not boolean or the
    /// mapping is not target-producing, or the first type problem found in
    /// either call.
    pub fn class_rule(&self, filter: Option<&Call>, mapping: &Call) -> Result<()> {
        if let Some(filter) = filter {
            self.filter(filter)?;
        }
        if !mapping.is_target() {
            return Err(Error::bridge_validation(format!(
                "class rule mapping {} does not produce target individuals",
                mapping.name()
            )));
        }
        self.call(mapping)
    }

    /// Checks a property bridge.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the attribute does not belong to
    /// the target grouping, the mapping is target-producing, or the filter is
    /// not boolean; a type mismatch if the mapping's return type does not fit
    /// the attribute's range.
    pub fn property_bridge(&self, filter: Option<&Call>, mapping: &Call, attribute: &Iri) -> Result<()> {
        if !self.target_attributes.contains(attribute) {
            return Err(Error::bridge_validation(format!(
                "{attribute} is not an attribute of {}",
                self.target
            )));
        }
        if mapping.is_target() {
            return Err(Error::bridge_validation(format!(
                "property bridge mapping {} produces target individuals",
                mapping.name()
            )));
        }
        if let Some(filter) = filter {
            self.filter(filter)?;
        }
        let expected = self.attribute_type(attribute);
        if !expected.accepts(mapping.return_type()) {
            return Err(Error::type_mismatch(
                attribute.local_name(),
                expected,
                mapping.return_type().clone(),
            ));
        }
        self.call(mapping)
    }

    /// Checks a filter call.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the call is not boolean, or the
    /// first type problem in its arguments.
    pub fn filter(&self, filter: &Call) -> Result<()> {
        if !filter.is_boolean() {
            return Err(Error::bridge_validation(format!(
                "filter {} is not boolean",
                filter.name()
            )));
        }
        self.call(filter)
    }

    /// Re-checks call invariants, then every resource reference.
    fn call(&self, call: &Call) -> Result<()> {
        validate(call)?;
        self.references(call)
    }

    fn references(&self, call: &Call) -> Result<()> {
        let sig = call.function();
        for (key, value) in call.entries() {
            let Some(arg) = sig.arguments().get(key.index) else {
                continue;
            };
            let expected = arg.value_type();
            let actual = match value {
                CallValue::Resource(iri) => {
                    if is_structural(expected) || self.role(iri) == AttributeRole::Constant {
                        self.ontology.graph().classify(iri)
                    } else {
                        self.attribute_type(iri)
                    }
                }
                CallValue::Current => ValueType::Resource,
                CallValue::Call(nested) => {
                    self.references(nested)?;
                    continue;
                }
                CallValue::Literal(_) => continue,
            };
            if !expected.accepts(&actual) {
                return Err(Error::type_mismatch(arg.name(), expected.clone(), actual));
            }
        }
        Ok(())
    }
}
