//! The mapping model: contexts, their rules, and how they reference each other.
//!
//! Every mutation validates first and applies second, so a failed call
//! leaves the model exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use ontobridge_foundation::{Error, Iri, Result};
use ontobridge_function::{Call, FunctionRegistry};
use ontobridge_storage::{Ontology, SchemaOracle};

use crate::context::{
    BridgeId, BridgeMapping, ClassMapping, ClassRule, Context, ContextId, PropertyBridge,
};
use crate::link::{check_link, discover_link};
use crate::validate::BridgeValidator;

/// Contexts over one schema, validated against one function registry.
#[derive(Debug)]
pub struct MappingModel {
    ontology: Ontology,
    registry: Arc<FunctionRegistry>,
    contexts: BTreeMap<ContextId, Context>,
    next_context: u32,
    next_bridge: u32,
}

impl MappingModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new(ontology: Ontology, registry: Arc<FunctionRegistry>) -> Self {
        Self {
            ontology,
            registry,
            contexts: BTreeMap::new(),
            next_context: 1,
            next_bridge: 1,
        }
    }

    /// The schema rules are validated against.
    #[must_use]
    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// The function registry rules resolve against.
    #[must_use]
    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Looks up a context.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if `id` is not in the model.
    pub fn context(&self, id: ContextId) -> Result<&Context> {
        self.contexts
            .get(&id)
            .ok_or_else(|| Error::bridge_validation(format!("unknown context {id}")))
    }

    /// Every context in identifier order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.values()
    }

    /// The context mapping `source` onto `target`, if one exists.
    #[must_use]
    pub fn find_context(&self, source: &Iri, target: &Iri) -> Option<ContextId> {
        self.contexts
            .values()
            .find(|c| c.source == *source && c.target == *target)
            .map(Context::id)
    }

    /// Contexts that structurally reference `id`.
    #[must_use]
    pub fn dependents_of(&self, id: ContextId) -> Vec<ContextId> {
        self.contexts
            .values()
            .filter(|c| c.id != id && c.references().contains(&id))
            .map(Context::id)
            .collect()
    }

    /// Number of contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns true if the model has no contexts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    // =========================================================================
    // Contexts
    // =========================================================================

    /// Returns the context for a grouping pair, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if either side is not a grouping.
    pub fn create_context(&mut self, source: Iri, target: Iri) -> Result<ContextId> {
        if let Some(existing) = self.find_context(&source, &target) {
            return Ok(existing);
        }
        self.require_grouping(&source)?;
        self.require_grouping(&target)?;
        Ok(self.insert_context(source, target, None))
    }

    /// Removes a context and its property bridges.
    ///
    /// # Errors
    ///
    /// Returns a dependency error naming every context that references it.
    pub fn delete_context(&mut self, id: ContextId) -> Result<Context> {
        self.context(id)?;
        let dependents = self.dependents_of(id);
        if !dependents.is_empty() {
            return Err(Error::dependency(
                id.to_string(),
                dependents.iter().map(ToString::to_string).collect(),
            ));
        }
        let removed = self
            .contexts
            .remove(&id)
            .ok_or_else(|| Error::internal(format!("context {id} vanished")))?;
        tracing::debug!(context = %id, "deleted context");
        Ok(removed)
    }

    /// Attaches `right` to `left` through the unique link between their
    /// target groupings.
    ///
    /// # Errors
    ///
    /// Returns a link resolution error if no unique link exists, or any
    /// error [`Self::attach_context`] raises.
    pub fn bind_contexts(&mut self, left: ContextId, right: ContextId) -> Result<BridgeId> {
        let link = discover_link(
            &self.ontology,
            &self.context(left)?.target,
            &self.context(right)?.target,
        )?;
        self.attach_context(left, right, link.property)
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Sets the class rule of a context, replacing any previous one.
    ///
    /// Property bridges are untouched.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the filter is not boolean or
    /// the mapping is not target-producing, or the first type problem in
    /// either call.
    pub fn add_class_bridge(&mut self, id: ContextId, filter: Option<Call>, mapping: Call) -> Result<()> {
        {
            let ctx = self.context(id)?;
            BridgeValidator::new(&self.ontology, &ctx.source, &ctx.target)
                .class_rule(filter.as_ref(), &mapping)?;
        }
        self.registered(filter.iter().chain(Some(&mapping)))?;
        let ctx = self.context_mut(id)?;
        ctx.class_rule = Some(ClassRule {
            filter,
            mapping: ClassMapping::Call(mapping),
        });
        tracing::debug!(context = %id, "set class rule");
        Ok(())
    }

    /// Adds a property bridge deriving `attribute` on the target individual.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the attribute is not one of the
    /// target grouping's, the mapping is target-producing, or the filter is
    /// not boolean; a type mismatch if the mapping does not fit the
    /// attribute's range.
    pub fn add_property_bridge(
        &mut self,
        id: ContextId,
        filter: Option<Call>,
        mapping: Call,
        attribute: Iri,
    ) -> Result<BridgeId> {
        {
            let ctx = self.context(id)?;
            BridgeValidator::new(&self.ontology, &ctx.source, &ctx.target).property_bridge(
                filter.as_ref(),
                &mapping,
                &attribute,
            )?;
        }
        self.registered(filter.iter().chain(Some(&mapping)))?;
        self.insert_bridge(id, filter, BridgeMapping::Call(mapping), attribute)
    }

    /// Removes a property bridge.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the bridge does not exist.
    pub fn delete_property_bridge(&mut self, id: BridgeId) -> Result<PropertyBridge> {
        let removed = self
            .context_mut(id.context)?
            .bridges
            .remove(&id)
            .ok_or_else(|| Error::bridge_validation(format!("unknown property bridge {id}")))?;
        tracing::debug!(bridge = %id, "deleted property bridge");
        Ok(removed)
    }

    /// Maps `other_source` onto this context's target, reusing the target
    /// individual this context derives for a linked individual.
    ///
    /// When `link` is `None` the unique relational attribute between the two
    /// source groupings is discovered. If a context for the new pair already
    /// exists its class rule is replaced.
    ///
    /// # Errors
    ///
    /// Returns a link resolution error if discovery finds no link or several;
    /// a bridge validation error if `other_source` is this context's source,
    /// is not a grouping, the named link does not connect the groupings, or
    /// the relation would make a context its own ancestor.
    pub fn create_related_context(
        &mut self,
        id: ContextId,
        other_source: Iri,
        link: Option<Iri>,
    ) -> Result<ContextId> {
        let (source, target) = {
            let parent = self.context(id)?;
            (parent.source.clone(), parent.target.clone())
        };
        if other_source == source {
            return Err(Error::bridge_validation(format!(
                "{other_source} is already the source of {id}"
            )));
        }
        self.require_grouping(&other_source)?;
        let link = match link {
            Some(property) => check_link(&self.ontology, &other_source, &source, &property)?,
            None => discover_link(&self.ontology, &other_source, &source)?,
        };

        let existing = self.find_context(&other_source, &target);
        if let Some(existing) = existing {
            if self.ancestors(id).contains(&existing) {
                return Err(Error::bridge_validation(format!(
                    "relating {existing} to {id} would form a cycle"
                )));
            }
        }

        let rule = ClassRule {
            filter: None,
            mapping: ClassMapping::Related { parent: id, link },
        };
        let related = match existing {
            Some(existing) => {
                self.context_mut(existing)?.class_rule = Some(rule);
                existing
            }
            None => self.insert_context(other_source, target, Some(rule)),
        };
        tracing::debug!(context = %related, parent = %id, "related context");
        Ok(related)
    }

    /// Asserts `link` between the targets two contexts derive for the same
    /// source individual.
    ///
    /// # Errors
    ///
    /// Returns a bridge validation error if the contexts are the same, have
    /// different source groupings, or `link` does not connect their target
    /// groupings.
    pub fn attach_context(&mut self, id: ContextId, other: ContextId, link: Iri) -> Result<BridgeId> {
        if id == other {
            return Err(Error::bridge_validation(format!(
                "cannot attach {id} to itself"
            )));
        }
        let this = self.context(id)?;
        let that = self.context(other)?;
        if this.source != that.source {
            return Err(Error::bridge_validation(format!(
                "{id} and {other} map different source groupings"
            )));
        }
        let link = check_link(&self.ontology, &this.target, &that.target, &link)?;
        self.insert_bridge(
            id,
            None,
            BridgeMapping::Attached {
                context: other,
                direction: link.direction,
            },
            link.property,
        )
    }

    /// Checks a call without attaching it anywhere.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem in the call, or an unknown
    /// function error if it uses a function the registry does not hold.
    pub fn validate(&self, call: &Call) -> Result<()> {
        ontobridge_function::validate(call)?;
        self.registered(Some(call))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn context_mut(&mut self, id: ContextId) -> Result<&mut Context> {
        self.contexts
            .get_mut(&id)
            .ok_or_else(|| Error::bridge_validation(format!("unknown context {id}")))
    }

    fn require_grouping(&self, iri: &Iri) -> Result<()> {
        if self.ontology.graph().is_grouping(iri) {
            Ok(())
        } else {
            Err(Error::bridge_validation(format!("{iri} is not a grouping")))
        }
    }

    fn registered<'c>(&self, calls: impl IntoIterator<Item = &'c Call>) -> Result<()> {
        let snapshot = self.registry.snapshot();
        for call in calls {
            for used in call.functions_used() {
                snapshot.get_function(&used)?;
            }
        }
        Ok(())
    }

    /// Parents reached by following related class rules upward, `id` included.
    fn ancestors(&self, id: ContextId) -> Vec<ContextId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(ClassRule {
            mapping: ClassMapping::Related { parent, .. },
            ..
        }) = self.contexts.get(&current).and_then(|c| c.class_rule.as_ref())
        {
            if chain.contains(parent) {
                break;
            }
            chain.push(*parent);
            current = *parent;
        }
        chain
    }

    fn insert_context(&mut self, source: Iri, target: Iri, class_rule: Option<ClassRule>) -> ContextId {
        let id = ContextId(self.next_context);
        self.next_context += 1;
        let mut ctx = Context::new(id, source, target);
        ctx.class_rule = class_rule;
        tracing::debug!(context = %ctx, "created context");
        self.contexts.insert(id, ctx);
        id
    }

    fn insert_bridge(
        &mut self,
        id: ContextId,
        filter: Option<Call>,
        mapping: BridgeMapping,
        target_attribute: Iri,
    ) -> Result<BridgeId> {
        let bridge = BridgeId {
            context: id,
            index: self.next_bridge,
        };
        let ctx = self.context_mut(id)?;
        ctx.bridges.insert(
            bridge,
            PropertyBridge {
                id: bridge,
                filter,
                mapping,
                target_attribute,
            },
        );
        self.next_bridge += 1;
        tracing::debug!(bridge = %bridge, "added property bridge");
        Ok(bridge)
    }
}
