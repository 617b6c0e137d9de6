//! Rule compiler - turns a mapping model into executable rules.
//!
//! Classifies every attribute reference of a rule's calls into source or
//! target slots, derives the template shape, and fetches the shared
//! template from the cache.

use ontobridge_foundation::{ErrorContext, Result};
use ontobridge_function::{Call, CallValue, is_structural};

use crate::config::EngineConfig;
use crate::context::{BridgeMapping, ClassMapping, Context, Link};
use crate::model::MappingModel;
use crate::rule::{CompiledRule, RuleBody, RuleId, Slot};
use crate::template::{TemplateCache, TemplateShape};
use crate::validate::{AttributeRole, BridgeValidator};

/// Compiles contexts into rules.
pub struct RuleCompiler;

impl RuleCompiler {
    /// Compiles every rule of the model, ordered for execution.
    ///
    /// # Errors
    ///
    /// Returns the first template synthesis failure, with the failing rule
    /// as its error context.
    pub fn compile(
        model: &MappingModel,
        cache: &mut TemplateCache,
        config: &EngineConfig,
    ) -> Result<Vec<CompiledRule>> {
        let mut rules = Vec::new();
        for ctx in model.contexts() {
            let validator = BridgeValidator::new(model.ontology(), ctx.source(), ctx.target());

            if let Some(class_rule) = ctx.class_rule() {
                let filter = class_rule.filter.clone();
                let body = match &class_rule.mapping {
                    ClassMapping::Call(mapping) => RuleBody::Class {
                        filter,
                        mapping: mapping.clone(),
                    },
                    ClassMapping::Related { parent, link } => RuleBody::Related {
                        filter,
                        parent: *parent,
                        link: link.clone(),
                    },
                };
                rules.push(Self::rule(RuleId::Class(ctx.id()), ctx, body, &validator, cache, config)?);
            }

            for bridge in ctx.bridges() {
                let filter = bridge.filter().cloned();
                let body = match bridge.mapping() {
                    BridgeMapping::Call(mapping) => RuleBody::Attribute {
                        filter,
                        mapping: mapping.clone(),
                        attribute: bridge.target_attribute().clone(),
                    },
                    BridgeMapping::Attached { context, direction } => RuleBody::Attached {
                        filter,
                        other: *context,
                        link: Link {
                            property: bridge.target_attribute().clone(),
                            direction: *direction,
                        },
                    },
                };
                rules.push(Self::rule(RuleId::Bridge(bridge.id()), ctx, body, &validator, cache, config)?);
            }
        }
        rules.sort_by_cached_key(CompiledRule::order_key);
        Ok(rules)
    }

    fn rule(
        id: RuleId,
        ctx: &Context,
        body: RuleBody,
        validator: &BridgeValidator<'_>,
        cache: &mut TemplateCache,
        config: &EngineConfig,
    ) -> Result<CompiledRule> {
        let mut source_slots = Vec::new();
        let mut target_slots = Vec::new();
        for call in body.filter().into_iter().chain(body.expression()) {
            collect_slots(call, validator, &mut source_slots, &mut target_slots);
        }

        let shape = TemplateShape {
            filter_slots: usize::from(body.filter().is_some()),
            source_slots: source_slots.len(),
            target_slots: target_slots.len(),
            default_slots: source_slots
                .iter()
                .chain(&target_slots)
                .filter(|s| s.default.is_some())
                .count(),
            requires_type_guard: !body.derives_type(),
        };
        let template = cache
            .get_or_synthesize(shape, config.max_source_slots)
            .map_err(|e| e.with_context(ErrorContext::new().with_source(id.to_string())))?;
        tracing::trace!(rule = %id, kind = ?template.kind(), "compiled rule");

        Ok(CompiledRule {
            id,
            trigger: ctx.source().clone(),
            target_grouping: ctx.target().clone(),
            body,
            template,
            source_slots,
            target_slots,
        })
    }
}

/// Assigns slots in first-seen order; structural arguments and constants
/// are not slots.
fn collect_slots(call: &Call, validator: &BridgeValidator<'_>, source: &mut Vec<Slot>, target: &mut Vec<Slot>) {
    let sig = call.function();
    for (key, value) in call.entries() {
        let Some(arg) = sig.arguments().get(key.index) else {
            continue;
        };
        match value {
            CallValue::Resource(attribute) if !is_structural(arg.value_type()) => {
                let slots = match validator.role(attribute) {
                    AttributeRole::Source => &mut *source,
                    AttributeRole::Target => &mut *target,
                    AttributeRole::Constant => continue,
                };
                let default = arg.default().cloned();
                match slots.iter_mut().find(|s| s.attribute == *attribute) {
                    Some(slot) => {
                        if slot.default.is_none() {
                            slot.default = default;
                        }
                    }
                    None => slots.push(Slot {
                        attribute: attribute.clone(),
                        default,
                    }),
                }
            }
            CallValue::Call(nested) => collect_slots(nested, validator, source, target),
            _ => {}
        }
    }
}
