//! Integration tests for rule compilation and template sharing

use std::sync::Arc;

use ontobridge_engine::{EngineConfig, RuleBody, RuleCompiler, RuleId, TemplateCache};
use ontobridge_foundation::{ErrorKind, Literal};

use crate::fixtures::{attr, between, call, iri, people};

/// Person -> User with one class rule and two single-slot bridges.
fn model() -> ontobridge_engine::MappingModel {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let id = call(&model, "generateId", vec![]);
    model.add_class_bridge(ctx, None, id).unwrap();
    let first = call(&model, "upperCase", vec![("value", attr("urn:firstName"))]);
    model
        .add_property_bridge(ctx, None, first, iri("urn:fullName"))
        .unwrap();
    let age = call(&model, "identity", vec![("value", attr("urn:age"))]);
    model
        .add_property_bridge(ctx, None, age, iri("urn:userAge"))
        .unwrap();
    model
}

#[test]
fn same_shaped_rules_share_a_template() {
    let model = model();
    let mut cache = TemplateCache::new();
    let rules = RuleCompiler::compile(&model, &mut cache, &EngineConfig::default()).unwrap();

    assert_eq!(rules.len(), 3);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits(), 1);
    assert!(Arc::ptr_eq(&rules[1].template, &rules[2].template));
    assert!(!Arc::ptr_eq(&rules[0].template, &rules[1].template));
}

#[test]
fn recompiling_reuses_every_template() {
    let model = model();
    let mut cache = TemplateCache::new();
    let config = EngineConfig::default();
    RuleCompiler::compile(&model, &mut cache, &config).unwrap();
    RuleCompiler::compile(&model, &mut cache, &config).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits(), 4);
}

#[test]
fn class_rules_are_ordered_first() {
    let model = model();
    let mut cache = TemplateCache::new();
    let rules = RuleCompiler::compile(&model, &mut cache, &EngineConfig::default()).unwrap();

    assert!(matches!(rules[0].id, RuleId::Class(_)));
    assert!(matches!(rules[0].body, RuleBody::Class { .. }));
    assert!(!rules[0].template.requires_type_guard());
    for rule in &rules[1..] {
        assert!(matches!(rule.id, RuleId::Bridge(_)));
        assert!(rule.template.requires_type_guard());
        assert_eq!(rule.trigger, iri("urn:Person"));
        assert_eq!(rule.target_grouping, iri("urn:User"));
    }
}

#[test]
fn filters_and_defaults_change_the_shape() {
    let mut model = model();
    let ctx = model.contexts().next().unwrap().id();
    let filter = between(&model, "urn:age", 17, 120);
    let age = call(&model, "identity", vec![("value", attr("urn:age"))]);
    model
        .add_property_bridge(ctx, Some(filter), age, iri("urn:userAge"))
        .unwrap();

    let mut cache = TemplateCache::new();
    let rules = RuleCompiler::compile(&model, &mut cache, &EngineConfig::default()).unwrap();
    assert_eq!(cache.len(), 3);
    let filtered = rules.iter().find(|r| r.body.filter().is_some()).unwrap();
    assert_eq!(filtered.template.shape().filter_slots, 1);
    assert_eq!(filtered.source_slots.len(), 1);
}

#[test]
fn slot_limit_fails_with_the_rule_named() {
    let mut model = people().model();
    let ctx = model.create_context(iri("urn:Person"), iri("urn:User")).unwrap();
    let concat = call(
        &model,
        "concat",
        vec![
            ("value", attr("urn:firstName")),
            ("value", attr("urn:lastName")),
            ("sep", Literal::string(" ").into()),
        ],
    );
    let bridge = model
        .add_property_bridge(ctx, None, concat, iri("urn:fullName"))
        .unwrap();

    let mut cache = TemplateCache::new();
    let err = RuleCompiler::compile(
        &model,
        &mut cache,
        &EngineConfig::default().with_max_source_slots(1),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TemplateSynthesis(_)));
    let source = err.context.and_then(|c| c.source).unwrap();
    assert_eq!(source, RuleId::Bridge(bridge).to_string());
    assert!(cache.is_empty());
}
