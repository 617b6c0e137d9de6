//! Forward-chaining inference over a mapping model.
//!
//! A run seeds its frontier with every typed individual of the source
//! graph, executes the applicable rules of each (type-deriving rules
//! first), merges what they derive into the target graph, and feeds every
//! newly typed resource back into the frontier. Each (individual, rule)
//! pair executes at most once per run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ontobridge_foundation::{Error, ErrorContext, Iri, Result, SemanticLimit, Term, Triple};
use ontobridge_function::{EvalContext, IdMinter, RegistrySnapshot};
use ontobridge_storage::{Graph, GraphStore, GraphView, Ontology, UnionView};

use crate::config::EngineConfig;
use crate::context::{ContextId, Link, LinkDirection};
use crate::model::MappingModel;
use crate::query::{NativeQueryFacility, QueryFacility, TemplateBindings};
use crate::rule::{CompiledRule, RuleBody, RuleCompiler, RuleId};
use crate::template::TemplateCache;

// =============================================================================
// Abort Handle
// =============================================================================

/// Stops a run at the next individual.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Requests that the run stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once an abort was requested.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the engine can run again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Run Report
// =============================================================================

/// One rule execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    /// The executed rule.
    pub rule: RuleId,
    /// The individual it ran for.
    pub individual: Term,
    /// Propagation generation of the individual.
    pub depth: usize,
    /// Triples the execution added to the target graph.
    pub added: usize,
}

/// What a completed run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rule executions.
    pub executions: usize,
    /// (individual, rule) pairs skipped because they had already run.
    pub skipped: usize,
    /// Triples added to the target graph.
    pub triples_added: usize,
    /// Individuals taken off the frontier.
    pub individuals_visited: usize,
    /// Executions in order, when tracing is enabled.
    pub trace: Vec<TraceEntry>,
}

// =============================================================================
// Inference Engine
// =============================================================================

/// Executes a mapping model over source data.
pub struct InferenceEngine<'m> {
    model: &'m MappingModel,
    config: EngineConfig,
    facility: Box<dyn QueryFacility + 'm>,
    abort: AbortHandle,
}

impl<'m> InferenceEngine<'m> {
    /// Creates an engine with the default configuration and the native
    /// query facility.
    #[must_use]
    pub fn new(model: &'m MappingModel) -> Self {
        Self {
            model,
            config: EngineConfig::default(),
            facility: Box::new(NativeQueryFacility),
            abort: AbortHandle::default(),
        }
    }

    /// Builder method to set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder method to replace the query facility.
    #[must_use]
    pub fn with_facility(mut self, facility: impl QueryFacility + 'm) -> Self {
        self.facility = Box::new(facility);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A handle that aborts runs of this engine.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Compiles the model's rules in execution order.
    ///
    /// # Errors
    ///
    /// Returns the first rule that cannot be turned into a template.
    pub fn compile(&self) -> Result<Vec<CompiledRule>> {
        let mut cache = TemplateCache::new();
        let rules = RuleCompiler::compile(self.model, &mut cache, &self.config)?;
        tracing::debug!(
            rules = rules.len(),
            templates = cache.len(),
            shared = cache.hits(),
            "compiled rules"
        );
        Ok(rules)
    }

    /// Runs every rule to quiescence, adding derived facts to `target`.
    ///
    /// The run reaches its fixpoint when the frontier empties: no
    /// individual is left with an (individual, rule) pair that has not run.
    /// `max_propagation_depth` is only a kill switch for runaway models and
    /// never decides when a healthy run ends.
    ///
    /// On error the target graph holds whatever was derived before the
    /// failure and must not be treated as complete.
    ///
    /// # Errors
    ///
    /// Returns a template synthesis error for a malformed rule, a rule
    /// execution error wrapping the first failing execution, a limit
    /// error when a kill switch trips, or an aborted error once the abort
    /// handle is set.
    pub fn run(&self, source: &dyn GraphView, target: &mut Graph) -> Result<RunReport> {
        let rules = self.compile()?;
        let seeds = source.typed_individuals();
        tracing::info!(rules = rules.len(), seeds = seeds.len(), "inference run started");

        let mut run = Run::new(self, &rules, source, target);
        for seed in seeds {
            run.enqueue(seed, 0)?;
        }
        run.drain()?;

        let report = run.report;
        tracing::info!(
            executions = report.executions,
            skipped = report.skipped,
            added = report.triples_added,
            visited = report.individuals_visited,
            "inference run finished"
        );
        Ok(report)
    }
}

// =============================================================================
// Run State
// =============================================================================

/// State of one run; discarded when the run ends.
struct Run<'a> {
    ontology: &'a Ontology,
    config: &'a EngineConfig,
    facility: &'a dyn QueryFacility,
    abort: &'a AbortHandle,
    rules: &'a [CompiledRule],
    class_rules: HashMap<ContextId, &'a CompiledRule>,
    source: &'a dyn GraphView,
    target: &'a mut Graph,
    registry: RegistrySnapshot,
    minter: IdMinter,
    executed: HashSet<(Term, RuleId)>,
    /// Targets each context derived per source individual.
    targets: HashMap<(ContextId, Term), Vec<Term>>,
    frontier: VecDeque<(Term, usize)>,
    queued: HashSet<Term>,
    report: RunReport,
}

impl<'a> Run<'a> {
    fn new(
        engine: &'a InferenceEngine<'_>,
        rules: &'a [CompiledRule],
        source: &'a dyn GraphView,
        target: &'a mut Graph,
    ) -> Self {
        let class_rules = rules
            .iter()
            .filter(|r| matches!(r.id, RuleId::Class(_)))
            .map(|r| (r.context(), r))
            .collect();
        Self {
            ontology: engine.model.ontology(),
            config: &engine.config,
            facility: &*engine.facility,
            abort: &engine.abort,
            rules,
            class_rules,
            source,
            target,
            registry: engine.model.registry().snapshot(),
            minter: IdMinter::new(engine.config.id_seed, engine.config.id_namespace.clone()),
            executed: HashSet::new(),
            targets: HashMap::new(),
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            report: RunReport::default(),
        }
    }

    fn enqueue(&mut self, individual: Term, depth: usize) -> Result<()> {
        if depth > self.config.max_propagation_depth {
            return Err(Error::limit_exceeded(SemanticLimit::MaxPropagationDepth {
                limit: self.config.max_propagation_depth,
                individual: Some(individual.to_string()),
            }));
        }
        if self.queued.insert(individual.clone()) {
            self.frontier.push_back((individual, depth));
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        while let Some((individual, depth)) = self.frontier.pop_front() {
            if self.abort.is_aborted() {
                tracing::warn!(pending = self.frontier.len() + 1, "inference run aborted");
                return Err(Error::aborted());
            }
            self.queued.remove(&individual);
            self.report.individuals_visited += 1;

            let types = self.types_of(&individual);
            let applicable: Vec<&'a CompiledRule> =
                self.rules.iter().filter(|r| self.applies(r, &types)).collect();
            for rule in applicable {
                self.execute(rule, &individual, depth)?;
            }
        }
        Ok(())
    }

    fn view(&self) -> UnionView<'_> {
        UnionView::new().with(self.source).with(&*self.target)
    }

    fn types_of(&self, individual: &Term) -> Vec<Iri> {
        self.view().types_of(individual)
    }

    fn applies(&self, rule: &CompiledRule, types: &[Iri]) -> bool {
        types.iter().any(|t| {
            *t == rule.trigger
                || (self.config.inherit_rules && self.ontology.specializes(t, &rule.trigger))
        })
    }

    /// Individuals reached from `individual` over a link.
    fn linked(&self, individual: &Term, link: &Link) -> Vec<Term> {
        let view = self.view();
        match link.direction {
            LinkDirection::Forward => view.objects(individual, &link.property),
            LinkDirection::Inverse => view.subjects(&link.property, individual),
        }
    }

    fn execute(&mut self, rule: &'a CompiledRule, individual: &Term, depth: usize) -> Result<()> {
        let key = (individual.clone(), rule.id);
        if self.executed.contains(&key) {
            tracing::trace!(rule = %rule.id, %individual, "already executed");
            self.report.skipped += 1;
            return Ok(());
        }
        if self.report.executions >= self.config.max_executions {
            return Err(Error::limit_exceeded(SemanticLimit::MaxExecutions {
                limit: self.config.max_executions,
                context: Some(format!("{} on {individual}", rule.id)),
            }));
        }
        self.executed.insert(key);
        self.report.executions += 1;
        tracing::debug!(rule = %rule.id, %individual, depth, "executing rule");

        let mut added = 0;
        match &rule.body {
            RuleBody::Class { .. } => {
                self.targets.entry((rule.context(), individual.clone())).or_default();
                let (derived, n) = self.apply(rule, individual, None, None, &rule.target_grouping, depth)?;
                self.remember(rule.context(), individual, &derived);
                added += n;
            }
            RuleBody::Related { parent, link, .. } => {
                self.targets.entry((rule.context(), individual.clone())).or_default();
                for linked in self.linked(individual, link) {
                    for reused in self.resolve_target(*parent, &linked, depth)? {
                        let (derived, n) =
                            self.apply(rule, individual, None, Some(reused), &rule.target_grouping, depth)?;
                        self.remember(rule.context(), individual, &derived);
                        added += n;
                    }
                }
            }
            RuleBody::Attribute { attribute, .. } => {
                for target in self.resolve_target(rule.context(), individual, depth)? {
                    added += self.apply(rule, individual, Some(&target), None, attribute, depth)?.1;
                }
            }
            RuleBody::Attached { other, link, .. } => {
                let mine = self.resolve_target(rule.context(), individual, depth)?;
                let theirs = self.resolve_target(*other, individual, depth)?;
                for m in &mine {
                    for o in &theirs {
                        let (subject, object) = match link.direction {
                            LinkDirection::Forward => (m, o),
                            LinkDirection::Inverse => (o, m),
                        };
                        added += self
                            .apply(rule, individual, Some(subject), Some(object.clone()), &link.property, depth)?
                            .1;
                    }
                }
            }
        }

        if self.config.record_trace {
            self.report.trace.push(TraceEntry {
                rule: rule.id,
                individual: individual.clone(),
                depth,
                added,
            });
        }
        Ok(())
    }

    /// The targets a context derives for an individual, running its class
    /// rule first if it has not run yet.
    fn resolve_target(&mut self, context: ContextId, individual: &Term, depth: usize) -> Result<Vec<Term>> {
        let key = (context, individual.clone());
        if let Some(found) = self.targets.get(&key) {
            return Ok(found.clone());
        }
        let Some(&rule) = self.class_rules.get(&context) else {
            return Ok(Vec::new());
        };
        let types = self.types_of(individual);
        if !self.applies(rule, &types) {
            return Ok(Vec::new());
        }
        self.execute(rule, individual, depth)?;
        Ok(self.targets.get(&key).cloned().unwrap_or_default())
    }

    fn remember(&mut self, context: ContextId, individual: &Term, derived: &[Triple]) {
        let known = self.targets.entry((context, individual.clone())).or_default();
        for triple in derived.iter().filter(|t| t.is_type_assertion()) {
            if !known.contains(&triple.subject) {
                known.push(triple.subject.clone());
            }
        }
    }

    /// Runs a rule's template once and merges what it derives.
    fn apply(
        &mut self,
        rule: &'a CompiledRule,
        individual: &Term,
        target: Option<&Term>,
        value: Option<Term>,
        output: &Iri,
        depth: usize,
    ) -> Result<(Vec<Triple>, usize)> {
        let bindings = TemplateBindings {
            rule: rule.id,
            this: individual,
            target,
            source_slots: &rule.source_slots,
            target_slots: &rule.target_slots,
            filter: rule.body.filter(),
            expression: rule.body.expression(),
            value,
            output,
        };
        let derived = {
            let view = UnionView::new().with(self.source).with(&*self.target);
            let mut eval = EvalContext::new(individual.clone(), &self.registry, &mut self.minter);
            self.facility.execute(&rule.template, &bindings, &view, &mut eval)
        }
        .map_err(|cause| {
            Error::rule_execution(rule.id.to_string(), individual.to_string(), cause)
                .with_context(ErrorContext::new().with_source(rule.id.to_string()))
        })?;

        let mut added = 0;
        for triple in &derived {
            if self.target.insert(triple.clone()) {
                added += 1;
                if triple.is_type_assertion() {
                    self.enqueue(triple.subject.clone(), depth + 1)?;
                }
            }
        }
        self.report.triples_added += added;
        Ok((derived, added))
    }
}
