//! Configuration for inference runs.

/// Limits and switches for an [`crate::InferenceEngine`] run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Kill switch: rule executions allowed per run.
    pub max_executions: usize,

    /// Kill switch: propagation generations allowed per run.
    pub max_propagation_depth: usize,

    /// Largest source slot count a template may be synthesized for.
    pub max_source_slots: usize,

    /// Whether a rule for grouping G also applies to sub-groupings of G.
    pub inherit_rules: bool,

    /// Seed for identifier minting.
    pub id_seed: u64,

    /// Namespace minted identifiers live in.
    pub id_namespace: String,

    /// Keep the per-execution trace in the run report.
    pub record_trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_executions: 100_000,
            max_propagation_depth: 64,
            max_source_slots: 16,
            inherit_rules: true,
            id_seed: 0,
            id_namespace: "urn:ontobridge:id:".to_string(),
            record_trace: true,
        }
    }
}

impl EngineConfig {
    /// Tight limits for untrusted rule sets; exact groupings only.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_executions: 10_000,
            max_propagation_depth: 8,
            max_source_slots: 8,
            inherit_rules: false,
            ..Self::default()
        }
    }

    /// Generous limits for large batch runs; no trace kept.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_executions: 10_000_000,
            max_propagation_depth: 1_024,
            max_source_slots: 64,
            record_trace: false,
            ..Self::default()
        }
    }

    /// Builder method to set the execution kill switch.
    #[must_use]
    pub fn with_max_executions(mut self, max: usize) -> Self {
        self.max_executions = max;
        self
    }

    /// Builder method to set the propagation depth kill switch.
    #[must_use]
    pub fn with_max_propagation_depth(mut self, depth: usize) -> Self {
        self.max_propagation_depth = depth;
        self
    }

    /// Builder method to set the template slot limit.
    #[must_use]
    pub fn with_max_source_slots(mut self, slots: usize) -> Self {
        self.max_source_slots = slots;
        self
    }

    /// Builder method to enable/disable rule inheritance.
    #[must_use]
    pub fn with_inherit_rules(mut self, inherit: bool) -> Self {
        self.inherit_rules = inherit;
        self
    }

    /// Builder method to set the identifier seed.
    #[must_use]
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.id_seed = seed;
        self
    }

    /// Builder method to set the identifier namespace.
    #[must_use]
    pub fn with_id_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.id_namespace = namespace.into();
        self
    }

    /// Builder method to enable/disable the execution trace.
    #[must_use]
    pub fn with_record_trace(mut self, record: bool) -> Self {
        self.record_trace = record;
        self
    }
}
