//! Rule template synthesis.
//!
//! A template depends only on a rule's shape (how many filter, source, and
//! target slots it has and whether it needs the type guard), never on the
//! concrete attributes, so structurally identical rules share one
//! [`RuleTemplate`]. The attributes themselves are bound per execution.

use std::collections::HashMap;
use std::sync::Arc;

use ontobridge_foundation::{Error, Result};

/// Largest source slot count the minimal template handles.
const MINIMAL_SOURCE_SLOTS: usize = 2;

// =============================================================================
// Shape
// =============================================================================

/// Structural signature of a rule; the template memo key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateShape {
    /// Filter expressions (0 or 1).
    pub filter_slots: usize,
    /// Distinct source attributes read from the individual.
    pub source_slots: usize,
    /// Distinct target attributes read from the target individual.
    pub target_slots: usize,
    /// Slots carrying a default value for an absent fact.
    pub default_slots: usize,
    /// The target individual must already carry a type.
    pub requires_type_guard: bool,
}

/// Which built-in template family a shape maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Expression only; every slot must be present.
    Minimal,
    /// Optional slots with default fallbacks, filter, and guard.
    Parameterized,
}

/// What a template asserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateOutput {
    /// `value rdf:type grouping`
    Type,
    /// `target attribute value`
    Attribute,
}

// =============================================================================
// RuleTemplate
// =============================================================================

/// A reusable, parameterized query descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTemplate {
    shape: TemplateShape,
    kind: TemplateKind,
    output: TemplateOutput,
    text: String,
}

impl RuleTemplate {
    /// Synthesizes the template for a shape.
    ///
    /// # Errors
    ///
    /// Returns a template synthesis error if the shape has more than one
    /// filter slot or more default slots than attribute slots.
    pub fn synthesize(shape: TemplateShape) -> Result<Self> {
        if shape.filter_slots > 1 {
            return Err(Error::template_synthesis(format!(
                "{} filter slots; a rule has at most one filter",
                shape.filter_slots
            )));
        }
        if shape.default_slots > shape.source_slots + shape.target_slots {
            return Err(Error::template_synthesis(format!(
                "{} default slots for {} attribute slots",
                shape.default_slots,
                shape.source_slots + shape.target_slots
            )));
        }
        let kind = if shape.filter_slots == 0
            && shape.default_slots == 0
            && shape.source_slots <= MINIMAL_SOURCE_SLOTS
            && shape.target_slots == 0
        {
            TemplateKind::Minimal
        } else {
            TemplateKind::Parameterized
        };
        let output = if shape.requires_type_guard {
            TemplateOutput::Attribute
        } else {
            TemplateOutput::Type
        };
        Ok(Self {
            shape,
            kind,
            output,
            text: render(shape, kind, output),
        })
    }

    /// The shape this template was synthesized for.
    #[must_use]
    pub fn shape(&self) -> TemplateShape {
        self.shape
    }

    /// Template family.
    #[must_use]
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// What the template asserts.
    #[must_use]
    pub fn output(&self) -> TemplateOutput {
        self.output
    }

    /// Returns true if a target individual must already be typed.
    #[must_use]
    pub fn requires_type_guard(&self) -> bool {
        self.shape.requires_type_guard
    }

    /// Rendered query text, for diagnostics.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

fn render(shape: TemplateShape, kind: TemplateKind, output: TemplateOutput) -> String {
    let mut lines = vec![
        match output {
            TemplateOutput::Type => "CONSTRUCT { ?value a ?output . }".to_string(),
            TemplateOutput::Attribute => "CONSTRUCT { ?target ?output ?value . }".to_string(),
        },
        "WHERE {".to_string(),
    ];
    if shape.requires_type_guard {
        lines.push("  ?target a ?targetType .".to_string());
    }
    for i in 1..=shape.source_slots {
        match kind {
            TemplateKind::Minimal => lines.push(format!("  ?this ?s{i} ?v{i} .")),
            TemplateKind::Parameterized => {
                lines.push(format!("  OPTIONAL {{ ?this ?s{i} ?v{i} . }}"));
                lines.push(format!("  BIND(COALESCE(?v{i}, ?d{i}) AS ?b{i})"));
            }
        }
    }
    for i in 1..=shape.target_slots {
        lines.push(format!("  OPTIONAL {{ ?target ?t{i} ?w{i} . }}"));
        lines.push(format!("  BIND(COALESCE(?w{i}, ?e{i}) AS ?c{i})"));
    }
    if shape.filter_slots > 0 {
        lines.push("  FILTER(?filter)".to_string());
    }
    lines.push("  BIND(?expression AS ?value)".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

// =============================================================================
// Cache
// =============================================================================

/// Memoizes templates by shape.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: HashMap<TemplateShape, Arc<RuleTemplate>>,
    hits: usize,
    misses: usize,
}

impl TemplateCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the template for `shape`, synthesizing it on first use.
    ///
    /// # Errors
    ///
    /// Returns a template synthesis error if the shape has more source slots
    /// than `max_source_slots` or cannot be synthesized.
    pub fn get_or_synthesize(&mut self, shape: TemplateShape, max_source_slots: usize) -> Result<Arc<RuleTemplate>> {
        if shape.source_slots > max_source_slots {
            return Err(Error::template_synthesis(format!(
                "{} source slots exceed the limit of {max_source_slots}",
                shape.source_slots
            )));
        }
        if let Some(hit) = self.templates.get(&shape) {
            self.hits += 1;
            return Ok(Arc::clone(hit));
        }
        let template = Arc::new(RuleTemplate::synthesize(shape)?);
        self.misses += 1;
        tracing::trace!(?shape, kind = ?template.kind(), "synthesized template");
        self.templates.insert(shape, Arc::clone(&template));
        Ok(template)
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that synthesized a template.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Number of distinct templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if nothing has been synthesized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
