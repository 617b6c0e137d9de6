//! Template execution.
//!
//! [`QueryFacility`] is the seam between the engine and whatever evaluates
//! templates. [`NativeQueryFacility`] interprets templates directly over a
//! [`GraphView`], evaluating expressions through the function registry.

use std::collections::BTreeMap;

use ontobridge_foundation::{Error, Iri, Result, Term, Triple};
use ontobridge_function::{Call, EvalContext, evaluate, passes};
use ontobridge_storage::GraphView;

use crate::rule::{RuleId, Slot};
use crate::template::{RuleTemplate, TemplateKind, TemplateOutput};

/// Values pre-bound into a template for one execution.
#[derive(Clone, Debug)]
pub struct TemplateBindings<'r> {
    /// The executing rule.
    pub rule: RuleId,
    /// The individual being processed.
    pub this: &'r Term,
    /// The target individual, for attribute templates.
    pub target: Option<&'r Term>,
    /// Attributes read from `this`.
    pub source_slots: &'r [Slot],
    /// Attributes read from `target`.
    pub target_slots: &'r [Slot],
    /// Filter evaluated per solution.
    pub filter: Option<&'r Call>,
    /// Expression producing the asserted value.
    pub expression: Option<&'r Call>,
    /// Asserted value when there is no expression.
    pub value: Option<Term>,
    /// Grouping (type templates) or attribute (attribute templates).
    pub output: &'r Iri,
}

/// Evaluates templates against bound values.
pub trait QueryFacility {
    /// Runs a template and returns the facts it derives.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be evaluated; the engine
    /// treats it as fatal for the run.
    fn execute(
        &self,
        template: &RuleTemplate,
        bindings: &TemplateBindings<'_>,
        view: &dyn GraphView,
        eval: &mut EvalContext<'_>,
    ) -> Result<Vec<Triple>>;
}

/// In-process template interpreter.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeQueryFacility;

impl NativeQueryFacility {
    /// Creates the facility.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// One column per slot; `None` in a column marks an absent fact.
type Columns = Vec<(Iri, Vec<Option<Term>>)>;

/// Reads every slot of `subject`; false if a minimal template's required
/// fact is missing.
fn columns(kind: TemplateKind, view: &dyn GraphView, subject: Option<&Term>, slots: &[Slot], out: &mut Columns) -> bool {
    for slot in slots {
        let values = subject.map_or_else(Vec::new, |s| view.objects(s, &slot.attribute));
        let column = if values.is_empty() {
            match kind {
                TemplateKind::Minimal => return false,
                TemplateKind::Parameterized => vec![slot.default.clone()],
            }
        } else {
            values.into_iter().map(Some).collect()
        };
        out.push((slot.attribute.clone(), column));
    }
    true
}

/// Every combination of one value per column.
fn solutions(columns: &Columns) -> Vec<BTreeMap<Iri, Option<Term>>> {
    let mut rows = vec![BTreeMap::new()];
    for (attribute, values) in columns {
        rows = rows
            .iter()
            .flat_map(|row| {
                values.iter().map(move |value| {
                    let mut next = row.clone();
                    next.insert(attribute.clone(), value.clone());
                    next
                })
            })
            .collect();
    }
    rows
}

impl QueryFacility for NativeQueryFacility {
    fn execute(
        &self,
        template: &RuleTemplate,
        bindings: &TemplateBindings<'_>,
        view: &dyn GraphView,
        eval: &mut EvalContext<'_>,
    ) -> Result<Vec<Triple>> {
        if template.requires_type_guard() {
            match bindings.target {
                Some(target) if !view.types_of(target).is_empty() => {}
                _ => return Ok(Vec::new()),
            }
        }

        let mut cols = Vec::new();
        if !columns(template.kind(), view, Some(bindings.this), bindings.source_slots, &mut cols)
            || !columns(template.kind(), view, bindings.target, bindings.target_slots, &mut cols)
        {
            return Ok(Vec::new());
        }

        let mut derived: Vec<Triple> = Vec::new();
        for solution in solutions(&cols) {
            eval.bind(solution);
            if let Some(filter) = bindings.filter {
                if !passes(filter, eval)? {
                    continue;
                }
            }
            let value = match bindings.expression {
                Some(expression) => evaluate(expression, eval)?,
                None => bindings.value.clone(),
            };
            let Some(value) = value else {
                continue;
            };
            let triple = match template.output() {
                TemplateOutput::Type => {
                    if value.is_literal() {
                        return Err(Error::internal(format!(
                            "{} produced literal {value} as a target individual",
                            bindings.rule
                        )));
                    }
                    Triple::typed(value, bindings.output.clone())
                }
                TemplateOutput::Attribute => {
                    let Some(target) = bindings.target else {
                        return Err(Error::internal(format!(
                            "{} has no target individual to assert {} on",
                            bindings.rule, bindings.output
                        )));
                    };
                    Triple::new(target.clone(), bindings.output.clone(), value)
                }
            };
            if !derived.contains(&triple) {
                derived.push(triple);
            }
        }
        Ok(derived)
    }
}
