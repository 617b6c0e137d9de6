//! Graph terms: identifiers, blank nodes, literals, and triples.
//!
//! Terms are immutable and cheaply cloneable; string payloads are shared
//! behind `Arc<str>`.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::{Datatype, ValueType};
use crate::vocab;

// =============================================================================
// Iri
// =============================================================================

/// An absolute identifier for a grouping, attribute, function, or individual.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Iri(Arc<str>);

impl Iri {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part after the last `#`, `/`, or `:`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0
            .rfind(['#', '/', ':'])
            .map_or(&self.0, |idx| &self.0[idx + 1..])
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for Iri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Blank Node
// =============================================================================

/// An anonymous node, local to the graph it appears in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlankNode(Arc<str>);

impl BlankNode {
    /// Creates a blank node with the given label.
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self(label.into())
    }

    /// Returns the node label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

// =============================================================================
// Literal
// =============================================================================

/// A literal value with its lexical form, datatype, and optional language tag.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Iri,
    language: Option<Arc<str>>,
}

impl Literal {
    /// Creates a literal with an arbitrary datatype identifier.
    #[must_use]
    pub fn with_datatype(lexical: impl Into<Arc<str>>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    /// Creates a literal of a known datatype.
    #[must_use]
    pub fn typed(lexical: impl Into<Arc<str>>, datatype: Datatype) -> Self {
        Self::with_datatype(lexical, datatype.iri())
    }

    /// Creates an `xsd:string` literal.
    #[must_use]
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::typed(value, Datatype::String)
    }

    /// Creates a language-tagged string.
    #[must_use]
    pub fn lang_string(value: impl Into<Arc<str>>, language: impl Into<Arc<str>>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::LangString.iri(),
            language: Some(language.into()),
        }
    }

    /// Creates an `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), Datatype::Integer)
    }

    /// Creates an `xsd:decimal` literal.
    #[must_use]
    pub fn decimal(value: f64) -> Self {
        Self::typed(format_decimal(value), Datatype::Decimal)
    }

    /// Creates an `xsd:double` literal.
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::typed(format_decimal(value), Datatype::Double)
    }

    /// Creates an `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::typed(if value { "true" } else { "false" }, Datatype::Boolean)
    }

    /// Returns the lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// Returns the datatype identifier.
    #[must_use]
    pub fn datatype_iri(&self) -> &Iri {
        &self.datatype
    }

    /// Returns the datatype if it is known to the lattice.
    #[must_use]
    pub fn datatype(&self) -> Option<Datatype> {
        Datatype::from_iri(self.datatype.as_str())
    }

    /// Returns the language tag, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the lattice type of this literal.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self.datatype() {
            Some(dt) => ValueType::Datatype(dt),
            None => ValueType::CustomDatatype(self.datatype.clone()),
        }
    }

    /// Returns true if the datatype is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.datatype().is_some_and(Datatype::is_numeric)
    }

    /// Attempts to read the literal as a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match (self.datatype(), self.lexical()) {
            (Some(Datatype::Boolean), "true" | "1") => Some(true),
            (Some(Datatype::Boolean), "false" | "0") => Some(false),
            _ => None,
        }
    }

    /// Attempts to read the literal as an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        if self.datatype().is_some_and(Datatype::is_integer) {
            self.lexical.trim().parse().ok()
        } else {
            None
        }
    }

    /// Attempts to read the literal as a number (integers are widened).
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_numeric() {
            self.lexical.trim().parse().ok()
        } else {
            None
        }
    }
}

/// Formats a float so that it always carries a fractional part.
fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.lexical.escape_default())?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if self.datatype() == Some(Datatype::String) {
            Ok(())
        } else {
            write!(f, "^^{:?}", self.datatype)
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Term
// =============================================================================

/// A node of a graph: an identifier, a blank node, or a literal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// Named resource.
    Iri(Iri),
    /// Anonymous resource.
    Blank(BlankNode),
    /// Literal value.
    Literal(Literal),
}

impl Term {
    /// Creates an identifier term.
    #[must_use]
    pub fn iri(value: impl Into<Arc<str>>) -> Self {
        Self::Iri(Iri::new(value))
    }

    /// Creates a blank node term.
    #[must_use]
    pub fn blank(label: impl Into<Arc<str>>) -> Self {
        Self::Blank(BlankNode::new(label))
    }

    /// Returns the identifier if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the literal if this term is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Returns true for identifiers and blank nodes.
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Iri(_) | Self::Blank(_))
    }

    /// Returns true for literals.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Interprets the term as a boolean (only `xsd:boolean` literals qualify).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_literal().and_then(Literal::as_bool)
    }

    /// Returns a textual form usable in string functions.
    ///
    /// Identifiers yield their text, literals their lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        match self {
            Self::Iri(iri) => iri.as_str(),
            Self::Blank(node) => node.label(),
            Self::Literal(lit) => lit.lexical(),
        }
    }
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Self::Iri(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl From<BlankNode> for Term {
    fn from(value: BlankNode) -> Self {
        Self::Blank(value)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "{iri:?}"),
            Self::Blank(node) => write!(f, "{node:?}"),
            Self::Literal(lit) => write!(f, "{lit:?}"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Triple
// =============================================================================

/// A single fact: subject, predicate, object.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triple {
    /// Subject resource.
    pub subject: Term,
    /// Predicate identifier.
    pub predicate: Iri,
    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Creates a triple.
    #[must_use]
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Creates an `rdf:type` assertion.
    #[must_use]
    pub fn typed(subject: impl Into<Term>, grouping: Iri) -> Self {
        Self::new(subject, Iri::new(vocab::RDF_TYPE), grouping)
    }

    /// Returns true if this triple asserts a type.
    #[must_use]
    pub fn is_type_assertion(&self) -> bool {
        self.predicate.as_str() == vocab::RDF_TYPE
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} .", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
