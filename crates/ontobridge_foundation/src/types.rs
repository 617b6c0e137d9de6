//! Datatypes and the type lattice used to validate function arguments.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::term::Iri;
use crate::vocab;

// =============================================================================
// Datatype
// =============================================================================

/// A literal datatype known to the type lattice.
///
/// Unknown datatypes are carried as [`ValueType::CustomDatatype`] and only
/// match themselves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Datatype {
    /// `xsd:string`
    String,
    /// `rdf:langString`
    LangString,
    /// `xsd:boolean`
    Boolean,
    /// `xsd:double`
    Double,
    /// `xsd:float`
    Float,
    /// `xsd:decimal`
    Decimal,
    /// `xsd:integer`
    Integer,
    /// `xsd:long`
    Long,
    /// `xsd:int`
    Int,
    /// `xsd:short`
    Short,
    /// `xsd:byte`
    Byte,
    /// `xsd:nonPositiveInteger`
    NonPositiveInteger,
    /// `xsd:negativeInteger`
    NegativeInteger,
    /// `xsd:nonNegativeInteger`
    NonNegativeInteger,
    /// `xsd:positiveInteger`
    PositiveInteger,
    /// `xsd:unsignedLong`
    UnsignedLong,
    /// `xsd:unsignedInt`
    UnsignedInt,
    /// `xsd:unsignedShort`
    UnsignedShort,
    /// `xsd:unsignedByte`
    UnsignedByte,
    /// `xsd:dateTime`
    DateTime,
    /// `xsd:date`
    Date,
    /// `xsd:anyURI`
    AnyUri,
}

impl Datatype {
    /// Every known datatype.
    pub const ALL: &'static [Datatype] = &[
        Self::String,
        Self::LangString,
        Self::Boolean,
        Self::Double,
        Self::Float,
        Self::Decimal,
        Self::Integer,
        Self::Long,
        Self::Int,
        Self::Short,
        Self::Byte,
        Self::NonPositiveInteger,
        Self::NegativeInteger,
        Self::NonNegativeInteger,
        Self::PositiveInteger,
        Self::UnsignedLong,
        Self::UnsignedInt,
        Self::UnsignedShort,
        Self::UnsignedByte,
        Self::DateTime,
        Self::Date,
        Self::AnyUri,
    ];

    /// The numeric datatypes, widest first.
    pub const NUMERIC: &'static [Datatype] = &[
        Self::Double,
        Self::Float,
        Self::Decimal,
        Self::Integer,
        Self::Long,
        Self::Int,
        Self::Short,
        Self::Byte,
        Self::NonPositiveInteger,
        Self::NegativeInteger,
        Self::NonNegativeInteger,
        Self::PositiveInteger,
        Self::UnsignedLong,
        Self::UnsignedInt,
        Self::UnsignedShort,
        Self::UnsignedByte,
    ];

    /// Returns the local name within the XSD (or RDF) namespace.
    #[must_use]
    pub const fn local_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::LangString => "langString",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::NonPositiveInteger => "nonPositiveInteger",
            Self::NegativeInteger => "negativeInteger",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::AnyUri => "anyURI",
        }
    }

    /// Returns the full identifier of this datatype.
    #[must_use]
    pub fn iri(self) -> Iri {
        match self {
            Self::LangString => Iri::new(vocab::RDF_LANG_STRING),
            other => Iri::new(format!("{}{}", vocab::XSD, other.local_name())),
        }
    }

    /// Looks up a known datatype by identifier.
    #[must_use]
    pub fn from_iri(iri: &str) -> Option<Self> {
        if iri == vocab::RDF_LANG_STRING {
            return Some(Self::LangString);
        }
        let local = iri.strip_prefix(vocab::XSD)?;
        Self::ALL
            .iter()
            .copied()
            .find(|dt| *dt != Self::LangString && dt.local_name() == local)
    }

    /// Returns true for the numeric datatypes.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }

    /// Returns true for the integer family (everything below `xsd:integer`).
    #[must_use]
    pub fn is_integer(self) -> bool {
        Datatype::Integer.accepts(self)
    }

    /// The datatypes one widening step below this one.
    #[must_use]
    pub const fn narrower(self) -> &'static [Datatype] {
        match self {
            Self::Double => &[Self::Float],
            Self::Float => &[Self::Decimal],
            Self::Decimal => &[Self::Integer],
            Self::Integer => &[
                Self::Long,
                Self::NonPositiveInteger,
                Self::NonNegativeInteger,
            ],
            Self::Long => &[Self::Int],
            Self::Int => &[Self::Short],
            Self::Short => &[Self::Byte],
            Self::NonPositiveInteger => &[Self::NegativeInteger],
            Self::NonNegativeInteger => &[Self::UnsignedLong, Self::PositiveInteger],
            Self::UnsignedLong => &[Self::UnsignedInt],
            Self::UnsignedInt => &[Self::UnsignedShort],
            Self::UnsignedShort => &[Self::UnsignedByte],
            _ => &[],
        }
    }

    /// Returns true if a value of `actual` may be used where `self` is expected.
    ///
    /// Descends the promotion lattice from `self` toward `actual`; the
    /// reverse direction (narrowing) is never accepted.
    #[must_use]
    pub fn accepts(self, actual: Datatype) -> bool {
        self == actual || self.narrower().iter().any(|n| n.accepts(actual))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LangString => write!(f, "rdf:langString"),
            other => write!(f, "xsd:{}", other.local_name()),
        }
    }
}

// =============================================================================
// Value Type
// =============================================================================

/// Declared or observed type of a function argument, return value, or term.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// Universal wildcard, compatible with everything.
    Any,
    /// Any literal (`rdfs:Literal`).
    Literal,
    /// Plain string literal (`rdf:PlainLiteral`).
    PlainLiteral,
    /// A datatype from the promotion lattice.
    Datatype(Datatype),
    /// A datatype unknown to the lattice; only matches itself.
    CustomDatatype(Iri),
    /// Any kind of property (`rdf:Property`).
    Property,
    /// `owl:ObjectProperty`
    ObjectProperty,
    /// `owl:DatatypeProperty`
    DatatypeProperty,
    /// `owl:AnnotationProperty`
    AnnotationProperty,
    /// A grouping (`owl:Class` / `rdfs:Class`).
    Class,
    /// A datatype used as a value (`rdfs:Datatype`).
    DatatypeClass,
    /// An individual (`rdfs:Resource`).
    Resource,
}

impl ValueType {
    /// Maps a declared type identifier onto the lattice.
    ///
    /// Unknown identifiers outside the XSD namespace denote groupings whose
    /// members are individuals, so they map to [`ValueType::Resource`].
    #[must_use]
    pub fn from_iri(iri: &str) -> Self {
        if let Some(dt) = Datatype::from_iri(iri) {
            return Self::Datatype(dt);
        }
        match iri {
            vocab::RDFS_LITERAL => Self::Literal,
            vocab::RDF_PLAIN_LITERAL => Self::PlainLiteral,
            vocab::RDF_PROPERTY => Self::Property,
            vocab::OWL_OBJECT_PROPERTY => Self::ObjectProperty,
            vocab::OWL_DATATYPE_PROPERTY => Self::DatatypeProperty,
            vocab::OWL_ANNOTATION_PROPERTY => Self::AnnotationProperty,
            vocab::OWL_CLASS | vocab::RDFS_CLASS => Self::Class,
            vocab::RDFS_DATATYPE => Self::DatatypeClass,
            _ if iri.starts_with(vocab::XSD) => Self::CustomDatatype(Iri::new(iri)),
            _ => Self::Resource,
        }
    }

    /// Convenience constructor for a lattice datatype.
    #[must_use]
    pub const fn datatype(dt: Datatype) -> Self {
        Self::Datatype(dt)
    }

    /// Returns true if this type is the universal wildcard.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true for literal categories.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Literal | Self::PlainLiteral | Self::Datatype(_) | Self::CustomDatatype(_)
        )
    }

    /// Returns true for the property categories.
    #[must_use]
    pub const fn is_property(&self) -> bool {
        matches!(
            self,
            Self::Property
                | Self::ObjectProperty
                | Self::DatatypeProperty
                | Self::AnnotationProperty
        )
    }

    /// Returns true if this is exactly `xsd:boolean`.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Datatype(Datatype::Boolean))
    }

    /// Checks whether a value of type `actual` is accepted where `self` is expected.
    ///
    /// Rules, checked in order:
    /// - `Any` on either side is compatible
    /// - `Literal` accepts any literal category
    /// - datatypes follow the one-directional numeric promotion lattice
    /// - `PlainLiteral` accepts only plain strings
    /// - `Property` accepts every property kind
    /// - remaining categories must match structurally
    #[must_use]
    pub fn accepts(&self, actual: &ValueType) -> bool {
        if self.is_any() || actual.is_any() {
            return true;
        }

        match (self, actual) {
            (Self::Literal, a) => a.is_literal(),
            (Self::Datatype(e), Self::Datatype(a)) => e.accepts(*a),
            (Self::PlainLiteral, a) => matches!(
                a,
                Self::PlainLiteral
                    | Self::Datatype(Datatype::String | Datatype::LangString)
            ),
            (Self::Property, a) => a.is_property(),
            (Self::CustomDatatype(e), Self::CustomDatatype(a)) => e == a,
            (Self::Resource, a) => !a.is_literal(),
            (Self::Class, Self::Class)
            | (Self::DatatypeClass, Self::DatatypeClass)
            | (Self::ObjectProperty, Self::ObjectProperty)
            | (Self::DatatypeProperty, Self::DatatypeProperty)
            | (Self::AnnotationProperty, Self::AnnotationProperty) => true,
            _ => false,
        }
    }
}

/// Free-function form of [`ValueType::accepts`].
#[must_use]
pub fn is_compatible(expected: &ValueType, actual: &ValueType) -> bool {
    expected.accepts(actual)
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Literal => write!(f, "rdfs:Literal"),
            Self::PlainLiteral => write!(f, "rdf:PlainLiteral"),
            Self::Datatype(dt) => write!(f, "{dt}"),
            Self::CustomDatatype(iri) => write!(f, "<{iri}>"),
            Self::Property => write!(f, "rdf:Property"),
            Self::ObjectProperty => write!(f, "owl:ObjectProperty"),
            Self::DatatypeProperty => write!(f, "owl:DatatypeProperty"),
            Self::AnnotationProperty => write!(f, "owl:AnnotationProperty"),
            Self::Class => write!(f, "owl:Class"),
            Self::DatatypeClass => write!(f, "rdfs:Datatype"),
            Self::Resource => write!(f, "rdfs:Resource"),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
