//! Error types for ontology loading and reasoning.

use oxiri::IriParseError;
use oxrdfio::RdfParseError;
use std::io;
use std::time::Duration;

/// Errors that can occur while loading an ontology or answering a query.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OwlError {
    /// The queried class does not exist in the ontology.
    #[error("The class {0} does not exist in the ontology")]
    ConceptNotFound(String),
    /// Error building the ontology from RDF.
    #[error(transparent)]
    Parse(#[from] OwlParseError),
    /// Error during saturation.
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),
    /// I/O error while reading an ontology.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// IRI parsing error.
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
}

/// Errors that can occur while reading an ontology from RDF.
#[derive(Debug, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct OwlParseError {
    kind: ParseErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The RDF document itself is invalid.
    Rdf,
    /// Missing required property.
    MissingProperty,
    /// Invalid property value type.
    InvalidValue,
    /// Class constructor outside of the EL fragment.
    UnsupportedConstruct,
    /// Unknown OWL construct.
    UnknownConstruct,
    /// Malformed RDF list.
    MalformedList,
    /// Circular reference detected.
    CircularReference,
}

impl OwlParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a missing property error.
    pub fn missing_property(property: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingProperty,
            format!("Missing required property: {property}"),
        )
    }

    /// Creates an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidValue, message)
    }

    /// Creates an error for a construct the EL fragment does not support.
    pub fn unsupported_construct(construct: &str) -> Self {
        Self::new(
            ParseErrorKind::UnsupportedConstruct,
            format!("{construct} is not supported in the EL fragment"),
        )
    }

    /// Creates a malformed list error.
    pub fn malformed_list(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::MalformedList, message)
    }

    /// Creates a circular reference error.
    pub fn circular_reference(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::CircularReference, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl From<RdfParseError> for OwlParseError {
    fn from(error: RdfParseError) -> Self {
        Self::new(ParseErrorKind::Rdf, error.to_string())
    }
}

/// Errors that can occur during saturation.
///
/// Saturation always terminates, these errors only come from the optional
/// caps of [`ReasonerConfig`](crate::ReasonerConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ReasoningError {
    /// Reasoning exceeded the configured number of worklist iterations.
    #[error("Exceeded maximum iterations ({0})")]
    MaxIterationsExceeded(usize),
    /// Reasoning exceeded the configured wall-clock time.
    #[error("Reasoning timeout exceeded ({0:?})")]
    Timeout(Duration),
}
