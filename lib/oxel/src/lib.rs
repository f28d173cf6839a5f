#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

mod axiom;
mod concept;
mod error;
mod ontology;
mod parser;
mod reasoner;

pub use axiom::Axiom;
pub use concept::{Concept, ConceptName, Role};
pub use error::{OwlError, OwlParseError, ParseErrorKind, ReasoningError};
pub use ontology::Ontology;
pub use parser::{
    OntologyParser, ParserConfig, parse_ontology, parse_ontology_with_config, read_ontology,
};
pub use reasoner::{
    Classification, ElReasoner, ElRule, ElementId, ExtractionScope, ReasonerConfig, Saturation,
    SaturationStats, SubsumerPolicy, compute_subsumers,
};
