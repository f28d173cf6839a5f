//! EL ontology parser from RDF graphs.
//!
//! Only the OWL 2 vocabulary of the EL fragment is understood: named classes,
//! `owl:Thing`, intersections and existential restrictions, related by
//! `rdfs:subClassOf` and `owl:equivalentClass`.

use crate::axiom::Axiom;
use crate::concept::{Concept, ConceptName, OWL_THING, Role};
use crate::error::{OwlError, OwlParseError, ParseErrorKind};
use crate::ontology::Ontology;
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{BlankNode, BlankNodeRef, Graph, NamedNodeRef, TermRef};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser};
use rustc_hash::FxHashSet;
use std::io::Read;
use tracing::{debug, warn};

mod vocab {
    use oxrdf::NamedNodeRef;

    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const NOTHING: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");
    pub const ONTOLOGY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
    pub const OBJECT_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const RESTRICTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Restriction");
    pub const EQUIVALENT_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentClass");

    pub const ON_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#onProperty");
    pub const SOME_VALUES_FROM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#someValuesFrom");
    pub const ALL_VALUES_FROM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#allValuesFrom");
    pub const HAS_VALUE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#hasValue");
    pub const HAS_SELF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#hasSelf");
    pub const MIN_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#minCardinality");
    pub const MAX_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#maxCardinality");
    pub const CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#cardinality");
    pub const MIN_QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#minQualifiedCardinality");
    pub const MAX_QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#maxQualifiedCardinality");
    pub const QUALIFIED_CARDINALITY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#qualifiedCardinality");

    pub const INTERSECTION_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#intersectionOf");
    pub const UNION_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#unionOf");
    pub const COMPLEMENT_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#complementOf");
    pub const ONE_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#oneOf");
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum depth for parsing nested expressions.
    pub max_depth: usize,
    /// Maximum length for RDF lists.
    pub max_list_length: usize,
    /// Skip axioms using constructs outside of EL instead of failing.
    pub lenient: bool,
}

impl ParserConfig {
    /// Creates a new parser configuration with default values.
    pub fn new() -> Self {
        Self {
            max_depth: 100,
            max_list_length: 10000,
            lenient: false,
        }
    }

    /// Sets lenient mode.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses an EL ontology from an RDF graph.
pub struct OntologyParser<'a> {
    graph: &'a Graph,
    config: ParserConfig,
    /// Blank nodes of the expression being parsed, to detect cycles
    in_progress: FxHashSet<BlankNode>,
    skipped: usize,
}

impl<'a> OntologyParser<'a> {
    /// Creates a new parser for the given graph.
    pub fn new(graph: &'a Graph) -> Self {
        Self::with_config(graph, ParserConfig::new())
    }

    /// Creates a new parser with custom configuration.
    pub fn with_config(graph: &'a Graph, config: ParserConfig) -> Self {
        Self {
            graph,
            config,
            in_progress: FxHashSet::default(),
            skipped: 0,
        }
    }

    /// Parses the ontology from the graph.
    pub fn parse(&mut self) -> Result<Ontology, OwlParseError> {
        let mut ontology = Ontology::new(None);

        if let Some(iri) = self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::ONTOLOGY)
            .find_map(|subject| named_node(subject.into()))
        {
            ontology.set_iri(Some(iri.into_owned()));
        }

        self.parse_declarations(&mut ontology);
        self.parse_axioms(&mut ontology)?;

        debug!(
            axioms = ontology.axiom_count(),
            classes = ontology.classes().count(),
            skipped = self.skipped,
            "Parsed ontology"
        );
        Ok(ontology)
    }

    /// Parses class and object property declarations.
    fn parse_declarations(&self, ontology: &mut Ontology) {
        for class in self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::CLASS)
            .filter_map(|subject| named_node(subject.into()))
        {
            if class != OWL_THING {
                ontology.add_axiom(Axiom::DeclareClass(ConceptName::new(class.into_owned())));
            }
        }
        for property in self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, vocab::OBJECT_PROPERTY)
            .filter_map(|subject| named_node(subject.into()))
        {
            ontology.add_axiom(Axiom::DeclareObjectProperty(Role::new(
                property.into_owned(),
            )));
        }
    }

    /// Parses the `rdfs:subClassOf` and `owl:equivalentClass` axioms.
    fn parse_axioms(&mut self, ontology: &mut Ontology) -> Result<(), OwlParseError> {
        let graph = self.graph;
        for triple in graph.triples_for_predicate(rdfs::SUB_CLASS_OF) {
            let axiom = self
                .parse_class_expression(triple.subject.into())
                .and_then(|sub_class| {
                    Ok(Axiom::SubClassOf {
                        sub_class,
                        super_class: self.parse_class_expression(triple.object)?,
                    })
                });
            self.add_or_skip(ontology, axiom)?;
        }

        for triple in graph.triples_for_predicate(vocab::EQUIVALENT_CLASS) {
            let axiom = self
                .parse_class_expression(triple.subject.into())
                .and_then(|left| {
                    let right = self.parse_class_expression(triple.object)?;
                    Ok(Axiom::EquivalentClasses(vec![left, right]))
                });
            self.add_or_skip(ontology, axiom)?;
        }
        Ok(())
    }

    fn add_or_skip(
        &mut self,
        ontology: &mut Ontology,
        axiom: Result<Axiom, OwlParseError>,
    ) -> Result<(), OwlParseError> {
        match axiom {
            Ok(axiom) => ontology.add_axiom(axiom),
            Err(e)
                if self.config.lenient
                    && matches!(
                        e.kind(),
                        ParseErrorKind::UnsupportedConstruct | ParseErrorKind::UnknownConstruct
                    ) =>
            {
                warn!(error = %e, "Skipping axiom outside of the EL fragment");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Parses a class expression.
    fn parse_class_expression(&mut self, term: TermRef<'_>) -> Result<Concept, OwlParseError> {
        if self.in_progress.len() >= self.config.max_depth {
            return Err(OwlParseError::circular_reference(format!(
                "Class expression nesting exceeds {} levels",
                self.config.max_depth
            )));
        }
        match term {
            TermRef::NamedNode(n) if n == OWL_THING => Ok(Concept::Top),
            TermRef::NamedNode(n) if n == vocab::NOTHING => {
                Err(OwlParseError::unsupported_construct("owl:Nothing"))
            }
            TermRef::NamedNode(n) => Ok(Concept::Name(ConceptName::new(n.into_owned()))),
            TermRef::BlankNode(b) => {
                if !self.in_progress.insert(b.into_owned()) {
                    return Err(OwlParseError::circular_reference(format!(
                        "Class expression {b} contains itself"
                    )));
                }
                let result = self.parse_anonymous_class(b);
                self.in_progress.remove(&b.into_owned());
                result
            }
            _ => Err(OwlParseError::invalid_value(format!(
                "{term} cannot be a class expression"
            ))),
        }
    }

    /// Parses an anonymous class expression (restriction or intersection).
    fn parse_anonymous_class(&mut self, bnode: BlankNodeRef<'_>) -> Result<Concept, OwlParseError> {
        let graph = self.graph;
        if graph.triples_for_subject(bnode).any(|triple| {
            triple.predicate == rdf::TYPE
                && matches!(triple.object, TermRef::NamedNode(o) if o == vocab::RESTRICTION)
        }) {
            return self.parse_restriction(bnode);
        }

        for triple in graph.triples_for_subject(bnode) {
            if triple.predicate == vocab::INTERSECTION_OF {
                let operands = self.parse_class_list(triple.object)?;
                return Ok(Concept::intersection(operands));
            } else if triple.predicate == vocab::UNION_OF {
                return Err(OwlParseError::unsupported_construct("owl:unionOf"));
            } else if triple.predicate == vocab::COMPLEMENT_OF {
                return Err(OwlParseError::unsupported_construct("owl:complementOf"));
            } else if triple.predicate == vocab::ONE_OF {
                return Err(OwlParseError::unsupported_construct("owl:oneOf"));
            }
        }

        Err(OwlParseError::new(
            ParseErrorKind::UnknownConstruct,
            format!("Cannot parse anonymous class: {bnode}"),
        ))
    }

    /// Parses an `owl:someValuesFrom` restriction.
    fn parse_restriction(&mut self, bnode: BlankNodeRef<'_>) -> Result<Concept, OwlParseError> {
        let graph = self.graph;
        let property = match graph.object_for_subject_predicate(bnode, vocab::ON_PROPERTY) {
            Some(TermRef::NamedNode(property)) => Role::new(property.into_owned()),
            Some(TermRef::BlankNode(_)) => {
                return Err(OwlParseError::unsupported_construct(
                    "Anonymous object property expression",
                ));
            }
            Some(_) => return Err(OwlParseError::invalid_value("owl:onProperty must be an IRI")),
            None => return Err(OwlParseError::missing_property("owl:onProperty")),
        };

        if let Some(filler) = graph.object_for_subject_predicate(bnode, vocab::SOME_VALUES_FROM) {
            return Ok(Concept::exists(property, self.parse_class_expression(filler)?));
        }

        for (predicate, construct) in [
            (vocab::ALL_VALUES_FROM, "owl:allValuesFrom"),
            (vocab::HAS_VALUE, "owl:hasValue"),
            (vocab::HAS_SELF, "owl:hasSelf"),
            (vocab::MIN_CARDINALITY, "owl:minCardinality"),
            (vocab::MAX_CARDINALITY, "owl:maxCardinality"),
            (vocab::CARDINALITY, "owl:cardinality"),
            (vocab::MIN_QUALIFIED_CARDINALITY, "owl:minQualifiedCardinality"),
            (vocab::MAX_QUALIFIED_CARDINALITY, "owl:maxQualifiedCardinality"),
            (vocab::QUALIFIED_CARDINALITY, "owl:qualifiedCardinality"),
        ] {
            if graph.object_for_subject_predicate(bnode, predicate).is_some() {
                return Err(OwlParseError::unsupported_construct(construct));
            }
        }

        Err(OwlParseError::new(
            ParseErrorKind::UnknownConstruct,
            format!("Unknown restriction type: {bnode}"),
        ))
    }

    /// Parses an RDF list of class expressions.
    fn parse_class_list(&mut self, head: TermRef<'_>) -> Result<Vec<Concept>, OwlParseError> {
        let graph = self.graph;
        let mut result = Vec::new();
        let mut current = head;
        while !matches!(current, TermRef::NamedNode(n) if n == rdf::NIL) {
            if result.len() >= self.config.max_list_length {
                return Err(OwlParseError::malformed_list("List too long"));
            }
            let (first, rest) = match current {
                TermRef::NamedNode(n) => (
                    graph.object_for_subject_predicate(n, rdf::FIRST),
                    graph.object_for_subject_predicate(n, rdf::REST),
                ),
                TermRef::BlankNode(b) => (
                    graph.object_for_subject_predicate(b, rdf::FIRST),
                    graph.object_for_subject_predicate(b, rdf::REST),
                ),
                _ => {
                    return Err(OwlParseError::malformed_list(format!(
                        "{current} is not a list node"
                    )));
                }
            };
            let first = first.ok_or_else(|| OwlParseError::malformed_list("Missing rdf:first"))?;
            result.push(self.parse_class_expression(first)?);
            current = rest.ok_or_else(|| OwlParseError::malformed_list("Missing rdf:rest"))?;
        }
        Ok(result)
    }
}

fn named_node(term: TermRef<'_>) -> Option<NamedNodeRef<'_>> {
    match term {
        TermRef::NamedNode(node) => Some(node),
        _ => None,
    }
}

/// Parses an ontology from an RDF graph.
pub fn parse_ontology(graph: &Graph) -> Result<Ontology, OwlParseError> {
    OntologyParser::new(graph).parse()
}

/// Parses an ontology with custom configuration.
pub fn parse_ontology_with_config(
    graph: &Graph,
    config: ParserConfig,
) -> Result<Ontology, OwlParseError> {
    OntologyParser::with_config(graph, config).parse()
}

/// Reads an ontology serialized in any RDF format supported by [`oxrdfio`].
///
/// Triples of all graphs of a dataset format are merged.
///
/// ```
/// use oxel::{ParserConfig, compute_subsumers, read_ontology};
/// use oxrdfio::RdfFormat;
///
/// let file = br#"
///     @prefix owl: <http://www.w3.org/2002/07/owl#> .
///     @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
///     @prefix : <http://example.org/> .
///     :Dog a owl:Class ; rdfs:subClassOf :Animal .
/// "#;
/// let ontology = read_ontology(file.as_slice(), RdfFormat::Turtle, None, ParserConfig::new())?;
/// let subsumers = compute_subsumers(&ontology, "Dog");
/// assert_eq!(subsumers.len(), 2);
/// # Result::<_, oxel::OwlError>::Ok(())
/// ```
pub fn read_ontology(
    reader: impl Read,
    format: RdfFormat,
    base_iri: Option<&str>,
    config: ParserConfig,
) -> Result<Ontology, OwlError> {
    let mut parser = RdfParser::from_format(format);
    if let Some(base_iri) = base_iri {
        parser = parser.with_base_iri(base_iri)?;
    }
    let mut graph = Graph::new();
    for quad in parser.for_reader(reader) {
        let quad = quad.map_err(|e| match e {
            RdfParseError::Io(e) => OwlError::Io(e),
            e => OwlError::Parse(e.into()),
        })?;
        graph.insert(quad.as_ref());
    }
    Ok(parse_ontology_with_config(&graph, config)?)
}
