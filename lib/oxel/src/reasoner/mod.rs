//! EL saturation engine.
//!
//! Subsumers of a named class are computed by building a completion graph
//! rooted at an element labelled with the class and applying the EL completion
//! rules until no label or edge changes anymore. Each query owns its graph, the
//! ontology is only read.

mod graph;
mod rules;

pub use graph::ElementId;
pub use rules::ElRule;

use crate::concept::{Concept, ConceptName, Role};
use crate::error::{OwlError, ReasoningError};
use crate::ontology::Ontology;
use graph::CompletionGraph;
use rayon::prelude::*;
use rules::Conclusion;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Which elements of the completion graph subsumers are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionScope {
    /// Only the label of the root element.
    #[default]
    Root,
    /// The union of the labels of every element, successors included.
    ///
    /// This also reports the fillers of the existential restrictions the
    /// class implies, which are not subsumers of the class itself.
    AllElements,
}

/// Filters applied when reading subsumers out of a saturated graph.
///
/// The queried class is always reported, whatever the filters say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubsumerPolicy {
    pub scope: ExtractionScope,
    /// Report ⊤ as `owl:Thing`.
    pub include_top: bool,
    /// Names never reported.
    pub excluded: Vec<ConceptName>,
}

/// Configuration for the reasoner.
#[derive(Debug, Clone, Default)]
pub struct ReasonerConfig {
    /// Maximum number of processed worklist entries per query (None = unlimited).
    pub max_iterations: Option<usize>,
    /// Maximum time allowed for a query (None = unlimited).
    pub timeout: Option<Duration>,
    /// How subsumers are extracted from the completion graph.
    pub policy: SubsumerPolicy,
}

/// Counters collected during a saturation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaturationStats {
    iterations: usize,
    firings: [usize; 5],
}

impl SaturationStats {
    /// Number of elements taken from the worklist.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of facts (labels or edges) a rule added to the graph.
    pub fn firings(&self, rule: ElRule) -> usize {
        self.firings[rule.index()]
    }

    /// Number of facts added by all rules.
    pub fn total_firings(&self) -> usize {
        self.firings.iter().sum()
    }
}

/// The completion graph of a finished query.
#[derive(Debug)]
pub struct Saturation {
    target: ConceptName,
    graph: CompletionGraph,
    stats: SaturationStats,
}

impl Saturation {
    /// The queried class.
    pub fn target(&self) -> &ConceptName {
        &self.target
    }

    /// The root element, labelled with the queried class.
    pub fn root(&self) -> ElementId {
        ElementId::ROOT
    }

    pub fn element_count(&self) -> usize {
        self.graph.len()
    }

    /// Returns all elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + use<> {
        self.graph.ids()
    }

    /// Returns the label of an element.
    ///
    /// # Panics
    ///
    /// If the element does not belong to this saturation.
    pub fn label(&self, element: ElementId) -> impl Iterator<Item = &Concept> {
        self.graph.label(element).iter()
    }

    /// Checks if a concept belongs to the label of an element.
    pub fn has_label(&self, element: ElementId, concept: &Concept) -> bool {
        self.graph.label(element).contains(concept)
    }

    /// Returns the display name of an element (`d0`, `d0_hasIngredient`...).
    pub fn element_name(&self, element: ElementId) -> &str {
        self.graph.name(element)
    }

    /// Returns the `role`-successors of an element.
    pub fn successors(&self, element: ElementId, role: &Role) -> impl Iterator<Item = ElementId> {
        self.graph.successors(element, role)
    }

    /// Reads the subsumers out of the graph.
    ///
    /// The result is deduplicated and sorted by IRI.
    pub fn subsumers(&self, policy: &SubsumerPolicy) -> Vec<ConceptName> {
        let elements = match policy.scope {
            ExtractionScope::Root => vec![ElementId::ROOT],
            ExtractionScope::AllElements => self.graph.ids().collect(),
        };
        let mut subsumers = BTreeSet::new();
        for element in elements {
            for concept in self.graph.label(element) {
                match concept {
                    Concept::Name(name) => {
                        subsumers.insert(name.clone());
                    }
                    Concept::Top if policy.include_top => {
                        subsumers.insert(ConceptName::thing());
                    }
                    _ => {}
                }
            }
        }
        subsumers.retain(|name| !policy.excluded.contains(name));
        subsumers.insert(self.target.clone());
        subsumers.into_iter().collect()
    }

    pub fn stats(&self) -> &SaturationStats {
        &self.stats
    }
}

/// Subsumers of every class of an ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    subsumers: BTreeMap<ConceptName, Vec<ConceptName>>,
}

impl Classification {
    /// Returns the subsumers of a class, `None` if the class is not part of the ontology.
    pub fn subsumers(&self, class: &ConceptName) -> Option<&[ConceptName]> {
        self.subsumers.get(class).map(Vec::as_slice)
    }

    /// Checks if `sub` is subsumed by `sup`.
    pub fn is_subsumed_by(&self, sub: &ConceptName, sup: &ConceptName) -> bool {
        self.subsumers(sub)
            .is_some_and(|subsumers| subsumers.binary_search(sup).is_ok())
    }

    /// Iterates over the classes, in IRI order, with their subsumers.
    pub fn iter(&self) -> impl Iterator<Item = (&ConceptName, &[ConceptName])> {
        self.subsumers
            .iter()
            .map(|(class, subsumers)| (class, subsumers.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.subsumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsumers.is_empty()
    }
}

/// EL consequence-based reasoner.
///
/// ```
/// use oxel::{Axiom, ConceptName, ElReasoner, Ontology};
///
/// let dog = ConceptName::new_from_iri("http://example.org/Dog")?;
/// let animal = ConceptName::new_from_iri("http://example.org/Animal")?;
/// let mut ontology = Ontology::default();
/// ontology.add_axiom(Axiom::subclass_of(dog.clone(), animal.clone()));
///
/// let reasoner = ElReasoner::new(&ontology);
/// assert_eq!(reasoner.compute_subsumers("Dog")?, [animal, dog]);
/// assert!(reasoner.compute_subsumers("Cat")?.is_empty());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct ElReasoner<'a> {
    ontology: &'a Ontology,
    config: ReasonerConfig,
}

impl<'a> ElReasoner<'a> {
    /// Creates a new reasoner for the given ontology.
    pub fn new(ontology: &'a Ontology) -> Self {
        Self::with_config(ontology, ReasonerConfig::default())
    }

    /// Creates a new reasoner with custom configuration.
    pub fn with_config(ontology: &'a Ontology, config: ReasonerConfig) -> Self {
        Self { ontology, config }
    }

    pub fn ontology(&self) -> &'a Ontology {
        self.ontology
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Returns the subsumers of the class with the given IRI or local name.
    ///
    /// An unknown class is not an error: the result is then empty.
    pub fn compute_subsumers(&self, name: &str) -> Result<Vec<ConceptName>, ReasoningError> {
        let Some(target) = self.ontology.resolve(name) else {
            debug!(class = name, "Class not found in the ontology");
            return Ok(Vec::new());
        };
        Ok(self.saturate(target)?.subsumers(&self.config.policy))
    }

    /// Same as [`compute_subsumers`](Self::compute_subsumers) but fails on unknown classes.
    pub fn try_compute_subsumers(&self, name: &str) -> Result<Vec<ConceptName>, OwlError> {
        let target = self
            .ontology
            .resolve(name)
            .ok_or_else(|| OwlError::ConceptNotFound(name.to_owned()))?;
        Ok(self.saturate(target)?.subsumers(&self.config.policy))
    }

    /// Computes the subsumers of every class of the ontology.
    ///
    /// Classes are saturated in parallel, each one in its own completion graph.
    pub fn classify(&self) -> Result<Classification, ReasoningError> {
        let classes = self.ontology.classes().collect::<Vec<_>>();
        debug!(classes = classes.len(), "Classifying ontology");
        let subsumers = classes
            .into_par_iter()
            .map(|class| {
                let subsumers = self.saturate(class)?.subsumers(&self.config.policy);
                Ok((class.clone(), subsumers))
            })
            .collect::<Result<BTreeMap<_, _>, ReasoningError>>()?;
        Ok(Classification { subsumers })
    }

    /// Saturates the completion graph rooted at `target`.
    pub fn saturate(&self, target: &ConceptName) -> Result<Saturation, ReasoningError> {
        let start = Instant::now();
        let seed = Concept::Name(target.clone());
        let mut graph = CompletionGraph::new(seed.clone());
        graph.add_to_label(ElementId::ROOT, seed);
        for equivalent in self.ontology.equivalents(target) {
            if !equivalent.is_named() {
                graph.add_to_label(ElementId::ROOT, equivalent.clone());
            }
        }

        let mut worklist = Worklist::default();
        worklist.push(ElementId::ROOT);
        let mut stats = SaturationStats::default();
        let mut conclusions = Vec::new();
        while let Some(element) = worklist.pop() {
            stats.iterations += 1;
            if let Some(max_iterations) = self.config.max_iterations {
                if stats.iterations > max_iterations {
                    warn!(class = %target, max_iterations, "Saturation stopped");
                    return Err(ReasoningError::MaxIterationsExceeded(max_iterations));
                }
            }
            if let Some(timeout) = self.config.timeout {
                if start.elapsed() >= timeout {
                    warn!(class = %target, ?timeout, "Saturation stopped");
                    return Err(ReasoningError::Timeout(timeout));
                }
            }
            for &rule in ElRule::all() {
                rule.apply(self.ontology, &graph, element, &mut conclusions);
                for conclusion in conclusions.drain(..) {
                    if apply_conclusion(&mut graph, &mut worklist, rule, conclusion) {
                        stats.firings[rule.index()] += 1;
                    }
                }
            }
        }

        debug!(
            class = %target,
            elements = graph.len(),
            iterations = stats.iterations,
            elapsed = ?start.elapsed(),
            "Saturation complete"
        );
        Ok(Saturation {
            target: target.clone(),
            graph,
            stats,
        })
    }
}

/// Returns the subsumers of the class with the given IRI or local name.
///
/// Uses the default configuration: subsumers are read from the root label,
/// ⊤ is not reported and the class itself always is. The result is sorted
/// by IRI and empty if the ontology has no such class.
///
/// ```
/// use oxel::{Axiom, Concept, ConceptName, Ontology, Role, compute_subsumers};
///
/// let iri = |name: &str| format!("http://example.org/pizza#{name}");
/// let margherita = ConceptName::new_from_iri(iri("Margherita"))?;
/// let pizza = ConceptName::new_from_iri(iri("Pizza"))?;
/// let food = ConceptName::new_from_iri(iri("Food"))?;
/// let cheese = ConceptName::new_from_iri(iri("Cheese"))?;
/// let has_ingredient = Role::new_from_iri(iri("hasIngredient"))?;
///
/// let mut ontology = Ontology::default();
/// ontology.add_axiom(Axiom::equivalent_classes(vec![
///     margherita.clone().into(),
///     Concept::conjunction(
///         pizza.clone().into(),
///         Concept::exists(has_ingredient, cheese.into()),
///     ),
/// ]));
/// ontology.add_axiom(Axiom::subclass_of(pizza.clone(), food.clone()));
///
/// assert_eq!(
///     compute_subsumers(&ontology, "Margherita"),
///     [food, margherita, pizza]
/// );
/// assert!(compute_subsumers(&ontology, "Calzone").is_empty());
/// # Result::<_, oxiri::IriParseError>::Ok(())
/// ```
pub fn compute_subsumers(ontology: &Ontology, name: &str) -> Vec<ConceptName> {
    ElReasoner::new(ontology)
        .compute_subsumers(name)
        .unwrap_or_else(|e| {
            warn!(class = name, error = %e, "Subsumer computation failed");
            Vec::new()
        })
}

/// FIFO of elements with at most one pending entry per element.
#[derive(Debug, Default)]
struct Worklist {
    queue: VecDeque<ElementId>,
    queued: Vec<bool>,
}

impl Worklist {
    fn push(&mut self, element: ElementId) {
        let index = element.index();
        if index >= self.queued.len() {
            self.queued.resize(index + 1, false);
        }
        if !self.queued[index] {
            self.queued[index] = true;
            self.queue.push_back(element);
        }
    }

    fn pop(&mut self) -> Option<ElementId> {
        let element = self.queue.pop_front()?;
        self.queued[element.index()] = false;
        Some(element)
    }
}

/// Adds a conclusion to the graph and schedules the elements it affects.
///
/// Returns whether the graph changed.
fn apply_conclusion(
    graph: &mut CompletionGraph,
    worklist: &mut Worklist,
    rule: ElRule,
    conclusion: Conclusion,
) -> bool {
    match conclusion {
        Conclusion::Label(element, concept) => {
            if graph.label(element).contains(&concept) {
                return false;
            }
            trace!(rule = rule.name(), element = graph.name(element), concept = %concept, "Derived");
            graph.add_to_label(element, concept);
            worklist.push(element);
            // predecessors may now back-propagate the new concept
            for predecessor in graph.predecessors(element) {
                worklist.push(predecessor);
            }
            true
        }
        Conclusion::Successor { from, role, filler } => {
            let (successor, created) = graph.element_for(from, &role, &filler);
            if created {
                worklist.push(successor);
            }
            if !graph.add_edge(from, &role, successor) {
                return created;
            }
            trace!(
                rule = rule.name(),
                element = graph.name(from),
                role = %role,
                successor = graph.name(successor),
                "Linked"
            );
            worklist.push(from);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axiom::Axiom;
    use rustc_hash::FxHashSet;

    fn name(local: &str) -> Concept {
        Concept::name(ConceptName::new_from_iri(format!("http://example.org/{local}")).unwrap())
    }

    fn role(local: &str) -> Role {
        Role::new_from_iri(format!("http://example.org/{local}")).unwrap()
    }

    fn labels(graph: &CompletionGraph) -> Vec<FxHashSet<Concept>> {
        graph.ids().map(|id| graph.label(id).clone()).collect()
    }

    #[test]
    fn labels_only_grow_during_saturation() {
        let r = role("r");
        let mut ontology = Ontology::default();
        ontology.add_axiom(Axiom::subclass_of(
            name("X"),
            Concept::conjunction(
                Concept::exists(r.clone(), name("A")),
                Concept::exists(r.clone(), name("B")),
            ),
        ));
        ontology.add_axiom(Axiom::subclass_of(name("A"), name("C")));
        ontology.add_axiom(Axiom::subclass_of(
            Concept::exists(r.clone(), name("C")),
            name("Y"),
        ));
        ontology.add_axiom(Axiom::subclass_of(
            Concept::conjunction(name("X"), name("Y")),
            name("Z"),
        ));

        let mut graph = CompletionGraph::new(name("X"));
        graph.add_to_label(ElementId::ROOT, name("X"));
        let mut worklist = Worklist::default();
        worklist.push(ElementId::ROOT);
        let mut conclusions = Vec::new();
        let mut previous = labels(&graph);
        while let Some(element) = worklist.pop() {
            for &rule in ElRule::all() {
                rule.apply(&ontology, &graph, element, &mut conclusions);
                for conclusion in conclusions.drain(..) {
                    apply_conclusion(&mut graph, &mut worklist, rule, conclusion);
                }
                let current = labels(&graph);
                assert!(current.len() >= previous.len());
                for (before, after) in previous.iter().zip(&current) {
                    assert!(before.is_subset(after), "{} shrank", rule.name());
                }
                previous = current;
            }
        }

        let root = graph.label(ElementId::ROOT);
        assert!(root.contains(&name("Y")));
        assert!(root.contains(&name("Z")));
        assert_eq!(graph.len(), 3);
    }
}
