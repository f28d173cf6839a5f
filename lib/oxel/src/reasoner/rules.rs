//! EL completion rules.

use super::graph::{CompletionGraph, ElementId};
use crate::concept::{Concept, Role};
use crate::ontology::Ontology;

/// EL completion rule identifier.
///
/// Identifiers are used to report per-rule statistics and in trace logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElRule {
    /// ⊤ belongs to every label
    Top,
    /// `C ⊓ D` in a label adds `C` and `D`, and `C` and `D` in a label add
    /// `C ⊓ D` when the ontology mentions it
    Conjunction,
    /// `C` in a label and `C ⊑ D` (or `C ≡ D`) in the ontology adds `D`
    Subsumption,
    /// `∃r.C` in a label creates or reuses an `r`-successor labelled with `C`
    Existential,
    /// An `r`-successor labelled with `C` adds `∃r.C` when the ontology mentions it
    BackPropagation,
}

impl ElRule {
    /// Returns all EL rules in application order.
    pub fn all() -> &'static [ElRule] {
        &[
            ElRule::Top,
            ElRule::Conjunction,
            ElRule::Subsumption,
            ElRule::Existential,
            ElRule::BackPropagation,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ElRule::Top => "top",
            ElRule::Conjunction => "conjunction",
            ElRule::Subsumption => "subsumption",
            ElRule::Existential => "existential",
            ElRule::BackPropagation => "back-propagation",
        }
    }

    pub(super) fn index(self) -> usize {
        match self {
            ElRule::Top => 0,
            ElRule::Conjunction => 1,
            ElRule::Subsumption => 2,
            ElRule::Existential => 3,
            ElRule::BackPropagation => 4,
        }
    }

    /// Collects what the rule derives for `element` from the current state of the graph.
    ///
    /// The graph is only read: the caller applies the conclusions once the rule ran.
    pub(super) fn apply(
        self,
        ontology: &Ontology,
        graph: &CompletionGraph,
        element: ElementId,
        conclusions: &mut Vec<Conclusion>,
    ) {
        match self {
            ElRule::Top => conclusions.push(Conclusion::Label(element, Concept::Top)),
            ElRule::Conjunction => {
                let label = graph.label(element);
                for concept in label {
                    if let Concept::Conjunction(left, right) = concept {
                        conclusions.push(Conclusion::Label(element, Concept::clone(left)));
                        conclusions.push(Conclusion::Label(element, Concept::clone(right)));
                    }
                    for conjunction in ontology.conjunctions_with(concept) {
                        if let Concept::Conjunction(left, right) = conjunction {
                            if label.contains(&**left) && label.contains(&**right) {
                                conclusions.push(Conclusion::Label(element, conjunction.clone()));
                            }
                        }
                    }
                }
            }
            ElRule::Subsumption => {
                for concept in graph.label(element) {
                    for subsumer in ontology.told_subsumers(concept) {
                        conclusions.push(Conclusion::Label(element, subsumer.clone()));
                    }
                }
            }
            ElRule::Existential => {
                for concept in graph.label(element) {
                    if let Concept::Exists { role, filler } = concept {
                        conclusions.push(Conclusion::Successor {
                            from: element,
                            role: role.clone(),
                            filler: Concept::clone(filler),
                        });
                    }
                }
            }
            ElRule::BackPropagation => {
                for (role, successors) in graph.edges(element) {
                    for &successor in successors {
                        for concept in graph.label(successor) {
                            if let Some(restriction) = ontology.existential(role, concept) {
                                conclusions.push(Conclusion::Label(element, restriction.clone()));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A fact derived by a rule, not yet applied to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Conclusion {
    /// The concept belongs to the label of the element
    Label(ElementId, Concept),
    /// The element has a `role`-successor labelled with `filler`
    Successor {
        from: ElementId,
        role: Role,
        filler: Concept,
    },
}
