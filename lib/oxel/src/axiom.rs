//! EL TBox axioms.

use crate::concept::{Concept, ConceptName, Role};

/// An axiom of an EL ontology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axiom {
    /// SubClassOf(sub, super) - sub is subsumed by super
    SubClassOf {
        sub_class: Concept,
        super_class: Concept,
    },

    /// EquivalentClasses(C1, C2, ...) - all expressions denote the same set
    EquivalentClasses(Vec<Concept>),

    /// Declaration(Class(C))
    DeclareClass(ConceptName),

    /// Declaration(ObjectProperty(P))
    DeclareObjectProperty(Role),
}

impl Axiom {
    /// Creates a SubClassOf axiom.
    pub fn subclass_of(sub: impl Into<Concept>, sup: impl Into<Concept>) -> Self {
        Self::SubClassOf {
            sub_class: sub.into(),
            super_class: sup.into(),
        }
    }

    /// Creates an EquivalentClasses axiom.
    pub fn equivalent_classes(classes: Vec<Concept>) -> Self {
        Self::EquivalentClasses(classes)
    }
}
