//! EL ontology - container for axioms and the read-only index the reasoner queries.

use crate::axiom::Axiom;
use crate::concept::{Concept, ConceptName, Role};
use oxrdf::NamedNode;
use rustc_hash::{FxHashMap, FxHashSet};

/// An EL ontology.
///
/// Besides the axiom list, the ontology maintains the lookup tables the
/// saturation engine needs: told subsumers per left-hand side, asserted
/// equivalences per name and the existential restrictions that occur in
/// any axiom. The tables are updated by [`Ontology::add_axiom`], so an
/// ontology is always ready to be reasoned over.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    /// The ontology IRI (optional)
    iri: Option<NamedNode>,

    /// All axioms in the ontology
    axioms: Vec<Axiom>,

    /// Declared or mentioned classes
    classes: FxHashSet<ConceptName>,

    /// Declared or mentioned roles
    roles: FxHashSet<Role>,

    /// Told subsumers of concept names: `N ⊑ D` and the members of `N ≡ D ≡ ...`
    named_subsumers: FxHashMap<ConceptName, Vec<Concept>>,

    /// Told subsumers of other left-hand sides (general concept inclusions)
    general_subsumers: FxHashMap<Concept, Vec<Concept>>,

    /// Asserted equivalent expressions per concept name
    equivalents: FxHashMap<ConceptName, Vec<Concept>>,

    /// Existential restrictions occurring in the axioms: role -> filler -> restriction
    existentials: FxHashMap<Role, FxHashMap<Concept, Concept>>,

    /// Conjunctions occurring in the axioms, indexed by each of their operands
    conjunctions: FxHashMap<Concept, Vec<Concept>>,
}

impl Ontology {
    /// Creates a new empty ontology.
    pub fn new(iri: Option<NamedNode>) -> Self {
        Self {
            iri,
            ..Self::default()
        }
    }

    /// Creates a new ontology with the given IRI string.
    pub fn with_iri(iri: impl Into<String>) -> Result<Self, oxiri::IriParseError> {
        Ok(Self::new(Some(NamedNode::new(iri)?)))
    }

    /// Returns the ontology IRI.
    pub fn iri(&self) -> Option<&NamedNode> {
        self.iri.as_ref()
    }

    /// Sets the ontology IRI.
    pub fn set_iri(&mut self, iri: Option<NamedNode>) {
        self.iri = iri;
    }

    /// Adds an axiom to the ontology and updates the lookup tables.
    pub fn add_axiom(&mut self, axiom: Axiom) {
        match &axiom {
            Axiom::DeclareClass(c) => {
                self.classes.insert(c.clone());
            }
            Axiom::DeclareObjectProperty(r) => {
                self.roles.insert(r.clone());
            }
            Axiom::SubClassOf {
                sub_class,
                super_class,
            } => {
                self.index_concept(sub_class);
                self.index_concept(super_class);
                self.add_told_subsumer(sub_class, super_class);
            }
            Axiom::EquivalentClasses(classes) => {
                for c in classes {
                    self.index_concept(c);
                }
                for (i, left) in classes.iter().enumerate() {
                    for (j, right) in classes.iter().enumerate() {
                        if i == j || left == right {
                            continue;
                        }
                        self.add_told_subsumer(left, right);
                        if let Concept::Name(name) = left {
                            push_unique(self.equivalents.entry(name.clone()).or_default(), right);
                        }
                    }
                }
            }
        }
        self.axioms.push(axiom);
    }

    /// Records the names, roles and existential restrictions of an expression.
    fn index_concept(&mut self, concept: &Concept) {
        for sub in concept.subconcepts() {
            match sub {
                Concept::Name(name) => {
                    self.classes.insert(name.clone());
                }
                Concept::Exists { role, filler } => {
                    self.roles.insert(role.clone());
                    self.existentials
                        .entry(role.clone())
                        .or_default()
                        .entry(Concept::clone(filler))
                        .or_insert_with(|| sub.clone());
                }
                Concept::Conjunction(left, right) => {
                    for operand in [left, right] {
                        push_unique(
                            self.conjunctions.entry(Concept::clone(operand)).or_default(),
                            sub,
                        );
                    }
                }
                Concept::Top => {}
            }
        }
    }

    fn add_told_subsumer(&mut self, sub: &Concept, sup: &Concept) {
        if sub == sup {
            return;
        }
        let subsumers = match sub {
            Concept::Name(name) => self.named_subsumers.entry(name.clone()).or_default(),
            _ => self.general_subsumers.entry(sub.clone()).or_default(),
        };
        push_unique(subsumers, sup);
    }

    /// Returns all axioms in the ontology.
    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    /// Returns the number of axioms.
    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    /// Returns all declared or mentioned classes.
    pub fn classes(&self) -> impl Iterator<Item = &ConceptName> {
        self.classes.iter()
    }

    /// Returns all declared or mentioned roles.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Checks if a class is declared or mentioned in this ontology.
    pub fn contains_class(&self, class: &ConceptName) -> bool {
        self.classes.contains(class)
    }

    /// Resolves a class from its full IRI or from its local name.
    ///
    /// An exact IRI match wins. Otherwise, if `name` contains no `#` or `/`,
    /// the classes whose IRI ends with `#name` or `/name` are candidates and
    /// the first one in IRI order is returned.
    pub fn resolve(&self, name: &str) -> Option<&ConceptName> {
        if let Ok(exact) = ConceptName::new_from_iri(name) {
            if let Some(class) = self.classes.get(&exact) {
                return Some(class);
            }
        }
        if name.is_empty() || name.contains(['#', '/']) {
            return None;
        }
        self.classes
            .iter()
            .filter(|class| {
                class
                    .as_str()
                    .strip_suffix(name)
                    .is_some_and(|prefix| prefix.ends_with(['#', '/']))
            })
            .min()
    }

    /// Returns the expressions asserted equivalent to a name.
    pub fn equivalents(&self, class: &ConceptName) -> &[Concept] {
        self.equivalents.get(class).map_or(&[], Vec::as_slice)
    }

    /// Returns the told subsumers of a name: its asserted superclasses and equivalents.
    pub fn superclasses(&self, class: &ConceptName) -> &[Concept] {
        self.named_subsumers.get(class).map_or(&[], Vec::as_slice)
    }

    /// Returns the told subsumers of any expression used as the left-hand side of an axiom.
    pub fn told_subsumers(&self, concept: &Concept) -> &[Concept] {
        match concept {
            Concept::Name(name) => self.superclasses(name),
            _ => self
                .general_subsumers
                .get(concept)
                .map_or(&[], Vec::as_slice),
        }
    }

    /// Returns the canonical `∃role.filler` expression if it occurs in the ontology.
    ///
    /// Expressions are looked up structurally, so the same instance is returned
    /// whatever way the caller built `filler`.
    pub fn existential(&self, role: &Role, filler: &Concept) -> Option<&Concept> {
        self.existentials.get(role)?.get(filler)
    }

    /// Returns the conjunctions occurring in the ontology that have `operand` as a direct operand.
    pub fn conjunctions_with(&self, operand: &Concept) -> &[Concept] {
        self.conjunctions.get(operand).map_or(&[], Vec::as_slice)
    }
}

impl std::fmt::Display for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(iri) = &self.iri {
            write!(f, "Ontology({iri})")?;
        } else {
            write!(f, "Ontology(anonymous)")?;
        }
        write!(f, " [{} axioms]", self.axioms.len())
    }
}

fn push_unique(concepts: &mut Vec<Concept>, concept: &Concept) {
    if !concepts.contains(concept) {
        concepts.push(concept.clone());
    }
}
