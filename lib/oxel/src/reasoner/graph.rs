//! Completion graph: elements, their labels and role edges.

use crate::concept::{Concept, Role};
use rustc_hash::{FxHashMap, FxHashSet};

/// Identifier of an element of the completion graph.
///
/// Identifiers are indexes into the graph arena and are only meaningful for
/// the [`Saturation`](super::Saturation) that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

impl ElementId {
    /// The root element `d0`, labelled with the queried concept.
    pub const ROOT: Self = Self(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Element {
    name: String,
    label: FxHashSet<Concept>,
    successors: FxHashMap<Role, FxHashSet<ElementId>>,
    predecessors: FxHashSet<ElementId>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            label: FxHashSet::default(),
            successors: FxHashMap::default(),
            predecessors: FxHashSet::default(),
        }
    }
}

/// Arena of elements with their labels and the role-successor map.
///
/// Labels only grow: the graph has no operation that removes a concept or an edge.
#[derive(Debug)]
pub(crate) struct CompletionGraph {
    elements: Vec<Element>,
    /// Successor reuse: the element seeded with a given filler
    by_seed: FxHashMap<Concept, ElementId>,
}

impl CompletionGraph {
    /// Creates a graph holding only the root element, registered as the element for `seed`.
    pub fn new(seed: Concept) -> Self {
        let mut by_seed = FxHashMap::default();
        by_seed.insert(seed, ElementId::ROOT);
        Self {
            elements: vec![Element::new("d0".into())],
            by_seed,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + use<> {
        (0..self.elements.len()).map(ElementId)
    }

    pub fn name(&self, element: ElementId) -> &str {
        &self.elements[element.0].name
    }

    pub fn label(&self, element: ElementId) -> &FxHashSet<Concept> {
        &self.elements[element.0].label
    }

    /// Adds a concept to the label of an element, returns whether the label grew.
    pub fn add_to_label(&mut self, element: ElementId, concept: Concept) -> bool {
        self.elements[element.0].label.insert(concept)
    }

    /// Returns the element seeded with `filler`, creating it as an `role`-successor
    /// of `predecessor` if it does not exist yet.
    ///
    /// The boolean is `true` when the element was created. A new element is named
    /// after the (predecessor, role) pair that generated it and its label is `{filler}`.
    pub fn element_for(
        &mut self,
        predecessor: ElementId,
        role: &Role,
        filler: &Concept,
    ) -> (ElementId, bool) {
        if let Some(&existing) = self.by_seed.get(filler) {
            return (existing, false);
        }
        let id = ElementId(self.elements.len());
        let base = format!("{}_{}", self.name(predecessor), role.local_name());
        let siblings = self.elements[predecessor.0]
            .successors
            .get(role)
            .map_or(0, FxHashSet::len);
        let name = if siblings == 0 {
            base
        } else {
            format!("{base}_{}", siblings + 1)
        };
        let mut element = Element::new(name);
        element.label.insert(filler.clone());
        self.elements.push(element);
        self.by_seed.insert(filler.clone(), id);
        (id, true)
    }

    /// Registers `to` as a `role`-successor of `from`, returns whether the edge is new.
    pub fn add_edge(&mut self, from: ElementId, role: &Role, to: ElementId) -> bool {
        let added = self.elements[from.0]
            .successors
            .entry(role.clone())
            .or_default()
            .insert(to);
        if added {
            self.elements[to.0].predecessors.insert(from);
        }
        added
    }

    /// Returns the `role`-successors of an element.
    pub fn successors(&self, element: ElementId, role: &Role) -> impl Iterator<Item = ElementId> {
        self.elements[element.0]
            .successors
            .get(role)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Returns all outgoing edges of an element grouped by role.
    pub fn edges(&self, element: ElementId) -> impl Iterator<Item = (&Role, &FxHashSet<ElementId>)> {
        self.elements[element.0].successors.iter()
    }

    /// Returns the elements having an edge to `element`.
    pub fn predecessors(&self, element: ElementId) -> impl Iterator<Item = ElementId> {
        self.elements[element.0].predecessors.iter().copied()
    }
}
