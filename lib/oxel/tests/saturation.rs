//! Tests for EL saturation and subsumer extraction.

use oxel::{
    Axiom, Concept, ConceptName, ElReasoner, ElRule, ExtractionScope, Ontology, OwlError,
    ReasonerConfig, Role, SubsumerPolicy, compute_subsumers,
};

fn class(name: &str) -> ConceptName {
    ConceptName::new_from_iri(format!("http://example.org/pizza#{name}")).unwrap()
}

fn named(name: &str) -> Concept {
    Concept::name(class(name))
}

fn role(name: &str) -> Role {
    Role::new_from_iri(format!("http://example.org/pizza#{name}")).unwrap()
}

fn names(classes: &[ConceptName]) -> Vec<&str> {
    classes.iter().map(ConceptName::local_name).collect()
}

/// Pizza ⊑ Food, Margherita ≡ Pizza ⊓ ∃hasIngredient.Cheese
fn pizza_ontology() -> Ontology {
    let mut ontology = Ontology::with_iri("http://example.org/pizza").unwrap();
    ontology.add_axiom(Axiom::DeclareObjectProperty(role("hasIngredient")));
    ontology.add_axiom(Axiom::DeclareClass(class("Cheese")));
    ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Food")));
    ontology.add_axiom(Axiom::equivalent_classes(vec![
        named("Margherita"),
        Concept::conjunction(
            named("Pizza"),
            Concept::exists(role("hasIngredient"), named("Cheese")),
        ),
    ]));
    ontology
}

// =============================================================================
// Subsumer queries
// =============================================================================

#[test]
fn test_margherita_subsumers() {
    let ontology = pizza_ontology();
    assert_eq!(
        names(&compute_subsumers(&ontology, "Margherita")),
        ["Food", "Margherita", "Pizza"]
    );
}

#[test]
fn test_query_by_full_iri() {
    let ontology = pizza_ontology();
    assert_eq!(
        compute_subsumers(&ontology, "http://example.org/pizza#Pizza"),
        [class("Food"), class("Pizza")]
    );
}

#[test]
fn test_unknown_class_gives_empty_result() {
    let ontology = pizza_ontology();
    assert!(compute_subsumers(&ontology, "Calzone").is_empty());
    assert!(compute_subsumers(&Ontology::default(), "Pizza").is_empty());
    assert_eq!(
        ElReasoner::new(&ontology).compute_subsumers("Calzone"),
        Ok(Vec::new())
    );
}

#[test]
fn test_unknown_class_error() {
    let ontology = pizza_ontology();
    let error = ElReasoner::new(&ontology)
        .try_compute_subsumers("Calzone")
        .unwrap_err();
    assert!(matches!(error, OwlError::ConceptNotFound(name) if name == "Calzone"));
}

#[test]
fn test_class_without_axioms_subsumes_itself() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::DeclareClass(class("Lonely")));
    assert_eq!(compute_subsumers(&ontology, "Lonely"), [class("Lonely")]);
    assert_eq!(
        names(&compute_subsumers(&pizza_ontology(), "Cheese")),
        ["Cheese"]
    );
}

#[test]
fn test_idempotence() {
    let ontology = pizza_ontology();
    let first = compute_subsumers(&ontology, "Margherita");
    let second = compute_subsumers(&ontology, "Margherita");
    assert_eq!(first, second);
}

#[test]
fn test_transitive_named_hierarchy() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(class("Margherita"), class("NamedPizza")));
    ontology.add_axiom(Axiom::subclass_of(class("NamedPizza"), class("Pizza")));
    ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Food")));
    assert_eq!(
        names(&compute_subsumers(&ontology, "Margherita")),
        ["Food", "Margherita", "NamedPizza", "Pizza"]
    );
}

#[test]
fn test_named_equivalence() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::equivalent_classes(vec![
        named("Pie"),
        named("Pizza"),
    ]));
    ontology.add_axiom(Axiom::subclass_of(class("Pizza"), class("Food")));
    assert_eq!(
        names(&compute_subsumers(&ontology, "Pie")),
        ["Food", "Pie", "Pizza"]
    );
    assert_eq!(
        names(&compute_subsumers(&ontology, "Pizza")),
        ["Food", "Pie", "Pizza"]
    );
}

#[test]
fn test_conjunction_decomposition() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::equivalent_classes(vec![
        named("X"),
        Concept::conjunction(named("A"), named("B")),
    ]));
    ontology.add_axiom(Axiom::subclass_of(class("A"), class("C")));
    ontology.add_axiom(Axiom::subclass_of(class("B"), class("D")));
    assert_eq!(
        names(&compute_subsumers(&ontology, "X")),
        ["A", "B", "C", "D", "X"]
    );
}

#[test]
fn test_defined_class_is_recognized() {
    let mut ontology = pizza_ontology();
    ontology.add_axiom(Axiom::subclass_of(class("Mozzarella"), class("Cheese")));
    ontology.add_axiom(Axiom::subclass_of(class("CheesyPizza"), class("Pizza")));
    ontology.add_axiom(Axiom::subclass_of(
        named("CheesyPizza"),
        Concept::exists(role("hasIngredient"), named("Mozzarella")),
    ));
    assert_eq!(
        names(&compute_subsumers(&ontology, "CheesyPizza")),
        ["CheesyPizza", "Food", "Margherita", "Pizza"]
    );
}

#[test]
fn test_existential_round_trip() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(
        named("X"),
        Concept::exists(role("r"), named("Y")),
    ));
    ontology.add_axiom(Axiom::subclass_of(class("Y"), class("Z")));

    let reasoner = ElReasoner::new(&ontology);
    let saturation = reasoner.saturate(&class("X")).unwrap();
    let successors = saturation
        .successors(saturation.root(), &role("r"))
        .collect::<Vec<_>>();
    assert_eq!(successors.len(), 1);
    assert!(saturation.has_label(successors[0], &named("Y")));
    assert!(saturation.has_label(successors[0], &named("Z")));
    assert_eq!(saturation.subsumers(&SubsumerPolicy::default()), [class("X")]);
}

#[test]
fn test_back_propagation_through_successor() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(
        named("X"),
        Concept::exists(role("r"), named("Y")),
    ));
    ontology.add_axiom(Axiom::subclass_of(class("Y"), class("Z")));
    ontology.add_axiom(Axiom::subclass_of(
        Concept::exists(role("r"), named("Z")),
        named("W"),
    ));
    assert_eq!(names(&compute_subsumers(&ontology, "X")), ["W", "X"]);
}

#[test]
fn test_top_subsumes_everything() {
    let ontology = pizza_ontology();
    let reasoner = ElReasoner::new(&ontology);
    let saturation = reasoner.saturate(&class("Margherita")).unwrap();
    for element in saturation.elements() {
        assert!(saturation.has_label(element, &Concept::Top));
    }
}

#[test]
fn test_gci_with_top_left_hand_side() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(Concept::Top, named("Entity")));
    ontology.add_axiom(Axiom::DeclareClass(class("Pizza")));
    assert_eq!(
        names(&compute_subsumers(&ontology, "Pizza")),
        ["Entity", "Pizza"]
    );
}

#[test]
fn test_adding_axioms_never_removes_subsumers() {
    let mut ontology = pizza_ontology();
    let before = compute_subsumers(&ontology, "Margherita");
    ontology.add_axiom(Axiom::subclass_of(class("Food"), class("Edible")));
    ontology.add_axiom(Axiom::subclass_of(class("Cheese"), class("Dairy")));
    let after = compute_subsumers(&ontology, "Margherita");
    assert!(before.iter().all(|class| after.contains(class)));
    assert_eq!(names(&after), ["Edible", "Food", "Margherita", "Pizza"]);
}

// =============================================================================
// Completion graph
// =============================================================================

#[test]
fn test_margherita_completion_graph() {
    let ontology = pizza_ontology();
    let reasoner = ElReasoner::new(&ontology);
    let saturation = reasoner.saturate(&class("Margherita")).unwrap();

    assert_eq!(saturation.target(), &class("Margherita"));
    assert_eq!(saturation.element_count(), 2);
    assert_eq!(saturation.element_name(saturation.root()), "d0");
    let successors = saturation
        .successors(saturation.root(), &role("hasIngredient"))
        .collect::<Vec<_>>();
    assert_eq!(successors.len(), 1);
    assert_eq!(saturation.element_name(successors[0]), "d0_hasIngredient");
    assert!(saturation.has_label(successors[0], &named("Cheese")));
    assert!(!saturation.has_label(saturation.root(), &named("Cheese")));
    assert!(saturation.has_label(
        saturation.root(),
        &Concept::exists(role("hasIngredient"), named("Cheese"))
    ));
}

#[test]
fn test_statistics() {
    let ontology = pizza_ontology();
    let reasoner = ElReasoner::new(&ontology);
    let saturation = reasoner.saturate(&class("Margherita")).unwrap();
    let stats = saturation.stats();

    assert!(stats.iterations() >= saturation.element_count());
    assert_eq!(stats.firings(ElRule::Top), saturation.element_count());
    assert_eq!(stats.firings(ElRule::Existential), 1);
    assert!(stats.firings(ElRule::Conjunction) >= 2);
    assert_eq!(
        stats.total_firings(),
        ElRule::all().iter().map(|&r| stats.firings(r)).sum::<usize>()
    );
}

#[test]
fn test_successors_are_shared_between_restrictions() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(
        named("A"),
        Concept::exists(role("r"), named("B")),
    ));
    ontology.add_axiom(Axiom::subclass_of(
        named("A"),
        Concept::exists(role("s"), named("B")),
    ));
    let saturation = ElReasoner::new(&ontology).saturate(&class("A")).unwrap();
    assert_eq!(saturation.element_count(), 2);
    assert_eq!(
        saturation.successors(saturation.root(), &role("r")).collect::<Vec<_>>(),
        saturation.successors(saturation.root(), &role("s")).collect::<Vec<_>>()
    );
}

#[test]
fn test_fillers_are_not_merged() {
    let mut ontology = Ontology::default();
    ontology.add_axiom(Axiom::subclass_of(
        named("X"),
        Concept::exists(role("r"), named("A")),
    ));
    ontology.add_axiom(Axiom::subclass_of(
        named("X"),
        Concept::exists(role("r"), named("B")),
    ));
    ontology.add_axiom(Axiom::subclass_of(
        Concept::exists(role("r"), Concept::conjunction(named("A"), named("B"))),
        named("W"),
    ));
    let saturation = ElReasoner::new(&ontology).saturate(&class("X")).unwrap();
    let successors = saturation
        .successors(saturation.root(), &role("r"))
        .collect::<Vec<_>>();
    assert_eq!(successors.len(), 2);
    let mut element_names = successors
        .iter()
        .map(|s| saturation.element_name(*s))
        .collect::<Vec<_>>();
    element_names.sort_unstable();
    assert_eq!(element_names, ["d0_r", "d0_r_2"]);
    for successor in successors {
        assert_ne!(
            saturation.has_label(successor, &named("A")),
            saturation.has_label(successor, &named("B"))
        );
    }
    // ∃r.A and ∃r.B do not imply ∃r.(A ⊓ B)
    assert_eq!(names(&compute_subsumers(&ontology, "X")), ["X"]);
}

// =============================================================================
// Output policy
// =============================================================================

#[test]
fn test_all_elements_scope() {
    let ontology = pizza_ontology();
    let config = ReasonerConfig {
        policy: SubsumerPolicy {
            scope: ExtractionScope::AllElements,
            ..SubsumerPolicy::default()
        },
        ..ReasonerConfig::default()
    };
    let subsumers = ElReasoner::with_config(&ontology, config)
        .compute_subsumers("Margherita")
        .unwrap();
    assert_eq!(names(&subsumers), ["Cheese", "Food", "Margherita", "Pizza"]);
}

#[test]
fn test_include_top() {
    let ontology = pizza_ontology();
    let saturation = ElReasoner::new(&ontology)
        .saturate(&class("Margherita"))
        .unwrap();
    let policy = SubsumerPolicy {
        include_top: true,
        ..SubsumerPolicy::default()
    };
    assert_eq!(
        saturation.subsumers(&policy),
        [
            class("Food"),
            class("Margherita"),
            class("Pizza"),
            ConceptName::thing()
        ]
    );
}

#[test]
fn test_excluded_names() {
    let ontology = pizza_ontology();
    let saturation = ElReasoner::new(&ontology)
        .saturate(&class("Margherita"))
        .unwrap();
    let policy = SubsumerPolicy {
        excluded: vec![class("Food"), class("Margherita")],
        ..SubsumerPolicy::default()
    };
    assert_eq!(names(&saturation.subsumers(&policy)), ["Margherita", "Pizza"]);
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_classify() {
    let ontology = pizza_ontology();
    let classification = ElReasoner::new(&ontology).classify().unwrap();

    assert_eq!(classification.len(), 4);
    assert!(!classification.is_empty());
    assert_eq!(
        classification.subsumers(&class("Margherita")),
        Some(compute_subsumers(&ontology, "Margherita").as_slice())
    );
    assert_eq!(
        classification.subsumers(&class("Cheese")),
        Some([class("Cheese")].as_slice())
    );
    assert!(classification.is_subsumed_by(&class("Margherita"), &class("Food")));
    assert!(!classification.is_subsumed_by(&class("Food"), &class("Pizza")));
    assert_eq!(classification.subsumers(&class("Calzone")), None);
    assert_eq!(
        classification
            .iter()
            .map(|(class, _)| class.local_name())
            .collect::<Vec<_>>(),
        ["Cheese", "Food", "Margherita", "Pizza"]
    );
}
