//! EL concept expressions and the named entities they are built from.

use oxrdf::{NamedNode, NamedNodeRef};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;

pub(crate) const OWL_THING: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");

/// An atomic concept name (an `owl:Class` IRI).
///
/// Names are ordered by IRI, which gives subsumer lists a stable lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConceptName(NamedNode);

impl ConceptName {
    /// Creates a new concept name from a named node.
    #[inline]
    pub fn new(iri: NamedNode) -> Self {
        Self(iri)
    }

    /// Creates a new concept name from an IRI string.
    #[inline]
    pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, oxiri::IriParseError> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// The name of `owl:Thing`, used when the top concept is reported as a subsumer.
    #[inline]
    pub fn thing() -> Self {
        Self(OWL_THING.into_owned())
    }

    /// Returns the IRI of this concept name.
    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the part of the IRI after the last `#` or `/`.
    ///
    /// ```
    /// use oxel::ConceptName;
    ///
    /// let pizza = ConceptName::new_from_iri("http://example.org/pizza#Margherita")?;
    /// assert_eq!(pizza.local_name(), "Margherita");
    /// # Result::<_, oxiri::IriParseError>::Ok(())
    /// ```
    pub fn local_name(&self) -> &str {
        local_name(self.0.as_str())
    }
}

impl fmt::Display for ConceptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for ConceptName {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

impl From<ConceptName> for NamedNode {
    fn from(name: ConceptName) -> Self {
        name.0
    }
}

/// A role (an `owl:ObjectProperty` IRI).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Role(NamedNode);

impl Role {
    #[inline]
    pub fn new(iri: NamedNode) -> Self {
        Self(iri)
    }

    #[inline]
    pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, oxiri::IriParseError> {
        Ok(Self(NamedNode::new(iri)?))
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        &self.0
    }

    /// Returns the part of the IRI after the last `#` or `/`.
    pub fn local_name(&self) -> &str {
        local_name(self.0.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for Role {
    fn from(node: NamedNode) -> Self {
        Self(node)
    }
}

/// An EL concept expression.
///
/// Expressions are immutable values compared structurally. Sub-expressions are
/// reference counted so that labels can share them without copying whole trees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Concept {
    /// The universal concept ⊤ (`owl:Thing`)
    Top,
    /// An atomic concept name
    Name(ConceptName),
    /// Binary conjunction `C ⊓ D`
    Conjunction(Arc<Concept>, Arc<Concept>),
    /// Existential restriction `∃role.filler`
    Exists { role: Role, filler: Arc<Concept> },
}

impl Concept {
    pub fn name(name: impl Into<ConceptName>) -> Self {
        Self::Name(name.into())
    }

    pub fn conjunction(left: Concept, right: Concept) -> Self {
        Self::Conjunction(Arc::new(left), Arc::new(right))
    }

    pub fn exists(role: impl Into<Role>, filler: Concept) -> Self {
        Self::Exists {
            role: role.into(),
            filler: Arc::new(filler),
        }
    }

    /// Builds the conjunction of any number of operands as right-nested binary conjunctions.
    ///
    /// An empty list gives ⊤ and a single operand is returned unchanged.
    ///
    /// ```
    /// use oxel::{Concept, ConceptName};
    ///
    /// let a = Concept::name(ConceptName::new_from_iri("http://example.org/A")?);
    /// let b = Concept::name(ConceptName::new_from_iri("http://example.org/B")?);
    /// let c = Concept::name(ConceptName::new_from_iri("http://example.org/C")?);
    /// assert_eq!(
    ///     Concept::intersection(vec![a.clone(), b.clone(), c.clone()]),
    ///     Concept::conjunction(a, Concept::conjunction(b, c))
    /// );
    /// assert_eq!(Concept::intersection(Vec::new()), Concept::Top);
    /// # Result::<_, oxiri::IriParseError>::Ok(())
    /// ```
    pub fn intersection(operands: Vec<Concept>) -> Self {
        let mut operands = operands.into_iter().rev();
        let Some(last) = operands.next() else {
            return Self::Top;
        };
        operands.fold(last, |acc, operand| Self::conjunction(operand, acc))
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Name(_))
    }

    /// Returns every sub-expression of this expression, itself included.
    pub fn subconcepts(&self) -> FxHashSet<&Concept> {
        let mut result = FxHashSet::default();
        let mut stack = vec![self];
        while let Some(concept) = stack.pop() {
            if !result.insert(concept) {
                continue;
            }
            match concept {
                Self::Top | Self::Name(_) => {}
                Self::Conjunction(left, right) => {
                    stack.push(left);
                    stack.push(right);
                }
                Self::Exists { filler, .. } => stack.push(filler),
            }
        }
        result
    }
}

impl From<ConceptName> for Concept {
    fn from(name: ConceptName) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("owl:Thing"),
            Self::Name(name) => write!(f, "{name}"),
            Self::Conjunction(left, right) => write!(f, "({left} and {right})"),
            Self::Exists { role, filler } => write!(f, "({role} some {filler})"),
        }
    }
}

fn local_name(iri: &str) -> &str {
    iri.rfind(['#', '/']).map_or(iri, |i| &iri[i + 1..])
}
