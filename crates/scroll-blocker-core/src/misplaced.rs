#![forbid(unsafe_code)]

//! Misplaced elements: nodes whose layout must absorb the scrollbar width.
//!
//! A fixed header spanning to the right edge of the viewport shifts when the
//! scrollbar disappears. Listing it as a [`MisplacedElement`] makes the engine
//! write the scrollbar width into one of its CSS properties while locked.
//!
//! Targets are either concrete element handles or a lazy [`Producer`] that
//! is evaluated when the lock engages, which allows targets that do not exist
//! yet when the engine is configured. Everything is flattened into
//! [`ResolvedTarget`] pairs at lock time; that list is what gets cleaned up on
//! release.

use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::LOG_TARGET;

/// Deepest chain of producers returning producers that is followed.
pub const MAX_PRODUCER_DEPTH: usize = 8;

/// Lazily computes misplaced elements at lock time.
pub type Producer<E> = Rc<dyn Fn() -> Vec<MisplacedElement<E>>>;

/// What a [`MisplacedElement`] points at.
pub enum Target<E> {
    /// A single element.
    Element(E),
    /// Several elements sharing one property. An empty list is skipped.
    Elements(Vec<E>),
    /// Evaluated at lock time; the returned specs carry their own properties.
    Lazy(Producer<E>),
}

impl<E: Clone> Clone for Target<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Element(e) => Self::Element(e.clone()),
            Self::Elements(list) => Self::Elements(list.clone()),
            Self::Lazy(producer) => Self::Lazy(Rc::clone(producer)),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Target<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(e) => f.debug_tuple("Element").field(e).finish(),
            Self::Elements(list) => f.debug_tuple("Elements").field(list).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// One compensation target plus the CSS property that receives the width.
#[derive(Debug)]
pub struct MisplacedElement<E> {
    target: Target<E>,
    property: String,
}

impl<E: Clone> Clone for MisplacedElement<E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            property: self.property.clone(),
        }
    }
}

impl<E> MisplacedElement<E> {
    /// Compensate a single element.
    pub fn element(element: E, property: impl Into<String>) -> Self {
        Self {
            target: Target::Element(element),
            property: property.into(),
        }
    }

    /// Compensate every element of a list.
    pub fn elements(elements: Vec<E>, property: impl Into<String>) -> Self {
        Self {
            target: Target::Elements(elements),
            property: property.into(),
        }
    }

    /// Resolve targets when the lock engages.
    pub fn lazy<F>(producer: F) -> Self
    where
        F: Fn() -> Vec<MisplacedElement<E>> + 'static,
    {
        Self {
            target: Target::Lazy(Rc::new(producer)),
            property: String::new(),
        }
    }

    #[must_use]
    pub const fn target(&self) -> &Target<E> {
        &self.target
    }

    /// CSS property written with the scrollbar width. Empty for lazy specs.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// A spec that can never produce a write.
    fn is_vacant(&self) -> bool {
        match &self.target {
            Target::Element(_) => self.property.is_empty(),
            Target::Elements(list) => list.is_empty() || self.property.is_empty(),
            Target::Lazy(_) => false,
        }
    }
}

/// A concrete `(element, property)` pair written during a lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget<E> {
    pub element: E,
    pub property: String,
}

/// Combine configured defaults with per-call specs, dropping vacant entries.
pub(crate) fn merge<E: Clone>(
    defaults: &[MisplacedElement<E>],
    per_call: Vec<MisplacedElement<E>>,
) -> Vec<MisplacedElement<E>> {
    defaults
        .iter()
        .cloned()
        .chain(per_call)
        .filter(|spec| !spec.is_vacant())
        .collect()
}

/// Flatten specs into concrete pairs, invoking lazy producers.
pub(crate) fn resolve<E: Clone>(specs: &[MisplacedElement<E>]) -> Vec<ResolvedTarget<E>> {
    let mut out = Vec::new();
    resolve_into(specs, 0, &mut out);
    out
}

fn resolve_into<E: Clone>(
    specs: &[MisplacedElement<E>],
    depth: usize,
    out: &mut Vec<ResolvedTarget<E>>,
) {
    for spec in specs {
        match &spec.target {
            Target::Element(element) if !spec.property.is_empty() => out.push(ResolvedTarget {
                element: element.clone(),
                property: spec.property.clone(),
            }),
            Target::Elements(list) if !spec.property.is_empty() => {
                out.extend(list.iter().map(|element| ResolvedTarget {
                    element: element.clone(),
                    property: spec.property.clone(),
                }));
            }
            Target::Element(_) | Target::Elements(_) => {}
            Target::Lazy(producer) => {
                if depth >= MAX_PRODUCER_DEPTH {
                    warn!(
                        target: LOG_TARGET,
                        depth,
                        "misplaced element producers nested too deeply; skipping"
                    );
                    continue;
                }
                let produced = producer();
                resolve_into(&produced, depth + 1, out);
            }
        }
    }
}
