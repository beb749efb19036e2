//! Predicates applied during filtered traversal.

use crate::handle::Fact;
use std::any::{Any, TypeId};

/// A boolean test over a fact, applied during filtered traversal.
///
/// Any `Fn(&Fact) -> bool` closure is a filter.
pub trait ObjectFilter {
    fn accept(&self, object: &Fact) -> bool;
}

impl<F> ObjectFilter for F
where
    F: Fn(&Fact) -> bool,
{
    fn accept(&self, object: &Fact) -> bool {
        self(object)
    }
}

/// Accepts facts whose runtime type matches a type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeFilter {
    tag: TypeId,
}

impl TypeFilter {
    #[must_use]
    pub const fn new(tag: TypeId) -> Self {
        Self { tag }
    }

    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self::new(TypeId::of::<T>())
    }

    #[must_use]
    pub const fn tag(&self) -> TypeId {
        self.tag
    }
}

impl ObjectFilter for TypeFilter {
    fn accept(&self, object: &Fact) -> bool {
        type_of(object) == self.tag
    }
}

/// Runtime type of the value behind a fact, not of the `Arc` wrapping it.
pub(crate) fn type_of(object: &Fact) -> TypeId {
    (**object).type_id()
}
