//! Fact handles: the tokens the store tracks.

use parking_lot::RwLock;
use std::any::Any;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A shared, type-erased object tracked by the store.
pub type Fact = Arc<dyn Any + Send + Sync>;

/// Wraps a value into a [`Fact`].
#[must_use]
pub fn fact<T: Any + Send + Sync>(value: T) -> Fact {
    Arc::new(value)
}

/// A token wrapping exactly one fact at a time.
///
/// Clones of a handle denote the same token: rebinding through one clone must be
/// observed through every other clone. Equality is reference-like (e.g. by id), never
/// by the wrapped fact's value.
pub trait FactHandle: Clone + PartialEq + Debug {
    /// The currently wrapped fact.
    fn object(&self) -> Fact;

    /// Rebinds the handle to `object`.
    fn set_object(&self, object: Fact);
}

#[derive(Debug)]
struct HandleInner {
    id: u64,
    object: RwLock<Fact>,
}

/// Id-based [`FactHandle`] backed by a shared cell.
///
/// Cloning is cheap and every clone sees the same binding. Two handles compare equal
/// when their ids match, even when they were created independently.
#[derive(Debug, Clone)]
pub struct DefaultFactHandle {
    inner: Arc<HandleInner>,
}

impl DefaultFactHandle {
    #[must_use]
    pub fn new(id: u64, object: Fact) -> Self {
        Self { inner: Arc::new(HandleInner { id, object: RwLock::new(object) }) }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }
}

impl FactHandle for DefaultFactHandle {
    fn object(&self) -> Fact {
        self.inner.object.read().clone()
    }

    fn set_object(&self, object: Fact) {
        *self.inner.object.write() = object;
    }
}

impl PartialEq for DefaultFactHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for DefaultFactHandle {}

impl Hash for DefaultFactHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

/// Allocates [`DefaultFactHandle`]s with monotonically increasing ids.
#[derive(Debug)]
pub struct FactHandleFactory {
    next_id: AtomicU64,
}

impl Default for FactHandleFactory {
    fn default() -> Self {
        Self::with_start(1)
    }
}

impl FactHandleFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts allocation at `first_id`, e.g. to resume after restoring handles.
    #[must_use]
    pub const fn with_start(first_id: u64) -> Self {
        Self { next_id: AtomicU64::new(first_id) }
    }

    #[must_use]
    pub fn new_handle(&self, object: Fact) -> DefaultFactHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        DefaultFactHandle::new(id, object)
    }

    /// The id the next handle will receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_ids_increase() {
        let factory = FactHandleFactory::new();
        let a = factory.new_handle(fact(1u32));
        let b = factory.new_handle(fact(2u32));

        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(factory.next_id(), 3);
    }

    #[test]
    fn test_clones_share_binding() {
        let handle = DefaultFactHandle::new(7, fact("before"));
        let clone = handle.clone();
        let after = fact("after");

        clone.set_object(after.clone());

        assert!(Arc::ptr_eq(&handle.object(), &after));
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = DefaultFactHandle::new(3, fact(1u8));
        let b = DefaultFactHandle::new(3, fact(2u8));
        let c = DefaultFactHandle::new(4, fact(1u8));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
