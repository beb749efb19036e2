//! The identity-keyed fact store.
//!
//! [`IdentityStore`] tracks handles in insertion order and indexes them by the identity
//! of the fact each one wraps. [`ObjectStore`] is the storage contract a hosting engine
//! programs against.

use crate::builder::StoreBuilder;
use crate::config::{IndexStrategy, StoreConfig};
use crate::error::{Result, StoreError};
use crate::filter::{ObjectFilter, TypeFilter};
use crate::handle::{DefaultFactHandle, Fact, FactHandle};
use crate::index::IdentityIndex;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Storage contract for tracked facts.
///
/// Traversals borrow the store, so it cannot be mutated while one is alive. Every call
/// starts a fresh, lazy traversal in insertion order.
pub trait ObjectStore {
    type Handle: FactHandle;

    /// Number of tracked handles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every handle and index entry.
    fn clear(&mut self);

    /// The fact wrapped by `handle`, if that fact is tracked.
    ///
    /// A handle whose fact was removed through another handle reports `None` even though
    /// it still wraps an object.
    fn object_for_handle(&self, handle: &Self::Handle) -> Option<Fact>;

    /// Returns the tracked handle equal to `handle`, tracking `handle` with its current
    /// fact if there is none.
    fn reconnect(&mut self, handle: Self::Handle) -> Self::Handle;

    /// The handle wrapping `object`, matched by identity only.
    fn handle_for_object(&self, object: &Fact) -> Option<&Self::Handle>;

    /// Same as [`ObjectStore::handle_for_object`]; spelled out for callers that depend
    /// on identity-only matching.
    fn handle_for_object_identity(&self, object: &Fact) -> Option<&Self::Handle> {
        self.handle_for_object(object)
    }

    /// Rebinds a tracked handle to `object`, keeping its position.
    ///
    /// # Errors
    /// Returns [`StoreError::HandleNotTracked`] if the handle is not tracked; the store
    /// and the handle are left untouched.
    fn update_handle(&mut self, handle: &Self::Handle, object: Fact) -> Result<()>;

    /// Binds `handle` to `object` and tracks it. Membership is not checked, use
    /// [`ObjectStore::reconnect`] for idempotent insertion.
    fn add_handle(&mut self, handle: Self::Handle, object: Fact);

    /// Stops tracking `handle`. Returns `false` if it was not tracked.
    fn remove_handle(&mut self, handle: &Self::Handle) -> bool;

    fn objects(&self) -> impl Iterator<Item = Fact> + '_;

    fn objects_matching<'a, F>(&'a self, filter: &'a F) -> impl Iterator<Item = Fact> + 'a
    where
        F: ObjectFilter + ?Sized,
    {
        self.objects().filter(move |o| filter.accept(o))
    }

    fn objects_of_type(&self, tag: TypeId) -> impl Iterator<Item = Fact> + '_ {
        let filter = TypeFilter::new(tag);
        self.objects().filter(move |o| filter.accept(o))
    }

    fn fact_handles(&self) -> impl Iterator<Item = &Self::Handle> + '_;

    /// Handles whose wrapped fact passes `filter`.
    fn fact_handles_matching<'a, F>(
        &'a self,
        filter: &'a F,
    ) -> impl Iterator<Item = &'a Self::Handle> + 'a
    where
        F: ObjectFilter + ?Sized,
    {
        self.fact_handles().filter(move |h| filter.accept(&h.object()))
    }

    /// Handles whose wrapped fact has the runtime type `tag`.
    fn fact_handles_of_type(&self, tag: TypeId) -> impl Iterator<Item = &Self::Handle> + '_ {
        let filter = TypeFilter::new(tag);
        self.fact_handles().filter(move |h| filter.accept(&h.object()))
    }

    /// Negated facts. Stores without negative state yield nothing.
    fn neg_objects<'a, F>(&'a self, filter: &'a F) -> impl Iterator<Item = Fact> + 'a
    where
        F: ObjectFilter + ?Sized;

    /// Handles of negated facts. Stores without negative state yield nothing.
    fn neg_fact_handles<'a, F>(&'a self, filter: &'a F) -> impl Iterator<Item = &'a Self::Handle> + 'a
    where
        F: ObjectFilter + ?Sized;
}

/// Handles in insertion order plus an identity index over their facts.
///
/// Single owner: mutation takes `&mut self` and the store is not internally
/// synchronized. Wrap it in a lock to share it.
///
/// # Example
///
/// ```rust
/// use factbase_store::{FactHandleFactory, IdentityStore, ObjectStore, fact};
///
/// let factory = FactHandleFactory::new();
/// let mut store = IdentityStore::new();
///
/// let order = fact(String::from("order-1"));
/// let handle = factory.new_handle(order.clone());
/// store.add_handle(handle.clone(), order.clone());
///
/// assert_eq!(store.handle_for_object(&order), Some(&handle));
/// // Equal by value, but a different object.
/// assert!(store.handle_for_object(&fact(String::from("order-1"))).is_none());
///
/// store.remove_handle(&handle);
/// assert!(store.is_empty());
/// ```
#[derive(Debug)]
pub struct IdentityStore<H = DefaultFactHandle> {
    handles: Vec<H>,
    index: IdentityIndex<H>,
    strategy: IndexStrategy,
}

impl<H: FactHandle> Default for IdentityStore<H> {
    fn default() -> Self {
        Self::from_parts(Vec::new(), IdentityIndex::new(None, 0), IndexStrategy::Identity)
    }
}

impl IdentityStore<DefaultFactHandle> {
    /// An empty store over [`DefaultFactHandle`]s with an identity index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: FactHandle> IdentityStore<H> {
    #[must_use = "The store is not created until you call .build()"]
    pub fn builder() -> StoreBuilder<H> {
        StoreBuilder::new()
    }

    /// # Errors
    /// Returns [`StoreError::InvalidConfig`] if the configuration is out of range.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        StoreBuilder::new().config(config).build()
    }

    pub(crate) const fn from_parts(
        handles: Vec<H>,
        index: IdentityIndex<H>,
        strategy: IndexStrategy,
    ) -> Self {
        Self { handles, index, strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> IndexStrategy {
        self.strategy
    }

    /// Number of index entries. Matches [`ObjectStore::len`] unless a handle was added
    /// more than once.
    #[must_use]
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn contains_handle(&self, handle: &H) -> bool {
        self.handles.contains(handle)
    }

    /// Tracked facts of type `T`, downcast.
    pub fn objects_as<T: Any + Send + Sync>(&self) -> impl Iterator<Item = Arc<T>> + '_ {
        self.objects().filter_map(|o| o.downcast::<T>().ok())
    }

    /// Drops index entries still bound to `handle` after the direct removal missed.
    ///
    /// Happens when the handle was rebound without going through the store, or when a
    /// derived key no longer leads to the entry.
    fn purge_stale(&mut self, handle: &H) -> usize {
        let purged = self.index.purge(handle);
        warn!(?handle, purged, strategy = ?self.strategy, "Index entry missed; swept index for handle");
        purged
    }
}

impl<H: FactHandle> ObjectStore for IdentityStore<H> {
    type Handle = H;

    fn len(&self) -> usize {
        self.handles.len()
    }

    fn clear(&mut self) {
        let handles = self.handles.len();
        self.handles.clear();
        self.index.clear();
        debug!(handles, "Identity store cleared");
    }

    fn object_for_handle(&self, handle: &H) -> Option<Fact> {
        let object = handle.object();
        self.index.contains(&object).then_some(object)
    }

    fn reconnect(&mut self, handle: H) -> H {
        let object = handle.object();
        if let Some(tracked) = self.index.get(&object).filter(|h| **h == handle) {
            return tracked.clone();
        }
        if let Some(tracked) = self.handles.iter().find(|h| **h == handle) {
            trace!(?handle, "Reconnected to tracked handle bound to another object");
            return tracked.clone();
        }

        trace!(?handle, "Reconnect found no tracked handle; adding");
        self.add_handle(handle.clone(), object);
        handle
    }

    fn handle_for_object(&self, object: &Fact) -> Option<&H> {
        self.index.get(object)
    }

    fn update_handle(&mut self, handle: &H, object: Fact) -> Result<()> {
        let current = handle.object();
        if !self.index.remove(&current, handle) {
            if !self.handles.contains(handle) {
                return Err(StoreError::HandleNotTracked {
                    message: format!("{handle:?}").into(),
                    context: Some("update_handle".into()),
                });
            }
            self.purge_stale(handle);
        }

        handle.set_object(object.clone());
        if let Some(previous) = self.index.insert(object, handle.clone()) {
            debug!(?previous, ?handle, "Object rebound to another handle");
        }
        trace!(?handle, "Handle updated");
        Ok(())
    }

    fn add_handle(&mut self, handle: H, object: Fact) {
        // Re-adding a tracked handle with another fact retires its old entry.
        let stale = handle.object();
        if !Arc::ptr_eq(&stale, &object) && self.index.remove(&stale, &handle) {
            debug!(?handle, "Tracked handle re-added with another object");
        }
        handle.set_object(object.clone());
        self.handles.push(handle.clone());
        if let Some(previous) = self.index.insert(object, handle.clone())
            && previous != handle
        {
            debug!(?previous, ?handle, "Object rebound to another handle");
        }
        trace!(?handle, handles = self.handles.len(), "Handle added");
    }

    fn remove_handle(&mut self, handle: &H) -> bool {
        let Some(pos) = self.handles.iter().position(|h| h == handle) else {
            trace!(?handle, "Handle already absent");
            return false;
        };
        let removed = self.handles.remove(pos);

        // A duplicate add leaves an equal handle behind; its entry is still live.
        if self.handles.contains(&removed) {
            trace!(?handle, "Handle removed; duplicate still tracked");
            return true;
        }

        let tracked_object = removed.object();
        let mut hit = self.index.remove(&tracked_object, &removed);
        if !hit {
            let given_object = handle.object();
            if !Arc::ptr_eq(&given_object, &tracked_object) {
                hit = self.index.remove(&given_object, &removed);
            }
        }
        if !hit {
            self.purge_stale(&removed);
        }

        trace!(?handle, handles = self.handles.len(), "Handle removed");
        true
    }

    fn objects(&self) -> impl Iterator<Item = Fact> + '_ {
        self.handles.iter().map(FactHandle::object)
    }

    fn fact_handles(&self) -> impl Iterator<Item = &H> + '_ {
        self.handles.iter()
    }

    fn neg_objects<'a, F>(&'a self, _filter: &'a F) -> impl Iterator<Item = Fact> + 'a
    where
        F: ObjectFilter + ?Sized,
    {
        std::iter::empty()
    }

    fn neg_fact_handles<'a, F>(&'a self, _filter: &'a F) -> impl Iterator<Item = &'a H> + 'a
    where
        F: ObjectFilter + ?Sized,
    {
        std::iter::empty()
    }
}
