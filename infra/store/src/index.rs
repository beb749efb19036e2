//! Identity index: object identity -> owning handle.
//!
//! Each entry pins a clone of its fact, so the address used as key cannot be handed to
//! a new allocation while the entry exists. Every lookup confirms pointer identity;
//! the derived-key variant keeps colliding entries side by side in a bucket.

use crate::handle::{Fact, FactHandle};
use crate::identity::{DerivedKey, ObjectIdentity};
use fxhash::FxHashMap;

#[derive(Debug)]
pub(crate) struct Entry<H> {
    object: Fact,
    handle: H,
}

impl<H> Entry<H> {
    fn identity(&self) -> ObjectIdentity {
        ObjectIdentity::of(&self.object)
    }
}

#[derive(Debug)]
pub(crate) enum IdentityIndex<H> {
    Identity(FxHashMap<ObjectIdentity, Entry<H>>),
    Derived { key: DerivedKey, buckets: FxHashMap<u32, Vec<Entry<H>>>, len: usize },
}

impl<H: FactHandle> IdentityIndex<H> {
    pub(crate) fn new(derived: Option<DerivedKey>, capacity: usize) -> Self {
        match derived {
            None => Self::Identity(FxHashMap::with_capacity_and_hasher(capacity, Default::default())),
            Some(key) => Self::Derived {
                key,
                buckets: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                len: 0,
            },
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Identity(map) => map.len(),
            Self::Derived { len, .. } => *len,
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            Self::Identity(map) => map.clear(),
            Self::Derived { buckets, len, .. } => {
                buckets.clear();
                *len = 0;
            },
        }
    }

    pub(crate) fn get(&self, object: &Fact) -> Option<&H> {
        let identity = ObjectIdentity::of(object);
        match self {
            Self::Identity(map) => map.get(&identity).map(|e| &e.handle),
            Self::Derived { key, buckets, .. } => buckets
                .get(&key.derive(identity))?
                .iter()
                .find(|e| e.identity() == identity)
                .map(|e| &e.handle),
        }
    }

    pub(crate) fn contains(&self, object: &Fact) -> bool {
        self.get(object).is_some()
    }

    /// Binds `object` to `handle`, returning the handle previously bound to it.
    pub(crate) fn insert(&mut self, object: Fact, handle: H) -> Option<H> {
        let identity = ObjectIdentity::of(&object);
        let entry = Entry { object, handle };
        match self {
            Self::Identity(map) => map.insert(identity, entry).map(|e| e.handle),
            Self::Derived { key, buckets, len } => {
                let bucket = buckets.entry(key.derive(identity)).or_default();
                if let Some(slot) = bucket.iter_mut().find(|e| e.identity() == identity) {
                    return Some(std::mem::replace(slot, entry).handle);
                }
                bucket.push(entry);
                *len += 1;
                None
            },
        }
    }

    /// Removes the entry for `object` only if it is bound to a handle equal to `handle`.
    pub(crate) fn remove(&mut self, object: &Fact, handle: &H) -> bool {
        let identity = ObjectIdentity::of(object);
        match self {
            Self::Identity(map) => {
                if map.get(&identity).is_some_and(|e| e.handle == *handle) {
                    map.remove(&identity);
                    return true;
                }
                false
            },
            Self::Derived { key, buckets, len } => {
                let derived = key.derive(identity);
                let Some(bucket) = buckets.get_mut(&derived) else {
                    return false;
                };
                let Some(pos) =
                    bucket.iter().position(|e| e.identity() == identity && e.handle == *handle)
                else {
                    return false;
                };
                bucket.swap_remove(pos);
                if bucket.is_empty() {
                    buckets.remove(&derived);
                }
                *len -= 1;
                true
            },
        }
    }

    /// Linear sweep removing every entry bound to a handle equal to `handle`.
    pub(crate) fn purge(&mut self, handle: &H) -> usize {
        let before = self.len();
        match self {
            Self::Identity(map) => map.retain(|_, e| e.handle != *handle),
            Self::Derived { buckets, len, .. } => {
                buckets.retain(|_, bucket| {
                    bucket.retain(|e| e.handle != *handle);
                    !bucket.is_empty()
                });
                *len = buckets.values().map(Vec::len).sum();
            },
        }
        before - self.len()
    }
}
