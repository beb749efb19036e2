//! # Fact Store
//!
//! An in-memory registry pairing fact handles with the objects they wrap, keyed by
//! object *identity* rather than value equality.
//!
//! ## Overview
//!
//! [`IdentityStore`] keeps an insertion-ordered list of handles next to an index from
//! object identity to owning handle, and keeps both in step as facts are added,
//! rebound and removed. Hosting engines program against the [`ObjectStore`] contract.
//!
//! ## Features
//!
//! * **Identity, not equality**: two equal values are two facts.
//! * **Two index strategies**: true identity (default) or a derived scalar key with
//!   collision buckets, see [`IndexStrategy`].
//! * **Self-repairing removal**: a handle rebound behind the store's back is still
//!   removed cleanly.
//! * **Lazy traversal**: by predicate ([`ObjectFilter`]) or runtime type
//!   ([`TypeFilter`]); the borrow checker rules out mutation mid-traversal.
//!
//! # Example
//!
//! ```rust
//! use factbase_store::{
//!     FactHandleFactory, IdentityStore, IndexStrategy, ObjectStore, StoreError, fact,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Order { id: u64 }
//!
//! fn main() -> Result<(), StoreError> {
//!     let factory = FactHandleFactory::new();
//!     let mut store: IdentityStore = IdentityStore::builder()
//!         .strategy(IndexStrategy::DerivedKey { bits: 16 })
//!         .capacity(64)
//!         .build()?;
//!
//!     let first = fact(Order { id: 1 });
//!     let handle = factory.new_handle(first.clone());
//!     store.add_handle(handle.clone(), first.clone());
//!
//!     let second = fact(Order { id: 2 });
//!     store.update_handle(&handle, second.clone())?;
//!
//!     assert!(store.handle_for_object(&first).is_none());
//!     assert_eq!(store.handle_for_object(&second), Some(&handle));
//!     assert_eq!(store.objects_as::<Order>().next().map(|o| o.id), Some(2));
//!     Ok(())
//! }
//! ```

mod builder;
mod config;
mod error;
mod filter;
mod handle;
mod identity;
mod index;
mod store;

pub use builder::StoreBuilder;
pub use config::{IndexStrategy, StoreConfig};
pub use error::{StoreError, StoreErrorExt};
pub use filter::{ObjectFilter, TypeFilter};
pub use handle::{DefaultFactHandle, Fact, FactHandle, FactHandleFactory, fact};
pub use identity::{DerivedKey, ObjectIdentity};
pub use store::{IdentityStore, ObjectStore};
