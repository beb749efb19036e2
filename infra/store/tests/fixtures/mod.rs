#![allow(dead_code)]

use factbase_store::{
    DefaultFactHandle, Fact, FactHandleFactory, IdentityStore, IndexStrategy, ObjectStore, fact,
};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
}

/// Routes store logs through the test harness; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::TRACE)
        .try_init();
}

pub fn person(name: &'static str) -> Fact {
    fact(Person { name })
}

pub fn order(id: u64) -> Fact {
    fact(Order { id })
}

/// A store plus the factory used to mint its handles.
#[derive(Debug)]
pub struct Fixture {
    pub factory: FactHandleFactory,
    pub store: IdentityStore,
}

impl Fixture {
    /// # Panics
    /// * If the strategy is rejected by the builder.
    #[must_use]
    pub fn new(strategy: IndexStrategy) -> Self {
        init_tracing();
        let store = IdentityStore::builder().strategy(strategy).build().expect("valid strategy");
        Self { factory: FactHandleFactory::new(), store }
    }

    /// Mints a handle for `object` and tracks it.
    pub fn insert(&mut self, object: Fact) -> DefaultFactHandle {
        let handle = self.factory.new_handle(object.clone());
        self.store.add_handle(handle.clone(), object);
        handle
    }
}

/// Every strategy the store supports, including one where all derived keys collide.
#[must_use]
pub fn strategies() -> [IndexStrategy; 3] {
    [
        IndexStrategy::Identity,
        IndexStrategy::DerivedKey { bits: 32 },
        IndexStrategy::DerivedKey { bits: 0 },
    ]
}
