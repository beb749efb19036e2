use crate::config::{IndexStrategy, StoreConfig};
use crate::error::Result;
use crate::handle::{DefaultFactHandle, FactHandle};
use crate::index::IdentityIndex;
use crate::store::IdentityStore;
use std::marker::PhantomData;
use tracing::debug;

/// Fluent builder for an [`IdentityStore`].
#[derive(Debug)]
pub struct StoreBuilder<H = DefaultFactHandle> {
    config: StoreConfig,
    _handle: PhantomData<fn() -> H>,
}

impl<H> Default for StoreBuilder<H> {
    fn default() -> Self {
        Self { config: StoreConfig::default(), _handle: PhantomData }
    }
}

impl<H: FactHandle> StoreBuilder<H> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the number of handles to preallocate room for"]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    #[must_use = "Sets how objects are located in the index"]
    pub const fn strategy(mut self, strategy: IndexStrategy) -> Self {
        self.config.index = strategy;
        self
    }

    #[must_use = "Replaces the whole configuration"]
    pub const fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and creates an empty store.
    ///
    /// # Errors
    /// Returns [`crate::StoreError::InvalidConfig`] if the derived key width exceeds 32 bits.
    pub fn build(self) -> Result<IdentityStore<H>> {
        let StoreConfig { capacity, index } = self.config;
        let derived = index.derived_key()?;

        debug!(capacity, strategy = ?index, "Creating identity store");

        Ok(IdentityStore::from_parts(
            Vec::with_capacity(capacity),
            IdentityIndex::new(derived, capacity),
            index,
        ))
    }
}
