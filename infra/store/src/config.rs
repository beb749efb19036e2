use crate::error::{Result, StoreError, StoreErrorExt};
use crate::identity::DerivedKey;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const ENV_PREFIX: &str = "FACTBASE";
const DEFAULT_CONFIG_FILE: &str = "factbase";

/// How the store locates the handle of an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexStrategy {
    /// Keyed by object identity; collisions are impossible.
    #[default]
    Identity,
    /// Keyed by a scalar folded from the identity, `bits` wide (`0..=32`).
    /// Colliding objects share a bucket and are told apart by identity.
    DerivedKey { bits: u8 },
}

impl IndexStrategy {
    pub(crate) fn derived_key(self) -> Result<Option<DerivedKey>> {
        match self {
            Self::Identity => Ok(None),
            Self::DerivedKey { bits } => DerivedKey::with_bits(bits).map(Some).ok_or_else(|| {
                StoreError::InvalidConfig {
                    message: format!(
                        "derived key width {bits} exceeds {} bits",
                        DerivedKey::MAX_BITS
                    )
                    .into(),
                    context: None,
                }
            }),
        }
    }
}

/// Store configuration.
///
/// ```toml
/// capacity = 1024
///
/// [index]
/// kind = "derived_key"
/// bits = 16
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of handles to preallocate room for.
    pub capacity: usize,
    pub index: IndexStrategy,
}

impl StoreConfig {
    /// Loads the configuration from a file layered with `FACTBASE__*` environment
    /// overrides (`FACTBASE__CAPACITY=4096`).
    ///
    /// The file format follows its extension. Without a path, `factbase` in the working
    /// directory is used.
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] if the file is missing or does not deserialize
    /// into a [`StoreConfig`], and [`StoreError::InvalidConfig`] if the loaded values
    /// are out of range.
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self> {
        let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

        info!(path = %path.display(), "Loading store config");

        let config = Config::builder()
            .add_source(File::from(path.as_path()).required(true))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()
            .context("Failed to build store config")?
            .try_deserialize::<Self>()
            .context("Failed to deserialize store config")?;

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`StoreError::InvalidConfig`] if the derived key width exceeds 32 bits.
    pub fn validate(&self) -> Result<()> {
        self.index.derived_key().map(|_| ())
    }
}
