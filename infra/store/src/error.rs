use std::borrow::Cow;

/// A specialized [`StoreError`] enum of this crate.
#[factbase_derive::store_error]
pub enum StoreError {
    /// The handle is not tracked by the store.
    #[error("Handle not tracked{}: {message}", format_context(.context))]
    HandleNotTracked { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A configuration value is out of range.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}
