use factbase_derive::store_error;
use std::borrow::Cow;

#[store_error]
pub enum DemoError {
    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Missing entry{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn port(raw: &str) -> Result<u16> {
    raw.parse::<u16>().context("Reading port")
}

fn lookup() -> Result<()> {
    Err(DemoError::Missing { message: "key".into(), context: None })
}

fn main() {
    let err = port("eighty").unwrap_err();
    assert!(err.to_string().starts_with("Parse failure (Reading port): "));

    let err = lookup().context("Resolving alias").unwrap_err();
    assert_eq!(err.to_string(), "Missing entry (Resolving alias): key");
}
