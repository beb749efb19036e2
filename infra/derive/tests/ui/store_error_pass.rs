use factbase_derive::store_error;
use std::borrow::Cow;

#[store_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Missing entry{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<()> {
    Err::<(), _>(std::io::Error::other("disk gone"))?;
    Ok(())
}

fn main() {
    let err = open().unwrap_err();
    assert!(matches!(err, DemoError::Io { context: None, .. }));
}
