pub mod logger;
pub mod styles;

pub(crate) static CHECK: &str = "✔";
pub(crate) static MARK: &str = "✘";
pub(crate) static WARN: &str = "!";
