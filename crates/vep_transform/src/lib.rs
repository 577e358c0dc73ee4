//! # vep_transform
//!
//! Stateless data shaping helpers over [`serde_json::Value`]. Virtual endpoint scripts see
//! them as `context.utils`; the script runtime reaches them through [`dispatch`].
//!
//! Every helper tolerates `null` or wrong-typed input and answers with a neutral value
//! (`{}`, `[]`, `""`, `0`, `false`, `null`) rather than an error.

pub mod array;
pub mod date;
mod dispatch;
pub mod encoding;
pub mod http;
pub mod math;
pub mod object;
pub mod path;
pub mod string;
pub mod validate;

pub use array::{KeySelector, SortOrder};
pub use dispatch::{HELPERS, TransformError, computed, dispatch, key_selector};
