//! Shared source-location and error types

mod span;
mod error;

pub use span::Span;
pub use error::{Error, Result};
