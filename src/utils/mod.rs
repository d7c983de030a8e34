pub mod error;

pub use error::{PatternSyntaxKind, Result, SweepError};
