//! Shared types for the Puffs C backend.
//!
//! This crate defines the AST node types handed over by the front end,
//! the identifier table, source spans, and the package-assembly errors.

mod error;
mod ids;
mod span;
pub mod ast;
pub mod builder;

pub use builder::PackageBuilder;
pub use error::PackageError;
pub use ids::{Id, IdMap};
pub use span::Span;
