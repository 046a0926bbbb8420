use thiserror::Error;

/// Errors raised while assembling a [`Package`](crate::ast::Package) from
/// front-end documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    /// Two documents claim different package names.
    #[error("package name mismatch: expected {expected:?}, found {found:?}")]
    PackageMismatch { expected: String, found: String },

    /// Two documents of the same package carry different identifier tables.
    #[error("identifier table mismatch in package {package:?}")]
    IdTableMismatch { package: String },

    /// The identifier table itself is malformed.
    #[error("malformed identifier table: {0}")]
    MalformedIdTable(String),
}
