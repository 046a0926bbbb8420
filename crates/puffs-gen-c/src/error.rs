use puffs_cgen::CodegenError;
use puffs_types::PackageError;
use thiserror::Error;

use crate::format::FormatError;

/// Errors from one compilation run. Any of them means no output.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The input documents could not be combined into one package.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Code generation rejected the package.
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// The external formatter failed.
    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),

    /// A config file could not be read or parsed.
    #[error("invalid config {path}: {message}")]
    Config { path: String, message: String },
}

impl CompileError {
    /// A short machine-readable category, used in [`crate::CompileResult`].
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Package(_) => "package",
            CompileError::Codegen(_) => "codegen",
            CompileError::Format(_) => "format",
            CompileError::Config { .. } => "config",
        }
    }
}
