//! Puffs C backend: orchestrates the full generation pipeline.
//!
//! ```text
//! Package JSON → Package → C Codegen → Formatter → .c/.h text
//! ```
//!
//! The front end (parser, type checker, constant folder) lives elsewhere
//! and hands over resolved [`Package`] documents. This crate turns one
//! package into one formatted C file, or one error and no output.

pub mod config;
pub mod error;
pub mod format;

use puffs_types::ast::Package;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

pub use config::{CompilerConfig, FormatterConfig};
pub use error::CompileError;
pub use format::{ClangFormat, FormatError, Formatter, Unformatted};
pub use puffs_cgen::GenOptions;

/// Compile a package to formatted C using `config`.
pub fn compile(pkg: &Package, config: &CompilerConfig) -> Result<String, CompileError> {
    let formatter = config.formatter();
    compile_with(pkg, &config.gen, formatter.as_ref())
}

/// Compile a package to C, normalizing the text with `formatter`.
#[tracing::instrument(skip_all, fields(package = %pkg.name))]
pub fn compile_with(
    pkg: &Package,
    options: &GenOptions,
    formatter: &dyn Formatter,
) -> Result<String, CompileError> {
    let source = puffs_cgen::generate_with_options(pkg, options)?;
    let formatted = formatter.format(&source)?;
    info!(bytes = formatted.len(), "compiled");
    Ok(formatted)
}

/// Compile a package and package the outcome as a serializable record.
pub fn compile_to_result(pkg: &Package, config: &CompilerConfig) -> CompileResult {
    CompileResult::from_outcome(&pkg.name, compile(pkg, config))
}

/// The outcome of one compilation, for tools that want JSON rather than a
/// process exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    pub package: String,
    /// The generated C file, on success.
    pub source: Option<String>,
    /// Hex SHA-256 of `source`, on success.
    pub sha256: Option<String>,
    /// On failure, the error category and message.
    pub error: Option<CompileErrorInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileErrorInfo {
    pub kind: String,
    pub message: String,
}

impl CompileResult {
    pub fn from_outcome(package: &str, outcome: Result<String, CompileError>) -> Self {
        match outcome {
            Ok(source) => Self {
                success: true,
                package: package.to_string(),
                sha256: Some(sha256_hex(&source)),
                source: Some(source),
                error: None,
            },
            Err(e) => Self {
                success: false,
                package: package.to_string(),
                source: None,
                sha256: None,
                error: Some(CompileErrorInfo {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

/// Lowercase hex SHA-256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
