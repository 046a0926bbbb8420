//! Codegen error types.

use std::fmt;

use puffs_types::ast::JumpKind;
use puffs_types::Span;
use thiserror::Error;

/// Which recursion a depth cap applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingKind {
    /// Statement bodies nested inside loops.
    Body,
    /// Subexpressions within a single statement-level expression.
    Expression,
}

impl fmt::Display for NestingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestingKind::Body => f.write_str("body"),
            NestingKind::Expression => f.write_str("expression"),
        }
    }
}

/// Errors that can occur during C code generation.
///
/// Every variant names the offending construct and where it was found.
/// Generation stops at the first error; no partial output is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A type has no C rendering (slices, tables, user-named types).
    #[error("cannot convert Puffs type {ty:?} to C (in {context})")]
    UnsupportedType { ty: String, context: String },

    /// A type wraps more `ptr` layers than the generator allows.
    #[error("cannot convert Puffs type {ty:?} to C: too many ptr's (in {context})")]
    TooManyPointers { ty: String, context: String },

    /// A statement or expression form the C backend does not translate.
    #[error("cannot convert Puffs {construct} to C (in {context} at {span})")]
    Unsupported {
        construct: String,
        context: String,
        span: Span,
    },

    /// An array length or field default was not folded to a constant.
    #[error("{what} must be a constant expression (in {context} at {span})")]
    NonConstant {
        what: &'static str,
        context: String,
        span: Span,
    },

    /// Only suspendible functions may be methods.
    #[error("cannot convert Puffs function \"{receiver}.{func}\" to C: only suspendible functions may have a receiver")]
    IllegalReceiver { receiver: String, func: String },

    /// A `break` or `continue` with no matching enclosing loop.
    #[error("{kind}{} has no enclosing loop (in function {func} at {span})", label_suffix(.label))]
    UnresolvedJump {
        kind: JumpKind,
        label: Option<String>,
        func: String,
        span: Span,
    },

    /// The per-function jump target counter overflowed.
    #[error("too many jump targets in function {func}")]
    TooManyJumpTargets { func: String },

    /// Statement or expression nesting exceeded its cap.
    #[error("{kind} recursion depth too large in function {func}")]
    NestingTooDeep { kind: NestingKind, func: String },

    /// An identifier handle has no entry in the package's table.
    #[error("identifier handle {id} is not in the identifier table")]
    UnknownIdentifier { id: u32 },

    /// The package name cannot be spliced into C identifiers.
    #[error("package name {name:?} is not a valid C identifier fragment")]
    InvalidPackageName { name: String },

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),
}

fn label_suffix(label: &Option<String>) -> String {
    match label {
        Some(l) => format!(" to label {l:?}"),
        None => String::new(),
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_jump_mentions_label() {
        let err = CodegenError::UnresolvedJump {
            kind: JumpKind::Break,
            label: Some("outer".into()),
            func: "decoder.decode".into(),
            span: Span::point(3, 5),
        };
        let msg = err.to_string();
        assert!(msg.contains("to label \"outer\""), "{msg}");
        assert!(msg.contains("3:5"), "{msg}");
    }

    #[test]
    fn nesting_message_names_the_kind() {
        let err = CodegenError::NestingTooDeep {
            kind: NestingKind::Expression,
            func: "f".into(),
        };
        assert_eq!(err.to_string(), "expression recursion depth too large in function f");
    }
}
