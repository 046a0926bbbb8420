//! Puffs C code generator: compiles a type-checked package to one C file.
//!
//! # Architecture
//!
//! The generator takes a resolved [`puffs_types::ast::Package`] and produces
//! a single self-contained text that serves as both a C header and its
//! implementation. Everything above the `// C HEADER ENDS HERE.` marker is
//! the public interface; everything below is the implementation.
//!
//! ## Output sections, in order
//! - include guard, generated-code banner, base runtime header
//! - status codes (enum, `status_is_error`, `status_string` prototypes)
//! - public structs, public constructor/destructor and function prototypes
//! - base runtime implementation, status code implementations
//! - private structs, private prototypes
//! - constructor/destructor implementations, function implementations
//!
//! ## ABI
//!
//! Suspendible structs begin with a `status` then a `magic` field. The
//! constructor checks the caller's version token, zeroes the struct unless
//! told it is already zeroed, stamps [`layout::MAGIC`], and applies field
//! defaults. Status codes are non-positive; the low bit marks an error.
//! See [`layout`] and [`status`].
//!
//! Formatting the output is left to the caller (see the `puffs-gen-c`
//! crate); this crate only guarantees a syntactically complete text.

/// Append formatted text to a [`buffer::Buffer`].
macro_rules! printf {
    ($buf:expr, $($arg:tt)*) => {
        $buf.push_fmt(format_args!($($arg)*))
    };
}

pub mod buffer;
pub mod compiler;
pub mod error;
pub mod expr;
pub mod jump;
pub mod layout;
pub mod options;
pub mod runtime;
pub mod scan;
pub mod status;
pub mod stmt;
pub mod types;

pub use compiler::{generate, generate_with_options};
pub use error::{CodegenError, CodegenResult, NestingKind};
pub use options::GenOptions;
