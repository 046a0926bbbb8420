//! Status codes.
//!
//! Every generated package exposes the same seven built-in statuses. The
//! status at index `i` has the value `-2 * i`, plus one when it is an error,
//! so every value is non-positive and the low bit alone answers
//! "is this an error?". Statuses whose name starts with `status_` are
//! recoverable; those starting with `error_` are not.

use crate::buffer::Buffer;

/// The built-in statuses, in value order.
pub const BUILT_IN_STATUSES: [&str; 7] = [
    "status_ok",
    "error_bad_version",
    "error_bad_receiver",
    "error_bad_argument",
    "error_constructor_not_called",
    "status_short_dst",
    "status_short_src",
];

pub const STATUS_OK: &str = BUILT_IN_STATUSES[0];
pub const ERROR_BAD_VERSION: &str = BUILT_IN_STATUSES[1];
pub const ERROR_BAD_RECEIVER: &str = BUILT_IN_STATUSES[2];
pub const ERROR_BAD_ARGUMENT: &str = BUILT_IN_STATUSES[3];
pub const ERROR_CONSTRUCTOR_NOT_CALLED: &str = BUILT_IN_STATUSES[4];

/// One status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub index: usize,
    pub name: &'static str,
}

impl Status {
    pub fn is_error(&self) -> bool {
        self.name.starts_with("error_")
    }

    /// The numeric value of this status in C.
    pub fn value(&self) -> i64 {
        -2 * self.index as i64 + i64::from(self.is_error())
    }

    /// The enum initializer as written in C, e.g. `-2+1`.
    pub fn initializer(&self) -> String {
        let base = -2 * self.index as i64;
        if self.is_error() {
            format!("{base}+1")
        } else {
            base.to_string()
        }
    }

    /// Human-readable message: `"pkg: bad version"`.
    pub fn message(&self, pkg: &str) -> String {
        let bare = self
            .name
            .strip_prefix("status_")
            .or_else(|| self.name.strip_prefix("error_"))
            .unwrap_or(self.name);
        format!("{pkg}: {}", bare.replace('_', " "))
    }
}

/// All built-in statuses in value order.
pub fn statuses() -> impl Iterator<Item = Status> {
    BUILT_IN_STATUSES
        .into_iter()
        .enumerate()
        .map(|(index, name)| Status { index, name })
}

// ── Emission ─────────────────────────────────────────────────────────────────

/// The enum and helper prototypes; part of the header.
pub fn write_status_decls(out: &mut Buffer, pkg: &str) {
    out.writes("// ---------------- Status Codes\n\n");
    out.writes("// Status codes are non-positive integers.\n");
    out.writes("//\n");
    out.writes(
        "// The least significant bit indicates a non-recoverable status code: an error.\n",
    );
    out.writes("typedef enum {\n");
    for s in statuses() {
        printf!(out, "puffs_{pkg}_{} = {},\n", s.name, s.initializer());
    }
    printf!(out, "}} puffs_{pkg}_status;\n\n");
    printf!(out, "bool puffs_{pkg}_status_is_error(puffs_{pkg}_status s);\n\n");
    printf!(out, "const char* puffs_{pkg}_status_string(puffs_{pkg}_status s);\n\n");
}

/// The message table and helper bodies; part of the implementation.
pub fn write_status_impls(out: &mut Buffer, pkg: &str) {
    out.writes("// ---------------- Status Codes Implementations\n\n");
    printf!(
        out,
        "bool puffs_{pkg}_status_is_error(puffs_{pkg}_status s) {{\nreturn s & 1;\n}}\n\n"
    );
    printf!(
        out,
        "const char* puffs_{pkg}_status_strings[{}] = {{\n",
        BUILT_IN_STATUSES.len()
    );
    for s in statuses() {
        printf!(out, "{:?},\n", s.message(pkg));
    }
    out.writes("};\n\n");
    printf!(
        out,
        "const char* puffs_{pkg}_status_string(puffs_{pkg}_status s) {{\n\
         s = -(s >> 1);\n\
         if ((0 <= s) && (s < {})) {{\n\
         return puffs_{pkg}_status_strings[s];\n\
         }}\n\
         return \"\";\n\
         }}\n\n",
        BUILT_IN_STATUSES.len()
    );
}
