//! Jump target allocation and recursion caps.
//!
//! Loops that are the target of a `break` or `continue` get a numeric jump
//! target, used to spell their `label_<n>_break` / `label_<n>_continue`
//! C labels. Numbers are handed out lazily, starting at 0, in the order
//! the translator first needs them, and restart for every function.

/// Cap on jump targets per function.
pub const MAX_JUMP_TARGETS: u32 = 1_000_000;
/// Cap on statement nesting; top-level statements are at depth 1.
pub const MAX_BODY_DEPTH: u32 = 255;
/// Cap on subexpression nesting within one statement-level expression.
pub const MAX_EXPR_DEPTH: u32 = 255;

/// Per-function map from loop index to jump target.
#[derive(Debug, Clone)]
pub struct JumpTargets {
    ids: Vec<Option<u32>>,
    next: u32,
    limit: u32,
}

impl JumpTargets {
    pub fn new(loop_count: usize) -> Self {
        Self::with_limit(loop_count, MAX_JUMP_TARGETS)
    }

    pub fn with_limit(loop_count: usize, limit: u32) -> Self {
        Self {
            ids: vec![None; loop_count],
            next: 0,
            limit,
        }
    }

    /// The jump target of loop `index`, allocating one on first use.
    ///
    /// Returns `None` once the per-function cap is exhausted.
    pub fn get(&mut self, index: usize) -> Option<u32> {
        if let Some(id) = self.ids[index] {
            return Some(id);
        }
        if self.next >= self.limit {
            return None;
        }
        let id = self.next;
        self.next += 1;
        self.ids[index] = Some(id);
        Some(id)
    }
}
