//! The append-only text buffer every emitter writes into.

use std::fmt::{self, Write};

/// Growable output text.
///
/// Writing to a `String` cannot fail, so unlike [`fmt::Write`] the methods
/// here return nothing.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    text: String,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn writeb(&mut self, c: char) {
        self.text.push(c);
    }

    /// Backs the crate's `printf!` macro.
    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>) {
        // String's fmt::Write impl never returns Err.
        let _ = self.text.write_fmt(args);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printf_appends_formatted_text() {
        let mut b = Buffer::new();
        b.writes("x");
        printf!(b, " = {};", 3);
        b.writeb('\n');
        assert_eq!(b.as_str(), "x = 3;\n");
        assert_eq!(b.len(), 7);
    }
}
