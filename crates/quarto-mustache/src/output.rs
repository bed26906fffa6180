/*
 * output.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The output side of a render: the caller's sink plus partial indentation.
//!
//! A standalone partial tag contributes the whitespace in front of it to the
//! indentation prefix. After every newline that comes from template text the
//! prefix becomes pending and is written just before the next output byte, so
//! lines that end up empty (standalone tags) never receive stray indentation.
//! Newlines inside interpolated values do not make the prefix pending.

use crate::error::MustacheResult;
use std::io::Write;

/// Indentation state that survives across `render_some` calls.
#[derive(Debug, Clone)]
pub(crate) struct Indentation {
    prefix: Vec<u8>,
    pending: bool,
}

impl Indentation {
    /// Start of output is the start of a line.
    pub(crate) fn new() -> Self {
        Self {
            prefix: Vec::new(),
            pending: true,
        }
    }
}

/// Writes rendered bytes, in document order, to the caller's sink.
pub(crate) struct Output<'r> {
    sink: &'r mut dyn Write,
    indentation: &'r mut Indentation,
}

impl<'r> Output<'r> {
    pub(crate) fn new(sink: &'r mut dyn Write, indentation: &'r mut Indentation) -> Self {
        Self { sink, indentation }
    }

    /// Write bytes, preceded by the indentation prefix if one is pending.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> MustacheResult<()> {
        if self.indentation.pending {
            self.indentation.pending = false;
            if !self.indentation.prefix.is_empty() {
                self.sink.write_all(&self.indentation.prefix)?;
            }
        }
        if !bytes.is_empty() {
            self.sink.write_all(bytes)?;
        }
        Ok(())
    }

    /// Write a template line terminator; the next line starts indented.
    pub(crate) fn newline(&mut self) -> MustacheResult<()> {
        self.write(b"\n")?;
        self.indentation.pending = true;
        Ok(())
    }

    /// Current prefix length, to pass back to [`Output::restore_indent`].
    pub(crate) fn indent_mark(&self) -> usize {
        self.indentation.prefix.len()
    }

    /// Extend the prefix for the duration of a standalone partial.
    pub(crate) fn push_indent(&mut self, whitespace: &[u8]) {
        self.indentation.prefix.extend_from_slice(whitespace);
    }

    pub(crate) fn restore_indent(&mut self, mark: usize) {
        self.indentation.prefix.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_writes() {
        let mut sink = Vec::new();
        let mut indentation = Indentation::new();
        let mut out = Output::new(&mut sink, &mut indentation);
        out.write(b"a").unwrap();
        out.newline().unwrap();
        out.write(b"b").unwrap();
        assert_eq!(sink, b"a\nb");
    }

    #[test]
    fn test_prefix_after_template_newlines_only() {
        let mut sink = Vec::new();
        let mut indentation = Indentation::new();
        let mut out = Output::new(&mut sink, &mut indentation);
        out.push_indent(b"  ");
        out.write(b"one").unwrap();
        out.write(b"\ndata").unwrap();
        out.newline().unwrap();
        out.write(b"two").unwrap();
        assert_eq!(sink, b"  one\ndata\n  two");
    }

    #[test]
    fn test_pending_prefix_is_dropped_when_nothing_follows() {
        let mut sink = Vec::new();
        let mut indentation = Indentation::new();
        let mut out = Output::new(&mut sink, &mut indentation);
        let mark = out.indent_mark();
        out.push_indent(b"    ");
        out.write(b"x").unwrap();
        out.newline().unwrap();
        out.restore_indent(mark);
        out.write(b"y").unwrap();
        assert_eq!(sink, b"    x\ny");
    }
}
