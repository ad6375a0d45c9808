//! Rendering of a [`GeneratedUnit`] into source text.
//!
//! The [`Renderer`] trait is the seam between synthesis and output. The
//! only implementation today is [`TypeScriptRenderer`].

mod typescript;

pub use typescript::TypeScriptRenderer;

use crate::ir::GeneratedUnit;

/// Turns a generated unit into the text of one source file.
///
/// Rendering is pure: the same unit always yields byte-identical text.
pub trait Renderer {
    fn render(&self, unit: &GeneratedUnit) -> String;
}

/// Appends lines at the current indentation level.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    buf: String,
    level: usize,
    indent: &'static str,
}

impl CodeWriter {
    pub(crate) fn new(indent: &'static str) -> Self {
        Self {
            buf: String::new(),
            level: 0,
            indent,
        }
    }

    pub(crate) fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.level {
            self.buf.push_str(self.indent);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    pub(crate) fn indent(&mut self) {
        self.level += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Current indentation, for text built outside the writer.
    pub(crate) fn prefix(&self) -> String {
        self.indent.repeat(self.level)
    }

    pub(crate) fn finish(mut self) -> String {
        while self.buf.ends_with("\n\n") {
            self.buf.pop();
        }
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_indents_nested_lines() {
        let mut w = CodeWriter::new("  ");
        w.line("a {");
        w.indent();
        w.line("b;");
        w.dedent();
        w.line("}");
        assert_eq!(w.finish(), "a {\n  b;\n}\n");
    }

    #[test]
    fn writer_collapses_blank_lines() {
        let mut w = CodeWriter::new("  ");
        w.blank();
        w.line("a;");
        w.blank();
        w.blank();
        w.line("b;");
        w.blank();
        assert_eq!(w.finish(), "a;\n\nb;\n");
    }

    #[test]
    fn dedent_saturates() {
        let mut w = CodeWriter::new("  ");
        w.dedent();
        w.line("x");
        assert_eq!(w.prefix(), "");
        assert_eq!(w.finish(), "x\n");
    }
}
