use std::io::{self, Write};

use crate::CompileError;

/// Renders errors against the source text of one compilation run.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics<'a> {
    source: &'a str,
}

impl<'a> Diagnostics<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Positional errors become
    ///
    /// ```text
    /// 1 # 2
    ///   ^ invalid token
    /// ```
    ///
    /// anything else is just the message.
    pub fn render(&self, err: &CompileError) -> String {
        match err.offset() {
            Some(offset) => self.error_at(offset, &err.to_string()),
            None => err.to_string(),
        }
    }

    pub fn report<W: Write>(&self, err: &CompileError, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.render(err))
    }

    fn error_at(&self, offset: usize, msg: &str) -> String {
        format!("{}\n{: <width$}^ {}", self.source, "", msg, width = offset)
    }
}
