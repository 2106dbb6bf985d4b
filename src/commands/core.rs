//! Core command traits.
//!
//! A [`CommandWithOutput`] does the work and returns a value. [`CommandWithOutputExt`] turns it
//! into a [`Command`] that renders the value in the requested [`Format`] on stdout, which is what
//! the dispatcher hands to `main`.
use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::formatting::{Format, Formattable};

/// A unit of work run by `main`.
#[async_trait]
pub trait Command {
    async fn execute(&mut self) -> Result<()>;
}

/// A command producing a value to print.
#[async_trait]
pub trait CommandWithOutput {
    type Output;

    async fn execute(&mut self) -> Result<Self::Output>;
}

pub trait CommandWithOutputExt {
    /// Wrap the command so that its output is formatted with `format` and printed to stdout.
    fn with_print_to_stdout(self, format: Format) -> Result<Box<dyn Command>>;
}

struct PrintOutput<C> {
    command: C,
    format: Format,
}

#[async_trait]
impl<C> Command for PrintOutput<C>
where
    C: CommandWithOutput + Send,
    C::Output: Formattable + Send,
{
    async fn execute(&mut self) -> Result<()> {
        let output = self.command.execute().await?;
        let rendered = output.format(&self.format)?;

        write_rendered(&mut std::io::stdout().lock(), &rendered).context("writing output")
    }
}

/// Write rendered output, ending it with exactly the newline the renderer did not add.
fn write_rendered(out: &mut impl Write, rendered: &str) -> std::io::Result<()> {
    out.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

impl<C> CommandWithOutputExt for C
where
    C: CommandWithOutput + Send + 'static,
    C::Output: Formattable + Send + 'static,
{
    fn with_print_to_stdout(self, format: Format) -> Result<Box<dyn Command>> {
        Ok(Box::new(PrintOutput {
            command: self,
            format,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_rendered_adds_missing_newline() {
        let mut out = Vec::new();
        write_rendered(&mut out, "Cluster available.").unwrap();
        assert_eq!(out, b"Cluster available.\n");
    }

    #[test]
    fn test_write_rendered_keeps_template_newline() {
        let mut out = Vec::new();
        write_rendered(&mut out, "ID    NAME\n").unwrap();
        assert_eq!(out, b"ID    NAME\n");
    }
}
