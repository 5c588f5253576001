use crate::collectors::layout::Layout;
use crate::error::{CheckError, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::process::Command;
use std::str::Lines;

/// Runs `df` with the given arguments and returns its stdout.
pub trait DfRunner {
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// An external `df` binary, `df` on `$PATH` by default.
pub struct DfCommand {
    pub program: PathBuf,
}

impl Default for DfCommand {
    fn default() -> Self {
        Self { program: PathBuf::from("df") }
    }
}

impl DfRunner for DfCommand {
    fn run(&self, args: &[&str]) -> Result<String> {
        let cmd = format!("{} {}", self.program.display(), args.join(" "));
        let out = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| CheckError::acquisition(format!("cannot run {}: {}", cmd, e)))?;

        let text = String::from_utf8_lossy(&out.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(CheckError::acquisition(format!(
                "{} produced no output ({})",
                cmd,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        // GNU df exits 1 when a single mount is unreadable but still lists the rest.
        if !out.status.success() {
            warn!("{} exited with {}: {}", cmd, out.status,
                String::from_utf8_lossy(&out.stderr).trim());
        }
        Ok(text)
    }
}

pub(crate) fn is_number(token: &str) -> bool {
    token.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

/// Lazily yields one token list per logical `df` row.
///
/// The header line is dropped. A device name too long for its column is
/// printed alone and its numbers follow on the next line; such pairs are
/// joined back into one row. A lone name followed by anything other than a
/// numeric continuation is discarded.
pub struct DfRows<'a> {
    lines:   Lines<'a>,
    layout:  Layout,
    pending: Option<&'a str>,
}

pub fn parse_rows(output: &str, layout: Layout) -> DfRows<'_> {
    let mut lines = output.lines();
    lines.next(); // header
    DfRows { lines, layout, pending: None }
}

impl<'a> DfRows<'a> {
    /// A wrapped row starts with the first numeric column, or with the type
    /// column when the layout prints one.
    fn is_continuation(&self, tokens: &[&str]) -> bool {
        tokens.get(self.layout.numeric_start() - 1).is_some_and(|t| is_number(t))
    }
}

impl<'a> Iterator for DfRows<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            let mut tokens: Vec<&'a str> = line.split_whitespace().collect();

            match tokens.len() {
                0 => continue,
                1 => {
                    if let Some(dropped) = self.pending.replace(tokens[0]) {
                        debug!("df: dropping dangling device name {}", dropped);
                    }
                    continue;
                }
                _ => {}
            }

            if let Some(name) = self.pending.take() {
                if self.is_continuation(&tokens) {
                    tokens.insert(0, name);
                } else {
                    debug!("df: dropping dangling device name {}", name);
                }
            }
            return Some(tokens);
        }
    }
}
