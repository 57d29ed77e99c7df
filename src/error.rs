//! Shared error utilities used across the compilation pipeline.
//!
//! Two layers live here. `Diagnostic` is a recoverable, position-tagged
//! message collected by the [`Session`](crate::session::Session) while a phase
//! keeps running. `CompileError` is the fatal layer: I/O failures, a halted
//! pipeline, or an internal inconsistency in the generator.

use std::fmt;
use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// A source-level error reported at a line/column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub message: String,
  pub line: usize,
  pub col: usize,
}

impl Diagnostic {
  pub fn new(message: impl Into<String>, line: usize, col: usize) -> Self {
    Self {
      message: message.into(),
      line,
      col,
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Error: {} ({}:{})", self.message, self.line, self.col)
  }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
  #[snafu(display("usage: {program} <input_file>"))]
  Usage { program: String },

  #[snafu(display("unknown target platform \"{name}\""))]
  UnknownPlatform { name: String },

  #[snafu(display("Could not open file {}: {source}", path.display()))]
  ReadInput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("Could not write to file {}: {source}", path.display()))]
  WriteOutput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("compilation halted after {} error(s)", diagnostics.len()))]
  Halted { diagnostics: Vec<Diagnostic> },

  #[snafu(display("internal error: variable `{name}` has no stack slot ({line}:{col})"))]
  MissingSlot {
    name: String,
    line: usize,
    col: usize,
  },
}

impl CompileError {
  /// Diagnostics carried by a halted pipeline; empty for every other variant.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    match self {
      Self::Halted { diagnostics } => diagnostics,
      _ => &[],
    }
  }
}
