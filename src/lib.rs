//! Crate root: wires together the compilation pipeline.
//!
//! - `tokenizer` scans source text into tokens on demand.
//! - `parser` builds the arena-backed tree in `ast`, using the value types in `ty`.
//! - `typeck` resolves names in two passes and annotates expression types.
//! - `codegen` lowers the checked tree into Intel-syntax x86-64 assembly.
//! - `session` carries diagnostics and the target platform through every phase.
//! - `error` holds the diagnostic and fatal error types.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod session;
pub mod tokenizer;
pub mod ty;
pub mod typeck;

pub use error::{CompileError, CompileResult, Diagnostic};
pub use session::{CompileOptions, Platform, Session};

use error::HaltedSnafu;

/// Compile a source file's text into assembly.
///
/// Each phase runs to completion and reports everything it finds; the
/// pipeline stops with [`CompileError::Halted`] after the first phase that
/// reported anything.
pub fn generate_assembly(source: &str, options: CompileOptions) -> CompileResult<String> {
  let mut session = Session::new(options);

  let mut program = parser::parse(source, &mut session);
  halt_on_errors(&mut session)?;

  typeck::check(&mut program, &mut session);
  halt_on_errors(&mut session)?;

  let asm = codegen::generate(&program, &mut session)?;
  halt_on_errors(&mut session)?;
  Ok(asm)
}

fn halt_on_errors(session: &mut Session) -> CompileResult<()> {
  if session.has_errors() {
    return HaltedSnafu {
      diagnostics: session.take_diagnostics(),
    }
    .fail();
  }
  Ok(())
}
