use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use poloc::error::{ReadInputSnafu, UsageSnafu, WriteOutputSnafu};
use poloc::{CompileError, CompileOptions, CompileResult, generate_assembly};
use snafu::ResultExt;

/// Install a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
  use tracing_subscriber::{EnvFilter, fmt, prelude::*};

  if env::var("RUST_LOG").is_ok() {
    tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
      .with(EnvFilter::from_default_env())
      .init();
  }
}

/// `foo.polo` compiles to `foo.s` next to it.
fn output_path(input: &Path) -> PathBuf {
  input.with_extension("s")
}

fn run(args: &[String]) -> CompileResult<()> {
  let [_, input] = args else {
    let program = args.first().map(String::as_str).unwrap_or("poloc");
    return UsageSnafu { program }.fail();
  };

  let input = Path::new(input);
  let source = fs::read_to_string(input).context(ReadInputSnafu { path: input })?;
  let options = CompileOptions::from_env()?;
  tracing::debug!(input = %input.display(), platform = %options.platform, "compiling");

  let asm = generate_assembly(&source, options)?;

  let output = output_path(input);
  fs::write(&output, asm).context(WriteOutputSnafu { path: &output })?;
  Ok(())
}

fn main() {
  init_tracing();

  let args: Vec<String> = env::args().collect();
  if let Err(err) = run(&args) {
    match &err {
      CompileError::Halted { diagnostics } => {
        for diagnostic in diagnostics {
          eprintln!("{diagnostic}");
        }
      }
      _ => eprintln!("Error: {err}"),
    }
    process::exit(1);
  }
}
