//! Per-run compilation context.
//!
//! A `Session` is threaded through every phase. It owns the diagnostics
//! reported so far and the platform that `target` attributes are compared
//! against, so nothing about one compilation leaks into another.

use std::fmt;

use crate::error::{CompileResult, Diagnostic, UnknownPlatformSnafu};

/// Environment variable that overrides the host platform.
pub const TARGET_ENV: &str = "POLO_TARGET";

/// Operating systems the generator knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  Linux,
  MacOS,
  Windows,
}

impl Platform {
  /// The platform this compiler was built for.
  pub fn host() -> Self {
    if cfg!(target_os = "windows") {
      Self::Windows
    } else if cfg!(target_os = "macos") {
      Self::MacOS
    } else {
      Self::Linux
    }
  }

  /// Spelling used by `#!(target = "...")` attributes.
  pub fn name(self) -> &'static str {
    match self {
      Self::Linux => "Linux",
      Self::MacOS => "MacOS",
      Self::Windows => "Windows",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    [Self::Linux, Self::MacOS, Self::Windows]
      .into_iter()
      .find(|platform| platform.name() == name)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Knobs that select how a compilation run behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
  pub platform: Platform,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self {
      platform: Platform::host(),
    }
  }
}

impl CompileOptions {
  pub fn for_platform(platform: Platform) -> Self {
    Self { platform }
  }

  /// Host defaults, overridden by `POLO_TARGET` when it is set.
  pub fn from_env() -> CompileResult<Self> {
    match std::env::var(TARGET_ENV) {
      Ok(name) => {
        let platform = Platform::from_name(&name).ok_or_else(|| {
          UnknownPlatformSnafu { name: name.clone() }.build()
        })?;
        Ok(Self { platform })
      }
      Err(_) => Ok(Self::default()),
    }
  }
}

/// Diagnostics sink plus the target platform for one compilation.
#[derive(Debug)]
pub struct Session {
  platform: Platform,
  diagnostics: Vec<Diagnostic>,
}

impl Session {
  pub fn new(options: CompileOptions) -> Self {
    Self {
      platform: options.platform,
      diagnostics: Vec::new(),
    }
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  /// Record an error; the calling phase keeps going.
  pub fn report(&mut self, message: impl Into<String>, line: usize, col: usize) {
    let diagnostic = Diagnostic::new(message, line, col);
    tracing::debug!(%diagnostic, "reported");
    self.diagnostics.push(diagnostic);
  }

  pub fn has_errors(&self) -> bool {
    !self.diagnostics.is_empty()
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
    std::mem::take(&mut self.diagnostics)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn platform_names_round_trip() {
    for platform in [Platform::Linux, Platform::MacOS, Platform::Windows] {
      assert_eq!(Platform::from_name(platform.name()), Some(platform));
    }
    assert_eq!(Platform::from_name("Plan9"), None);
  }

  #[test]
  fn reporting_sets_the_error_state() {
    let mut session = Session::new(CompileOptions::for_platform(Platform::Linux));
    assert!(!session.has_errors());
    session.report("Unexpected token: }", 2, 5);
    assert!(session.has_errors());
    assert_eq!(session.diagnostics()[0].line, 2);
    assert_eq!(session.take_diagnostics().len(), 1);
    assert!(!session.has_errors());
  }
}
