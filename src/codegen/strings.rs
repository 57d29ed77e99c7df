//! Content-addressed pool of string literals for the read-only data section.

use rustc_hash::FxHashMap;

/// One label per distinct literal, in first-use order.
#[derive(Debug, Default)]
pub struct StringPool {
  labels: FxHashMap<String, usize>,
  entries: Vec<String>,
}

impl StringPool {
  pub fn new() -> Self {
    Self::default()
  }

  /// Label for `text`, allocating a new one on first sight.
  pub fn intern(&mut self, text: &str) -> String {
    let index = match self.labels.get(text) {
      Some(&index) => index,
      None => {
        let index = self.entries.len();
        self.labels.insert(text.to_string(), index);
        self.entries.push(text.to_string());
        tracing::trace!(index, "pooled string literal");
        index
      }
    };
    label(index)
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Append the `.rodata` section, or nothing for an empty pool.
  pub fn emit(&self, out: &mut String) {
    if self.is_empty() {
      return;
    }
    out.push_str("\n.section .rodata\n");
    for (index, text) in self.entries.iter().enumerate() {
      out.push_str(&format!("{}:\n", label(index)));
      out.push_str(&format!("    .string \"{}\"\n\n", escape(text)));
    }
  }
}

fn label(index: usize) -> String {
  format!(".L_str_{index}")
}

/// Escape literal bytes for a `.string` directive.
pub fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for byte in text.bytes() {
    match byte {
      b'"' => escaped.push_str("\\\""),
      b'\\' => escaped.push_str("\\\\"),
      b'\n' => escaped.push_str("\\n"),
      b'\r' => escaped.push_str("\\r"),
      b'\t' => escaped.push_str("\\t"),
      0x20..=0x7e => escaped.push(char::from(byte)),
      _ => escaped.push_str(&format!("\\{byte:03o}")),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let mut pool = StringPool::new();
    let first = pool.intern("same");
    let other = pool.intern("other");
    assert_eq!(pool.intern("same"), first);
    assert_eq!(first, ".L_str_0");
    assert_eq!(other, ".L_str_1");
    let mut out = String::new();
    pool.emit(&mut out);
    assert_eq!(out.matches(".string").count(), 2);
  }

  #[test]
  fn escapes_control_and_non_ascii_bytes() {
    assert_eq!(escape("a\"b\\c"), "a\\\"b\\\\c");
    assert_eq!(escape("hi\n\t\r"), "hi\\n\\t\\r");
    assert_eq!(escape("\u{1}"), "\\001");
    assert_eq!(escape("é"), "\\303\\251");
  }

  #[test]
  fn emits_rodata_only_when_used() {
    let mut out = String::new();
    StringPool::new().emit(&mut out);
    assert!(out.is_empty());

    let mut pool = StringPool::new();
    pool.intern("hi\n");
    pool.emit(&mut out);
    assert_eq!(out, "\n.section .rodata\n.L_str_0:\n    .string \"hi\\n\"\n\n");
  }
}
