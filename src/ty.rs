//! Source-level value types.
//!
//! A `Type` is an immutable value: a scalar kind plus independent pointer and
//! array flags. Equality is structural over exactly those three parts, so no
//! numeric promotion ever happens implicitly.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
  I8,
  I16,
  I32,
  I64,
  U8,
  U16,
  U32,
  U64,
  F32,
  F64,
  Bool,
  Str,
  Void,
  /// Unresolved or deliberately unconstrained.
  Any,
}

impl TypeKind {
  pub fn from_name(name: &str) -> Option<Self> {
    let kind = match name {
      "i8" => Self::I8,
      "i16" => Self::I16,
      "i32" => Self::I32,
      "i64" => Self::I64,
      "u8" => Self::U8,
      "u16" => Self::U16,
      "u32" => Self::U32,
      "u64" => Self::U64,
      "f32" => Self::F32,
      "f64" => Self::F64,
      "bool" => Self::Bool,
      "str" => Self::Str,
      "void" => Self::Void,
      "@any" => Self::Any,
      _ => return None,
    };
    Some(kind)
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::I8 => "i8",
      Self::I16 => "i16",
      Self::I32 => "i32",
      Self::I64 => "i64",
      Self::U8 => "u8",
      Self::U16 => "u16",
      Self::U32 => "u32",
      Self::U64 => "u64",
      Self::F32 => "f32",
      Self::F64 => "f64",
      Self::Bool => "bool",
      Self::Str => "str",
      Self::Void => "void",
      Self::Any => "@any",
    }
  }

  pub fn is_integer(self) -> bool {
    self.is_signed() || self.is_unsigned()
  }

  pub fn is_signed(self) -> bool {
    matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
  }

  pub fn is_unsigned(self) -> bool {
    matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
  }

  pub fn is_float(self) -> bool {
    matches!(self, Self::F32 | Self::F64)
  }

  pub fn is_numeric(self) -> bool {
    self.is_integer() || self.is_float()
  }

  /// Byte width of a value of this kind; zero for `void` and `@any`.
  pub fn size(self) -> usize {
    match self {
      Self::Bool | Self::I8 | Self::U8 => 1,
      Self::I16 | Self::U16 => 2,
      Self::I32 | Self::U32 | Self::F32 => 4,
      Self::I64 | Self::U64 | Self::F64 | Self::Str => 8,
      Self::Void | Self::Any => 0,
    }
  }
}

/// Named field of a structural type.
#[derive(Debug, Clone)]
pub struct Field {
  pub name: String,
  pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Type {
  pub kind: TypeKind,
  pub is_pointer: bool,
  pub is_array: bool,
  pub name: String,
  /// Operand type when this pointer was produced by taking an address.
  pub base: Option<Box<Type>>,
  /// Field list for structural types; never consulted by equality.
  pub fields: Option<Vec<Field>>,
}

impl PartialEq for Type {
  fn eq(&self, other: &Self) -> bool {
    self.kind == other.kind
      && self.is_pointer == other.is_pointer
      && self.is_array == other.is_array
  }
}

impl Eq for Type {}

impl Type {
  pub fn scalar(kind: TypeKind) -> Self {
    Self {
      kind,
      is_pointer: false,
      is_array: false,
      name: kind.name().to_string(),
      base: None,
      fields: None,
    }
  }

  pub fn i32() -> Self {
    Self::scalar(TypeKind::I32)
  }

  pub fn bool() -> Self {
    Self::scalar(TypeKind::Bool)
  }

  pub fn str() -> Self {
    Self::scalar(TypeKind::Str)
  }

  pub fn void() -> Self {
    Self::scalar(TypeKind::Void)
  }

  /// Type for a name the scalar table does not know, e.g. a struct name.
  pub fn unresolved(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Self::scalar(TypeKind::Any)
    }
  }

  /// Structural aggregate with named fields.
  pub fn structure(name: impl Into<String>, fields: Vec<Field>) -> Self {
    Self {
      name: name.into(),
      fields: Some(fields),
      ..Self::scalar(TypeKind::Any)
    }
  }

  /// Resolve a source spelling such as `i64`; unknown names stay unresolved.
  pub fn from_name(name: &str) -> Self {
    match TypeKind::from_name(name) {
      Some(kind) => Self::scalar(kind),
      None => Self::unresolved(name),
    }
  }

  /// Result of taking the address of a value of type `base`.
  pub fn pointer_to(base: Type) -> Self {
    Self {
      kind: base.kind,
      is_pointer: true,
      is_array: base.is_array,
      name: base.name.clone(),
      base: Some(Box::new(base)),
      fields: None,
    }
  }

  pub fn with_pointer(mut self, is_pointer: bool) -> Self {
    self.is_pointer = is_pointer;
    self
  }

  pub fn with_array(mut self, is_array: bool) -> Self {
    self.is_array = is_array;
    self
  }

  pub fn base(&self) -> Option<&Type> {
    self.base.as_deref()
  }

  /// Kind-only test: a `*bool` still counts as boolean.
  pub fn is_bool(&self) -> bool {
    self.kind == TypeKind::Bool
  }

  pub fn is_str(&self) -> bool {
    self.is_scalar() && self.kind == TypeKind::Str
  }

  /// Kind-only test, so pointer arithmetic such as `buf + 1` on a `*u8` is accepted.
  pub fn is_numeric(&self) -> bool {
    self.kind.is_numeric()
  }

  pub fn is_unsigned(&self) -> bool {
    self.is_scalar() && self.kind.is_unsigned()
  }

  fn is_scalar(&self) -> bool {
    !self.is_pointer && !self.is_array
  }

  pub fn size(&self) -> usize {
    if self.is_pointer {
      return 8;
    }
    self.kind.size()
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_pointer {
      f.write_str("*")?;
    }
    f.write_str(&self.name)?;
    if self.is_array {
      f.write_str("[]")?;
    }
    Ok(())
  }
}
