//! Syntax tree produced by the parser.
//!
//! Nodes live in two arenas owned by [`Program`] and refer to their children
//! by index. Every child index is stored in exactly one parent, so the tree
//! has no sharing; the checker annotates expressions in place through
//! `Program::exprs`.

use std::ops::{Index, IndexMut};

use la_arena::{Arena, Idx};

use crate::session::Platform;
use crate::ty::{Field, Type, TypeKind};

pub type ExprId = Idx<Expr>;
pub type StmtId = Idx<Stmt>;

/// Line/column of the token a node starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
  pub line: usize,
  pub col: usize,
}

impl Pos {
  pub fn new(line: usize, col: usize) -> Self {
    Self { line, col }
  }
}

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Eq,
  Ne,
  Lt,
  Gt,
  Le,
  Ge,
  And,
  Or,
}

impl BinaryOp {
  pub fn is_arithmetic(self) -> bool {
    matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod)
  }

  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  AddressOf,
  Negate,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
  Int(i64),
  Float(f64),
  Bool(bool),
  Str(String),
  Ident(String),
  Binary {
    op: BinaryOp,
    lhs: ExprId,
    rhs: ExprId,
  },
  Unary {
    op: UnaryOp,
    operand: ExprId,
  },
  Call {
    name: String,
    args: Vec<ExprId>,
  },
  /// Compiler intrinsic such as `syscall!(...)`.
  MacroCall {
    name: String,
    args: Vec<ExprId>,
  },
  MemberAccess {
    object: ExprId,
    member: String,
  },
  /// Placeholder left behind by a syntax error.
  Invalid,
}

#[derive(Debug, Clone)]
pub struct Expr {
  pub kind: ExprKind,
  pub pos: Pos,
  /// Result type: set for literals at construction, for the rest by the checker.
  pub ty: Option<Type>,
  /// Target of a trailing `as <type>`.
  pub cast: Option<Type>,
}

impl Expr {
  pub fn new(kind: ExprKind, pos: Pos) -> Self {
    let ty = match &kind {
      ExprKind::Int(value) => Some(Type::scalar(literal_kind(*value))),
      ExprKind::Float(_) => Some(Type::scalar(TypeKind::F64)),
      ExprKind::Bool(_) => Some(Type::bool()),
      ExprKind::Str(_) => Some(Type::str()),
      _ => None,
    };
    Self {
      kind,
      pos,
      ty,
      cast: None,
    }
  }
}

/// Narrowest signed kind for an integer literal, as seen by the parser.
fn literal_kind(value: i64) -> TypeKind {
  if value > i64::from(i32::MAX) {
    TypeKind::I64
  } else if value <= i64::from(i8::MAX) {
    TypeKind::I8
  } else if value <= i64::from(i16::MAX) {
    TypeKind::I16
  } else {
    TypeKind::I32
  }
}

#[derive(Debug, Clone)]
pub struct Param {
  pub name: String,
  pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Function {
  pub name: String,
  pub params: Vec<Param>,
  pub ret: Type,
  pub body: Vec<StmtId>,
  /// False for `fn name(...);` declarations.
  pub has_body: bool,
}

/// One `key [= value]` entry of a `#!(...)` attribute list.
#[derive(Debug, Clone)]
pub struct MacroAttr {
  pub key: String,
  pub value: ExprId,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
  Function(Function),
  VarDecl {
    name: String,
    ty: Type,
    init: Option<ExprId>,
  },
  Assign {
    name: String,
    value: ExprId,
  },
  MemberAssign {
    member: ExprId,
    value: ExprId,
  },
  Expr(ExprId),
  Return(Option<ExprId>),
  If {
    cond: ExprId,
    then_body: Vec<StmtId>,
    else_body: Vec<StmtId>,
  },
  For {
    init: Option<StmtId>,
    cond: Option<ExprId>,
    step: Option<StmtId>,
    body: Vec<StmtId>,
  },
  Break,
  Continue,
  MacroDecl {
    attrs: Vec<MacroAttr>,
    decl: StmtId,
  },
  StructDecl {
    name: String,
    fields: Vec<StmtId>,
  },
  FieldDecl {
    name: String,
    ty: Type,
  },
  ImplDecl {
    target: String,
    members: Vec<StmtId>,
  },
  ConstructorDecl {
    params: Vec<Param>,
    body: Vec<StmtId>,
  },
}

#[derive(Debug, Clone)]
pub struct Stmt {
  pub kind: StmtKind,
  pub pos: Pos,
  pub is_pub: bool,
}

impl Stmt {
  pub fn new(kind: StmtKind, pos: Pos) -> Self {
    Self {
      kind,
      pos,
      is_pub: false,
    }
  }
}

/// Root of the tree: the arenas plus the ordered top-level statements.
#[derive(Debug, Default)]
pub struct Program {
  pub exprs: Arena<Expr>,
  pub stmts: Arena<Stmt>,
  pub items: Vec<StmtId>,
}

impl Program {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc_expr(&mut self, kind: ExprKind, pos: Pos) -> ExprId {
    self.exprs.alloc(Expr::new(kind, pos))
  }

  pub fn alloc_stmt(&mut self, kind: StmtKind, pos: Pos) -> StmtId {
    self.stmts.alloc(Stmt::new(kind, pos))
  }

  /// The function a top-level item declares, looking through a macro wrapper.
  pub fn function(&self, id: StmtId) -> Option<&Function> {
    match &self[id].kind {
      StmtKind::Function(function) => Some(function),
      StmtKind::MacroDecl { decl, .. } => self.function(*decl),
      _ => None,
    }
  }

  /// Last binding of `key` in a macro attribute list.
  pub fn attr<'a>(&self, attrs: &'a [MacroAttr], key: &str) -> Option<&'a MacroAttr> {
    attrs.iter().rev().find(|attr| attr.key == key)
  }

  /// String-literal value bound to `key`; `Err(pos)` when it is bound to
  /// something other than a string literal.
  pub fn attr_str(&self, attrs: &[MacroAttr], key: &str) -> Result<Option<&str>, Pos> {
    let Some(attr) = self.attr(attrs, key) else {
      return Ok(None);
    };
    let value = &self[attr.value];
    match &value.kind {
      ExprKind::Str(text) => Ok(Some(text)),
      _ => Err(value.pos),
    }
  }

  /// Whether a macro-wrapped declaration survives `target` gating.
  pub fn target_enabled(&self, attrs: &[MacroAttr], platform: Platform) -> Result<bool, Pos> {
    let target = self.attr_str(attrs, "target")?;
    Ok(target.is_none_or(|name| name == platform.name()))
  }

  /// Structural type described by a `struct` declaration.
  pub fn struct_type(&self, id: StmtId) -> Option<Type> {
    let StmtKind::StructDecl { name, fields } = &self[id].kind else {
      return None;
    };
    let fields = fields
      .iter()
      .filter_map(|field| match &self[*field].kind {
        StmtKind::FieldDecl { name, ty } => Some(Field {
          name: name.clone(),
          ty: ty.clone(),
        }),
        _ => None,
      })
      .collect();
    Some(Type::structure(name.clone(), fields))
  }
}

impl Index<ExprId> for Program {
  type Output = Expr;

  fn index(&self, id: ExprId) -> &Expr {
    &self.exprs[id]
  }
}

impl IndexMut<ExprId> for Program {
  fn index_mut(&mut self, id: ExprId) -> &mut Expr {
    &mut self.exprs[id]
  }
}

impl Index<StmtId> for Program {
  type Output = Stmt;

  fn index(&self, id: StmtId) -> &Stmt {
    &self.stmts[id]
  }
}

impl IndexMut<StmtId> for Program {
  fn index_mut(&mut self, id: StmtId) -> &mut Stmt {
    &mut self.stmts[id]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literals_type_themselves() {
    let mut program = Program::new();
    let small = program.alloc_expr(ExprKind::Int(7), Pos::new(1, 1));
    let medium = program.alloc_expr(ExprKind::Int(1_000), Pos::new(1, 1));
    let large = program.alloc_expr(ExprKind::Int(70_000), Pos::new(1, 1));
    let huge = program.alloc_expr(ExprKind::Int(1 << 40), Pos::new(1, 1));
    let text = program.alloc_expr(ExprKind::Str("hi".into()), Pos::new(1, 1));
    let name = program.alloc_expr(ExprKind::Ident("x".into()), Pos::new(1, 1));

    let kind = |id: ExprId| program[id].ty.as_ref().map(|ty| ty.kind);
    assert_eq!(kind(small), Some(TypeKind::I8));
    assert_eq!(kind(medium), Some(TypeKind::I16));
    assert_eq!(kind(large), Some(TypeKind::I32));
    assert_eq!(kind(huge), Some(TypeKind::I64));
    assert_eq!(kind(text), Some(TypeKind::Str));
    assert_eq!(kind(name), None);
  }

  #[test]
  fn later_attribute_bindings_win() {
    let mut program = Program::new();
    let first = program.alloc_expr(ExprKind::Str("Linux".into()), Pos::new(1, 1));
    let second = program.alloc_expr(ExprKind::Str("MacOS".into()), Pos::new(1, 1));
    let flag = program.alloc_expr(ExprKind::Bool(true), Pos::new(1, 5));
    let attrs = vec![
      MacroAttr {
        key: "target".into(),
        value: first,
      },
      MacroAttr {
        key: "target".into(),
        value: second,
      },
      MacroAttr {
        key: "extern".into(),
        value: flag,
      },
    ];
    assert_eq!(program.attr_str(&attrs, "target"), Ok(Some("MacOS")));
    assert_eq!(program.attr_str(&attrs, "missing"), Ok(None));
    assert_eq!(program.attr_str(&attrs, "extern"), Err(Pos::new(1, 5)));
    assert_eq!(program.target_enabled(&attrs, Platform::MacOS), Ok(true));
    assert_eq!(program.target_enabled(&attrs, Platform::Linux), Ok(false));
    assert_eq!(program.target_enabled(&attrs[2..], Platform::Linux), Ok(true));
  }
}
