//! Two-pass static checking.
//!
//! Pass 1 collects every visible function signature so calls may refer to
//! functions declared later in the file. Pass 2 walks each function body,
//! resolves names through a stack of saved scopes and annotates every
//! expression node with its result type.
//!
//! Macro-wrapped declarations whose `target` does not name the session's
//! platform are skipped by both passes, so they are invisible to callers.

use rustc_hash::FxHashMap;

use crate::ast::{ExprId, ExprKind, Function, Pos, Program, StmtId, StmtKind, UnaryOp};
use crate::session::Session;
use crate::ty::{Type, TypeKind};

/// Signature recorded for call resolution.
#[derive(Debug, Clone)]
struct FnSig {
  params: Vec<Type>,
  ret: Type,
  has_body: bool,
}

/// Check `program`, reporting problems to `session` and annotating
/// expression types in place.
#[tracing::instrument(level = "debug", skip_all, fields(items = program.items.len()))]
pub fn check(program: &mut Program, session: &mut Session) {
  let mut checker = TypeChecker::new(session);
  let functions = checker.collect_signatures(program);
  for id in functions {
    checker.check_function(program, id);
  }
}

struct TypeChecker<'s> {
  session: &'s mut Session,
  variables: FxHashMap<String, Type>,
  saved: Vec<FxHashMap<String, Type>>,
  functions: FxHashMap<String, FnSig>,
}

impl<'s> TypeChecker<'s> {
  fn new(session: &'s mut Session) -> Self {
    Self {
      session,
      variables: FxHashMap::default(),
      saved: Vec::new(),
      functions: FxHashMap::default(),
    }
  }

  fn error(&mut self, message: impl Into<String>, pos: Pos) {
    self.session.report(message, pos.line, pos.col);
  }

  fn push_scope(&mut self) {
    self.saved.push(self.variables.clone());
  }

  fn pop_scope(&mut self) {
    if let Some(variables) = self.saved.pop() {
      self.variables = variables;
    }
  }

  fn add_variable(&mut self, name: &str, ty: Type, pos: Pos) {
    if self.variables.contains_key(name) {
      self.error(format!("Variable already defined: {name}"), pos);
      return;
    }
    self.variables.insert(name.to_string(), ty);
  }

  fn add_function(&mut self, function: &Function, pos: Pos) {
    let sig = FnSig {
      params: function.params.iter().map(|param| param.ty.clone()).collect(),
      ret: function.ret.clone(),
      has_body: function.has_body,
    };
    if let Some(existing) = self.functions.get(&function.name)
      && existing.has_body
    {
      if sig.has_body {
        self.error(format!("Function already defined: {}", function.name), pos);
      }
      return;
    }
    self.functions.insert(function.name.clone(), sig);
  }

  /// Top-level items that pass target gating and declare a function.
  fn visible_function(&mut self, program: &Program, id: StmtId) -> Option<StmtId> {
    let stmt = &program[id];
    match &stmt.kind {
      StmtKind::Function(_) => Some(id),
      StmtKind::MacroDecl { attrs, decl } => {
        let enabled = match program.target_enabled(attrs, self.session.platform()) {
          Ok(enabled) => enabled,
          Err(pos) => {
            self.error("Attribute `target` expects a string literal", pos);
            false
          }
        };
        if !enabled {
          tracing::debug!(line = stmt.pos.line, "declaration gated out by target");
          return None;
        }
        match &program[*decl].kind {
          StmtKind::Function(_) => Some(*decl),
          StmtKind::StructDecl { .. } | StmtKind::ImplDecl { .. } => None,
          _ => {
            self.error("Statement not allowed at top level", program[*decl].pos);
            None
          }
        }
      }
      StmtKind::StructDecl { .. } | StmtKind::ImplDecl { .. } => None,
      _ => {
        self.error("Statement not allowed at top level", stmt.pos);
        None
      }
    }
  }

  /// Pass 1: register signatures, returning the functions whose bodies pass 2 checks.
  fn collect_signatures(&mut self, program: &Program) -> Vec<StmtId> {
    let mut functions = Vec::new();
    for &item in &program.items {
      let Some(id) = self.visible_function(program, item) else {
        continue;
      };
      if let StmtKind::Function(function) = &program[id].kind {
        self.add_function(function, program[id].pos);
        functions.push(id);
      }
    }
    tracing::debug!(count = self.functions.len(), "collected signatures");
    functions
  }

  /// Pass 2 for one function: bind parameters, check the body.
  fn check_function(&mut self, program: &mut Program, id: StmtId) {
    let pos = program[id].pos;
    let StmtKind::Function(function) = &program[id].kind else {
      return;
    };
    let params = function.params.clone();
    let body = function.body.clone();

    self.push_scope();
    for param in params {
      self.add_variable(&param.name, param.ty, pos);
    }
    for stmt in body {
      self.check_stmt(program, stmt);
    }
    self.pop_scope();
  }

  fn check_block(&mut self, program: &mut Program, body: &[StmtId]) {
    self.push_scope();
    for &stmt in body {
      self.check_stmt(program, stmt);
    }
    self.pop_scope();
  }

  fn check_stmt(&mut self, program: &mut Program, id: StmtId) {
    let pos = program[id].pos;
    match program[id].kind.clone() {
      StmtKind::VarDecl { name, ty, init } => {
        if let Some(init) = init
          && let Some(init_ty) = self.check_expr(program, init)
          && init_ty != ty
        {
          self.error("Type mismatch in variable declaration", pos);
          return;
        }
        self.add_variable(&name, ty, pos);
      }
      StmtKind::Assign { name, value } => {
        let Some(var_ty) = self.variables.get(&name).cloned() else {
          self.error(format!("Undefined variable: {name}"), pos);
          return;
        };
        if let Some(value_ty) = self.check_expr(program, value)
          && value_ty != var_ty
        {
          self.error("Type mismatch in assignment", pos);
        }
      }
      StmtKind::MemberAssign { .. } => {
        self.error("Member assignment is not supported", pos);
      }
      StmtKind::Expr(expr) => {
        self.check_expr(program, expr);
      }
      StmtKind::Return(value) => {
        // The value is not compared with the declared return type.
        if let Some(value) = value {
          self.check_expr(program, value);
        }
      }
      StmtKind::If {
        cond,
        then_body,
        else_body,
      } => {
        if let Some(cond_ty) = self.check_expr(program, cond)
          && !cond_ty.is_bool()
        {
          self.error("If condition must be boolean", pos);
        }
        self.check_block(program, &then_body);
        self.check_block(program, &else_body);
      }
      StmtKind::For {
        init,
        cond,
        step,
        body,
      } => {
        self.push_scope();
        if let Some(init) = init {
          self.check_stmt(program, init);
        }
        if let Some(cond) = cond {
          self.check_expr(program, cond);
        }
        if let Some(step) = step {
          self.check_stmt(program, step);
        }
        self.check_block(program, &body);
        self.pop_scope();
      }
      StmtKind::Break | StmtKind::Continue => {}
      StmtKind::Function(function) => {
        self.error(
          format!("Nested function declarations are not supported: {}", function.name),
          pos,
        );
      }
      StmtKind::MacroDecl { .. }
      | StmtKind::StructDecl { .. }
      | StmtKind::FieldDecl { .. }
      | StmtKind::ImplDecl { .. }
      | StmtKind::ConstructorDecl { .. } => {
        self.error("Declaration not allowed inside a function body", pos);
      }
    }
  }

  /// Infer, record and return the type of an expression; `None` after an error.
  fn check_expr(&mut self, program: &mut Program, id: ExprId) -> Option<Type> {
    let pos = program[id].pos;
    let inferred = match program[id].kind.clone() {
      ExprKind::Int(_) => Some(Type::i32()),
      ExprKind::Float(_) => Some(Type::scalar(TypeKind::F32)),
      ExprKind::Bool(_) => Some(Type::bool()),
      ExprKind::Str(_) => Some(Type::str()),
      ExprKind::Ident(name) => {
        let ty = self.variables.get(&name).cloned();
        if ty.is_none() {
          self.error(format!("Undefined variable: {name}"), pos);
        }
        ty
      }
      ExprKind::Binary { op, lhs, rhs } => {
        let lhs_ty = self.check_expr(program, lhs);
        let rhs_ty = self.check_expr(program, rhs);
        if op.is_arithmetic() {
          for (side, ty) in [("left", &lhs_ty), ("right", &rhs_ty)] {
            if let Some(ty) = ty
              && !ty.is_numeric()
            {
              self.error(
                format!("Arithmetic operations require numeric types, {side} type: {ty}"),
                pos,
              );
            }
          }
          lhs_ty
        } else if op.is_comparison() {
          Some(Type::bool())
        } else {
          let boolean = |ty: &Option<Type>| ty.as_ref().is_none_or(Type::is_bool);
          if !boolean(&lhs_ty) || !boolean(&rhs_ty) {
            self.error("Logical operations require boolean types", pos);
          }
          Some(Type::bool())
        }
      }
      ExprKind::Unary { op, operand } => {
        let operand_ty = self.check_expr(program, operand);
        match op {
          UnaryOp::AddressOf => operand_ty.map(Type::pointer_to),
          UnaryOp::Negate => operand_ty,
        }
      }
      ExprKind::Call { name, args } => self.check_call(program, &name, &args, pos),
      ExprKind::MacroCall { args, .. } => {
        // Argument shapes are validated during code generation.
        for arg in args {
          self.check_expr(program, arg);
        }
        Some(Type::i32())
      }
      ExprKind::MemberAccess { .. } => {
        self.error("Member access is not supported", pos);
        None
      }
      ExprKind::Invalid => None,
    };

    let result = program[id].cast.clone().or(inferred);
    if let Some(ty) = &result {
      program[id].ty = Some(ty.clone());
    }
    result
  }

  fn check_call(
    &mut self,
    program: &mut Program,
    name: &str,
    args: &[ExprId],
    pos: Pos,
  ) -> Option<Type> {
    let Some(sig) = self.functions.get(name).cloned() else {
      self.error(format!("Undefined function: {name}"), pos);
      return None;
    };

    if args.len() != sig.params.len() {
      self.error(format!("Wrong number of arguments for function {name}"), pos);
    }

    for (index, &arg) in args.iter().enumerate() {
      let arg_ty = self.check_expr(program, arg);
      if let (Some(arg_ty), Some(param_ty)) = (arg_ty, sig.params.get(index))
        && arg_ty != *param_ty
      {
        self.error(
          format!("Type mismatch in argument {index} of function {name}"),
          pos,
        );
      }
    }
    Some(sig.ret)
  }
}
