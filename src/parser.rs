//! Recursive-descent parser producing the arena-backed syntax tree.
//!
//! The parser keeps the classic chibicc structure: one helper per precedence
//! level, loosest first, with a statement layer on top. Errors are reported
//! to the session and parsing carries on; `expect` always advances so every
//! loop makes progress even on malformed input.

use crate::ast::{
  BinaryOp, ExprId, ExprKind, Function, MacroAttr, Param, Pos, Program, StmtId, StmtKind, UnaryOp,
};
use crate::session::Session;
use crate::tokenizer::{Token, TokenKind, TokenStream, describe_token};
use crate::ty::Type;

/// Parse a whole source file into a [`Program`].
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse(source: &str, session: &mut Session) -> Program {
  let mut parser = Parser::new(source, session);
  while !parser.stream.is_eof() {
    let item = parser.parse_stmt();
    parser.program.items.push(item);
  }
  tracing::debug!(items = parser.program.items.len(), "parsed program");
  parser.program
}

struct Parser<'a, 's> {
  stream: TokenStream<'a>,
  session: &'s mut Session,
  program: Program,
}

impl<'a, 's> Parser<'a, 's> {
  fn new(source: &'a str, session: &'s mut Session) -> Self {
    Self {
      stream: TokenStream::new(source),
      session,
      program: Program::new(),
    }
  }

  fn pos(&self) -> Pos {
    let token = self.stream.current();
    Pos::new(token.line, token.col)
  }

  fn error(&mut self, message: impl Into<String>) {
    let pos = self.pos();
    self.session.report(message, pos.line, pos.col);
  }

  fn at(&self, kind: TokenKind) -> bool {
    self.stream.at(kind)
  }

  /// Consume the current token if it has the given kind.
  fn equal(&mut self, kind: TokenKind) -> bool {
    if self.at(kind) {
      self.stream.advance();
      return true;
    }
    false
  }

  /// Report a mismatch, then advance regardless.
  fn expect(&mut self, kind: TokenKind) -> Token {
    if !self.at(kind) {
      let message = format!("Unexpected token: {}", describe_token(self.stream.current()));
      self.error(message);
    }
    self.stream.advance()
  }

  /// Take an identifier's text, reporting `message` when something else is there.
  fn expect_ident(&mut self, message: &str) -> String {
    if !self.at(TokenKind::Ident) {
      self.error(message);
    }
    self.stream.advance().text
  }

  fn expr(&mut self, kind: ExprKind, pos: Pos) -> ExprId {
    self.program.alloc_expr(kind, pos)
  }

  fn stmt(&mut self, kind: StmtKind, pos: Pos) -> StmtId {
    self.program.alloc_stmt(kind, pos)
  }

  // ---------------------------------------------------------------------
  // types

  fn parse_type(&mut self) -> Type {
    let is_pointer = self.equal(TokenKind::Star);
    if !self.at(TokenKind::Ident) {
      self.error("Expected type identifier");
    }
    let name = self.stream.advance().text;
    let mut is_array = false;
    if self.equal(TokenKind::LBracket) {
      // The length is accepted but not tracked by the type.
      self.equal(TokenKind::Num);
      self.expect(TokenKind::RBracket);
      is_array = true;
    }
    Type::from_name(&name)
      .with_pointer(is_pointer)
      .with_array(is_array)
  }

  // ---------------------------------------------------------------------
  // statements

  fn parse_stmt(&mut self) -> StmtId {
    match self.stream.current().kind {
      TokenKind::Let => self.parse_var_decl(),
      TokenKind::Fn => self.parse_function(),
      TokenKind::Return => self.parse_return(),
      TokenKind::If => self.parse_if(),
      TokenKind::For => self.parse_for(),
      TokenKind::Break => self.parse_jump(StmtKind::Break),
      TokenKind::Continue => self.parse_jump(StmtKind::Continue),
      TokenKind::Pub => {
        self.stream.advance();
        let stmt = self.parse_stmt();
        self.program[stmt].is_pub = true;
        stmt
      }
      TokenKind::Hash => self.parse_macro_decl(),
      TokenKind::Struct => self.parse_struct(),
      TokenKind::Impl => self.parse_impl(),
      _ => {
        let stmt = self.parse_simple_stmt();
        self.expect(TokenKind::Semicolon);
        stmt
      }
    }
  }

  /// `{ stmt* }`
  fn parse_block(&mut self) -> Vec<StmtId> {
    self.expect(TokenKind::LBrace);
    let mut body = Vec::new();
    while !self.at(TokenKind::RBrace) && !self.stream.is_eof() {
      body.push(self.parse_stmt());
    }
    self.expect(TokenKind::RBrace);
    body
  }

  fn parse_var_decl(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Let);
    let name = self.expect_ident("Expected identifier after let");
    self.expect(TokenKind::Colon);
    let ty = self.parse_type();
    let init = if self.equal(TokenKind::Assign) {
      Some(self.parse_expression())
    } else {
      None
    };
    self.expect(TokenKind::Semicolon);
    self.stmt(StmtKind::VarDecl { name, ty, init }, pos)
  }

  fn parse_params(&mut self) -> Vec<Param> {
    self.expect(TokenKind::LParen);
    let mut params = Vec::new();
    if !self.at(TokenKind::RParen) {
      loop {
        let name = self.expect_ident("Expected parameter name");
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        params.push(Param { name, ty });
        if !self.equal(TokenKind::Comma) {
          break;
        }
      }
    }
    self.expect(TokenKind::RParen);
    params
  }

  fn parse_function(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Fn);
    let name = self.expect_ident("Expected function name");
    let params = self.parse_params();
    let ret = if self.equal(TokenKind::Arrow) {
      self.parse_type()
    } else {
      Type::i32()
    };

    let (body, has_body) = if self.equal(TokenKind::Semicolon) {
      (Vec::new(), false)
    } else {
      (self.parse_block(), true)
    };

    let function = Function {
      name,
      params,
      ret,
      body,
      has_body,
    };
    self.stmt(StmtKind::Function(function), pos)
  }

  fn parse_return(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Return);
    let value = if self.at(TokenKind::Semicolon) {
      None
    } else {
      Some(self.parse_expression())
    };
    self.expect(TokenKind::Semicolon);
    self.stmt(StmtKind::Return(value), pos)
  }

  fn parse_if(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::If);
    let cond = self.parse_expression();
    let then_body = self.parse_block();
    let else_body = if !self.equal(TokenKind::Else) {
      Vec::new()
    } else if self.at(TokenKind::If) {
      vec![self.parse_if()]
    } else {
      self.parse_block()
    };
    self.stmt(
      StmtKind::If {
        cond,
        then_body,
        else_body,
      },
      pos,
    )
  }

  /// `for { }`, `for cond { }` or `for init; [cond]; [step] { }`.
  fn parse_for(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::For);
    let mut init = None;
    let mut cond = None;
    let mut step = None;

    if !self.at(TokenKind::LBrace) {
      let three_clause = if self.equal(TokenKind::Semicolon) {
        true
      } else if self.at(TokenKind::Let) {
        init = Some(self.parse_var_decl());
        true
      } else {
        let head_pos = self.pos();
        let head = self.parse_expression();
        if self.at(TokenKind::Assign) || self.at(TokenKind::Semicolon) {
          init = Some(self.finish_simple_stmt(head, head_pos));
          self.expect(TokenKind::Semicolon);
          true
        } else {
          cond = Some(head);
          false
        }
      };

      if three_clause {
        if !self.at(TokenKind::Semicolon) {
          cond = Some(self.parse_expression());
        }
        self.expect(TokenKind::Semicolon);
        if !self.at(TokenKind::LBrace) {
          step = Some(self.parse_simple_stmt());
        }
      }
    }

    let body = self.parse_block();
    self.stmt(
      StmtKind::For {
        init,
        cond,
        step,
        body,
      },
      pos,
    )
  }

  fn parse_jump(&mut self, kind: StmtKind) -> StmtId {
    let pos = self.pos();
    self.stream.advance();
    self.expect(TokenKind::Semicolon);
    self.stmt(kind, pos)
  }

  /// Expression or assignment, without the trailing semicolon.
  fn parse_simple_stmt(&mut self) -> StmtId {
    let pos = self.pos();
    let lhs = self.parse_expression();
    self.finish_simple_stmt(lhs, pos)
  }

  fn finish_simple_stmt(&mut self, lhs: ExprId, pos: Pos) -> StmtId {
    if !self.equal(TokenKind::Assign) {
      return self.stmt(StmtKind::Expr(lhs), pos);
    }

    let value = self.parse_expression();
    match &self.program[lhs].kind {
      ExprKind::Ident(name) => {
        let name = name.clone();
        self.stmt(StmtKind::Assign { name, value }, pos)
      }
      ExprKind::MemberAccess { .. } => self.stmt(StmtKind::MemberAssign { member: lhs, value }, pos),
      _ => {
        self.error("Left side of assignment must be an identifier");
        self.stmt(StmtKind::Expr(value), pos)
      }
    }
  }

  /// `#!( key [= expr], ... ) stmt`
  fn parse_macro_decl(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Hash);
    self.expect(TokenKind::Not);
    self.expect(TokenKind::LParen);

    let mut attrs = Vec::new();
    while !self.at(TokenKind::RParen) && !self.stream.is_eof() {
      let key_pos = self.pos();
      let key = self.expect_ident("Expected attribute name");
      let value = if self.equal(TokenKind::Assign) {
        self.parse_expression()
      } else {
        self.expr(ExprKind::Bool(true), key_pos)
      };
      attrs.push(MacroAttr { key, value });
      if self.at(TokenKind::RParen) {
        break;
      }
      self.expect(TokenKind::Comma);
    }
    self.expect(TokenKind::RParen);

    let decl = self.parse_stmt();
    self.stmt(StmtKind::MacroDecl { attrs, decl }, pos)
  }

  fn parse_struct(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Struct);
    let is_pub = self.equal(TokenKind::Pub);
    let name = self.expect_ident("Expected struct name");
    self.expect(TokenKind::LBrace);

    let mut fields = Vec::new();
    while !self.at(TokenKind::RBrace) && !self.stream.is_eof() {
      let field_pos = self.pos();
      let field = self.expect_ident("Expected field name");
      self.expect(TokenKind::Colon);
      let ty = self.parse_type();
      fields.push(self.stmt(StmtKind::FieldDecl { name: field, ty }, field_pos));
      self.expect(TokenKind::Semicolon);
    }
    self.expect(TokenKind::RBrace);

    let id = self.stmt(StmtKind::StructDecl { name, fields }, pos);
    self.program[id].is_pub = is_pub;
    id
  }

  fn parse_impl(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Impl);
    let target = self.expect_ident("Expected type name");
    self.expect(TokenKind::LBrace);

    let mut members = Vec::new();
    while !self.at(TokenKind::RBrace) && !self.stream.is_eof() {
      let is_pub = self.equal(TokenKind::Pub);
      let member = if self.at(TokenKind::Constructor) {
        self.parse_constructor()
      } else {
        self.parse_function()
      };
      self.program[member].is_pub = is_pub;
      members.push(member);
    }
    self.expect(TokenKind::RBrace);
    self.stmt(StmtKind::ImplDecl { target, members }, pos)
  }

  fn parse_constructor(&mut self) -> StmtId {
    let pos = self.pos();
    self.expect(TokenKind::Constructor);
    let params = self.parse_params();
    let body = self.parse_block();
    self.stmt(StmtKind::ConstructorDecl { params, body }, pos)
  }

  // ---------------------------------------------------------------------
  // expressions

  fn parse_expression(&mut self) -> ExprId {
    self.parse_logical()
  }

  /// Shared loop for the left-associative binary levels, followed by an
  /// optional `as <type>` relabel.
  fn parse_binary_level(
    &mut self,
    next: fn(&mut Self) -> ExprId,
    op_for: fn(TokenKind) -> Option<BinaryOp>,
  ) -> ExprId {
    let mut node = next(self);
    while let Some(op) = op_for(self.stream.current().kind) {
      let pos = self.pos();
      self.stream.advance();
      let rhs = next(self);
      node = self.expr(ExprKind::Binary { op, lhs: node, rhs }, pos);
    }
    if self.equal(TokenKind::As) {
      let ty = self.parse_type();
      self.program[node].cast = Some(ty);
    }
    node
  }

  fn parse_logical(&mut self) -> ExprId {
    self.parse_binary_level(Self::parse_comparison, |kind| match kind {
      TokenKind::And => Some(BinaryOp::And),
      TokenKind::Or => Some(BinaryOp::Or),
      _ => None,
    })
  }

  fn parse_comparison(&mut self) -> ExprId {
    self.parse_binary_level(Self::parse_additive, |kind| match kind {
      TokenKind::Eq => Some(BinaryOp::Eq),
      TokenKind::Ne => Some(BinaryOp::Ne),
      TokenKind::Lt => Some(BinaryOp::Lt),
      TokenKind::Gt => Some(BinaryOp::Gt),
      TokenKind::Le => Some(BinaryOp::Le),
      TokenKind::Ge => Some(BinaryOp::Ge),
      _ => None,
    })
  }

  fn parse_additive(&mut self) -> ExprId {
    self.parse_binary_level(Self::parse_multiplicative, |kind| match kind {
      TokenKind::Plus => Some(BinaryOp::Add),
      TokenKind::Minus => Some(BinaryOp::Sub),
      _ => None,
    })
  }

  fn parse_multiplicative(&mut self) -> ExprId {
    self.parse_binary_level(Self::parse_unary, |kind| match kind {
      TokenKind::Star => Some(BinaryOp::Mul),
      TokenKind::Slash => Some(BinaryOp::Div),
      TokenKind::Percent => Some(BinaryOp::Mod),
      _ => None,
    })
  }

  fn parse_unary(&mut self) -> ExprId {
    let pos = self.pos();
    let op = match self.stream.current().kind {
      TokenKind::Minus => UnaryOp::Negate,
      TokenKind::Amp => UnaryOp::AddressOf,
      _ => return self.parse_primary(),
    };
    self.stream.advance();
    let operand = self.parse_unary();
    self.expr(ExprKind::Unary { op, operand }, pos)
  }

  fn parse_primary(&mut self) -> ExprId {
    let pos = self.pos();
    match self.stream.current().kind {
      TokenKind::Num => {
        let token = self.stream.advance();
        let value = token.text.parse::<i64>().unwrap_or_else(|_| {
          self
            .session
            .report(format!("Invalid integer literal: {}", token.text), pos.line, pos.col);
          0
        });
        self.expr(ExprKind::Int(value), pos)
      }
      TokenKind::Float => {
        let token = self.stream.advance();
        let value = token.text.parse::<f64>().unwrap_or_default();
        self.expr(ExprKind::Float(value), pos)
      }
      TokenKind::True | TokenKind::False => {
        let value = self.stream.advance().is(TokenKind::True);
        self.expr(ExprKind::Bool(value), pos)
      }
      TokenKind::Str => {
        let text = self.stream.advance().text;
        self.expr(ExprKind::Str(text), pos)
      }
      TokenKind::Ident => match self.stream.peek().kind {
        TokenKind::LParen => {
          let name = self.stream.advance().text;
          let args = self.parse_args();
          self.expr(ExprKind::Call { name, args }, pos)
        }
        TokenKind::Not => {
          let name = self.stream.advance().text;
          self.expect(TokenKind::Not);
          let args = self.parse_args();
          self.expr(ExprKind::MacroCall { name, args }, pos)
        }
        _ => {
          let name = self.stream.advance().text;
          let mut node = self.expr(ExprKind::Ident(name), pos);
          while self.at(TokenKind::Dot) {
            let member_pos = self.pos();
            self.stream.advance();
            let member = self.expect_ident("Expected member name");
            node = self.expr(ExprKind::MemberAccess { object: node, member }, member_pos);
          }
          node
        }
      },
      TokenKind::LParen => {
        self.stream.advance();
        let node = self.parse_expression();
        self.expect(TokenKind::RParen);
        node
      }
      _ => {
        let message = format!("Unexpected token: {}", describe_token(self.stream.current()));
        self.error(message);
        self.expr(ExprKind::Invalid, pos)
      }
    }
  }

  /// `( [expr (, expr)*] )`
  fn parse_args(&mut self) -> Vec<ExprId> {
    self.expect(TokenKind::LParen);
    let mut args = Vec::new();
    if !self.at(TokenKind::RParen) {
      loop {
        args.push(self.parse_expression());
        if !self.equal(TokenKind::Comma) {
          break;
        }
      }
    }
    self.expect(TokenKind::RParen);
    args
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::StmtKind;
  use crate::session::{CompileOptions, Platform};
  use crate::ty::TypeKind;

  fn parse_ok(source: &str) -> Program {
    let mut session = Session::new(CompileOptions::for_platform(Platform::Linux));
    let program = parse(source, &mut session);
    assert!(
      !session.has_errors(),
      "unexpected diagnostics: {:?}",
      session.diagnostics()
    );
    program
  }

  fn parse_err(source: &str) -> Vec<String> {
    let mut session = Session::new(CompileOptions::for_platform(Platform::Linux));
    parse(source, &mut session);
    session
      .diagnostics()
      .iter()
      .map(|diag| diag.message.clone())
      .collect()
  }

  fn only_function(program: &Program) -> &Function {
    assert_eq!(program.items.len(), 1);
    program.function(program.items[0]).expect("function item")
  }

  fn body_expr(program: &Program, index: usize) -> ExprId {
    let function = only_function(program);
    match &program[function.body[index]].kind {
      StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => *expr,
      other => panic!("expected expression statement, got {other:?}"),
    }
  }

  #[test]
  fn function_signature_and_default_return_type() {
    let program = parse_ok("fn add(a: i32, b: *u8) { return a; }");
    let function = only_function(&program);
    assert_eq!(function.name, "add");
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[1].ty.kind, TypeKind::U8);
    assert!(function.params[1].ty.is_pointer);
    assert_eq!(function.ret, Type::i32());
    assert!(function.has_body);
  }

  #[test]
  fn declaration_without_body() {
    let program = parse_ok("fn write(fd: i64, buf: str, len: i64) -> i64;");
    let function = only_function(&program);
    assert!(!function.has_body);
    assert!(function.body.is_empty());
    assert_eq!(function.ret.kind, TypeKind::I64);
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let program = parse_ok("fn f() { 1 + 2 * 3; }");
    let root = body_expr(&program, 0);
    let ExprKind::Binary { op, rhs, .. } = &program[root].kind else {
      panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
      program[*rhs].kind,
      ExprKind::Binary {
        op: BinaryOp::Mul,
        ..
      }
    ));
  }

  #[test]
  fn binary_levels_associate_left() {
    let program = parse_ok("fn f() { 10 - 4 - 3; }");
    let root = body_expr(&program, 0);
    let ExprKind::Binary { op, lhs, .. } = &program[root].kind else {
      panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Sub);
    assert!(matches!(
      program[*lhs].kind,
      ExprKind::Binary {
        op: BinaryOp::Sub,
        ..
      }
    ));
  }

  #[test]
  fn logical_operators_are_loosest() {
    let program = parse_ok("fn f() { 1 < 2 and 3 > 4; }");
    let root = body_expr(&program, 0);
    assert!(matches!(
      program[root].kind,
      ExprKind::Binary {
        op: BinaryOp::And,
        ..
      }
    ));
  }

  #[test]
  fn cast_relabels_the_expression() {
    let program = parse_ok("fn f() { return (1 + 2) as i64; }");
    let root = body_expr(&program, 0);
    assert_eq!(program[root].cast.as_ref().map(|ty| ty.kind), Some(TypeKind::I64));
  }

  #[test]
  fn lookahead_separates_calls_macros_and_names() {
    let program = parse_ok("fn f() { g(1, x); strlen!(\"hi\"); y; }");
    assert!(matches!(
      &program[body_expr(&program, 0)].kind,
      ExprKind::Call { name, args } if name == "g" && args.len() == 2
    ));
    assert!(matches!(
      &program[body_expr(&program, 1)].kind,
      ExprKind::MacroCall { name, args } if name == "strlen" && args.len() == 1
    ));
    assert!(matches!(
      &program[body_expr(&program, 2)].kind,
      ExprKind::Ident(name) if name == "y"
    ));
  }

  #[test]
  fn unary_operators() {
    let program = parse_ok("fn f() { -x + 1; &y; }");
    let root = body_expr(&program, 0);
    let ExprKind::Binary { lhs, .. } = &program[root].kind else {
      panic!("expected binary");
    };
    assert!(matches!(
      program[*lhs].kind,
      ExprKind::Unary {
        op: UnaryOp::Negate,
        ..
      }
    ));
    assert!(matches!(
      program[body_expr(&program, 1)].kind,
      ExprKind::Unary {
        op: UnaryOp::AddressOf,
        ..
      }
    ));
  }

  #[test]
  fn assignment_and_member_assignment() {
    let program = parse_ok("fn f() { x = 1; p.x = 2; }");
    let function = only_function(&program);
    assert!(matches!(
      &program[function.body[0]].kind,
      StmtKind::Assign { name, .. } if name == "x"
    ));
    assert!(matches!(
      program[function.body[1]].kind,
      StmtKind::MemberAssign { .. }
    ));
  }

  #[test]
  fn if_else_chains() {
    let program = parse_ok("fn f() { if a { } else if b { } else { 1; } }");
    let function = only_function(&program);
    let StmtKind::If { else_body, .. } = &program[function.body[0]].kind else {
      panic!("expected if");
    };
    assert_eq!(else_body.len(), 1);
    let StmtKind::If { else_body, .. } = &program[else_body[0]].kind else {
      panic!("expected nested if");
    };
    assert_eq!(else_body.len(), 1);
  }

  #[test]
  fn for_loop_forms() {
    let program = parse_ok(
      "fn f() { for { break; } for i < 3 { continue; } for let i: i32 = 0; i < 3; i = i + 1 { } for ; ; { } }",
    );
    let function = only_function(&program);
    let shapes: Vec<_> = function
      .body
      .iter()
      .map(|stmt| match &program[*stmt].kind {
        StmtKind::For {
          init, cond, step, ..
        } => (init.is_some(), cond.is_some(), step.is_some()),
        other => panic!("expected for, got {other:?}"),
      })
      .collect();
    assert_eq!(
      shapes,
      vec![
        (false, false, false),
        (false, true, false),
        (true, true, true),
        (false, false, false),
      ]
    );
  }

  #[test]
  fn macro_attributes_wrap_the_next_declaration() {
    let program = parse_ok("#!(target = \"Linux\", extern) fn puts(s: str);");
    let StmtKind::MacroDecl { attrs, decl } = &program[program.items[0]].kind else {
      panic!("expected macro decl");
    };
    assert_eq!(attrs.len(), 2);
    assert_eq!(program.attr_str(attrs, "target"), Ok(Some("Linux")));
    assert!(matches!(
      program[program.attr(attrs, "extern").expect("extern").value].kind,
      ExprKind::Bool(true)
    ));
    assert!(matches!(program[*decl].kind, StmtKind::Function(_)));
  }

  #[test]
  fn struct_and_impl_are_parsed() {
    let program = parse_ok(
      "pub struct Point { x: i32; y: i32; } impl Point { constructor(x: i32) { } pub fn len() -> i32 { return 0; } }",
    );
    assert_eq!(program.items.len(), 2);
    assert!(program[program.items[0]].is_pub);
    let point = program.struct_type(program.items[0]).expect("struct type");
    assert_eq!(point.to_string(), "Point");
    assert_eq!(point.fields.as_ref().map(Vec::len), Some(2));
    let StmtKind::ImplDecl { target, members } = &program[program.items[1]].kind else {
      panic!("expected impl");
    };
    assert_eq!(target, "Point");
    assert!(matches!(
      program[members[0]].kind,
      StmtKind::ConstructorDecl { .. }
    ));
    assert!(program[members[1]].is_pub);
  }

  #[test]
  fn pub_prefix_marks_statement() {
    let program = parse_ok("pub fn main() { }");
    assert!(program[program.items[0]].is_pub);
  }

  #[test]
  fn missing_semicolon_is_reported_and_parsing_continues() {
    let errors = parse_err("fn f() { let x: i32 = 1 let y: i32 = 2; }\nfn g() { }");
    assert_eq!(errors[0], "Unexpected token: let");
  }

  #[test]
  fn bad_assignment_target() {
    let errors = parse_err("fn f() { 1 = 2; }");
    assert_eq!(
      errors,
      vec!["Left side of assignment must be an identifier".to_string()]
    );
  }

  #[test]
  fn unexpected_primary_shows_token_text() {
    let errors = parse_err("fn f() { return ); }");
    assert_eq!(errors[0], "Unexpected token: )");
  }
}
