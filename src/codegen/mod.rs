//! Code generation: lower the checked tree into Intel-syntax x86-64 assembly.
//!
//! The emitter is a stack machine. Every expression leaves its value in
//! `rax`; binary operators park the left operand on the machine stack and
//! pop it into `rdi`. Variables always live in 8-byte frame slots assigned by
//! the layout pass in [`frame`], so each function is emitted in one forward
//! walk with its frame size already known.

mod abi;
mod frame;
mod strings;

use rustc_hash::FxHashMap;

use crate::ast::{
  BinaryOp, ExprId, ExprKind, Function, Pos, Program, StmtId, StmtKind, UnaryOp,
};
use crate::error::{CompileResult, MissingSlotSnafu};
use crate::session::{Platform, Session};

use abi::{CallConv, SYSCALL_REGS};
use frame::{FrameLayout, SLOT_SIZE, Slot};
use strings::StringPool;

/// Emit assembly for every function in `program` that survives target gating.
///
/// Source-level problems found while lowering (misused intrinsics, stray
/// `break`) are reported to `session`; a variable without a slot is an
/// internal error and aborts generation.
#[tracing::instrument(level = "debug", skip_all, fields(platform = %session.platform()))]
pub fn generate(program: &Program, session: &mut Session) -> CompileResult<String> {
  let mut codegen = Codegen::new(program, session);
  codegen.emit_program()?;
  Ok(codegen.out)
}

/// Jump targets of the innermost enclosing loop.
#[derive(Debug, Clone, Copy)]
struct LoopLabels {
  continue_label: usize,
  end_label: usize,
}

struct Codegen<'p, 's> {
  program: &'p Program,
  session: &'s mut Session,
  conv: CallConv,
  out: String,
  strings: StringPool,
  labels: usize,

  // Per-function state, reset by `emit_function`.
  layout: Option<FrameLayout>,
  bindings: FxHashMap<String, Slot>,
  str_lens: FxHashMap<String, usize>,
  loops: Vec<LoopLabels>,
  /// 8-byte pushes outstanding below the frame.
  depth: usize,
}

impl<'p, 's> Codegen<'p, 's> {
  fn new(program: &'p Program, session: &'s mut Session) -> Self {
    let conv = CallConv::for_platform(session.platform());
    Self {
      program,
      session,
      conv,
      out: String::new(),
      strings: StringPool::new(),
      labels: 0,
      layout: None,
      bindings: FxHashMap::default(),
      str_lens: FxHashMap::default(),
      loops: Vec::new(),
      depth: 0,
    }
  }

  fn error(&mut self, message: impl Into<String>, pos: Pos) {
    self.session.report(message, pos.line, pos.col);
  }

  fn emit(&mut self, instr: impl AsRef<str>) {
    self.out.push_str("    ");
    self.out.push_str(instr.as_ref());
    self.out.push('\n');
  }

  fn label(&mut self, name: impl AsRef<str>) {
    self.out.push_str(name.as_ref());
    self.out.push_str(":\n");
  }

  fn new_label(&mut self) -> usize {
    let label = self.labels;
    self.labels += 1;
    label
  }

  fn push(&mut self, reg: &str) {
    self.emit(format!("push {reg}"));
    self.depth += 1;
  }

  fn pop(&mut self, reg: &str) {
    self.emit(format!("pop {reg}"));
    self.depth = self.depth.saturating_sub(1);
  }

  fn emit_program(&mut self) -> CompileResult<()> {
    self.out.push_str(".intel_syntax noprefix\n");
    self.out.push_str(".globl main\n");
    self.out.push_str(".text\n\n");

    let program = self.program;
    for &item in &program.items {
      self.emit_item(item)?;
    }

    self.strings.emit(&mut self.out);
    if self.session.platform() != Platform::Windows {
      self.out.push_str(".section .note.GNU-stack,\"\",@progbits\n");
    }
    Ok(())
  }

  /// One top-level item: a function, or a `#!(...)` wrapper around one.
  fn emit_item(&mut self, id: StmtId) -> CompileResult<()> {
    let program = self.program;
    let stmt = &program[id];
    match &stmt.kind {
      StmtKind::Function(function) => self.emit_declared(function, stmt.is_pub, false),
      StmtKind::MacroDecl { attrs, decl } => {
        // A non-string `target` was already reported by the checker.
        let enabled = program
          .target_enabled(attrs, self.session.platform())
          .unwrap_or(false);
        if !enabled {
          tracing::debug!(line = stmt.pos.line, "skipping gated declaration");
          return Ok(());
        }
        let inner = &program[*decl];
        let StmtKind::Function(function) = &inner.kind else {
          return Ok(());
        };
        // `pub` may sit on the wrapper or on the wrapped function.
        let is_pub = stmt.is_pub || inner.is_pub;
        let is_extern = program.attr(attrs, "extern").is_some();
        self.emit_declared(function, is_pub, is_extern)
      }
      _ => Ok(()),
    }
  }

  fn emit_declared(
    &mut self,
    function: &Function,
    is_pub: bool,
    is_extern: bool,
  ) -> CompileResult<()> {
    if is_extern || !function.has_body {
      self.out.push_str(&format!(".extern {}\n\n", function.name));
      return Ok(());
    }
    if is_pub && function.name != "main" {
      self.out.push_str(&format!(".globl {}\n", function.name));
    }
    self.emit_function(function)
  }

  fn emit_function(&mut self, function: &Function) -> CompileResult<()> {
    let program = self.program;
    let layout = FrameLayout::compute(program, function, &self.conv);
    tracing::debug!(
      name = %function.name,
      frame = layout.size,
      locals = layout.local_count(),
      "emitting function"
    );

    self.bindings.clear();
    self.str_lens.clear();
    self.loops.clear();
    self.depth = 0;

    self.label(&function.name);
    self.emit("push rbp");
    self.emit("mov rbp, rsp");
    if layout.size > 0 {
      self.emit(format!("sub rsp, {}", layout.size));
    }

    let conv = self.conv;
    for (index, (param, slot)) in function.params.iter().zip(&layout.params).enumerate() {
      if let Some(reg) = conv.arg_regs.get(index) {
        self.emit(format!("mov {slot}, {reg}"));
      }
      self.bindings.insert(param.name.clone(), *slot);
    }
    self.layout = Some(layout);

    for &stmt in &function.body {
      self.emit_stmt(stmt)?;
    }

    if !self.ends_in_exit(&function.body) {
      self.emit("leave");
      self.emit("ret");
    }
    self.out.push('\n');
    self.layout = None;
    Ok(())
  }

  /// Whether the body's last statement already leaves the function.
  fn ends_in_exit(&self, body: &[StmtId]) -> bool {
    let Some(&last) = body.last() else {
      return false;
    };
    match &self.program[last].kind {
      StmtKind::Return(_) => true,
      StmtKind::Expr(expr) => matches!(
        &self.program[*expr].kind,
        ExprKind::MacroCall { name, .. } if name == "syscall"
      ),
      _ => false,
    }
  }

  fn lookup(&self, name: &str, pos: Pos) -> CompileResult<Slot> {
    self.bindings.get(name).copied().ok_or_else(|| {
      MissingSlotSnafu {
        name,
        line: pos.line,
        col: pos.col,
      }
      .build()
    })
  }

  fn emit_block(&mut self, body: &[StmtId]) -> CompileResult<()> {
    let saved = self.bindings.clone();
    for &stmt in body {
      self.emit_stmt(stmt)?;
    }
    self.bindings = saved;
    Ok(())
  }

  fn emit_stmt(&mut self, id: StmtId) -> CompileResult<()> {
    let program = self.program;
    let stmt = &program[id];
    let pos = stmt.pos;
    match &stmt.kind {
      StmtKind::VarDecl { name, ty, init } => {
        let slot = self
          .layout
          .as_ref()
          .and_then(|layout| layout.local(id))
          .ok_or_else(|| {
            MissingSlotSnafu {
              name,
              line: pos.line,
              col: pos.col,
            }
            .build()
          })?;
        self.emit(format!("# let {name}"));
        if let Some(init) = init {
          self.emit_expr(*init)?;
          self.emit(format!("mov {slot}, rax"));
        }
        self.bindings.insert(name.clone(), slot);
        if ty.is_str() {
          self.record_str_len(name, *init);
        }
      }
      StmtKind::Assign { name, value } => {
        let slot = self.lookup(name, pos)?;
        self.emit_expr(*value)?;
        self.emit(format!("mov {slot}, rax"));
        if self.str_lens.contains_key(name) || self.is_str_expr(*value) {
          self.record_str_len(name, Some(*value));
        }
      }
      StmtKind::Expr(expr) => self.emit_expr(*expr)?,
      StmtKind::Return(value) => {
        if let Some(value) = value {
          self.emit_expr(*value)?;
        }
        self.emit("leave");
        self.emit("ret");
      }
      StmtKind::If {
        cond,
        then_body,
        else_body,
      } => {
        let else_label = self.new_label();
        let end_label = self.new_label();
        self.emit_expr(*cond)?;
        self.emit("test rax, rax");
        self.emit(format!("jz .L_else_{else_label}"));
        self.emit_block(then_body)?;
        self.emit(format!("jmp .L_end_{end_label}"));
        self.label(format!(".L_else_{else_label}"));
        self.emit_block(else_body)?;
        self.label(format!(".L_end_{end_label}"));
      }
      StmtKind::For {
        init,
        cond,
        step,
        body,
      } => {
        let start_label = self.new_label();
        let end_label = self.new_label();
        let continue_label = self.new_label();
        let saved = self.bindings.clone();

        if let Some(init) = init {
          self.emit_stmt(*init)?;
        }
        self.label(format!(".L_for_start_{start_label}"));
        if let Some(cond) = cond {
          self.emit_expr(*cond)?;
          self.emit("test rax, rax");
          self.emit(format!("jz .L_for_end_{end_label}"));
        }

        self.loops.push(LoopLabels {
          continue_label,
          end_label,
        });
        let body_result = self.emit_block(body);
        self.loops.pop();
        body_result?;

        self.label(format!(".L_for_continue_{continue_label}"));
        if let Some(step) = step {
          self.emit_stmt(*step)?;
        }
        self.emit(format!("jmp .L_for_start_{start_label}"));
        self.label(format!(".L_for_end_{end_label}"));
        self.bindings = saved;
      }
      StmtKind::Break => match self.loops.last().copied() {
        Some(labels) => self.emit(format!("jmp .L_for_end_{}", labels.end_label)),
        None => self.error("`break` outside of a loop", pos),
      },
      StmtKind::Continue => match self.loops.last().copied() {
        Some(labels) => self.emit(format!("jmp .L_for_continue_{}", labels.continue_label)),
        None => self.error("`continue` outside of a loop", pos),
      },
      StmtKind::MemberAssign { .. } => self.error("Member assignment is not supported", pos),
      StmtKind::Function(_)
      | StmtKind::MacroDecl { .. }
      | StmtKind::StructDecl { .. }
      | StmtKind::FieldDecl { .. }
      | StmtKind::ImplDecl { .. }
      | StmtKind::ConstructorDecl { .. } => {}
    }
    Ok(())
  }

  fn is_str_expr(&self, id: ExprId) -> bool {
    self.program[id].ty.as_ref().is_some_and(|ty| ty.is_str())
  }

  /// Remember the compile-time length of a string variable for `strlen!`.
  fn record_str_len(&mut self, name: &str, value: Option<ExprId>) {
    let len = value.and_then(|value| match &self.program[value].kind {
      ExprKind::Str(text) => Some(text.len()),
      ExprKind::Ident(source) => self.str_lens.get(source).copied(),
      _ => None,
    });
    match len {
      Some(len) => {
        self.str_lens.insert(name.to_string(), len);
      }
      None => {
        self.str_lens.remove(name);
      }
    }
  }

  fn emit_expr(&mut self, id: ExprId) -> CompileResult<()> {
    let program = self.program;
    let expr = &program[id];
    let pos = expr.pos;
    match &expr.kind {
      ExprKind::Int(value) => self.emit(format!("mov rax, {value}")),
      ExprKind::Float(value) => {
        self.emit(format!("# float {value}"));
        self.emit(format!("mov rax, {}", value.trunc() as i64));
      }
      ExprKind::Bool(value) => self.emit(format!("mov rax, {}", u8::from(*value))),
      ExprKind::Str(text) => {
        let label = self.strings.intern(text);
        self.emit(format!("lea rax, [rip + {label}]"));
      }
      ExprKind::Ident(name) => {
        let slot = self.lookup(name, pos)?;
        self.emit(format!("mov rax, {slot}"));
      }
      ExprKind::Binary { op, lhs, rhs } => {
        self.emit_expr(*lhs)?;
        self.push("rax");
        self.emit_expr(*rhs)?;
        self.pop("rdi");
        let unsigned = program[*lhs].ty.as_ref().is_some_and(|ty| ty.is_unsigned());
        self.emit_binary(*op, unsigned);
      }
      ExprKind::Unary { op, operand } => match op {
        UnaryOp::Negate => match &program[*operand].kind {
          ExprKind::Int(value) => self.emit(format!("mov rax, {}", value.wrapping_neg())),
          _ => {
            self.emit_expr(*operand)?;
            self.emit("neg rax");
          }
        },
        UnaryOp::AddressOf => match &program[*operand].kind {
          ExprKind::Ident(name) => {
            let slot = self.lookup(name, program[*operand].pos)?;
            self.emit(format!("lea rax, {slot}"));
          }
          _ => self.error("Cannot take the address of a non-variable expression", pos),
        },
      },
      ExprKind::Call { name, args } => self.emit_call(name, args)?,
      ExprKind::MacroCall { name, args } => self.emit_macro(name, args, pos)?,
      ExprKind::MemberAccess { .. } => self.error("Member access is not supported", pos),
      ExprKind::Invalid => {}
    }
    Ok(())
  }

  /// Combine `rdi` (left) with `rax` (right) into `rax`.
  fn emit_binary(&mut self, op: BinaryOp, unsigned: bool) {
    match op {
      BinaryOp::Add => self.emit("add rax, rdi"),
      BinaryOp::Sub => {
        self.emit("sub rdi, rax");
        self.emit("mov rax, rdi");
      }
      BinaryOp::Mul => self.emit("imul rax, rdi"),
      BinaryOp::Div | BinaryOp::Mod => {
        self.emit("mov rcx, rax");
        self.emit("mov rax, rdi");
        if unsigned {
          self.emit("xor edx, edx");
          self.emit("div rcx");
        } else {
          self.emit("cqo");
          self.emit("idiv rcx");
        }
        if op == BinaryOp::Mod {
          self.emit("mov rax, rdx");
        }
      }
      BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
        let set = match (op, unsigned) {
          (BinaryOp::Eq, _) => "sete",
          (BinaryOp::Ne, _) => "setne",
          (BinaryOp::Lt, false) => "setl",
          (BinaryOp::Gt, false) => "setg",
          (BinaryOp::Le, false) => "setle",
          (BinaryOp::Ge, false) => "setge",
          (BinaryOp::Lt, true) => "setb",
          (BinaryOp::Gt, true) => "seta",
          (BinaryOp::Le, true) => "setbe",
          _ => "setae",
        };
        self.emit("cmp rdi, rax");
        self.emit(format!("{set} al"));
        self.emit("movzx rax, al");
      }
      BinaryOp::And => self.emit("and rax, rdi"),
      BinaryOp::Or => self.emit("or rax, rdi"),
    }
  }

  /// Evaluate arguments right to left onto the stack, then pop the register
  /// arguments in one batch so no evaluation can clobber a loaded register.
  fn emit_call(&mut self, name: &str, args: &[ExprId]) -> CompileResult<()> {
    let conv = self.conv;
    let stack_args = conv.stack_args(args.len());
    let padded = (self.depth + stack_args) % 2 == 1;
    if padded {
      self.emit("sub rsp, 8");
      self.depth += 1;
    }

    for &arg in args.iter().rev() {
      self.emit_expr(arg)?;
      self.push("rax");
    }
    for reg in conv.arg_regs.iter().take(args.len()) {
      self.pop(reg);
    }

    if conv.shadow_space > 0 {
      self.emit(format!("sub rsp, {}", conv.shadow_space));
    }
    self.emit(format!("call {name}"));

    let cleanup = conv.shadow_space + SLOT_SIZE * (stack_args + usize::from(padded));
    if cleanup > 0 {
      self.emit(format!("add rsp, {cleanup}"));
    }
    self.depth = self.depth.saturating_sub(stack_args + usize::from(padded));
    Ok(())
  }

  fn emit_macro(&mut self, name: &str, args: &[ExprId], pos: Pos) -> CompileResult<()> {
    match name {
      "syscall" => self.emit_syscall(args, pos),
      "strlen" => {
        self.emit_strlen(args, pos);
        Ok(())
      }
      _ => {
        self.error(format!("Unknown macro: {name}!"), pos);
        Ok(())
      }
    }
  }

  /// `syscall!(number, args...)`: trailing arguments go to the kernel
  /// registers, the number is loaded into `rax` last.
  fn emit_syscall(&mut self, args: &[ExprId], pos: Pos) -> CompileResult<()> {
    let Some((&number, rest)) = args.split_first() else {
      self.error("syscall! requires a syscall number", pos);
      return Ok(());
    };
    if rest.len() > SYSCALL_REGS.len() {
      self.error(
        format!("syscall! accepts at most {} arguments", SYSCALL_REGS.len()),
        pos,
      );
      return Ok(());
    }

    for &arg in rest.iter().rev() {
      self.emit_expr(arg)?;
      self.push("rax");
    }
    self.emit_expr(number)?;
    for reg in SYSCALL_REGS.iter().take(rest.len()) {
      self.pop(reg);
    }
    self.emit("syscall");
    Ok(())
  }

  /// `strlen!(x)` folds to the byte length of a literal or a string variable.
  fn emit_strlen(&mut self, args: &[ExprId], pos: Pos) {
    let program = self.program;
    let len = match args {
      [arg] => match &program[*arg].kind {
        ExprKind::Str(text) => Some(text.len()),
        ExprKind::Ident(name) => self.str_lens.get(name).copied(),
        _ => None,
      },
      _ => None,
    };
    match len {
      Some(len) => self.emit(format!("mov rax, {len}")),
      None => self.error("strlen! expects a string literal or a string variable", pos),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser::parse;
  use crate::session::CompileOptions;
  use crate::typeck::check;

  fn compile_on(source: &str, platform: Platform) -> (String, Vec<String>) {
    let mut session = Session::new(CompileOptions::for_platform(platform));
    let mut program = parse(source, &mut session);
    check(&mut program, &mut session);
    assert!(
      !session.has_errors(),
      "front-end errors: {:?}",
      session.diagnostics()
    );
    let asm = generate(&program, &mut session).expect("generate");
    let errors = session
      .diagnostics()
      .iter()
      .map(|diag| diag.message.clone())
      .collect();
    (asm, errors)
  }

  fn compile(source: &str) -> String {
    let (asm, errors) = compile_on(source, Platform::Linux);
    assert!(errors.is_empty(), "{errors:?}");
    asm
  }

  fn lines(asm: &str) -> Vec<&str> {
    asm.lines().map(str::trim).collect()
  }

  /// Whether `needle` occurs as a contiguous run of trimmed lines.
  fn contains_seq(asm: &str, needle: &[&str]) -> bool {
    lines(asm).windows(needle.len()).any(|window| window == needle)
  }

  #[test]
  fn add_function() {
    let asm = compile("fn add(a: i32, b: i32) -> i32 { return a + b; }");
    assert!(contains_seq(
      &asm,
      &[
        "add:",
        "push rbp",
        "mov rbp, rsp",
        "sub rsp, 16",
        "mov [rbp - 8], rdi",
        "mov [rbp - 16], rsi",
        "mov rax, [rbp - 8]",
        "push rax",
        "mov rax, [rbp - 16]",
        "pop rdi",
        "add rax, rdi",
        "leave",
        "ret",
      ]
    ));
    assert_eq!(lines(&asm).iter().filter(|line| **line == "ret").count(), 1);
  }

  #[test]
  fn header_and_trailer() {
    let asm = compile("fn main() { }");
    assert!(asm.starts_with(".intel_syntax noprefix\n.globl main\n"));
    assert!(asm.ends_with(".section .note.GNU-stack,\"\",@progbits\n"));
    assert!(!asm.contains(".rodata"));

    let (windows, _) = compile_on("fn main() { }", Platform::Windows);
    assert!(!windows.contains("GNU-stack"));
  }

  #[test]
  fn default_epilogue_is_appended() {
    let asm = compile("fn main() { let x: i32 = 1; }");
    assert!(contains_seq(&asm, &["mov [rbp - 8], rax", "leave", "ret"]));
  }

  #[test]
  fn strlen_folds_to_a_constant() {
    let asm = compile("fn main() { let x: str = \"hi\"; strlen!(x); strlen!(\"four\"); }");
    assert!(lines(&asm).contains(&"mov rax, 2"));
    assert!(lines(&asm).contains(&"mov rax, 4"));
  }

  #[test]
  fn strlen_follows_copies_and_rejects_unknown_lengths() {
    let asm = compile("fn main() { let x: str = \"abc\"; let y: str = x; strlen!(y); }");
    assert!(lines(&asm).contains(&"mov rax, 3"));

    let (_, errors) = compile_on("fn main(s: str) { strlen!(s); }", Platform::Linux);
    assert_eq!(
      errors,
      vec!["strlen! expects a string literal or a string variable".to_string()]
    );
  }

  #[test]
  fn identical_literals_share_one_entry() {
    let asm = compile("fn main() { let a: str = \"same\"; let b: str = \"same\"; }");
    assert_eq!(asm.matches(".string \"same\"").count(), 1);
    assert_eq!(asm.matches("lea rax, [rip + .L_str_0]").count(), 2);
  }

  #[test]
  fn target_gating_removes_the_function() {
    let source = "#!(target = \"Linux\") fn foo() { } fn main() { }";
    let (mac, _) = compile_on(source, Platform::MacOS);
    assert!(!mac.contains("foo"));
    let (linux, _) = compile_on(source, Platform::Linux);
    assert!(linux.contains("foo:\n"));
  }

  #[test]
  fn extern_and_bodyless_functions_are_declarations() {
    let asm = compile("#!(extern) fn puts(s: str) -> i32 { return 0; } fn exit(code: i32);");
    assert!(asm.contains(".extern puts\n"));
    assert!(asm.contains(".extern exit\n"));
    assert!(!asm.contains("puts:"));
  }

  #[test]
  fn wrapper_attributes_combine_target_and_extern() {
    let source = "#!(target = \"MacOS\", extern, target = \"Linux\") fn write(fd: i32);";
    let (linux, _) = compile_on(source, Platform::Linux);
    assert!(linux.contains(".extern write\n"));
    let (mac, _) = compile_on(source, Platform::MacOS);
    assert!(!mac.contains("write"));
  }

  #[test]
  fn pub_functions_are_exported() {
    let asm = compile("pub fn helper() { } fn local() { }");
    assert!(asm.contains(".globl helper\nhelper:\n"));
    assert!(!asm.contains(".globl local"));
  }

  #[test]
  fn pub_on_a_macro_wrapper_exports_the_function() {
    let asm = compile(
      "pub #!(target = \"Linux\") fn foo() { } #!(target = \"Linux\") pub fn bar() { }",
    );
    assert!(asm.contains(".globl foo\nfoo:\n"));
    assert!(asm.contains(".globl bar\nbar:\n"));
  }

  #[test]
  fn if_else_labels() {
    let asm = compile("fn main() { if true { } else { } }");
    assert!(contains_seq(
      &asm,
      &[
        "mov rax, 1",
        "test rax, rax",
        "jz .L_else_0",
        "jmp .L_end_1",
        ".L_else_0:",
        ".L_end_1:",
      ]
    ));
  }

  #[test]
  fn break_and_continue_jump() {
    let asm = compile(
      "fn main() { for let i: i32 = 0; i < 10; i = i + 1 { if i == 3 { continue; } break; } }",
    );
    // for labels 0..=2, if labels 3 and 4
    assert!(lines(&asm).contains(&"jmp .L_for_continue_2"));
    assert!(lines(&asm).contains(&"jmp .L_for_end_1"));
    assert!(contains_seq(
      &asm,
      &["jmp .L_for_start_0", ".L_for_end_1:", "leave", "ret"]
    ));
  }

  #[test]
  fn nested_loops_target_the_innermost() {
    let asm = compile("fn main() { for { for { break; } continue; } }");
    assert!(contains_seq(&asm, &[".L_for_start_3:", "jmp .L_for_end_4"]));
    assert!(contains_seq(
      &asm,
      &[".L_for_end_4:", "jmp .L_for_continue_2"]
    ));
  }

  #[test]
  fn stray_break_is_reported() {
    let (_, errors) = compile_on("fn main() { break; }", Platform::Linux);
    assert_eq!(errors, vec!["`break` outside of a loop".to_string()]);
  }

  #[test]
  fn frame_covers_params_and_locals() {
    let asm = compile("fn f(a: i32) { let x: i32 = 1; let y: i32 = 2; }");
    assert!(lines(&asm).contains(&"sub rsp, 32"));
    assert!(lines(&asm).contains(&"mov [rbp - 24], rax"));
  }

  #[test]
  fn calls_pop_arguments_into_registers() {
    let asm = compile("fn f(a: i32, b: i32) -> i32 { return a; } fn main() { f(1, 2); }");
    assert!(contains_seq(
      &asm,
      &[
        "mov rax, 2",
        "push rax",
        "mov rax, 1",
        "push rax",
        "pop rdi",
        "pop rsi",
        "call f",
      ]
    ));
  }

  #[test]
  fn calls_keep_the_stack_aligned() {
    let asm = compile("fn g() -> i32 { return 1; } fn main() { 1 + g(); }");
    assert!(contains_seq(
      &asm,
      &["push rax", "sub rsp, 8", "call g", "add rsp, 8", "pop rdi"]
    ));
  }

  #[test]
  fn stack_arguments_and_shadow_space() {
    let source = "fn f(a: i32, b: i32, c: i32, d: i32, e: i32) { } fn main() { f(1, 2, 3, 4, 5); }";
    let (win, _) = compile_on(source, Platform::Windows);
    assert!(contains_seq(
      &win,
      &[
        "pop rcx",
        "pop rdx",
        "pop r8",
        "pop r9",
        "sub rsp, 32",
        "call f",
        "add rsp, 48",
      ]
    ));
  }

  #[test]
  fn syscall_loads_number_last() {
    let asm = compile("fn main() { syscall!(60, 7); }");
    assert!(contains_seq(
      &asm,
      &["mov rax, 7", "push rax", "mov rax, 60", "pop rdi", "syscall"]
    ));
    // no default epilogue after a trailing syscall
    assert!(!lines(&asm).contains(&"leave"));
  }

  #[test]
  fn intrinsic_misuse_is_reported() {
    let (_, errors) = compile_on(
      "fn main() { syscall!(); syscall!(1, 2, 3, 4, 5, 6, 7, 8); frob!(1); }",
      Platform::Linux,
    );
    assert_eq!(
      errors,
      vec![
        "syscall! requires a syscall number".to_string(),
        "syscall! accepts at most 6 arguments".to_string(),
        "Unknown macro: frob!".to_string(),
      ]
    );
  }

  #[test]
  fn unsigned_operands_use_unsigned_instructions() {
    let asm = compile("fn f(a: u32, b: u32) -> bool { let q: u32 = a / b; return a < b; }");
    assert!(contains_seq(&asm, &["xor edx, edx", "div rcx"]));
    assert!(lines(&asm).contains(&"setb al"));
  }

  #[test]
  fn negation_and_address_of() {
    let asm = compile("fn main() { let x: i32 = -5; let p: *i32 = &x; let y: i32 = -x; }");
    assert!(lines(&asm).contains(&"mov rax, -5"));
    assert!(lines(&asm).contains(&"lea rax, [rbp - 8]"));
    assert!(lines(&asm).contains(&"neg rax"));
  }
}
