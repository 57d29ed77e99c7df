//! Layout pass: assign every parameter and local an 8-byte slot before any
//! instruction of the function is emitted, so the prologue already knows the
//! final frame size.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ast::{Function, Program, StmtId, StmtKind};

use super::abi::CallConv;

pub const SLOT_SIZE: usize = 8;

/// A stack location addressed from `rbp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
  /// Signed displacement from the frame pointer.
  pub disp: i64,
}

impl Slot {
  fn below(offset: usize) -> Self {
    Self {
      disp: -(offset as i64),
    }
  }

  fn above(offset: usize) -> Self {
    Self {
      disp: offset as i64,
    }
  }
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.disp < 0 {
      write!(f, "[rbp - {}]", self.disp.unsigned_abs())
    } else {
      write!(f, "[rbp + {}]", self.disp)
    }
  }
}

#[derive(Debug, Clone)]
pub struct FrameLayout {
  /// Slot of each parameter, in declaration order.
  pub params: Vec<Slot>,
  locals: FxHashMap<StmtId, Slot>,
  /// Bytes reserved below `rbp`, a multiple of 16.
  pub size: usize,
}

impl FrameLayout {
  pub fn compute(program: &Program, function: &Function, conv: &CallConv) -> Self {
    let register_params = conv.arg_regs.len();
    let mut offset = 0;

    let params = (0..function.params.len())
      .map(|index| {
        if index < register_params {
          offset += SLOT_SIZE;
          Slot::below(offset)
        } else {
          // Return address and saved rbp sit between the frame and the caller's pushes.
          let stacked = index - register_params;
          Slot::above(16 + conv.shadow_space + SLOT_SIZE * stacked)
        }
      })
      .collect();

    let mut layout = Self {
      params,
      locals: FxHashMap::default(),
      size: 0,
    };
    layout.assign_block(program, &function.body, &mut offset);
    layout.size = offset.next_multiple_of(16);
    layout
  }

  fn assign_block(&mut self, program: &Program, body: &[StmtId], offset: &mut usize) {
    for &stmt in body {
      self.assign_stmt(program, stmt, offset);
    }
  }

  fn assign_stmt(&mut self, program: &Program, id: StmtId, offset: &mut usize) {
    match &program[id].kind {
      StmtKind::VarDecl { .. } => {
        *offset += SLOT_SIZE;
        self.locals.insert(id, Slot::below(*offset));
      }
      StmtKind::If {
        then_body,
        else_body,
        ..
      } => {
        self.assign_block(program, then_body, offset);
        self.assign_block(program, else_body, offset);
      }
      StmtKind::For {
        init, step, body, ..
      } => {
        if let Some(init) = init {
          self.assign_stmt(program, *init, offset);
        }
        self.assign_block(program, body, offset);
        if let Some(step) = step {
          self.assign_stmt(program, *step, offset);
        }
      }
      _ => {}
    }
  }

  /// Slot of a `let` statement.
  pub fn local(&self, id: StmtId) -> Option<Slot> {
    self.locals.get(&id).copied()
  }

  pub fn local_count(&self) -> usize {
    self.locals.len()
  }
}
