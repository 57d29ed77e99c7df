//! Calling-convention constants for the two supported x86-64 ABIs.

use crate::session::Platform;

/// Registers the kernel reads syscall arguments from, in order.
pub const SYSCALL_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "r10", "r8", "r9"];

const SYSV_ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];
const WIN64_ARG_REGS: [&str; 4] = ["rcx", "rdx", "r8", "r9"];

/// How integer arguments reach a callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallConv {
  pub arg_regs: &'static [&'static str],
  /// Bytes the caller reserves above the return address for the callee.
  pub shadow_space: usize,
}

impl CallConv {
  pub fn for_platform(platform: Platform) -> Self {
    match platform {
      Platform::Windows => Self {
        arg_regs: &WIN64_ARG_REGS,
        shadow_space: 32,
      },
      Platform::Linux | Platform::MacOS => Self {
        arg_regs: &SYSV_ARG_REGS,
        shadow_space: 0,
      },
    }
  }

  /// Arguments beyond the register set travel on the stack.
  pub fn stack_args(&self, count: usize) -> usize {
    count.saturating_sub(self.arg_regs.len())
  }
}
