/*!
  Opcodes of the Hex machine.

  The numeric values are the hardware encoding carried in the high nibble of
  every instruction byte; assembler and simulator must agree on them, so
  they are written out explicitly rather than left to declaration order.
*/

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

/// The 4-bit instruction opcodes. Opcode 15 is undefined; decoding it is a
/// fatal simulator error.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,     Debug, Hash,
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
  Ldam = 0,
  Ldbm = 1,
  Ldac = 2,
  Ldbc = 3,
  Ldap = 4,
  Ldai = 5,
  Ldbi = 6,
  Stai = 7,
  Br   = 8,
  Brz  = 9,
  Brn  = 10,
  Opr  = 11,
  Pfix = 12,
  Stam = 13,
  Nfix = 14,
}

impl Opcode {
  /// The 4-bit numeric code, zero-extended to a byte.
  pub fn code(self) -> u8 {
    self.into()
  }
}

/// Sub-opcodes of OPR, selected by the operand register when an OPR
/// instruction executes.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,     Debug, Hash,
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum OprOp {
  Brb = 0,
  Add = 1,
  Sub = 2,
  Svc = 3,
}

impl OprOp {
  pub fn code(self) -> u8 {
    self.into()
  }
}

/// System calls, selected by accumulator A when OPR SVC executes.
#[derive(
  StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,               PartialEq,     Debug, Hash,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Syscall {
  Exit  = 0,
  Write = 1,
  Read  = 2,
}
