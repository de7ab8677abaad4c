/*!
  The directive model: one tagged variant per kind of top-level element in
  an assembly program. Directives are created by the parser, mutated only by
  the label resolver (which fills in label offsets and instruction widths),
  and walked once by the emitter.
*/

use std::fmt::{Display, Formatter};

use string_cache::DefaultAtom;

use crate::bytecode::{encoded_size, Opcode, OprOp};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Directive {
  /// A signed 32-bit data word. Always emitted on a 4-byte boundary.
  Data { value: i32 },

  /// Marks the start of a function. Emits nothing.
  Func { name: DefaultAtom },

  /// Marks the start of a procedure. Emits nothing.
  Proc { name: DefaultAtom },

  /// Names a position in the byte stream. `offset` is assigned by the
  /// resolver and equals the byte offset of this position in the emitted
  /// stream.
  Label { name: DefaultAtom, offset: i32 },

  /// An instruction with an immediate operand.
  InstrImm { opcode: Opcode, value: i32 },

  /// An instruction whose operand is a label reference. The resolver
  /// assigns `offset`, relative to the byte after the instruction's last
  /// byte, and `width`, the encoded length the offset was computed with.
  InstrLabel {
    opcode : Opcode,
    name   : DefaultAtom,
    offset : i32,
    width  : usize,
  },

  /// An OPR instruction carrying its sub-opcode.
  InstrOp { op: OprOp },
}

impl Directive {
  /// The encoded size in bytes, excluding any alignment padding inserted
  /// before a `Data`.
  pub fn size(&self) -> usize {
    match self {
      Directive::Data { .. } => 4,
      Directive::Func { .. } | Directive::Proc { .. } | Directive::Label { .. } => 0,
      Directive::InstrImm { value, .. } => encoded_size(*value),
      Directive::InstrLabel { width, .. } => *width,
      Directive::InstrOp { .. } => 1,
    }
  }

  /// The value the directive contributes to the byte stream: the data word,
  /// the immediate or resolved operand, or the sub-opcode.
  pub fn value(&self) -> i32 {
    match self {
      Directive::Data { value } => *value,
      Directive::Func { .. } | Directive::Proc { .. } => 0,
      Directive::Label { offset, .. } => *offset,
      Directive::InstrImm { value, .. } => *value,
      Directive::InstrLabel { offset, .. } => *offset,
      Directive::InstrOp { op } => op.code() as i32,
    }
  }

  pub fn operand_is_label(&self) -> bool {
    matches!(self, Directive::InstrLabel { .. })
  }
}

impl Display for Directive {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Directive::Data { value } => write!(f, "DATA {}", value),

      Directive::Func { name } => write!(f, "FUNC {}", name),

      Directive::Proc { name } => write!(f, "PROC {}", name),

      Directive::Label { name, .. } => write!(f, "{}", name),

      Directive::InstrImm { opcode, value } => write!(f, "{} {}", opcode, value),

      Directive::InstrLabel { opcode, name, offset, .. } => {
        write!(f, "{} {} ({})", opcode, name, offset)
      }

      Directive::InstrOp { op } => write!(f, "OPR {}", op),

    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sizes() {
    assert_eq!(Directive::Data { value: -7 }.size(), 4);
    assert_eq!(Directive::Label { name: DefaultAtom::from("a"), offset: 0 }.size(), 0);
    assert_eq!(Directive::Func { name: DefaultAtom::from("f") }.size(), 0);
    assert_eq!(Directive::InstrOp { op: OprOp::Add }.size(), 1);
    assert_eq!(Directive::InstrImm { opcode: Opcode::Ldac, value: 0 }.size(), 1);
    assert_eq!(Directive::InstrImm { opcode: Opcode::Ldac, value: 255 }.size(), 2);
    assert_eq!(Directive::InstrImm { opcode: Opcode::Ldac, value: -1 }.size(), 2);
    let branch = Directive::InstrLabel {
      opcode : Opcode::Br,
      name   : DefaultAtom::from("loop"),
      offset : -13,
      width  : 2,
    };
    assert_eq!(branch.size(), 2);
  }

  #[test]
  fn values() {
    assert_eq!(Directive::Data { value: -7 }.value(), -7);
    assert_eq!(Directive::Func { name: DefaultAtom::from("f") }.value(), 0);
    assert_eq!(Directive::InstrOp { op: OprOp::Svc }.value(), 3);
    let branch = Directive::InstrLabel {
      opcode : Opcode::Br,
      name   : DefaultAtom::from("loop"),
      offset : -13,
      width  : 2,
    };
    assert_eq!(branch.value(), -13);
  }

  #[test]
  fn rendering() {
    assert_eq!(Directive::Data { value: 16383 }.to_string(), "DATA 16383");
    assert_eq!(Directive::InstrOp { op: OprOp::Svc }.to_string(), "OPR SVC");
    let branch = Directive::InstrLabel {
      opcode : Opcode::Br,
      name   : DefaultAtom::from("start"),
      offset : 7,
      width  : 1,
    };
    assert_eq!(branch.to_string(), "BR start (7)");
    assert!(branch.operand_is_label());
  }
}
