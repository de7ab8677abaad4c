/*!
  Walks a resolved directive list once, emitting the binary image, or a
  human-readable listing for the assembler's `--tree` surface. The running
  byte offset maintained here matches the one the resolver's final pass
  computed, because both walks use the same sizes and the same alignment
  rule.
*/

use crate::bytecode::Opcode;
use crate::directive::Directive;

/// Emits the resolved program as a flat little-endian byte stream. The
/// image is zero-padded to a whole number of words.
pub fn emit_binary(program: &[Directive]) -> Vec<u8> {
  let mut bytes: Vec<u8> = Vec::new();
  for directive in program {
    match directive {

      Directive::Data { value } => {
        pad_to_word(&mut bytes);
        bytes.extend_from_slice(&value.to_le_bytes());
      }

      Directive::Func { .. } | Directive::Proc { .. } | Directive::Label { .. } => {}

      Directive::InstrOp { op } => {
        bytes.push(Opcode::Opr.code() << 4 | op.code());
      }

      Directive::InstrImm { opcode, value } => {
        emit_operand(&mut bytes, *opcode, *value, directive.size());
      }

      Directive::InstrLabel { opcode, offset, width, .. } => {
        emit_operand(&mut bytes, *opcode, *offset, *width);
      }

    }
  }
  pad_to_word(&mut bytes);
  bytes
}

/**
  Emits one instruction of the given encoded width. The `width - 1` prefix
  bytes deliver the operand's high nibbles most significant first; the final
  byte carries the opcode and the low nibble. A negative operand leads with
  a single NFIX, which seeds the sign bits of the operand register, and
  continues with PFIX like everything else: a second NFIX would set the
  bits the first one just shifted up. A width beyond the operand's minimal
  encoding pads with leading zero or sign nibbles, which the prefix
  semantics absorb.
*/
fn emit_operand(bytes: &mut Vec<u8>, opcode: Opcode, value: i32, width: usize) {
  let mut prefix = match value < 0 {
    true  => Opcode::Nfix,
    false => Opcode::Pfix,
  };
  for i in (1..width).rev() {
    bytes.push(prefix.code() << 4 | (value >> (4 * i)) as u8 & 0xF);
    prefix = Opcode::Pfix;
  }
  bytes.push(opcode.code() << 4 | value as u8 & 0xF);
}

fn pad_to_word(bytes: &mut Vec<u8>) {
  while bytes.len() & 0x3 != 0 {
    bytes.push(0);
  }
}

/// Renders the resolved program with byte offsets, directive forms, and
/// sizes, including explicit rows for alignment padding.
pub fn emit_listing(program: &[Directive]) -> String {
  let mut out = String::new();
  let mut byte_offset = 0;
  for directive in program {
    if matches!(directive, Directive::Data { .. }) && byte_offset & 0x3 != 0 {
      byte_offset += padding_row(&mut out, byte_offset);
    }
    out.push_str(&format!(
      "{:#08x} {:<20} ({} bytes)\n",
      byte_offset,
      directive.to_string(),
      directive.size()
    ));
    byte_offset += directive.size();
  }
  if byte_offset & 0x3 != 0 {
    byte_offset += padding_row(&mut out, byte_offset);
  }
  out.push_str(&format!("{} bytes\n", byte_offset));
  out
}

fn padding_row(out: &mut String, byte_offset: usize) -> usize {
  let padding = 4 - (byte_offset & 0x3);
  out.push_str(&format!(
    "{:#08x} {:<20} ({} bytes)\n",
    byte_offset,
    format!("PADDING {}", padding),
    padding
  ));
  padding
}

#[cfg(test)]
mod tests {
  use crate::assemble;
  use crate::bytecode::{encoded_size, OprOp};
  use crate::error::Result;
  use crate::lexer::Lexer;
  use crate::parser::Parser;
  use crate::resolver::{build_label_map, resolve_labels};

  use super::*;

  fn resolve(source: &str) -> Result<Vec<Directive>> {
    let mut program = Parser::new(Lexer::new(source)).parse_program()?;
    let labels = build_label_map(&program)?;
    resolve_labels(&mut program, &labels)?;
    Ok(program)
  }

  const EXIT0: &str = "BR start
DATA 16383
start
LDAC 0
LDBM 1
STAI 2
LDAC 0
OPR SVC
";

  /// Reconstructs the operand register from an encoded instruction the way
  /// the simulator's fetch loop does, returning it with the final opcode.
  fn decode_operand(bytes: &[u8]) -> (u8, u32) {
    let mut oreg: u32 = 0;
    for (index, byte) in bytes.iter().enumerate() {
      oreg |= (*byte & 0xF) as u32;
      let opcode = byte >> 4;
      match opcode {
        12 => oreg <<= 4,                           // PFIX
        14 => oreg = 0xFFFF_FF00 | (oreg << 4),     // NFIX
        _  => {
          assert_eq!(index, bytes.len() - 1);
          return (opcode, oreg);
        }
      }
    }
    panic!("instruction had no terminal opcode byte");
  }

  #[test]
  fn exit0_image() {
    let image = assemble(EXIT0).unwrap();
    assert_eq!(
      image,
      vec![
        0x87, 0x00, 0x00, 0x00, // BR start (operand 7), padding
        0xFF, 0x3F, 0x00, 0x00, // DATA 16383, little endian
        0x20, // LDAC 0
        0x11, // LDBM 1
        0x72, // STAI 2
        0x20, // LDAC 0
        0xB3, // OPR SVC
        0x00, 0x00, 0x00, // trailing pad to a whole word
      ]
    );
  }

  #[test]
  fn data_words_are_aligned() {
    let image = assemble("LDAC 0\nDATA -2").unwrap();
    assert_eq!(image.len(), 8);
    assert_eq!(&image[..4], &[0x20, 0x00, 0x00, 0x00]);
    assert_eq!(&image[4..], &(-2i32).to_le_bytes());
  }

  #[test]
  fn opr_byte_packs_the_sub_opcode() {
    let mut bytes = Vec::new();
    for (op, expected) in [
      (OprOp::Brb, 0xB0),
      (OprOp::Add, 0xB1),
      (OprOp::Sub, 0xB2),
      (OprOp::Svc, 0xB3),
    ] {
      bytes.clear();
      bytes.push(Opcode::Opr.code() << 4 | op.code());
      assert_eq!(bytes, vec![expected]);
    }
  }

  #[test]
  fn operand_encoding_law() {
    // Decoding an emitted immediate through the prefix rules reconstructs
    // the operand register exactly.
    for value in [
      0, 1, 15, 16, 255, 256, 4095, 65535, 1 << 20, i32::MAX,
      -1, -15, -16, -17, -255, -256, -257, -65536, i32::MIN,
    ] {
      let mut bytes = Vec::new();
      emit_operand(&mut bytes, Opcode::Ldac, value, encoded_size(value));
      let (opcode, oreg) = decode_operand(&bytes);
      assert_eq!(opcode, Opcode::Ldac.code());
      assert_eq!(oreg as i32, value, "operand {} did not survive encoding", value);
    }
  }

  #[test]
  fn padded_widths_decode_to_the_same_operand() {
    for (value, width) in [(15, 2), (15, 3), (-2, 3), (-2, 4), (300, 4)] {
      let mut bytes = Vec::new();
      emit_operand(&mut bytes, Opcode::Br, value, width);
      assert_eq!(bytes.len(), width);
      let (_, oreg) = decode_operand(&bytes);
      assert_eq!(oreg as i32, value);
    }
  }

  #[test]
  fn exit0_listing() {
    let program = resolve(EXIT0).unwrap();
    let listing = emit_listing(&program);
    let expected = "\
0x000000 BR start (7)         (1 bytes)
0x000004 DATA 16383           (4 bytes)
0x000008 start                (0 bytes)
0x000008 LDAC 0               (1 bytes)
0x000009 LDBM 1               (1 bytes)
0x00000a STAI 2               (1 bytes)
0x00000b LDAC 0               (1 bytes)
0x00000c OPR SVC              (1 bytes)
0x00000d PADDING 3            (3 bytes)
16 bytes
";
    assert_eq!(listing, expected);
  }
}
