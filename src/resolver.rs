/*!
  Label resolution. Every branch or memory-reference instruction may expand
  to multiple bytes, the required length depends on the distance to the
  target label, and that distance depends on the lengths of all intervening
  instructions. The resolver therefore iterates whole-program passes until
  the program size reaches a fixpoint.
*/

use std::collections::HashMap;

use string_cache::DefaultAtom;

use crate::bytecode::instr_len;
use crate::directive::Directive;
use crate::error::{Error, Result};

/// Maps a label name to the index of its `Label` directive in the program.
/// Indices, not references, so the map stays valid while the resolver
/// mutates the directives.
pub type LabelMap = HashMap<DefaultAtom, usize>;

/// Passes are bounded as a safety net; well-formed programs settle in a
/// handful of iterations.
const MAX_RESOLVE_PASSES: usize = 64;

/// Builds the label map. Two labels with the same name are an error.
pub fn build_label_map(program: &[Directive]) -> Result<LabelMap> {
  let mut labels = LabelMap::new();
  for (index, directive) in program.iter().enumerate() {
    if let Directive::Label { name, .. } = directive {
      if labels.insert(name.clone(), index).is_some() {
        return Err(Error::resolution(format!("duplicate label `{}`", name)));
      }
    }
  }
  Ok(labels)
}

/**
  Iteratively assigns byte offsets to labels and label operands until the
  program size stops changing.

  Each pass walks the program keeping a running byte offset: data words are
  aligned to 4-byte boundaries (the padding counts toward offsets), each
  label is assigned the current offset, and each label operand is assigned
  `target - offset - length`, where `length` is the self-consistent encoded
  width of the instruction. Widths only move when a distance crosses a
  nibble boundary and the set of possible widths is finite, so the passes
  settle; the loop stops when a pass leaves the total size unchanged.
*/
pub fn resolve_labels(program: &mut [Directive], labels: &LabelMap) -> Result<()> {
  // Every label operand must have a target before any offsets make sense.
  for directive in program.iter() {
    if let Directive::InstrLabel { name, .. } = directive {
      if !labels.contains_key(name) {
        return Err(Error::resolution(format!("unknown label `{}`", name)));
      }
    }
  }

  let mut last_size = -1;
  let mut byte_offset = 0;
  let mut passes = 0;
  while last_size != byte_offset {
    passes += 1;
    if passes > MAX_RESOLVE_PASSES {
      return Err(Error::resolution("label resolution failed to converge"));
    }

    last_size = byte_offset;
    byte_offset = 0;
    for index in 0..program.len() {
      // Data must lie on 4-byte boundaries.
      if matches!(program[index], Directive::Data { .. }) && byte_offset & 0x3 != 0 {
        byte_offset += 4 - (byte_offset & 0x3);
      }

      let target = match &program[index] {
        Directive::InstrLabel { name, .. } => match &program[labels[name]] {
          Directive::Label { offset, .. } => Some(*offset),
          _ => unreachable!("the label map does not point at a label directive"),
        },
        _ => None,
      };

      match (&mut program[index], target) {

        (Directive::Label { offset, .. }, _) => {
          *offset = byte_offset;
        }

        (Directive::InstrLabel { offset, width, .. }, Some(target)) => {
          let length = instr_len(target, byte_offset);
          *offset = (target - byte_offset) - length as i32;
          *width = length;
        }

        _ => {}

      }

      byte_offset += program[index].size() as i32;
    }
  }
  Ok(())
}

/// The byte size of the resolved program, alignment padding included but
/// not the trailing pad to a whole word.
pub fn program_size(program: &[Directive]) -> i32 {
  let mut byte_offset = 0;
  for directive in program {
    if matches!(directive, Directive::Data { .. }) && byte_offset & 0x3 != 0 {
      byte_offset += 4 - (byte_offset & 0x3);
    }
    byte_offset += directive.size() as i32;
  }
  byte_offset
}
