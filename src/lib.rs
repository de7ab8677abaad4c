/*!

  A toolchain for the Hex stack machine: an assembler that compiles the
  textual directive language into a compact binary, and a simulator that
  executes it. The `hexasm` and `hexsim` binaries live under `src/bin/`.

  The assembly pipeline is this:

  ```text
  text -> [`lexer`] -> tokens -> [`parser`] -> directives ->⋯

  ⋯-> [`resolver`] -> (resolved directives, label map) ->⋯

  ⋯-> [`emitter`] -> bytes -> [`hvm`] -> output/exit code
  ```

  An external compiler front end that lowers its own source language to
  `Directive` lists can enter the pipeline at [`assemble_directives`]; the
  only contract is a well-formed directive list with no duplicate labels.

*/

#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

pub mod bytecode;
pub mod chariter;
pub mod directive;
pub mod emitter;
pub mod error;
pub mod hvm;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod token;

use crate::directive::Directive;
use crate::error::Result;

/// Assembles Hex assembly source text into a binary image.
pub fn assemble(source: &str) -> Result<Vec<u8>> {
  let mut program = parser::Parser::new(lexer::Lexer::new(source)).parse_program()?;
  assemble_directives(&mut program)
}

/// Resolves and emits an externally produced directive list.
pub fn assemble_directives(program: &mut [Directive]) -> Result<Vec<u8>> {
  let labels = resolver::build_label_map(program)?;
  resolver::resolve_labels(program, &labels)?;
  Ok(emitter::emit_binary(program))
}

#[cfg(test)]
mod tests {
  use string_cache::DefaultAtom;

  use crate::bytecode::{Opcode, OprOp};

  use super::*;

  #[test]
  fn directive_lists_assemble_without_source_text() {
    // The shape a compiler front end hands over: an unresolved branch over
    // a data word.
    let mut program = vec![
      Directive::InstrLabel {
        opcode : Opcode::Br,
        name   : DefaultAtom::from("start"),
        offset : 0,
        width  : 1,
      },
      Directive::Data { value: 16383 },
      Directive::Label { name: DefaultAtom::from("start"), offset: 0 },
      Directive::InstrOp { op: OprOp::Svc },
    ];
    let image = assemble_directives(&mut program).unwrap();
    assert_eq!(image[0], 0x87);
    assert_eq!(image.len(), 12);
  }

  #[test]
  fn round_trip_through_the_rendered_form() {
    // Rendering a resolved program and assembling the rendered text again
    // produces the same image. Label operands display with their resolved
    // offset in parentheses for listings, so those render as name only.
    let source = "BR start\nDATA 16383\nstart\nLDAC 0\nLDBM 1\nSTAI 2\nLDAC 0\nOPR SVC\n";
    let mut program = parser::Parser::new(lexer::Lexer::new(source)).parse_program().unwrap();
    let first = assemble_directives(&mut program).unwrap();

    let mut rendered = String::new();
    for directive in &program {
      match directive {
        Directive::InstrLabel { opcode, name, .. } => {
          rendered.push_str(&format!("{} {}\n", opcode, name));
        }
        other => rendered.push_str(&format!("{}\n", other)),
      }
    }
    let second = assemble(&rendered).unwrap();
    assert_eq!(first, second);
  }
}
