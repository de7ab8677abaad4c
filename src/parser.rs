/*!

  The parser consumes the token stream and produces an ordered directive
  list, one directive per top-level construct:

  ```text
  program    := { directive }
  directive  := label | data | func | proc | instr
  label      := IDENTIFIER
  data       := "DATA" integer
  func       := "FUNC" IDENTIFIER
  proc       := "PROC" IDENTIFIER
  instr      := operand_opcode (integer | IDENTIFIER)
              | "OPR" opr_opcode
  integer    := [ "-" ] NATURAL
  ```

*/

use string_cache::DefaultAtom;

use crate::directive::Directive;
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::token::Token;

pub struct Parser<'a> {
  lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>) -> Self {
    Parser { lexer }
  }

  /// Parses the whole token stream into an ordered directive list.
  pub fn parse_program(&mut self) -> Result<Vec<Directive>> {
    let mut program = Vec::new();
    while self.lexer.next_token()? != Token::EndOfFile {
      program.push(self.parse_directive()?);
    }
    Ok(program)
  }

  fn parse_directive(&mut self) -> Result<Directive> {
    let token = self.lexer.last_token();
    match token {

      Token::Data => {
        self.lexer.next_token()?;
        Ok(Directive::Data { value: self.parse_integer()? })
      }

      Token::Func => Ok(Directive::Func { name: self.parse_identifier()? }),

      Token::Proc => Ok(Directive::Proc { name: self.parse_identifier()? }),

      Token::Identifier => Ok(Directive::Label {
        name   : DefaultAtom::from(self.lexer.identifier()),
        offset : 0,
      }),

      Token::Opr => {
        let operand = self.lexer.next_token()?;
        match operand.opr_op() {
          Some(op) => Ok(Directive::InstrOp { op }),
          None => Err(self.error(format!("unexpected operand to OPR `{}`", operand))),
        }
      }

      _ => match token.opcode() {
        Some(opcode) => {
          // An identifier operand makes a label reference; anything else
          // must be an integer immediate.
          if self.lexer.next_token()? == Token::Identifier {
            Ok(Directive::InstrLabel {
              opcode,
              name   : DefaultAtom::from(self.lexer.identifier()),
              offset : 0,
              width  : 1,
            })
          } else {
            Ok(Directive::InstrImm { opcode, value: self.parse_integer()? })
          }
        }
        None => Err(self.error(format!("unrecognised token `{}`", token))),
      },

    }
  }

  /// `MINUS? NUMBER`. The first of the two tokens must already have been
  /// read. `MINUS IDENTIFIER` is an error.
  fn parse_integer(&mut self) -> Result<i32> {
    if self.lexer.last_token() == Token::Minus {
      self.expect_next(Token::Number)?;
      return Ok(-(self.lexer.number() as i64) as i32);
    }
    self.expect_last(Token::Number)?;
    Ok(self.lexer.number() as i32)
  }

  fn parse_identifier(&mut self) -> Result<DefaultAtom> {
    self.expect_next(Token::Identifier)?;
    Ok(DefaultAtom::from(self.lexer.identifier()))
  }

  fn expect_next(&mut self, token: Token) -> Result<()> {
    self.lexer.next_token()?;
    self.expect_last(token)
  }

  fn expect_last(&self, token: Token) -> Result<()> {
    match self.lexer.last_token() == token {
      true  => Ok(()),
      false => Err(self.error(format!("expected {}, found {}", token, self.lexer.last_token()))),
    }
  }

  fn error(&self, message: String) -> Error {
    Error::parser(self.lexer.line(), message)
  }
}
