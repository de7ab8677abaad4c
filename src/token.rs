/*!
  Tokens of the Hex assembly language. One variant per keyword, plus
  numbers, the minus sign, identifiers and end-of-file. The lexer keeps the
  payload of the last `Number`/`Identifier` token in its own fields, so
  tokens stay `Copy`.
*/

use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::bytecode::{Opcode, OprOp};

#[derive(StrumDisplay, IntoStaticStr, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Token {
  Number,
  Minus,
  // Directive keywords
  Data,
  Func,
  Proc,
  Opr,
  // Instruction keywords with an operand
  Ldam,
  Ldbm,
  Stam,
  Ldac,
  Ldbc,
  Ldap,
  Ldai,
  Ldbi,
  Stai,
  Br,
  Brz,
  Brn,
  // OPR sub-opcode keywords
  Brb,
  Add,
  Sub,
  Svc,
  Identifier,
  #[strum(serialize = "EOF")]
  EndOfFile,
}

impl Token {
  /// The keyword table. Identifiers that are not keywords lex as
  /// `Identifier`.
  pub fn keyword(name: &str) -> Option<Token> {
    match name {
      "ADD"  => Some(Token::Add),
      "BR"   => Some(Token::Br),
      "BRB"  => Some(Token::Brb),
      "BRN"  => Some(Token::Brn),
      "BRZ"  => Some(Token::Brz),
      "DATA" => Some(Token::Data),
      "FUNC" => Some(Token::Func),
      "LDAC" => Some(Token::Ldac),
      "LDAI" => Some(Token::Ldai),
      "LDAM" => Some(Token::Ldam),
      "LDAP" => Some(Token::Ldap),
      "LDBC" => Some(Token::Ldbc),
      "LDBI" => Some(Token::Ldbi),
      "LDBM" => Some(Token::Ldbm),
      "OPR"  => Some(Token::Opr),
      "PROC" => Some(Token::Proc),
      "STAI" => Some(Token::Stai),
      "STAM" => Some(Token::Stam),
      "SUB"  => Some(Token::Sub),
      "SVC"  => Some(Token::Svc),
      _      => None,
    }
  }

  /// The opcode of an operand-taking instruction keyword.
  pub fn opcode(self) -> Option<Opcode> {
    match self {
      Token::Ldam => Some(Opcode::Ldam),
      Token::Ldbm => Some(Opcode::Ldbm),
      Token::Stam => Some(Opcode::Stam),
      Token::Ldac => Some(Opcode::Ldac),
      Token::Ldbc => Some(Opcode::Ldbc),
      Token::Ldap => Some(Opcode::Ldap),
      Token::Ldai => Some(Opcode::Ldai),
      Token::Ldbi => Some(Opcode::Ldbi),
      Token::Stai => Some(Opcode::Stai),
      Token::Br   => Some(Opcode::Br),
      Token::Brz  => Some(Opcode::Brz),
      Token::Brn  => Some(Opcode::Brn),
      _           => None,
    }
  }

  /// The sub-opcode of a keyword that is a legal operand to OPR.
  pub fn opr_op(self) -> Option<OprOp> {
    match self {
      Token::Brb => Some(OprOp::Brb),
      Token::Add => Some(OprOp::Add),
      Token::Sub => Some(OprOp::Sub),
      Token::Svc => Some(OprOp::Svc),
      _          => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keyword_lookup() {
    assert_eq!(Token::keyword("LDAM"), Some(Token::Ldam));
    assert_eq!(Token::keyword("SVC"), Some(Token::Svc));
    assert_eq!(Token::keyword("start"), None);
    // Keywords are case sensitive.
    assert_eq!(Token::keyword("ldam"), None);
    // Token class names are not keywords.
    assert_eq!(Token::keyword("NUMBER"), None);
    assert_eq!(Token::keyword("IDENTIFIER"), None);
  }

  #[test]
  fn display_matches_source_form() {
    assert_eq!(Token::Ldam.to_string(), "LDAM");
    assert_eq!(Token::Number.to_string(), "NUMBER");
    assert_eq!(Token::EndOfFile.to_string(), "EOF");
  }

  #[test]
  fn opcode_conversions() {
    assert_eq!(Token::Br.opcode(), Some(Opcode::Br));
    assert_eq!(Token::Stam.opcode(), Some(Opcode::Stam));
    assert_eq!(Token::Opr.opcode(), None);
    assert_eq!(Token::Brb.opcode(), None);
    assert_eq!(Token::Brb.opr_op(), Some(OprOp::Brb));
    assert_eq!(Token::Opr.opr_op(), None);
  }
}
