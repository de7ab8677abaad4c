/*!
  The lexer turns assembly source text into a token stream with one token of
  lookahead kept by the caller. It is driven from an in-memory buffer; the
  drivers read source files into a buffer first, so tests and the X compiler
  front end never need to touch the filesystem.

  Whitespace is skipped (tracking the line number on newlines) and `#`
  comments run to the end of the line.
*/

use std::io::Write;

use crate::chariter::CharIter;
use crate::error::{Error, Result};
use crate::token::Token;

pub struct Lexer<'a> {
  text       : CharIter<'a>,
  identifier : String,
  value      : u32,
  last_token : Token,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Self {
    Lexer {
      text       : CharIter::new(source),
      identifier : String::new(),
      value      : 0,
      last_token : Token::EndOfFile,
    }
  }

  /// Reads the next token and remembers it as the last token read.
  pub fn next_token(&mut self) -> Result<Token> {
    let token = self.read_token()?;
    self.last_token = token;
    Ok(token)
  }

  pub fn last_token(&self) -> Token {
    self.last_token
  }

  /// The text of the most recent `Identifier` token.
  pub fn identifier(&self) -> &str {
    &self.identifier
  }

  /// The value of the most recent `Number` token.
  pub fn number(&self) -> u32 {
    self.value
  }

  /// The line the read head is on, for error reports.
  pub fn line(&self) -> usize {
    self.text.location().0
  }

  fn read_token(&mut self) -> Result<Token> {
    loop {
      // Skip whitespace.
      while let Some(c) = self.text.peek() {
        if !c.is_whitespace() {
          break;
        }
        self.text.next();
      }
      // Comments run to the end of the line.
      if self.text.peek() == Some('#') {
        while let Some(c) = self.text.next() {
          if c == '\n' {
            break;
          }
        }
        continue;
      }
      break;
    }

    let first = match self.text.next() {
      Some(c) => c,
      None    => return Ok(Token::EndOfFile),
    };

    // Identifier or keyword.
    if first.is_ascii_alphabetic() {
      self.identifier.clear();
      self.identifier.push(first);
      if let Some(rest) = self
        .text
        .get_prefix_match(|c: char| c.is_ascii_alphanumeric() || c == '_')
      {
        self.identifier.push_str(rest);
      }
      return Ok(Token::keyword(&self.identifier).unwrap_or(Token::Identifier));
    }

    // Number.
    if first.is_ascii_digit() {
      let mut number = String::new();
      number.push(first);
      if let Some(rest) = self.text.get_prefix_match(|c: char| c.is_ascii_digit()) {
        number.push_str(rest);
      }
      self.value = number
        .parse()
        .map_err(|_| Error::lexical(self.line(), format!("number `{}` out of range", number)))?;
      return Ok(Token::Number);
    }

    if first == '-' {
      return Ok(Token::Minus);
    }

    Err(Error::lexical(self.line(), format!("unexpected character `{}`", first)))
  }

  /// Writes the token stream out, one token per line, with the payloads of
  /// identifiers and numbers. The `--tokens` surface of the assembler.
  pub fn emit_tokens<W: Write>(&mut self, out: &mut W) -> Result<()> {
    loop {
      let token = self.next_token()?;
      let result = match token {
        Token::Identifier => writeln!(out, "IDENTIFIER {}", self.identifier),
        Token::Number     => writeln!(out, "NUMBER {}", self.value),
        other             => writeln!(out, "{}", other),
      };
      result.map_err(|e| Error::source("writing token stream", e))?;
      if token == Token::EndOfFile {
        return Ok(());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EXIT0: &str = "BR start
DATA 16383
start
LDAC 0
LDBM 1
STAI 2
LDAC 0
OPR SVC
";

  fn all_tokens(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
      let token = lexer.next_token().unwrap();
      tokens.push(token);
      if token == Token::EndOfFile {
        return tokens;
      }
    }
  }

  #[test]
  fn exit0_token_stream() {
    let mut out = Vec::new();
    Lexer::new(EXIT0).emit_tokens(&mut out).unwrap();
    let expected = "BR
IDENTIFIER start
DATA
NUMBER 16383
IDENTIFIER start
LDAC
NUMBER 0
LDBM
NUMBER 1
STAI
NUMBER 2
LDAC
NUMBER 0
OPR
SVC
EOF
";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
  }

  #[test]
  fn comments_and_whitespace() {
    let tokens = all_tokens("# a comment line\nBRZ\t loop # trailing\n-42");
    assert_eq!(
      tokens,
      vec![Token::Brz, Token::Identifier, Token::Minus, Token::Number, Token::EndOfFile]
    );
  }

  #[test]
  fn identifier_payload() {
    let mut lexer = Lexer::new("loop_2x");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier);
    assert_eq!(lexer.identifier(), "loop_2x");
  }

  #[test]
  fn number_payload() {
    let mut lexer = Lexer::new("16383");
    assert_eq!(lexer.next_token().unwrap(), Token::Number);
    assert_eq!(lexer.number(), 16383);
  }

  #[test]
  fn unexpected_character() {
    let mut lexer = Lexer::new("BR\n.");
    lexer.next_token().unwrap();
    match lexer.next_token() {
      Err(Error::Lexical { line, .. }) => assert_eq!(line, 2),
      other => panic!("expected a lexical error, got {:?}", other),
    }
  }

  #[test]
  fn oversized_number() {
    let mut lexer = Lexer::new("99999999999");
    assert!(matches!(lexer.next_token(), Err(Error::Lexical { .. })));
  }
}
