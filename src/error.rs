/*!
  The error taxonomy of the toolchain. Every kind is fatal to the current
  invocation: the drivers report the error and exit with status 1. Nothing
  is recovered silently and nothing is retried.
*/

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// A source file could not be read or an output file could not be written.
  #[error("{context}: {source}")]
  Source {
    context: String,
    source:  io::Error,
  },

  /// A character the lexer cannot classify, or a malformed number.
  #[error("line {line}: {message}")]
  Lexical {
    line:    usize,
    message: String,
  },

  /// An unexpected token, a bad integer, or an illegal OPR operand.
  #[error("line {line}: {message}")]
  Parser {
    line:    usize,
    message: String,
  },

  /// An unknown or duplicate label.
  #[error("{message}")]
  Resolution { message: String },

  /// An undefined opcode, an undefined syscall, or an out-of-range memory
  /// access during simulation.
  #[error("{message}")]
  Vm { message: String },
}

impl Error {
  pub fn source(context: impl Into<String>, source: io::Error) -> Error {
    Error::Source { context: context.into(), source }
  }

  pub fn lexical(line: usize, message: impl Into<String>) -> Error {
    Error::Lexical { line, message: message.into() }
  }

  pub fn parser(line: usize, message: impl Into<String>) -> Error {
    Error::Parser { line, message: message.into() }
  }

  pub fn resolution(message: impl Into<String>) -> Error {
    Error::Resolution { message: message.into() }
  }

  pub fn vm(message: impl Into<String>) -> Error {
    Error::Vm { message: message.into() }
  }
}
