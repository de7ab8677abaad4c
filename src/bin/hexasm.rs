/*!
  The Hex assembler command line: assembles a source file to a flat binary,
  or prints its token stream or resolved directive listing.
*/

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use hex_machine::emitter;
use hex_machine::error::{Error, Result};
use hex_machine::lexer::Lexer;
use hex_machine::parser;
use hex_machine::resolver;

#[derive(Parser)]
#[command(name = "hexasm", about = "Hex assembler", version)]
struct Cli {
  /// A source file to assemble
  file: PathBuf,

  /// A file for binary output
  #[arg(short, long, default_value = "a.out")]
  output: PathBuf,

  /// Tokenise the input only
  #[arg(long)]
  tokens: bool,

  /// Display the resolved program only
  #[arg(long)]
  tree: bool,
}

fn main() {
  let cli = Cli::parse();
  if let Err(error) = run(&cli) {
    eprintln!("Error: {}: {}", cli.file.display(), error);
    process::exit(1);
  }
}

fn run(cli: &Cli) -> Result<()> {
  let source =
    fs::read_to_string(&cli.file).map_err(|e| Error::source("reading source file", e))?;

  if cli.tokens {
    return Lexer::new(&source).emit_tokens(&mut io::stdout());
  }

  let mut program = parser::Parser::new(Lexer::new(&source)).parse_program()?;
  let labels = resolver::build_label_map(&program)?;
  resolver::resolve_labels(&mut program, &labels)?;

  if cli.tree {
    print!("{}", emitter::emit_listing(&program));
    return Ok(());
  }

  let image = emitter::emit_binary(&program);
  fs::write(&cli.output, image).map_err(|e| Error::source("writing output file", e))?;
  Ok(())
}
