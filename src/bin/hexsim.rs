/*!
  The Hex processor simulator command line: loads a binary image and runs
  it against the standard streams. The process exit status is the simulated
  program's EXIT status.
*/

use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use hex_machine::error::{Error, Result};
use hex_machine::hvm::HVM;

#[derive(Parser)]
#[command(name = "hexsim", about = "Hex processor simulator", version)]
struct Cli {
  /// A binary file to simulate
  file: PathBuf,

  /// Enable instruction tracing
  #[arg(short, long)]
  trace: bool,

  /// Dump the binary file contents
  #[arg(short, long)]
  dump: bool,
}

fn main() {
  match run(&Cli::parse()) {
    Ok(code) => process::exit(code),
    Err(error) => {
      eprintln!("Error: {}", error);
      process::exit(1);
    }
  }
}

fn run(cli: &Cli) -> Result<i32> {
  let image = fs::read(&cli.file).map_err(|e| Error::source("reading binary file", e))?;

  let mut input = io::stdin();
  let mut output = io::stdout();
  let mut machine = HVM::new(&mut input, &mut output);
  machine.load_image(&image)?;

  if cli.dump {
    println!("Read {} bytes", machine.image_bytes());
    machine.dump().printstd();
    return Ok(0);
  }

  machine.set_tracing(cli.trace);
  let code = machine.run()?;
  // `process::exit` skips destructors, so any buffered output must go now.
  io::stdout().flush().map_err(|e| Error::source("flushing output", e))?;
  Ok(code as i32)
}
