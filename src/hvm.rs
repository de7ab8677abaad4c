/*!

  Structures and functions for the Hex Virtual Machine: a byte-oriented
  fetch/decode/execute loop over a fixed memory of 32-bit words.

  Each cycle extracts one instruction byte little-endian from the word
  holding `pc`, ORs its low nibble into the operand register `oreg`, and
  dispatches on its high nibble. PFIX and NFIX shift `oreg` left to build
  wide operands; every other instruction clears it. Memory words are
  addressed by word index through `oreg`; `pc` is a byte address.

  Word 1 of a loaded program holds the initial stack pointer as a byte
  address. System calls address their frame through it: with
  `sp = memory[1] >> 2`, slot `sp+1` receives results, and slots `sp+2` and
  `sp+3` carry arguments. The machine borrows one input and one output
  stream for the duration of the run; the stream-descriptor arguments are
  accepted and all route to that pair.

*/

use std::convert::TryFrom;
use std::io::{Read, Write};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::{Opcode, OprOp, Syscall};
use crate::error::{Error, Result};

/// Size of the simulated memory in 32-bit words.
pub const MEMORY_SIZE_WORDS: usize = 200_000;

pub struct HVM<'io> {
  // Registers //
  pc    : u32, // Program counter, a byte address
  areg  : u32, // Accumulator A
  breg  : u32, // Accumulator B
  oreg  : u32, // Operand register, accumulated by prefix bytes
  instr : u32, // Latch for the most recently fetched instruction byte

  // Memory //
  memory      : Vec<u32>,
  image_bytes : usize,

  // Control //
  running   : bool,
  tracing   : bool,
  cycles    : u64,
  exit_code : u32,

  // Syscall channels, borrowed for the duration of the run //
  input  : &'io mut dyn Read,
  output : &'io mut dyn Write,
}

impl<'io> HVM<'io> {

  // region Construction and loading

  pub fn new(input: &'io mut dyn Read, output: &'io mut dyn Write) -> HVM<'io> {
    HVM {
      pc    : 0,
      areg  : 0,
      breg  : 0,
      oreg  : 0,
      instr : 0,

      memory      : vec![0; MEMORY_SIZE_WORDS],
      image_bytes : 0,

      running   : true,
      tracing   : false,
      cycles    : 0,
      exit_code : 0,

      input,
      output,
    }
  }

  pub fn set_tracing(&mut self, tracing: bool) {
    self.tracing = tracing;
  }

  /// Loads a binary image into the head of memory, byte by byte into
  /// little-endian word positions. The rest of memory stays zero.
  pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
    if image.len() > MEMORY_SIZE_WORDS * 4 {
      return Err(Error::vm(format!(
        "binary image of {} bytes does not fit in memory",
        image.len()
      )));
    }
    for (index, byte) in image.iter().enumerate() {
      self.memory[index >> 2] |= (*byte as u32) << ((index & 0x3) << 3);
    }
    self.image_bytes = image.len();
    Ok(())
  }

  // endregion

  // region Register and memory accessors

  pub fn pc(&self) -> u32 {
    self.pc
  }

  pub fn areg(&self) -> u32 {
    self.areg
  }

  pub fn breg(&self) -> u32 {
    self.breg
  }

  pub fn oreg(&self) -> u32 {
    self.oreg
  }

  pub fn cycles(&self) -> u64 {
    self.cycles
  }

  pub fn image_bytes(&self) -> usize {
    self.image_bytes
  }

  fn read_word(&self, index: u32) -> Result<u32> {
    match self.memory.get(index as usize) {
      Some(word) => Ok(*word),
      None => Err(Error::vm(format!("memory read out of range: word {}", index))),
    }
  }

  fn write_word(&mut self, index: u32, value: u32) -> Result<()> {
    match self.memory.get_mut(index as usize) {
      Some(word) => {
        *word = value;
        Ok(())
      }
      None => Err(Error::vm(format!("memory write out of range: word {}", index))),
    }
  }

  // endregion

  // region Fetch/decode/execute

  /// Runs until an EXIT system call clears the running flag, returning the
  /// program's exit status. A program that never exits runs forever.
  pub fn run(&mut self) -> Result<u32> {
    while self.running {
      self.step()?;
    }
    Ok(self.exit_code)
  }

  /// One fetch/decode/execute cycle.
  pub fn step(&mut self) -> Result<()> {
    let word = self.read_word(self.pc >> 2)?;
    self.instr = word >> ((self.pc & 0x3) << 3) & 0xFF;
    self.pc = self.pc.wrapping_add(1);
    self.oreg |= self.instr & 0xF;
    let opcode = Opcode::try_from((self.instr >> 4) as u8).map_err(|_| {
      Error::vm(format!(
        "invalid instruction {:#04x} at address {:#x}",
        self.instr,
        self.pc.wrapping_sub(1)
      ))
    })?;

    if self.tracing {
      self.trace(opcode);
    }

    match opcode {

      Opcode::Ldam => {
        self.areg = self.read_word(self.oreg)?;
        self.oreg = 0;
      }

      Opcode::Ldbm => {
        self.breg = self.read_word(self.oreg)?;
        self.oreg = 0;
      }

      Opcode::Stam => {
        self.write_word(self.oreg, self.areg)?;
        self.oreg = 0;
      }

      Opcode::Ldac => {
        self.areg = self.oreg;
        self.oreg = 0;
      }

      Opcode::Ldbc => {
        self.breg = self.oreg;
        self.oreg = 0;
      }

      Opcode::Ldap => {
        self.areg = self.pc.wrapping_add(self.oreg);
        self.oreg = 0;
      }

      Opcode::Ldai => {
        self.areg = self.read_word((self.areg >> 2).wrapping_add(self.oreg))?;
        self.oreg = 0;
      }

      Opcode::Ldbi => {
        self.breg = self.read_word((self.breg >> 2).wrapping_add(self.oreg))?;
        self.oreg = 0;
      }

      Opcode::Stai => {
        self.write_word((self.breg >> 2).wrapping_add(self.oreg), self.areg)?;
        self.oreg = 0;
      }

      Opcode::Br => {
        self.pc = self.pc.wrapping_add(self.oreg);
        self.oreg = 0;
      }

      Opcode::Brz => {
        if self.areg == 0 {
          self.pc = self.pc.wrapping_add(self.oreg);
        }
        self.oreg = 0;
      }

      Opcode::Brn => {
        if (self.areg as i32) < 0 {
          self.pc = self.pc.wrapping_add(self.oreg);
        }
        self.oreg = 0;
      }

      Opcode::Pfix => {
        self.oreg <<= 4;
      }

      Opcode::Nfix => {
        self.oreg = 0xFFFF_FF00 | (self.oreg << 4);
      }

      Opcode::Opr => {
        self.operate()?;
        self.oreg = 0;
      }

    }
    self.cycles += 1;
    Ok(())
  }

  fn decode_opr(&self) -> Option<OprOp> {
    u8::try_from(self.oreg).ok().and_then(|code| OprOp::try_from(code).ok())
  }

  fn decode_syscall(&self) -> Option<Syscall> {
    u8::try_from(self.areg).ok().and_then(|code| Syscall::try_from(code).ok())
  }

  fn operate(&mut self) -> Result<()> {
    let op = self
      .decode_opr()
      .ok_or_else(|| Error::vm(format!("invalid OPR operand: {}", self.oreg)))?;
    match op {

      OprOp::Brb => {
        self.pc = self.breg;
      }

      OprOp::Add => {
        self.areg = self.areg.wrapping_add(self.breg);
      }

      OprOp::Sub => {
        self.areg = self.areg.wrapping_sub(self.breg);
      }

      OprOp::Svc => {
        self.syscall()?;
      }

    }
    Ok(())
  }

  /// System calls are selected by accumulator A and address their frame
  /// through the stack pointer held in memory word 1.
  fn syscall(&mut self) -> Result<()> {
    let sp = self.read_word(1)? >> 2;
    let call = self
      .decode_syscall()
      .ok_or_else(|| Error::vm(format!("invalid syscall: {}", self.areg)))?;
    match call {

      Syscall::Exit => {
        self.exit_code = self.read_word(sp.wrapping_add(2))?;
        self.running = false;
      }

      Syscall::Write => {
        let value = self.read_word(sp.wrapping_add(2))?;
        let _stream = self.read_word(sp.wrapping_add(3))?;
        self
          .output
          .write_all(&[value as u8])
          .map_err(|e| Error::vm(format!("write failed: {}", e)))?;
      }

      Syscall::Read => {
        let _stream = self.read_word(sp.wrapping_add(2))?;
        let mut byte = [0u8; 1];
        let value = match self.input.read(&mut byte) {
          Ok(0) => u32::MAX, // end of input, the EOF convention
          Ok(_) => byte[0] as u32,
          Err(e) => return Err(Error::vm(format!("read failed: {}", e))),
        };
        self.write_word(sp.wrapping_add(1), value)?;
      }

    }
    Ok(())
  }

  // endregion

  // region Tracing and dumping

  /// One line per cycle describing the instruction about to execute, in
  /// terms of the register state after the operand nibble has accumulated.
  fn trace(&self, opcode: Opcode) {
    let effect = match opcode {
      Opcode::Ldam => format!("areg = mem[{}]", self.oreg),
      Opcode::Ldbm => format!("breg = mem[{}]", self.oreg),
      Opcode::Stam => format!("mem[{}] = areg ({})", self.oreg, self.areg),
      Opcode::Ldac => format!("areg = {}", self.oreg as i32),
      Opcode::Ldbc => format!("breg = {}", self.oreg as i32),
      Opcode::Ldap => format!("areg = pc ({}) + {}", self.pc, self.oreg as i32),
      Opcode::Ldai => format!("areg = mem[areg ({:#x})/4 + {}]", self.areg, self.oreg as i32),
      Opcode::Ldbi => format!("breg = mem[breg ({:#x})/4 + {}]", self.breg, self.oreg as i32),
      Opcode::Stai => format!(
        "mem[breg ({:#x})/4 + {}] = areg ({})",
        self.breg, self.oreg as i32, self.areg
      ),
      Opcode::Br => format!(
        "pc = pc + {} ({:#x})",
        self.oreg as i32,
        self.pc.wrapping_add(self.oreg)
      ),
      Opcode::Brz => format!(
        "pc = areg == 0 ? pc + {} ({:#x}) : pc",
        self.oreg as i32,
        self.pc.wrapping_add(self.oreg)
      ),
      Opcode::Brn => format!(
        "pc = areg < 0 ? pc + {} ({:#x}) : pc",
        self.oreg as i32,
        self.pc.wrapping_add(self.oreg)
      ),
      Opcode::Pfix => format!("oreg = oreg << 4 ({:#x})", self.oreg << 4),
      Opcode::Nfix => {
        format!("oreg = 0xFFFFFF00 | oreg << 4 ({:#x})", 0xFFFF_FF00u32 | (self.oreg << 4))
      }
      Opcode::Opr => self.trace_operate(),
    };
    println!(
      "{:<8} {:<6} {:<4} {}",
      self.pc.wrapping_sub(1),
      opcode,
      self.instr & 0xF,
      effect
    );
  }

  fn trace_operate(&self) -> String {
    match self.decode_opr() {
      Some(OprOp::Brb) => format!("pc = breg ({:#x})", self.breg),
      Some(OprOp::Add) => format!("areg = areg ({}) + breg ({})", self.areg, self.breg),
      Some(OprOp::Sub) => format!("areg = areg ({}) - breg ({})", self.areg, self.breg),
      Some(OprOp::Svc) => match self.decode_syscall() {
        Some(Syscall::Exit) => format!("exit after {} cycles", self.cycles + 1),
        Some(call)          => call.to_string(),
        None                => format!("invalid syscall {}", self.areg),
      },
      None => format!("invalid OPR operand {}", self.oreg),
    }
  }

  /// Renders the words of the loaded image as a table.
  pub fn dump(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Word", ubl->"Contents"]);
    let words = (self.image_bytes / 4 + 1).min(self.memory.len());
    for index in 0..words {
      table.add_row(row![
        r->format!("{:08}", index),
        format!("{:08x}", self.memory[index])
      ]);
    }
    table
  }

  // endregion

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}
