//! Interpreter for encoded programs.
//!
//! The machine has eight 16-bit registers, a data memory addressed through
//! `MAR`, a stack used by `PUSH`/`POP`/`CALL`/`RET`, and an output log of
//! every value written to `IO`. Execution ends when `pc` runs off the end of
//! the program.

use crate::backend::codegen::INSTR_WORDS;
use crate::backend::encoder::{decode, EncodedInstr};
use crate::backend::instruction::MachineInstr;
use crate::backend::isa::{AluOp, BranchOp, CallRetOp, MemOp, Register};
use crate::CompileError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MEMORY_WORDS: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Instructions executed before the run is abandoned.
    pub max_steps: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { max_steps: 100_000 }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid instruction at @{pc}: {source}")]
    InvalidInstruction { pc: usize, source: CompileError },

    #[error("division by zero at @{pc}")]
    DivisionByZero { pc: usize },

    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("branch at @{pc} targets @{target}, which is not an instruction boundary")]
    BadBranchTarget { pc: usize, target: usize },

    #[error("memory address {address} out of range at @{pc}")]
    AddressOutOfRange { pc: usize, address: u16 },

    #[error("stack underflow at @{pc}")]
    StackUnderflow { pc: usize },
}

#[derive(Debug)]
pub struct Machine {
    registers: [u16; 8],
    memory: Vec<u16>,
    stack: Vec<u16>,
    output: Vec<u16>,
    pc: usize,
    steps: usize,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            registers: [0; 8],
            memory: vec![0; MEMORY_WORDS],
            stack: Vec::new(),
            output: Vec::new(),
            pc: 0,
            steps: 0,
        }
    }

    pub fn register(&self, reg: Register) -> u16 {
        self.registers[reg.bits() as usize]
    }

    /// Data word at `address`, `None` past the end of memory.
    pub fn memory(&self, address: usize) -> Option<u16> {
        self.memory.get(address).copied()
    }

    /// Every value written to `IO`, in order.
    pub fn output(&self) -> &[u16] {
        &self.output
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Execute `program` from address 0 until `pc` leaves it.
    pub fn run(&mut self, program: &[EncodedInstr], config: &SimConfig) -> Result<(), SimError> {
        let end = program.len() * INSTR_WORDS;
        while self.pc < end {
            if self.steps >= config.max_steps {
                return Err(SimError::StepLimitExceeded {
                    limit: config.max_steps,
                });
            }
            let encoded = program[self.pc / INSTR_WORDS];
            let instr = decode(encoded).map_err(|source| SimError::InvalidInstruction {
                pc: self.pc,
                source,
            })?;
            log::trace!("@{}: {}", self.pc, instr);
            self.step(instr, end)?;
            self.steps += 1;
        }
        log::debug!(
            "machine halted after {} steps, {} value(s) output",
            self.steps,
            self.output.len()
        );
        Ok(())
    }

    fn step(&mut self, instr: MachineInstr, end: usize) -> Result<(), SimError> {
        let pc = self.pc;
        let mut next = pc + INSTR_WORDS;
        match instr {
            MachineInstr::CalcReg { op, rs1, rs2, rd } => {
                let value = self.alu(op, self.register(rs1), self.register(rs2))?;
                self.write(rd, value);
            }
            MachineInstr::CalcImm { op, rs1, rd, imm } => {
                let value = self.alu(op, self.register(rs1), imm as u16)?;
                self.write(rd, value);
            }
            MachineInstr::MemLoad { op, rd } => {
                let value = match op {
                    MemOp::Pop => self.pop()?,
                    MemOp::Load => self.memory[self.address()?],
                    MemOp::Push | MemOp::Stor => self.register(rd),
                };
                self.write(rd, value);
            }
            MachineInstr::MemStore { op, rs1 } => {
                let value = self.register(rs1);
                match op {
                    MemOp::Push => self.stack.push(value),
                    MemOp::Stor => {
                        let address = self.address()?;
                        self.memory[address] = value;
                    }
                    MemOp::Pop | MemOp::Load => {}
                }
            }
            MachineInstr::CallRet { op, imm } => match op {
                CallRetOp::Call => {
                    self.stack.push(next as u16);
                    next = self.target(imm as usize, end)?;
                }
                CallRetOp::Ret => {
                    let ret = self.pop()? as usize;
                    next = self.target(ret, end)?;
                }
            },
            MachineInstr::Branch { op, rs1, rs2, imm } => {
                if branch_taken(op, self.register(rs1), self.register(rs2)) {
                    next = self.target(imm as usize, end)?;
                }
            }
        }
        self.pc = next;
        Ok(())
    }

    fn alu(&self, op: AluOp, a: u16, b: u16) -> Result<u16, SimError> {
        let shift = (b & 15) as u32;
        let value = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::And => a & b,
            AluOp::Or => a | b,
            AluOp::Not => !b,
            AluOp::Xor => a ^ b,
            AluOp::Shl => a << shift,
            AluOp::Shr => a >> shift,
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Mulh => ((a as i16 as i32 * b as i16 as i32) >> 16) as u16,
            AluOp::Div | AluOp::Divh if b == 0 => {
                return Err(SimError::DivisionByZero { pc: self.pc })
            }
            AluOp::Div => (a as i16).wrapping_div(b as i16) as u16,
            AluOp::Divh => (a as i16).wrapping_rem(b as i16) as u16,
            AluOp::Mov => b,
            AluOp::Rol => a.rotate_left(shift),
            AluOp::Ror => a.rotate_right(shift),
        };
        Ok(value)
    }

    fn write(&mut self, rd: Register, value: u16) {
        self.registers[rd.bits() as usize] = value;
        if rd == Register::Io {
            self.output.push(value);
        }
    }

    fn address(&self) -> Result<usize, SimError> {
        let address = self.register(Register::Mar);
        if address as usize >= self.memory.len() {
            return Err(SimError::AddressOutOfRange {
                pc: self.pc,
                address,
            });
        }
        Ok(address as usize)
    }

    fn pop(&mut self) -> Result<u16, SimError> {
        self.stack
            .pop()
            .ok_or(SimError::StackUnderflow { pc: self.pc })
    }

    /// Validate a jump destination. The end of the program is a legal
    /// target and halts the machine.
    fn target(&self, target: usize, end: usize) -> Result<usize, SimError> {
        if target > end || target % INSTR_WORDS != 0 {
            return Err(SimError::BadBranchTarget {
                pc: self.pc,
                target,
            });
        }
        Ok(target)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

fn branch_taken(op: BranchOp, a: u16, b: u16) -> bool {
    let (sa, sb) = (a as i16, b as i16);
    match op {
        BranchOp::Ble => sa <= sb,
        BranchOp::Blt => sa < sb,
        BranchOp::Bge => sa >= sb,
        BranchOp::Bgt => sa > sb,
        BranchOp::Bleu => a <= b,
        BranchOp::Bltu => a < b,
        BranchOp::Bgeu => a >= b,
        BranchOp::Bgtu => a > b,
        BranchOp::Beq => a == b,
        BranchOp::Bne => a != b,
        BranchOp::Jump => true,
    }
}

/// Run `program` on a fresh machine and return its final state.
pub fn run(program: &[EncodedInstr], config: &SimConfig) -> Result<Machine, SimError> {
    let mut machine = Machine::new();
    machine.run(program, config)?;
    Ok(machine)
}
