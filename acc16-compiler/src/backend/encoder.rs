//! Bit-level encoding of machine instructions.
//!
//! Opcode word layout:
//!
//! ```text
//!  15   13 12    9 8   6 5   3 2   0
//! [ dec  ][  op  ][ rs1 ][ rs2 ][ rd ]
//! ```
//!
//! The immediate travels in a second word. Fields an instruction does not
//! use are zero.

use super::instruction::MachineInstr;
use super::isa::{AluOp, BranchOp, CallRetOp, DecodeOp, MemOp, Register};
use crate::CompileError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const IMM_BITS: u32 = 13;
pub const IMM_MAX: i64 = (1 << IMM_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedInstr {
    pub opcode: u16,
    pub immediate: u16,
}

impl fmt::Display for EncodedInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x} {:04x}", self.opcode, self.immediate)
    }
}

fn pack(dec: DecodeOp, op: u16, rs1: Register, rs2: Register, rd: Register) -> u16 {
    dec.bits() << 13 | op << 9 | rs1.bits() << 6 | rs2.bits() << 3 | rd.bits()
}

fn immediate(value: i64) -> Result<u16, CompileError> {
    if !(0..=IMM_MAX).contains(&value) {
        return Err(CompileError::ImmediateOutOfRange {
            value,
            bits: IMM_BITS,
        });
    }
    Ok(value as u16)
}

pub fn encode(instr: &MachineInstr) -> Result<EncodedInstr, CompileError> {
    use Register::R0;
    let dec = instr.decode_op();
    let (opcode, imm) = match *instr {
        MachineInstr::CalcReg { op, rs1, rs2, rd } => (pack(dec, op.bits(), rs1, rs2, rd), 0),
        MachineInstr::CalcImm { op, rs1, rd, imm } => (pack(dec, op.bits(), rs1, R0, rd), imm),
        MachineInstr::MemLoad { op, rd } => (pack(dec, op.bits(), R0, R0, rd), 0),
        MachineInstr::MemStore { op, rs1 } => (pack(dec, op.bits(), rs1, R0, R0), 0),
        MachineInstr::CallRet { op, imm } => (pack(dec, op.bits(), R0, R0, R0), imm),
        MachineInstr::Branch { op, rs1, rs2, imm } => (pack(dec, op.bits(), rs1, rs2, R0), imm),
    };
    Ok(EncodedInstr {
        opcode,
        immediate: immediate(imm)?,
    })
}

/// Encode a whole instruction sequence, preserving order.
pub fn encode_program(instrs: &[MachineInstr]) -> Result<Vec<EncodedInstr>, CompileError> {
    let encoded = instrs.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
    log::debug!("encoded {} instructions", encoded.len());
    Ok(encoded)
}

/// Flatten encoded instructions into the word stream loaded by the machine.
pub fn to_words(encoded: &[EncodedInstr]) -> Vec<u16> {
    encoded
        .iter()
        .flat_map(|e| [e.opcode, e.immediate])
        .collect()
}

fn register(bits: u16) -> Register {
    // Three-bit fields always name one of the eight registers.
    Register::from_bits(bits & 0b111).unwrap_or(Register::R0)
}

/// Recover the machine instruction an encoded pair represents.
pub fn decode(encoded: EncodedInstr) -> Result<MachineInstr, CompileError> {
    let word = encoded.opcode;
    let invalid = |reason| CompileError::InvalidEncoding { word, reason };

    let dec = DecodeOp::from_bits(word >> 13).ok_or_else(|| invalid("reserved decode group"))?;
    let op = (word >> 9) & 0xF;
    let rs1 = register(word >> 6);
    let rs2 = register(word >> 3);
    let rd = register(word);
    let imm = encoded.immediate as i64;

    let instr = match dec {
        DecodeOp::CalcReg => MachineInstr::CalcReg {
            op: AluOp::from_bits(op).ok_or_else(|| invalid("reserved ALU operation"))?,
            rs1,
            rs2,
            rd,
        },
        DecodeOp::CalcImm => MachineInstr::CalcImm {
            op: AluOp::from_bits(op).ok_or_else(|| invalid("reserved ALU operation"))?,
            rs1,
            rd,
            imm,
        },
        DecodeOp::MemLoad => MachineInstr::MemLoad {
            op: MemOp::from_bits(op).ok_or_else(|| invalid("reserved memory operation"))?,
            rd,
        },
        DecodeOp::MemStor => MachineInstr::MemStore {
            op: MemOp::from_bits(op).ok_or_else(|| invalid("reserved memory operation"))?,
            rs1,
        },
        DecodeOp::CallRet => MachineInstr::CallRet {
            op: CallRetOp::from_bits(op).ok_or_else(|| invalid("reserved call/ret operation"))?,
            imm,
        },
        DecodeOp::Branch => MachineInstr::Branch {
            op: BranchOp::from_bits(op).ok_or_else(|| invalid("reserved branch condition"))?,
            rs1,
            rs2,
            imm,
        },
    };
    Ok(instr)
}
