//! Typed machine instructions for the 16-bit target.
//!
//! Every variant maps onto one decode group. Immediates are kept as `i64`
//! until encoding so that out-of-range values are reported there instead of
//! being truncated silently.

use super::isa::{AluOp, BranchOp, CallRetOp, DecodeOp, MemOp, Register};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineInstr {
    /// `rd = rs1 <op> rs2`
    CalcReg {
        op: AluOp,
        rs1: Register,
        rs2: Register,
        rd: Register,
    },
    /// `rd = rs1 <op> imm`
    CalcImm {
        op: AluOp,
        rs1: Register,
        rd: Register,
        imm: i64,
    },
    /// `rd = mem[MAR]` (or a stack pop)
    MemLoad { op: MemOp, rd: Register },
    /// `mem[MAR] = rs1` (or a stack push)
    MemStore { op: MemOp, rs1: Register },
    CallRet { op: CallRetOp, imm: i64 },
    /// Jump to `imm` when `rs1 <op> rs2` holds; `JUMP` ignores the registers.
    /// Before patching `imm` holds a label index, afterwards a word address.
    Branch {
        op: BranchOp,
        rs1: Register,
        rs2: Register,
        imm: i64,
    },
}

impl MachineInstr {
    /// Unconditional jump, registers zeroed.
    pub fn jump(target: i64) -> Self {
        MachineInstr::Branch {
            op: BranchOp::Jump,
            rs1: Register::R0,
            rs2: Register::R0,
            imm: target,
        }
    }

    pub fn decode_op(&self) -> DecodeOp {
        match self {
            MachineInstr::CalcReg { .. } => DecodeOp::CalcReg,
            MachineInstr::CalcImm { .. } => DecodeOp::CalcImm,
            MachineInstr::MemLoad { .. } => DecodeOp::MemLoad,
            MachineInstr::MemStore { .. } => DecodeOp::MemStor,
            MachineInstr::CallRet { .. } => DecodeOp::CallRet,
            MachineInstr::Branch { .. } => DecodeOp::Branch,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, MachineInstr::Branch { .. })
    }
}

impl fmt::Display for MachineInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineInstr::CalcReg { op, rs1, rs2, rd } => {
                write!(f, "{} {},{},{}", op.mnemonic(), rd, rs1, rs2)
            }
            MachineInstr::CalcImm { op, rs1, rd, imm } => {
                write!(f, "{}i {},{},#{}", op.mnemonic(), rd, rs1, imm)
            }
            MachineInstr::MemLoad { op, rd } => write!(f, "{} {}", op.mnemonic(), rd),
            MachineInstr::MemStore { op, rs1 } => write!(f, "{} {}", op.mnemonic(), rs1),
            MachineInstr::CallRet {
                op: CallRetOp::Ret, ..
            } => write!(f, "ret"),
            MachineInstr::CallRet { op, imm } => write!(f, "{} @{}", op.mnemonic(), imm),
            MachineInstr::Branch {
                op: BranchOp::Jump,
                imm,
                ..
            } => write!(f, "jump @{}", imm),
            MachineInstr::Branch { op, rs1, rs2, imm } => {
                write!(f, "{} {},{},@{}", op.mnemonic(), rs1, rs2, imm)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembly_text() {
        let select = MachineInstr::CalcImm {
            op: AluOp::Mov,
            rs1: Register::R0,
            rd: Register::Mar,
            imm: 3,
        };
        assert_eq!(select.to_string(), "movi MAR,R0,#3");
        assert_eq!(MachineInstr::jump(12).to_string(), "jump @12");
        let bge = MachineInstr::Branch {
            op: BranchOp::Bge,
            rs1: Register::R5,
            rs2: Register::R4,
            imm: 20,
        };
        assert_eq!(bge.to_string(), "bge R5,R4,@20");
    }
}
