//! IR instruction → machine instruction lowering.
//!
//! Implements `Codegen::emit_instr`, which translates a single IR
//! instruction into zero or more machine instructions. Reads are consumed by
//! the caller once the instruction has been emitted.

use super::Codegen;
use crate::backend::instruction::MachineInstr;
use crate::backend::isa::{AluOp, BranchOp, MemOp, Register};
use crate::ir::ast::BinOp;
use crate::ir::{Instr, Operand, RelOp, Slot};
use crate::CompileError;

/// ALU operation for an arithmetic or bitwise operator.
fn alu_op(op: BinOp) -> Result<AluOp, CompileError> {
    let alu = match op {
        BinOp::Add => AluOp::Add,
        BinOp::Sub => AluOp::Sub,
        BinOp::Mul => AluOp::Mul,
        BinOp::Div => AluOp::Div,
        BinOp::Mod => AluOp::Divh,
        BinOp::BitAnd => AluOp::And,
        BinOp::BitOr => AluOp::Or,
        BinOp::BitXor => AluOp::Xor,
        BinOp::Shl => AluOp::Shl,
        BinOp::Shr => AluOp::Shr,
        BinOp::Rol => AluOp::Rol,
        BinOp::Ror => AluOp::Ror,
        BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            return Err(CompileError::UnsupportedConstruct {
                stage: "lowerer",
                detail: format!("comparison `{}` used as a value", op),
            })
        }
    };
    Ok(alu)
}

/// Signed branch for a relational operator.
fn branch_op(op: RelOp) -> BranchOp {
    match op {
        RelOp::Eq => BranchOp::Beq,
        RelOp::Neq => BranchOp::Bne,
        RelOp::Lt => BranchOp::Blt,
        RelOp::Gt => BranchOp::Bgt,
        RelOp::Le => BranchOp::Ble,
        RelOp::Ge => BranchOp::Bge,
    }
}

impl Codegen {
    /// Lower a single IR instruction into machine instructions.
    pub(crate) fn emit_instr(&mut self, instr: &Instr) -> Result<(), CompileError> {
        match instr {
            Instr::Const { dst, value } => {
                let rd = self.reg.allocate(*dst)?;
                self.push(mov_imm(rd, *value));
            }
            Instr::Load { dst, src } => {
                self.select_slot(src);
                let rd = self.reg.allocate(*dst)?;
                self.push(MachineInstr::MemLoad { op: MemOp::Load, rd });
            }
            Instr::Store {
                dst,
                src: Operand::Temp(src),
            } => {
                let rs1 = self.reg.get_register(*src)?;
                self.select_slot(dst);
                self.push(MachineInstr::MemStore { op: MemOp::Stor, rs1 });
            }
            Instr::Store {
                dst,
                src: Operand::Const(value),
            } => {
                let scratch = self.reg.acquire_scratch()?;
                self.push(mov_imm(scratch, *value));
                self.select_slot(dst);
                self.push(MachineInstr::MemStore {
                    op: MemOp::Stor,
                    rs1: scratch,
                });
                self.reg.release_scratch(scratch)?;
            }
            Instr::BinOp {
                dst,
                left,
                right,
                op,
            } => {
                let op = alu_op(*op)?;
                let rs1 = self.reg.get_register(*left)?;
                match right {
                    Operand::Const(imm) => {
                        let rd = self.reg.allocate(*dst)?;
                        self.push(MachineInstr::CalcImm {
                            op,
                            rs1,
                            rd,
                            imm: *imm,
                        });
                    }
                    Operand::Temp(right) => {
                        let rs2 = self.reg.get_register(*right)?;
                        let rd = self.reg.allocate(*dst)?;
                        self.push(MachineInstr::CalcReg { op, rs1, rs2, rd });
                    }
                }
            }
            Instr::Not { dst, src } => match src {
                Operand::Const(imm) => {
                    let rd = self.reg.allocate(*dst)?;
                    self.push(MachineInstr::CalcImm {
                        op: AluOp::Not,
                        rs1: Register::R0,
                        rd,
                        imm: *imm,
                    });
                }
                Operand::Temp(src) => {
                    let rs2 = self.reg.get_register(*src)?;
                    let rd = self.reg.allocate(*dst)?;
                    self.push(MachineInstr::CalcReg {
                        op: AluOp::Not,
                        rs1: Register::R0,
                        rs2,
                        rd,
                    });
                }
            },
            Instr::Branch {
                left,
                right,
                op,
                target,
            } => {
                let rs1 = self.reg.get_register(*left)?;
                let rs2 = self.reg.get_register(*right)?;
                self.push(MachineInstr::Branch {
                    op: branch_op(*op),
                    rs1,
                    rs2,
                    imm: target.0 as i64,
                });
            }
            Instr::Jump(target) => self.push(MachineInstr::jump(target.0 as i64)),
            Instr::Label(label) => self.labels.record(*label, self.out.len())?,
            Instr::Print(value) => {
                let rs2 = self.reg.get_register(*value)?;
                self.push(MachineInstr::CalcReg {
                    op: AluOp::Mov,
                    rs1: Register::R0,
                    rs2,
                    rd: Register::Io,
                });
            }
        }
        Ok(())
    }

    /// Point `MAR` at a variable's storage slot.
    fn select_slot(&mut self, slot: &Slot) {
        self.push(mov_imm(Register::Mar, slot.index as i64));
    }
}

fn mov_imm(rd: Register, imm: i64) -> MachineInstr {
    MachineInstr::CalcImm {
        op: AluOp::Mov,
        rs1: Register::R0,
        rd,
        imm,
    }
}
