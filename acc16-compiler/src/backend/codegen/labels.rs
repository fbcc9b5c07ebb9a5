//! Label bookkeeping for the lowering pass.
//!
//! Offsets are recorded while instructions are emitted; the table is then
//! frozen and only read while branch immediates are patched.

use crate::backend::instruction::MachineInstr;
use crate::ir::Label;
use crate::CompileError;
use std::collections::BTreeMap;

/// Words occupied by every encoded instruction (opcode + immediate).
pub const INSTR_WORDS: usize = 2;

#[derive(Debug, Default)]
pub struct LabelTable {
    offsets: BTreeMap<Label, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `label` to the instruction that will be emitted at index
    /// `instr_index`.
    pub fn record(&mut self, label: Label, instr_index: usize) -> Result<(), CompileError> {
        let offset = instr_index * INSTR_WORDS;
        if self.offsets.insert(label, offset).is_some() {
            return Err(CompileError::UnsupportedConstruct {
                stage: "lowerer",
                detail: format!("label {} defined more than once", label),
            });
        }
        log::trace!("{} -> @{}", label, offset);
        Ok(())
    }

    pub fn freeze(self) -> FrozenLabels {
        FrozenLabels {
            offsets: self.offsets,
        }
    }
}

/// Read-only label table, produced once emission is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenLabels {
    offsets: BTreeMap<Label, usize>,
}

impl FrozenLabels {
    pub fn offset(&self, label: Label) -> Result<usize, CompileError> {
        self.offsets
            .get(&label)
            .copied()
            .ok_or(CompileError::UnresolvedLabel(label))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Labels with their word offsets, in label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.offsets.iter().map(|(l, o)| (*l, *o))
    }

    /// Rewrite every branch immediate from a label index to its offset.
    pub fn patch(&self, instrs: &mut [MachineInstr]) -> Result<(), CompileError> {
        for instr in instrs.iter_mut() {
            if let MachineInstr::Branch { imm, .. } = instr {
                let label = usize::try_from(*imm)
                    .map(Label)
                    .map_err(|_| CompileError::ImmediateOutOfRange {
                        value: *imm,
                        bits: 13,
                    })?;
                *imm = self.offset(label)? as i64;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::isa::{AluOp, Register};

    #[test]
    fn offsets_are_two_words_per_instruction() {
        let mut table = LabelTable::new();
        table.record(Label(0), 0).unwrap();
        table.record(Label(1), 5).unwrap();
        let frozen = table.freeze();
        assert_eq!(frozen.offset(Label(0)).unwrap(), 0);
        assert_eq!(frozen.offset(Label(1)).unwrap(), 10);
    }

    #[test]
    fn patch_rewrites_only_branches() {
        let mut table = LabelTable::new();
        table.record(Label(0), 3).unwrap();
        let frozen = table.freeze();

        let mut instrs = vec![
            MachineInstr::CalcImm {
                op: AluOp::Mov,
                rs1: Register::R0,
                rd: Register::R1,
                imm: 0,
            },
            MachineInstr::jump(0),
        ];
        frozen.patch(&mut instrs).unwrap();
        assert_eq!(instrs[1], MachineInstr::jump(6));
        assert!(matches!(instrs[0], MachineInstr::CalcImm { imm: 0, .. }));
    }

    #[test]
    fn missing_label_is_unresolved() {
        let frozen = LabelTable::new().freeze();
        let mut instrs = vec![MachineInstr::jump(4)];
        assert_eq!(
            frozen.patch(&mut instrs),
            Err(CompileError::UnresolvedLabel(Label(4)))
        );
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let mut table = LabelTable::new();
        table.record(Label(2), 0).unwrap();
        assert!(table.record(Label(2), 1).is_err());
    }
}
