//! Lowering from IR to machine instructions.
//!
//! Contains the [`Codegen`] driver: it walks the IR once, asks the register
//! allocator for a register per temporary, records label offsets, and
//! finally patches branch targets from label indices to word addresses.

mod labels;
mod lowering;

pub use labels::{FrozenLabels, LabelTable, INSTR_WORDS};

use super::instruction::MachineInstr;
use super::regalloc::{RefCountAllocator, RegAllocator};
use super::usage::TempUsageAnalyzer;
use crate::ir::ProgramIR;
use crate::CompileError;

// ============================================================================
// Output type
// ============================================================================

/// Patched machine code together with the label table used to patch it.
#[derive(Debug, Clone)]
pub struct LoweredProgram {
    pub instrs: Vec<MachineInstr>,
    pub labels: FrozenLabels,
    /// Most general registers simultaneously in use during lowering.
    pub peak_registers: usize,
}

impl LoweredProgram {
    /// Assembly listing with `@offset:` markers in front of labelled lines.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut labels = self.labels.iter().peekable();
        for (i, instr) in self.instrs.iter().enumerate() {
            let offset = i * INSTR_WORDS;
            while let Some((label, _)) = labels.next_if(|(_, o)| *o == offset) {
                lines.push(format!("{label}:"));
            }
            lines.push(format!("  {:>4}  {}", offset, instr));
        }
        for (label, _) in labels {
            lines.push(format!("{label}:"));
        }
        lines
    }
}

// ============================================================================
// Codegen state
// ============================================================================

pub struct Codegen {
    pub(crate) out: Vec<MachineInstr>,
    pub(crate) reg: Box<dyn RegAllocator>,
    pub(crate) labels: LabelTable,
}

impl Codegen {
    pub fn new() -> Self {
        Self::with_regalloc(Box::new(RefCountAllocator::new()))
    }

    pub fn with_regalloc(reg: Box<dyn RegAllocator>) -> Self {
        Self {
            out: Vec::new(),
            reg,
            labels: LabelTable::new(),
        }
    }

    /// Lower a whole program. The allocator is reset first, so a `Codegen`
    /// can be reused.
    pub fn emit_program(&mut self, ir: &ProgramIR) -> Result<LoweredProgram, CompileError> {
        self.reg.reset();
        self.out.clear();
        self.labels = LabelTable::new();
        self.reg.set_refcounts(TempUsageAnalyzer::new().analyze(ir));

        for instr in &ir.instrs {
            self.emit_instr(instr)?;
            for temp in instr.used_temps() {
                self.reg.consume(temp)?;
            }
            if let Some(dst) = instr.defined_temp() {
                if self.reg.remaining_uses(dst) == 0 {
                    log::debug!("{} is never read, releasing its register", dst);
                    self.reg.free(dst)?;
                }
            }
        }

        let labels = std::mem::take(&mut self.labels).freeze();
        let mut instrs = std::mem::take(&mut self.out);
        labels.patch(&mut instrs)?;

        let peak_registers = self.reg.peak_in_use();
        log::info!(
            "lowered {} IR instructions to {} machine instructions (peak {} registers)",
            ir.instrs.len(),
            instrs.len(),
            peak_registers
        );
        Ok(LoweredProgram {
            instrs,
            labels,
            peak_registers,
        })
    }

    pub(crate) fn push(&mut self, instr: MachineInstr) {
        log::debug!("asm[{}]: {}", self.out.len(), instr);
        self.out.push(instr);
    }
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower IR with the reference-counting allocator.
pub fn lower(ir: &ProgramIR) -> Result<LoweredProgram, CompileError> {
    Codegen::new().emit_program(ir)
}
