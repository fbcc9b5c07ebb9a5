//! Back end: IR to 16-bit machine words.
//!
//! Module layout:
//! - `isa`        : registers and op-code tables
//! - `instruction`: typed machine instructions
//! - `usage`      : per-temp read counts
//! - `regalloc`   : register allocation trait and implementation
//! - `codegen`    : lowering driver (IR → machine instructions)
//! - `encoder`    : bit packing and unpacking of instructions

pub mod codegen;
pub mod encoder;
pub mod instruction;
pub mod isa;
pub mod regalloc;
pub mod usage;

// Re-export the public API at `backend::` level.
pub use codegen::{Codegen, LoweredProgram};
pub use encoder::EncodedInstr;
pub use regalloc::{RefCountAllocator, RegAllocator};

use crate::ir::ProgramIR;
use crate::CompileError;

/// Lower and encode IR with a caller-supplied allocator.
pub fn compile_ir_with_allocator(
    reg: Box<dyn RegAllocator>,
    ir: &ProgramIR,
) -> Result<(LoweredProgram, Vec<EncodedInstr>), CompileError> {
    let lowered = Codegen::with_regalloc(reg).emit_program(ir)?;
    let encoded = encoder::encode_program(&lowered.instrs)?;
    Ok((lowered, encoded))
}
