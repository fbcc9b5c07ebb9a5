//! Register allocation interfaces.
//!
//! This module defines:
//! - [`RegAllocator`]: the trait the lowerer drives allocation through.
//! - [`AllocError`]: failures reported by allocator operations.
//! - [`RefCountAllocator`]: the reference-counting implementation.

mod refcount;

pub use refcount::RefCountAllocator;

use super::isa::Register;
use super::usage::RefCounts;
use crate::ir::Temp;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("{0} already has a register")]
    AlreadyAllocated(Temp),

    #[error("{0} has no register to release")]
    NotAllocated(Temp),

    #[error("{0} is not mapped to any register")]
    NotRegistered(Temp),

    /// Pool exhausted. `temp` is `None` when a scratch register was requested.
    #[error("no free register ({limit} in use)")]
    NoFreeRegister { temp: Option<Temp>, limit: usize },

    #[error("{0} is not a scratch register")]
    NotScratch(Register),
}

// ============================================================================
// Allocator trait
// ============================================================================

/// Abstract register allocation interface.
///
/// The lowerer interacts exclusively through this trait, so any allocator
/// that hands out registers from [`Register::GP_REGS`] can be plugged in.
pub trait RegAllocator {
    // ── Core operations ─────────────────────────────────────────────────

    /// Bind `temp` to a free register.
    fn allocate(&mut self, temp: Temp) -> Result<Register, AllocError>;

    /// Return `temp`'s register to the pool.
    fn free(&mut self, temp: Temp) -> Result<Register, AllocError>;

    /// Record one read of `temp`; its register is freed after the last read.
    fn consume(&mut self, temp: Temp) -> Result<(), AllocError>;

    fn get_register(&self, temp: Temp) -> Result<Register, AllocError>;

    // ── Bookkeeping ─────────────────────────────────────────────────────

    /// Install the per-temp read counts for the program about to be lowered.
    fn set_refcounts(&mut self, counts: RefCounts);

    /// Reads of `temp` still outstanding.
    fn remaining_uses(&self, temp: Temp) -> usize;

    /// Drop every binding and count, returning all registers to the pool.
    fn reset(&mut self);

    /// Number of registers currently handed out.
    fn in_use(&self) -> usize;

    /// Largest value `in_use` has reached since the last reset.
    fn peak_in_use(&self) -> usize;

    // ── Scratch registers ───────────────────────────────────────────────

    /// Borrow a register that is not bound to any temporary.
    fn acquire_scratch(&mut self) -> Result<Register, AllocError>;

    fn release_scratch(&mut self, reg: Register) -> Result<(), AllocError>;
}
