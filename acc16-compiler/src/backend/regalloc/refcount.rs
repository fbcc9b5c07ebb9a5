//! Reference-counting register allocator.
//!
//! Temporaries are single-assignment and their read counts are known up
//! front, so a register can be returned the moment its last read has been
//! lowered. There is no spilling: running out of registers is an error.

use super::{AllocError, RegAllocator};
use crate::backend::isa::Register;
use crate::backend::usage::RefCounts;
use crate::ir::Temp;
use std::collections::{HashMap, HashSet};

pub struct RefCountAllocator {
    /// Free registers; the top of the stack is handed out next.
    free: Vec<Register>,
    temp_to_reg: HashMap<Temp, Register>,
    reg_to_temp: HashMap<Register, Temp>,
    scratch: HashSet<Register>,
    refcounts: RefCounts,
    peak: usize,
}

impl RefCountAllocator {
    pub fn new() -> Self {
        Self {
            free: Register::GP_REGS.to_vec(),
            temp_to_reg: HashMap::new(),
            reg_to_temp: HashMap::new(),
            scratch: HashSet::new(),
            refcounts: RefCounts::new(),
            peak: 0,
        }
    }

    fn take_free(&mut self, temp: Option<Temp>) -> Result<Register, AllocError> {
        let reg = self.free.pop().ok_or(AllocError::NoFreeRegister {
            temp,
            limit: Register::GP_REGS.len(),
        })?;
        self.peak = self.peak.max(self.in_use());
        Ok(reg)
    }

    /// The temporary currently held in `reg`, if any.
    pub fn occupant(&self, reg: Register) -> Option<Temp> {
        self.reg_to_temp.get(&reg).copied()
    }
}

impl Default for RefCountAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RegAllocator for RefCountAllocator {
    fn allocate(&mut self, temp: Temp) -> Result<Register, AllocError> {
        if self.temp_to_reg.contains_key(&temp) {
            return Err(AllocError::AlreadyAllocated(temp));
        }
        let reg = self.take_free(Some(temp))?;
        self.temp_to_reg.insert(temp, reg);
        self.reg_to_temp.insert(reg, temp);
        log::trace!("alloc {} -> {}", temp, reg);
        Ok(reg)
    }

    fn free(&mut self, temp: Temp) -> Result<Register, AllocError> {
        let reg = self
            .temp_to_reg
            .remove(&temp)
            .ok_or(AllocError::NotAllocated(temp))?;
        self.reg_to_temp.remove(&reg);
        self.free.push(reg);
        log::trace!("free {} ({})", temp, reg);
        Ok(reg)
    }

    fn consume(&mut self, temp: Temp) -> Result<(), AllocError> {
        if !self.temp_to_reg.contains_key(&temp) {
            return Err(AllocError::NotAllocated(temp));
        }
        let remaining = self.refcounts.entry(temp).or_insert(0);
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.free(temp)?;
        }
        Ok(())
    }

    fn get_register(&self, temp: Temp) -> Result<Register, AllocError> {
        self.temp_to_reg
            .get(&temp)
            .copied()
            .ok_or(AllocError::NotRegistered(temp))
    }

    fn set_refcounts(&mut self, counts: RefCounts) {
        self.refcounts = counts;
    }

    fn remaining_uses(&self, temp: Temp) -> usize {
        self.refcounts.get(&temp).copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn in_use(&self) -> usize {
        Register::GP_REGS.len() - self.free.len()
    }

    fn peak_in_use(&self) -> usize {
        self.peak
    }

    fn acquire_scratch(&mut self) -> Result<Register, AllocError> {
        let reg = self.take_free(None)?;
        self.scratch.insert(reg);
        Ok(reg)
    }

    fn release_scratch(&mut self, reg: Register) -> Result<(), AllocError> {
        if !self.scratch.remove(&reg) {
            return Err(AllocError::NotScratch(reg));
        }
        self.free.push(reg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recently_freed_register_is_reused_first() {
        let mut ra = RefCountAllocator::new();
        let r0 = ra.allocate(Temp(0)).unwrap();
        let r1 = ra.allocate(Temp(1)).unwrap();
        assert_eq!((r0, r1), (Register::R5, Register::R4));

        ra.free(Temp(0)).unwrap();
        assert_eq!(ra.occupant(Register::R5), None);
        assert_eq!(ra.allocate(Temp(2)).unwrap(), Register::R5);
        assert_eq!(ra.occupant(Register::R5), Some(Temp(2)));
    }

    #[test]
    fn double_allocation_is_rejected() {
        let mut ra = RefCountAllocator::new();
        ra.allocate(Temp(3)).unwrap();
        assert_eq!(
            ra.allocate(Temp(3)),
            Err(AllocError::AlreadyAllocated(Temp(3)))
        );
    }

    #[test]
    fn lookups_on_unmapped_temps_fail() {
        let mut ra = RefCountAllocator::new();
        assert_eq!(ra.free(Temp(1)), Err(AllocError::NotAllocated(Temp(1))));
        assert_eq!(ra.consume(Temp(1)), Err(AllocError::NotAllocated(Temp(1))));
        assert_eq!(
            ra.get_register(Temp(1)),
            Err(AllocError::NotRegistered(Temp(1)))
        );
    }

    #[test]
    fn pool_exhaustion_reports_no_free_register() {
        let mut ra = RefCountAllocator::new();
        for i in 0..6 {
            ra.allocate(Temp(i)).unwrap();
        }
        assert_eq!(
            ra.allocate(Temp(6)),
            Err(AllocError::NoFreeRegister {
                temp: Some(Temp(6)),
                limit: 6
            })
        );
        assert_eq!(ra.peak_in_use(), 6);
    }

    #[test]
    fn register_is_freed_after_last_read() {
        let mut ra = RefCountAllocator::new();
        ra.set_refcounts(RefCounts::from([(Temp(0), 2)]));
        ra.allocate(Temp(0)).unwrap();

        ra.consume(Temp(0)).unwrap();
        assert_eq!(ra.in_use(), 1);
        assert_eq!(ra.remaining_uses(Temp(0)), 1);

        ra.consume(Temp(0)).unwrap();
        assert_eq!(ra.in_use(), 0);
        assert!(ra.get_register(Temp(0)).is_err());
    }

    #[test]
    fn scratch_registers_are_unbound() {
        let mut ra = RefCountAllocator::new();
        let scratch = ra.acquire_scratch().unwrap();
        assert_eq!(ra.in_use(), 1);
        assert!(ra.release_scratch(Register::R0).is_err());
        ra.release_scratch(scratch).unwrap();
        assert_eq!(ra.in_use(), 0);
    }

    #[test]
    fn reset_returns_everything() {
        let mut ra = RefCountAllocator::new();
        ra.allocate(Temp(0)).unwrap();
        ra.acquire_scratch().unwrap();
        ra.reset();
        assert_eq!(ra.in_use(), 0);
        assert_eq!(ra.peak_in_use(), 0);
        assert_eq!(ra.allocate(Temp(0)).unwrap(), Register::R5);
    }
}
