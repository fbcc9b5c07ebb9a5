//! Temp usage analysis.
//!
//! Every temporary is defined once and read a known number of times, so a
//! single forward pass counting reads is enough to know when its register
//! can be handed back.

use crate::ir::{ProgramIR, Temp};
use std::collections::HashMap;

/// Remaining-reads count per temporary.
pub type RefCounts = HashMap<Temp, usize>;

#[derive(Debug, Default)]
pub struct TempUsageAnalyzer {
    counts: RefCounts,
}

impl TempUsageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the reads of every temporary in `program`. Destinations are not
    /// counted; a temp that is defined but never read has no entry.
    pub fn analyze(mut self, program: &ProgramIR) -> RefCounts {
        for instr in &program.instrs {
            for temp in instr.used_temps() {
                *self.counts.entry(temp).or_insert(0) += 1;
            }
        }
        log::trace!("temp usage: {} temps read", self.counts.len());
        self.counts
    }
}

/// Total number of temp reads recorded in `counts`.
pub fn total_reads(counts: &RefCounts) -> usize {
    counts.values().sum()
}
