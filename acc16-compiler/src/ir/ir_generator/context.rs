use crate::ir::error_utils::make_semantic_error;
use crate::ir::symbol_table::SymbolTable;
use crate::ir::*;
use crate::ir::ast::SourceSpan;
use crate::{CompileError, SemanticErrorKind};

pub struct IrBuilder<'a> {
    pub out: ProgramIR,
    pub temp_count: usize,
    pub label_count: usize,
    symbols: &'a SymbolTable,
    source: &'a str,
    used: bool,
}

impl<'a> IrBuilder<'a> {
    pub fn new(symbols: &'a SymbolTable, source: &'a str) -> Self {
        Self {
            out: ProgramIR::new(),
            temp_count: 0,
            label_count: 0,
            symbols,
            source,
            used: false,
        }
    }

    /// Mark the builder as consumed. A second build would hand out temp and
    /// label ids that collide with the first program's.
    pub(super) fn claim(&mut self) -> Result<(), CompileError> {
        if self.used {
            return Err(CompileError::DuplicateUsageOfBuilder);
        }
        self.used = true;
        Ok(())
    }

    pub fn finish(&mut self) -> ProgramIR {
        std::mem::take(&mut self.out)
    }

    pub fn new_temp(&mut self) -> Temp {
        let t = Temp(self.temp_count);
        self.temp_count += 1;
        t
    }

    pub fn new_label(&mut self) -> Label {
        let l = Label(self.label_count);
        self.label_count += 1;
        l
    }

    pub fn emit(&mut self, i: Instr) {
        log::debug!("ir[{}]: {}", self.out.instrs.len(), i);
        self.out.instrs.push(i);
    }

    /// Resolve a variable to its slot, registering the slot with the
    /// program on first use.
    pub fn slot_for(&mut self, name: &str, span: SourceSpan) -> Result<Slot, CompileError> {
        let symbol = self.symbols.lookup(name).ok_or_else(|| {
            make_semantic_error(
                SemanticErrorKind::UndeclaredVariable,
                span,
                self.source,
                format!("Variable '{}' used before declaration", name),
            )
        })?;
        let slot = Slot {
            index: symbol.slot,
            name: symbol.name.clone(),
        };
        if !self.out.slots.iter().any(|s| s.index == slot.index) {
            log::trace!("registered slot {}", slot);
            self.out.slots.push(slot.clone());
        }
        Ok(slot)
    }
}
