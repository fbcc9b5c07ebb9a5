//! AST to IR lowering module.
//!
//! This module handles the translation of the checked AST into the linear
//! three-address IR, flattening `if`/`while` into labels and branches.

pub mod context;
pub mod expr;
pub mod stmt;

use crate::ir::ast::Program;
use crate::ir::symbol_table::SymbolTable;
use crate::ir::ProgramIR;
use crate::CompileError;

/// The builder that owns per-program temp and label counters.
pub use context::IrBuilder;

/// Entry point for lowering a checked AST to `ProgramIR`.
pub fn build(
    program: &Program,
    symbols: &SymbolTable,
    source: &str,
) -> Result<ProgramIR, CompileError> {
    IrBuilder::new(symbols, source).build_program(program)
}
