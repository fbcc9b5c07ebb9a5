//! Intermediate Representation (IR) module.
//!
//! This module contains the AST, the symbol table and semantic checks,
//! the IR definitions and the AST-to-IR builder.

pub mod ast;
pub mod error_utils;
#[allow(clippy::module_inception)]
pub mod ir;
pub mod ir_generator;
pub mod semantic;
pub mod symbol_table;

pub use ir::*;
