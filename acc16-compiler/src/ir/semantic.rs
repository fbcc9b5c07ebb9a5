//! Semantic analysis: slot assignment and declaration checks.
//!
//! Walks the AST in source order, declaring each `var` the first time it is
//! seen and checking that every referenced name was declared earlier. The
//! resulting [`SymbolTable`] is what the IR builder resolves slots against.

use super::ast::{Block, Expr, Program, Stmt};
use super::error_utils::make_semantic_error;
use super::symbol_table::SymbolTable;
use crate::options::{CompileOptions, RedeclarationPolicy};
use crate::{CompileError, SemanticErrorKind};

pub struct SemanticAnalyzer<'a> {
    table: SymbolTable,
    policy: RedeclarationPolicy,
    source: &'a str,
}

impl<'a> SemanticAnalyzer<'a> {
    /// `source` is only used to turn spans into line/column positions.
    pub fn new(source: &'a str, options: &CompileOptions) -> Self {
        Self {
            table: SymbolTable::new(),
            policy: options.redeclaration,
            source,
        }
    }

    pub fn analyze(mut self, program: &Program) -> Result<SymbolTable, CompileError> {
        for stmt in &program.statements {
            self.visit_stmt(stmt)?;
        }
        log::debug!("semantic analysis declared {} slot(s)", self.table.len());
        Ok(self.table)
    }

    fn visit_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::VarDecl { name, span, value } => {
                // The initializer is checked before the name comes into scope,
                // so `var x = x;` is rejected for a fresh `x`.
                self.visit_expr(value)?;
                match self.table.declare(name) {
                    Ok(sym) => log::trace!("declared {} in slot {}", sym.name, sym.slot),
                    Err(existing) => match self.policy {
                        RedeclarationPolicy::Reuse => {
                            log::debug!("{} already declared, reusing slot {}", name, existing.slot)
                        }
                        RedeclarationPolicy::Reject => {
                            let slot = existing.slot;
                            return Err(make_semantic_error(
                                SemanticErrorKind::VariableRedeclaration,
                                *span,
                                self.source,
                                format!("Variable '{}' already declared (slot {})", name, slot),
                            ));
                        }
                    },
                }
                Ok(())
            }
            Stmt::Print { value } => self.visit_expr(value),
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                self.visit_expr(condition)?;
                self.visit_block(then_block)?;
                if let Some(else_block) = else_block {
                    self.visit_block(else_block)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                self.visit_expr(condition)?;
                self.visit_block(body)
            }
            Stmt::Block(block) => self.visit_block(block),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Var { name, span } => {
                if self.table.lookup(name).is_none() {
                    return Err(make_semantic_error(
                        SemanticErrorKind::UndeclaredVariable,
                        *span,
                        self.source,
                        format!("Variable '{}' used before declaration", name),
                    ));
                }
                Ok(())
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)
            }
            Expr::Not(operand) => self.visit_expr(operand),
        }
    }
}

/// Run semantic analysis over a parsed program.
pub fn analyze(
    program: &Program,
    source: &str,
    options: &CompileOptions,
) -> Result<SymbolTable, CompileError> {
    SemanticAnalyzer::new(source, options).analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::parse_to_ast;

    fn analyze_src(source: &str, options: &CompileOptions) -> Result<SymbolTable, CompileError> {
        let program = parse_to_ast(source).expect("parse failed");
        analyze(&program, source, options)
    }

    #[test]
    fn nested_declarations_get_slots_in_source_order() {
        let table = analyze_src(
            "var a = 1; if a < 2: { var b = a; } else { var c = 3; } while a > 0: { var d = a; }",
            &CompileOptions::default(),
        )
        .unwrap();
        let names: Vec<_> = table.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn self_reference_in_fresh_declaration_is_undeclared() {
        let err = analyze_src("var x = x + 1;", &CompileOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Semantic {
                kind: SemanticErrorKind::UndeclaredVariable,
                ..
            }
        ));
    }

    #[test]
    fn strict_policy_rejects_redeclaration() {
        let options = CompileOptions {
            redeclaration: RedeclarationPolicy::Reject,
        };
        let err = analyze_src("var a = 1;\nvar a = 2;", &options).unwrap_err();
        match err {
            CompileError::Semantic { kind, line, col, .. } => {
                assert_eq!(kind, SemanticErrorKind::VariableRedeclaration);
                assert_eq!((line, col), (2, 5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
