use super::context::IrBuilder;
use crate::ir::ast::{Block, Expr, Program, Stmt};
use crate::ir::*;
use crate::CompileError;

impl IrBuilder<'_> {
    /// Lower a whole program. A builder lowers exactly one program; any
    /// further call fails with `DuplicateUsageOfBuilder`.
    pub fn build_program(&mut self, p: &Program) -> Result<ProgramIR, CompileError> {
        self.claim()?;
        for s in &p.statements {
            self.build_stmt(s)?;
        }
        let out = self.finish();
        log::debug!(
            "built {} IR instructions, {} temps, {} slots",
            out.instrs.len(),
            self.temp_count,
            out.slots.len()
        );
        Ok(out)
    }

    pub fn build_stmt(&mut self, s: &Stmt) -> Result<(), CompileError> {
        match s {
            Stmt::VarDecl { name, span, value } => {
                let src = match value {
                    Expr::Number(n) => Operand::Const(*n),
                    other => Operand::Temp(self.build_expr(other)?),
                };
                let dst = self.slot_for(name, *span)?;
                self.emit(Instr::Store { dst, src });
                Ok(())
            }
            Stmt::Print { value } => {
                let t = self.build_expr(value)?;
                self.emit(Instr::Print(t));
                Ok(())
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => self.build_if(condition, then_block, else_block.as_ref()),
            Stmt::While { condition, body } => self.build_while(condition, body),
            Stmt::Block(block) => self.build_block(block),
        }
    }

    pub fn build_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for s in &block.statements {
            self.build_stmt(s)?;
        }
        Ok(())
    }

    fn build_if(
        &mut self,
        condition: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
    ) -> Result<(), CompileError> {
        let else_label = self.new_label();
        let end_label = self.new_label();

        self.branch_unless(condition, else_label)?;
        self.build_block(then_block)?;
        self.emit(Instr::Jump(end_label));
        self.emit(Instr::Label(else_label));
        if let Some(else_block) = else_block {
            self.build_block(else_block)?;
        }
        self.emit(Instr::Label(end_label));
        Ok(())
    }

    fn build_while(&mut self, condition: &Expr, body: &Block) -> Result<(), CompileError> {
        let start = self.new_label();
        let stop = self.new_label();

        self.emit(Instr::Label(start));
        self.branch_unless(condition, stop)?;
        self.build_block(body)?;
        self.emit(Instr::Jump(start));
        self.emit(Instr::Label(stop));
        Ok(())
    }

    /// Emit a branch to `target` taken when `condition` is false.
    fn branch_unless(&mut self, condition: &Expr, target: Label) -> Result<(), CompileError> {
        let (op, left, right) = match condition {
            Expr::Binary { op, left, right } => match RelOp::from_binop(*op) {
                Some(rel) => (rel, left, right),
                None => return Err(non_comparison(condition)),
            },
            _ => return Err(non_comparison(condition)),
        };
        let left = self.build_expr(left)?;
        let right = self.build_expr(right)?;
        self.emit(Instr::Branch {
            left,
            right,
            op: op.invert(),
            target,
        });
        Ok(())
    }
}

fn non_comparison(condition: &Expr) -> CompileError {
    let detail = match condition {
        Expr::Number(n) => format!("condition `{}` is not a comparison", n),
        Expr::Var { name, .. } => format!("condition `{}` is not a comparison", name),
        Expr::Binary { op, .. } => format!("condition uses `{}`, expected a comparison", op),
        Expr::Not(_) => "condition uses `~`, expected a comparison".to_string(),
    };
    CompileError::UnsupportedConstruct {
        stage: "IR builder",
        detail,
    }
}
