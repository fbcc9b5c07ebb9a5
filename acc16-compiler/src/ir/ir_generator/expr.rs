use super::context::IrBuilder;
use crate::ir::ast::Expr;
use crate::ir::*;
use crate::CompileError;

impl IrBuilder<'_> {
    /// Evaluate an expression into a fresh temporary.
    pub fn build_expr(&mut self, expr: &Expr) -> Result<Temp, CompileError> {
        match expr {
            Expr::Number(value) => {
                let dst = self.new_temp();
                self.emit(Instr::Const { dst, value: *value });
                Ok(dst)
            }
            Expr::Var { name, span } => {
                let src = self.slot_for(name, *span)?;
                let dst = self.new_temp();
                self.emit(Instr::Load { dst, src });
                Ok(dst)
            }
            Expr::Binary { op, left, right } => {
                let left = self.build_expr(left)?;
                let right = self.build_operand(right)?;
                let dst = self.new_temp();
                self.emit(Instr::BinOp {
                    dst,
                    left,
                    right,
                    op: *op,
                });
                Ok(dst)
            }
            Expr::Not(operand) => {
                let src = self.build_operand(operand)?;
                let dst = self.new_temp();
                self.emit(Instr::Not { dst, src });
                Ok(dst)
            }
        }
    }

    /// Evaluate the right-hand side of a binary operation (or the operand of
    /// `~`). Literals stay
    /// immediates; everything else goes through a temporary.
    pub fn build_operand(&mut self, expr: &Expr) -> Result<Operand, CompileError> {
        match expr {
            Expr::Number(value) => Ok(Operand::Const(*value)),
            other => Ok(Operand::Temp(self.build_expr(other)?)),
        }
    }
}
