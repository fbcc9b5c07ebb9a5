//! Recursive-descent parser from tokens to the AST.
//!
//! Binary operators are parsed by precedence climbing. From loosest to
//! tightest: comparisons (non-associative), `|`, `^`, `&`, shifts and
//! rotates, `+ -`, `* / %`. Prefix `~` binds tighter than all of them.

use super::lexer::{get_error_context, position_to_line_col, Spanned, Token};
use crate::ir::ast::{BinOp, Block, Expr, Program, SourceSpan, Stmt};
use crate::CompileError;
use std::ops::Range;

/// Parentheses, blocks and `~` deeper than this are rejected.
pub const MAX_NESTING: usize = 256;

/// Precedence level and AST operator for a binary-operator token.
fn binary_op(token: &Token) -> Option<(u8, BinOp)> {
    let entry = match token {
        Token::Eq => (0, BinOp::Eq),
        Token::Neq => (0, BinOp::Neq),
        Token::Lt => (0, BinOp::Lt),
        Token::Gt => (0, BinOp::Gt),
        Token::Le => (0, BinOp::Le),
        Token::Ge => (0, BinOp::Ge),
        Token::Pipe => (1, BinOp::BitOr),
        Token::Caret => (2, BinOp::BitXor),
        Token::Amp => (3, BinOp::BitAnd),
        Token::Shl => (4, BinOp::Shl),
        Token::Shr => (4, BinOp::Shr),
        Token::Rol => (4, BinOp::Rol),
        Token::Ror => (4, BinOp::Ror),
        Token::Plus => (5, BinOp::Add),
        Token::Minus => (5, BinOp::Sub),
        Token::Mul => (6, BinOp::Mul),
        Token::Div => (6, BinOp::Div),
        Token::Mod => (6, BinOp::Mod),
        _ => return None,
    };
    Some(entry)
}

pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str, tokens: Vec<Spanned>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Program, CompileError> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        log::debug!("parsed {} top-level statements", statements.len());
        Ok(Program { statements })
    }

    // ── Token cursor ────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Byte offset of the current token, or end of input.
    fn current_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<Range<usize>, CompileError> {
        if self.peek() != Some(&expected) {
            return Err(self.unexpected(what));
        }
        self.pos += 1;
        Ok(self.tokens[self.pos - 1].1.clone())
    }

    fn expect_ident(&mut self) -> Result<(String, SourceSpan), CompileError> {
        match self.tokens.get(self.pos) {
            Some((Token::Ident(name), span)) => {
                let ident = (name.clone(), SourceSpan::from(span.clone()));
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Build a parse error for the current token.
    fn unexpected(&self, expected: &str) -> CompileError {
        let position = self.current_offset();
        let message = match self.peek() {
            Some(tok) => format!("Unexpected token '{}'. Expected {}", tok, expected),
            None => format!("Unexpected end of input. Expected {}", expected),
        };
        make_parse_error(self.source, position, message)
    }

    fn enter(&mut self) -> Result<(), CompileError> {
        if self.depth >= MAX_NESTING {
            return Err(make_parse_error(
                self.source,
                self.current_offset(),
                format!("Input nested too deeply (limit {})", MAX_NESTING),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        match self.peek() {
            Some(Token::Var) => self.parse_var_decl(),
            Some(Token::Print) => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(Token::Semicolon, "';'")?;
                Ok(Stmt::Print { value })
            }
            Some(Token::If) => self.parse_if(),
            Some(Token::While) => {
                self.advance();
                let condition = self.parse_expr()?;
                self.expect(Token::Colon, "':'")?;
                let body = self.parse_block()?;
                Ok(Stmt::While { condition, body })
            }
            Some(Token::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, CompileError> {
        self.expect(Token::Var, "'var'")?;
        let (name, span) = self.expect_ident()?;
        self.expect(Token::Assign, "'='")?;
        let value = self.parse_expr()?;
        self.expect(Token::Semicolon, "';'")?;
        Ok(Stmt::VarDecl { name, span, value })
    }

    fn parse_if(&mut self) -> Result<Stmt, CompileError> {
        self.expect(Token::If, "'if'")?;
        let condition = self.parse_expr()?;
        self.expect(Token::Colon, "':'")?;
        let then_block = self.parse_block()?;
        let else_block = if self.peek() == Some(&Token::Else) {
            self.advance();
            // `else: { ... }` and `else { ... }` are both accepted
            if self.peek() == Some(&Token::Colon) {
                self.advance();
            }
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn parse_block(&mut self) -> Result<Block, CompileError> {
        self.expect(Token::LBrace, "'{'")?;
        self.enter()?;
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => break,
                None => return Err(self.unexpected("'}'")),
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
        self.expect(Token::RBrace, "'}'")?;
        self.leave();
        Ok(Block { statements })
    }

    // ── Expressions ─────────────────────────────────────────────────────

    pub fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_level: u8) -> Result<Expr, CompileError> {
        let mut left = self.parse_atom()?;
        while let Some((level, op)) = self.peek().and_then(binary_op) {
            if level < min_level {
                break;
            }
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expr::binary(op, left, right);
            if op.is_comparison() {
                break;
            }
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr, CompileError> {
        match self.peek() {
            Some(Token::Number(_)) => match self.advance() {
                Some((Token::Number(n), _)) => Ok(Expr::Number(n)),
                _ => Err(self.unexpected("number")),
            },
            Some(Token::Ident(_)) => {
                let (name, span) = self.expect_ident()?;
                Ok(Expr::Var { name, span })
            }
            Some(Token::LParen) => {
                self.advance();
                self.enter()?;
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                self.leave();
                Ok(inner)
            }
            Some(Token::Tilde) => {
                self.advance();
                self.enter()?;
                let operand = self.parse_atom()?;
                self.leave();
                Ok(Expr::Not(Box::new(operand)))
            }
            _ => Err(self.unexpected("number, identifier, '(' or '~'")),
        }
    }
}

/// Helper: create CompileError::Parse with line/col from byte position
fn make_parse_error(source: &str, position: usize, message: String) -> CompileError {
    let (line, col) = position_to_line_col(source, position);
    let context = get_error_context(source, position);
    CompileError::Parse {
        line,
        col,
        context,
        message,
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::ast::{parse_to_ast, BinOp, Expr, Stmt};
    use crate::CompileError;

    fn first_value(source: &str) -> Expr {
        let program = parse_to_ast(source).expect("parse failed");
        match program.statements.into_iter().next() {
            Some(Stmt::VarDecl { value, .. }) => value,
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match first_value("var x = 1 + 2 * 3;") {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinOp::Add);
                assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        match first_value("var x = 10 - 3 - 2;") {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinOp::Sub);
                assert!(matches!(*left, Expr::Binary { op: BinOp::Sub, .. }));
                assert_eq!(*right, Expr::Number(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comparison_is_loosest() {
        let program = parse_to_ast("while a + 1 < b << 2: { print a; }").unwrap();
        match &program.statements[0] {
            Stmt::While { condition, .. } => {
                assert!(matches!(condition, Expr::Binary { op: BinOp::Lt, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn else_accepts_optional_colon() {
        let a = parse_to_ast("if 1 < 2: { print 1; } else: { print 2; }").unwrap();
        let b = parse_to_ast("if 1 < 2: { print 1; } else { print 2; }").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_semicolon_is_reported_with_location() {
        let err = parse_to_ast("var a = 1\nvar b = 2;").unwrap_err();
        match err {
            CompileError::Parse { line, col, message, .. } => {
                assert_eq!((line, col), (2, 1));
                assert!(message.contains("';'"), "message was {message}");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let err = parse_to_ast("while a < b: { print a;").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn bitwise_not_binds_tighter_than_binary_operators() {
        match first_value("var x = ~a & ~~3;") {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinOp::BitAnd);
                assert!(matches!(*left, Expr::Not(_)));
                assert!(matches!(*right, Expr::Not(ref inner) if matches!(**inner, Expr::Not(_))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nesting_limit_is_inclusive() {
        use super::MAX_NESTING;
        let at_limit = format!("var x = {}1{};", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse_to_ast(&at_limit).is_ok());
        let over = format!("var x = {}1{};", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        match parse_to_ast(&over).unwrap_err() {
            CompileError::Parse { col, .. } => assert_eq!(col, 9 + MAX_NESTING + 1),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
