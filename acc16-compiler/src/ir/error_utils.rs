use crate::frontend::lexer::position_to_line_col;
use crate::ir::ast::SourceSpan;
use crate::{CompileError, SemanticErrorKind};

/// Helper to create semantic errors with proper line/col conversion
pub fn make_semantic_error(
    kind: SemanticErrorKind,
    span: SourceSpan,
    source: &str,
    message: String,
) -> CompileError {
    let (line, col) = position_to_line_col(source, span.start);
    CompileError::Semantic {
        kind,
        line,
        col,
        message,
    }
}
