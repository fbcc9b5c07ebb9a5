//! Front end: `logos` lexer and recursive-descent parser.

pub mod lexer;
pub mod parser;
