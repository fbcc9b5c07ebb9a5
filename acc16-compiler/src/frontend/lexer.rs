use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n]+")] // Whitespace
#[logos(skip r"#[^\n]*")] // Shell-style comments starting with '#'
#[logos(skip r"//[^\n]*")] // C++-style line comments starting with '//'
pub enum Token {
    // --- Keywords ---
    #[token("var")]
    Var,
    #[token("print")]
    Print,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("rol")]
    Rol,
    #[token("ror")]
    Ror,

    // --- Identifiers and Numbers ---
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().map_err(|_| LexErrorKind::NumberOutOfRange))]
    Number(i64),

    // --- Operators ---
    #[token("==")]
    Eq,
    #[token("!=")]
    Neq,

    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,

    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,

    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,

    // --- Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Var => write!(f, "var"),
            Token::Print => write!(f, "print"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Rol => write!(f, "rol"),
            Token::Ror => write!(f, "ror"),
            Token::Ident(s) => write!(f, "'{}'", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Eq => write!(f, "=="),
            Token::Neq => write!(f, "!="),
            Token::Assign => write!(f, "="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Mul => write!(f, "*"),
            Token::Div => write!(f, "/"),
            Token::Mod => write!(f, "%"),
            Token::Shl => write!(f, "<<"),
            Token::Shr => write!(f, ">>"),
            Token::Gt => write!(f, ">"),
            Token::Lt => write!(f, "<"),
            Token::Ge => write!(f, ">="),
            Token::Le => write!(f, "<="),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::Tilde => write!(f, "~"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
        }
    }
}

/// What went wrong while lexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    #[default]
    UnexpectedCharacter,
    /// A decimal literal too large for an `i64`.
    NumberOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub kind: LexErrorKind,
    /// Byte offset of the offending text.
    pub location: usize,
    pub line: usize,
    pub column: usize,
    /// The offending source text.
    pub lexeme: String,
    pub context: String,
}

impl LexicalError {
    fn new(source: &str, span: Range<usize>, kind: LexErrorKind) -> Self {
        let (line, column) = position_to_line_col(source, span.start);
        Self {
            kind,
            location: span.start,
            line,
            column,
            lexeme: source.get(span).unwrap_or_default().to_string(),
            context: line_text(source, line),
        }
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexErrorKind::UnexpectedCharacter => {
                write!(f, "Unexpected character '{}'", self.lexeme)?
            }
            LexErrorKind::NumberOutOfRange => {
                write!(f, "Number literal {} is too large", self.lexeme)?
            }
        }
        write!(
            f,
            " at line {}, column {}\n  Context: {}",
            self.line, self.column, self.context
        )
    }
}

impl std::error::Error for LexicalError {}

/// 1-based line and column of byte `position`. Columns count characters.
pub fn position_to_line_col(source: &str, position: usize) -> (usize, usize) {
    let before = source.get(..position).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |text| text.chars().count())
        + 1;
    (line, column)
}

/// Trimmed text of 1-based `line`, empty past the end of the source.
pub fn line_text(source: &str, line: usize) -> String {
    source
        .lines()
        .nth(line.saturating_sub(1))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The source line containing byte `position`, trimmed.
pub fn get_error_context(source: &str, position: usize) -> String {
    let (line, _) = position_to_line_col(source, position);
    line_text(source, line)
}

/// A token together with its byte range in the source.
pub type Spanned = (Token, Range<usize>);

/// Spanned tokens of a source string; logos failures become positioned
/// [`LexicalError`]s.
pub struct LexerAdapter<'source> {
    source: &'source str,
    tokens: logos::SpannedIter<'source, Token>,
}

impl<'source> LexerAdapter<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            tokens: Token::lexer(source).spanned(),
        }
    }
}

impl Iterator for LexerAdapter<'_> {
    type Item = Result<Spanned, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (result, span) = self.tokens.next()?;
        Some(match result {
            Ok(token) => Ok((token, span)),
            Err(kind) => Err(LexicalError::new(self.source, span, kind)),
        })
    }
}

/// Lex the whole source, stopping at the first invalid character.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, LexicalError> {
    let tokens: Vec<Spanned> = LexerAdapter::new(source).collect::<Result<_, _>>()?;
    log::trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}
