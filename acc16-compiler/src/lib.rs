pub mod backend;
pub mod frontend;
pub mod ir;
pub mod options;
pub mod sim;

use backend::codegen::LoweredProgram;
use backend::encoder::EncodedInstr;
use backend::regalloc::AllocError;
use ir::ast::Program;
use ir::symbol_table::SymbolTable;
use thiserror::Error;

pub use options::{CompileOptions, RedeclarationPolicy};
pub use sim::{Machine, SimConfig, SimError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error ({line}:{col}) - {message}\n  Context: {context}")]
    Parse {
        line: usize,
        col: usize,
        context: String,
        message: String,
    },

    #[error("SemanticError:{kind} ({line}:{col}) - {message}")]
    Semantic {
        kind: SemanticErrorKind,
        line: usize,
        col: usize,
        message: String,
    },

    #[error("IR builder instances are single-use; create a new builder for each program")]
    DuplicateUsageOfBuilder,

    #[error("Unsupported construct in {stage}: {detail}")]
    UnsupportedConstruct { stage: &'static str, detail: String },

    #[error("Too many live temporaries: all {limit} registers are in use")]
    TooManyLiveTemporaries { limit: usize },

    #[error("Register allocator invariant violated: {0}")]
    Allocator(AllocError),

    #[error("Unresolved label {0}")]
    UnresolvedLabel(ir::Label),

    #[error("Immediate {value} does not fit in {bits} unsigned bits")]
    ImmediateOutOfRange { value: i64, bits: u32 },

    #[error("Invalid encoding {word:#06x}: {reason}")]
    InvalidEncoding { word: u16, reason: &'static str },
}

impl From<AllocError> for CompileError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::NoFreeRegister { limit, .. } => {
                CompileError::TooManyLiveTemporaries { limit }
            }
            other => CompileError::Allocator(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UndeclaredVariable,
    VariableRedeclaration,
}

impl std::fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticErrorKind::UndeclaredVariable => write!(f, "UndeclaredVariable"),
            SemanticErrorKind::VariableRedeclaration => write!(f, "VariableRedeclaration"),
        }
    }
}

/// Every artifact produced by a full compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub ir: ir::ProgramIR,
    pub lowered: LoweredProgram,
    pub encoded: Vec<EncodedInstr>,
}

pub fn parse(source: &str) -> Result<Program, CompileError> {
    ir::ast::parse_to_ast(source)
}

/// Check declarations and assign storage slots.
pub fn analyze(
    program: &Program,
    source: &str,
    options: &CompileOptions,
) -> Result<SymbolTable, CompileError> {
    ir::semantic::analyze(program, source, options)
}

pub fn compile_to_ir(source: &str) -> Result<ir::ProgramIR, CompileError> {
    compile_to_ir_with(source, &CompileOptions::default())
}

pub fn compile_to_ir_with(
    source: &str,
    options: &CompileOptions,
) -> Result<ir::ProgramIR, CompileError> {
    let program = parse(source)?;
    let symbols = analyze(&program, source, options)?;
    ir::ir_generator::build(&program, &symbols, source)
}

/// Compile source text straight to `(opcode, immediate)` word pairs.
pub fn compile_to_machine(source: &str) -> Result<Vec<EncodedInstr>, CompileError> {
    Ok(compile(source)?.encoded)
}

pub fn compile(source: &str) -> Result<Compiled, CompileError> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let ir = compile_to_ir_with(source, options)?;
    let lowered = backend::codegen::lower(&ir)?;
    let encoded = backend::encoder::encode_program(&lowered.instrs)?;
    log::info!(
        "compiled {} IR instructions into {} machine instructions",
        ir.instrs.len(),
        encoded.len()
    );
    Ok(Compiled {
        ir,
        lowered,
        encoded,
    })
}

/// Execute an encoded program on the simulated machine.
pub fn run(program: &[EncodedInstr], config: &SimConfig) -> Result<Machine, SimError> {
    sim::run(program, config)
}
