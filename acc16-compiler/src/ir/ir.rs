// A tiny, linear three-address IR with labels, branches and unbounded temps.

use super::ast::BinOp;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramIR {
    pub instrs: Vec<Instr>,
    /// Every storage slot touched by the program, in first-use order
    pub slots: Vec<Slot>,
}

impl ProgramIR {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct temporaries defined by the program.
    pub fn temp_count(&self) -> usize {
        self.instrs
            .iter()
            .filter_map(Instr::defined_temp)
            .map(|t| t.0 + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.instrs
            .iter()
            .map(|ins| match ins {
                Instr::Label(lbl) => format!("{lbl}:"),
                other => format!("  {other}"),
            })
            .collect()
    }
}

/// An SSA-like virtual register: defined once, read any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Temp(pub usize);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A symbolic jump target, resolved to an address during lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Storage location bound to a declared variable for the whole program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// Right-hand operand that may be either a temporary or an immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Temp(Temp),
    Const(i64),
}

impl Operand {
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Operand::Temp(t) => Some(*t),
            Operand::Const(_) => None,
        }
    }
}

impl From<Temp> for Operand {
    fn from(t: Temp) -> Self {
        Operand::Temp(t)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(t) => write!(f, "{t}"),
            Operand::Const(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl RelOp {
    /// Map a comparison operator from the AST; `None` for arithmetic operators.
    pub fn from_binop(op: BinOp) -> Option<RelOp> {
        match op {
            BinOp::Eq => Some(RelOp::Eq),
            BinOp::Neq => Some(RelOp::Neq),
            BinOp::Lt => Some(RelOp::Lt),
            BinOp::Gt => Some(RelOp::Gt),
            BinOp::Le => Some(RelOp::Le),
            BinOp::Ge => Some(RelOp::Ge),
            _ => None,
        }
    }

    /// The comparison that holds exactly when `self` does not.
    pub fn invert(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Neq,
            RelOp::Neq => RelOp::Eq,
            RelOp::Lt => RelOp::Ge,
            RelOp::Ge => RelOp::Lt,
            RelOp::Gt => RelOp::Le,
            RelOp::Le => RelOp::Gt,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Eq => "==",
            RelOp::Neq => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// `dst = value`
    Const { dst: Temp, value: i64 },

    /// `dst = load slot`
    Load { dst: Temp, src: Slot },

    /// `store slot, src`
    Store { dst: Slot, src: Operand },

    /// `dst = left <op> right`
    BinOp {
        dst: Temp,
        left: Temp,
        right: Operand,
        op: BinOp,
    },

    /// `dst = ~src`
    Not { dst: Temp, src: Operand },

    /// `if left <op> right goto target`
    Branch {
        left: Temp,
        right: Temp,
        op: RelOp,
        target: Label,
    },

    /// `goto target`
    Jump(Label),

    /// `<label>:`
    Label(Label),

    /// `print value`
    Print(Temp),
}

impl Instr {
    /// Temporaries read by this instruction, in operand order. Destinations
    /// are not reads.
    pub fn used_temps(&self) -> Vec<Temp> {
        match self {
            Instr::Store { src, .. } | Instr::Not { src, .. } => {
                src.as_temp().into_iter().collect()
            }
            Instr::BinOp { left, right, .. } => {
                let mut used = vec![*left];
                used.extend(right.as_temp());
                used
            }
            Instr::Branch { left, right, .. } => vec![*left, *right],
            Instr::Print(value) => vec![*value],
            Instr::Const { .. } | Instr::Load { .. } | Instr::Jump(_) | Instr::Label(_) => {
                Vec::new()
            }
        }
    }

    /// The temporary written by this instruction, if any.
    pub fn defined_temp(&self) -> Option<Temp> {
        match self {
            Instr::Const { dst, .. }
            | Instr::Load { dst, .. }
            | Instr::BinOp { dst, .. }
            | Instr::Not { dst, .. } => Some(*dst),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Const { dst, value } => write!(f, "{dst} = {value}"),
            Instr::Load { dst, src } => write!(f, "{dst} = load {src}"),
            Instr::Store { dst, src } => write!(f, "store {dst}, {src}"),
            Instr::BinOp {
                dst,
                left,
                right,
                op,
            } => write!(f, "{dst} = {left} {op} {right}"),
            Instr::Not { dst, src } => write!(f, "{dst} = ~{src}"),
            Instr::Branch {
                left,
                right,
                op,
                target,
            } => write!(f, "if {left} {op} {right} goto {target}"),
            Instr::Jump(target) => write!(f, "goto {target}"),
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Print(value) => write!(f, "print {value}"),
        }
    }
}
