//! Numeric definitions of the 16-bit target: registers and the op-code
//! tables for every decode group.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    /// Memory-address register: selects the data word for LOAD/STOR.
    Mar,
    /// I/O register: values moved here are written to the output port.
    Io,
}

impl Register {
    /// Interchangeable registers available to the allocator.
    pub const GP_REGS: [Register; 6] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
    ];

    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        let reg = match bits {
            0 => Register::R0,
            1 => Register::R1,
            2 => Register::R2,
            3 => Register::R3,
            4 => Register::R4,
            5 => Register::R5,
            6 => Register::Mar,
            7 => Register::Io,
            _ => return None,
        };
        Some(reg)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Register::R0 => "R0",
            Register::R1 => "R1",
            Register::R2 => "R2",
            Register::R3 => "R3",
            Register::R4 => "R4",
            Register::R5 => "R5",
            Register::Mar => "MAR",
            Register::Io => "IO",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instruction group, stored in bits [15:13] of the opcode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeOp {
    CalcReg = 0,
    CalcImm = 1,
    MemLoad = 2,
    CallRet = 4,
    Branch = 5,
    MemStor = 7,
}

impl DecodeOp {
    pub fn bits(self) -> u16 {
        self as u16
    }

    /// `None` for the reserved groups 3 and 6.
    pub fn from_bits(bits: u16) -> Option<Self> {
        let op = match bits {
            0 => DecodeOp::CalcReg,
            1 => DecodeOp::CalcImm,
            2 => DecodeOp::MemLoad,
            4 => DecodeOp::CallRet,
            5 => DecodeOp::Branch,
            7 => DecodeOp::MemStor,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add = 0,
    Sub = 1,
    And = 2,
    Or = 3,
    Not = 4,
    Xor = 5,
    Shl = 6,
    Shr = 7,
    Mul = 8,
    /// High 16 bits of the 32-bit product.
    Mulh = 9,
    Div = 10,
    /// Remainder of the division.
    Divh = 11,
    Mov = 13,
    Rol = 14,
    Ror = 15,
}

impl AluOp {
    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        let op = match bits {
            0 => AluOp::Add,
            1 => AluOp::Sub,
            2 => AluOp::And,
            3 => AluOp::Or,
            4 => AluOp::Not,
            5 => AluOp::Xor,
            6 => AluOp::Shl,
            7 => AluOp::Shr,
            8 => AluOp::Mul,
            9 => AluOp::Mulh,
            10 => AluOp::Div,
            11 => AluOp::Divh,
            13 => AluOp::Mov,
            14 => AluOp::Rol,
            15 => AluOp::Ror,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "add",
            AluOp::Sub => "sub",
            AluOp::And => "and",
            AluOp::Or => "or",
            AluOp::Not => "not",
            AluOp::Xor => "xor",
            AluOp::Shl => "shl",
            AluOp::Shr => "shr",
            AluOp::Mul => "mul",
            AluOp::Mulh => "mulh",
            AluOp::Div => "div",
            AluOp::Divh => "divh",
            AluOp::Mov => "mov",
            AluOp::Rol => "rol",
            AluOp::Ror => "ror",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOp {
    Ble = 0,
    Blt = 1,
    Bge = 2,
    Bgt = 3,
    Bleu = 4,
    Bltu = 5,
    Bgeu = 6,
    Bgtu = 7,
    Beq = 8,
    Bne = 9,
    Jump = 15,
}

impl BranchOp {
    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        let op = match bits {
            0 => BranchOp::Ble,
            1 => BranchOp::Blt,
            2 => BranchOp::Bge,
            3 => BranchOp::Bgt,
            4 => BranchOp::Bleu,
            5 => BranchOp::Bltu,
            6 => BranchOp::Bgeu,
            7 => BranchOp::Bgtu,
            8 => BranchOp::Beq,
            9 => BranchOp::Bne,
            15 => BranchOp::Jump,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BranchOp::Ble => "ble",
            BranchOp::Blt => "blt",
            BranchOp::Bge => "bge",
            BranchOp::Bgt => "bgt",
            BranchOp::Bleu => "bleu",
            BranchOp::Bltu => "bltu",
            BranchOp::Bgeu => "bgeu",
            BranchOp::Bgtu => "bgtu",
            BranchOp::Beq => "beq",
            BranchOp::Bne => "bne",
            BranchOp::Jump => "jump",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemOp {
    Push = 0,
    Pop = 1,
    Stor = 2,
    Load = 3,
}

impl MemOp {
    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        let op = match bits {
            0 => MemOp::Push,
            1 => MemOp::Pop,
            2 => MemOp::Stor,
            3 => MemOp::Load,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            MemOp::Push => "push",
            MemOp::Pop => "pop",
            MemOp::Stor => "stor",
            MemOp::Load => "load",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallRetOp {
    Call = 0,
    Ret = 1,
}

impl CallRetOp {
    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(CallRetOp::Call),
            1 => Some(CallRetOp::Ret),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            CallRetOp::Call => "call",
            CallRetOp::Ret => "ret",
        }
    }
}
