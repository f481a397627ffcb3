//! Model of the Hack target: the fixed registers the calling convention
//! relies on and the instruction shapes the translator emits.

use std::fmt;

/// First cell of the stack.
pub const STACK_BASE: u16 = 256;

/// The temp segment lives in R5..R12.
pub const TEMP_BASE: u16 = 5;
pub const TEMP_SLOTS: u16 = 8;

/// Largest literal an A-instruction can load.
pub const MAX_CONSTANT: u16 = 0x7fff;

/// Function the bootstrap code calls.
pub const ENTRY_FUNCTION: &str = "Sys.init";

/// Saved frame layout: return address + LCL, ARG, THIS, THAT.
pub const FRAME_SIZE: u16 = 5;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Register {
    Sp,
    Lcl,
    Arg,
    This,
    That,
    /// R5..R12
    Temp(u16),
    /// R13: target address for pops, saved frame base on return.
    Addr,
    /// R14: return address on return.
    Ret,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Sp => f.write_str("SP"),
            Register::Lcl => f.write_str("LCL"),
            Register::Arg => f.write_str("ARG"),
            Register::This => f.write_str("THIS"),
            Register::That => f.write_str("THAT"),
            Register::Temp(i) => write!(f, "R{}", TEMP_BASE + i),
            Register::Addr => f.write_str("R13"),
            Register::Ret => f.write_str("R14"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Address {
    Const(u16),
    Reg(Register),
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Const(c) => write!(f, "{}", c),
            Address::Reg(r) => write!(f, "{}", r),
            Address::Symbol(s) => f.write_str(s),
        }
    }
}

/// One line of Hack assembly.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Asm {
    /// `@addr`
    At(Address),
    /// `dest=comp;jump`, kept as written
    Compute(&'static str),
    /// `(LABEL)`
    Label(String),
    /// `// text`
    Comment(String),
}

impl fmt::Display for Asm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asm::At(addr) => write!(f, "@{}", addr),
            Asm::Compute(c) => f.write_str(c),
            Asm::Label(l) => write!(f, "({})", l),
            Asm::Comment(c) => write!(f, "// {}", c),
        }
    }
}

pub fn at_c(value: u16) -> Asm {
    Asm::At(Address::Const(value))
}

pub fn at_r(reg: Register) -> Asm {
    Asm::At(Address::Reg(reg))
}

pub fn at_s(symbol: impl Into<String>) -> Asm {
    Asm::At(Address::Symbol(symbol.into()))
}

pub fn c(instruction: &'static str) -> Asm {
    Asm::Compute(instruction)
}

pub fn label(symbol: impl Into<String>) -> Asm {
    Asm::Label(symbol.into())
}
