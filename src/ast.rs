use std::fmt;
use std::str::FromStr;

use crate::error::{TranslateError, UnknownOperatorSnafu, UnknownSegmentSnafu};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl FromStr for Segment {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "constant" => Segment::Constant,
            "local" => Segment::Local,
            "static" => Segment::Static,
            "argument" => Segment::Argument,
            "this" => Segment::This,
            "that" => Segment::That,
            "pointer" => Segment::Pointer,
            "temp" => Segment::Temp,
            _ => return UnknownSegmentSnafu { segment: s }.fail(),
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stack arithmetic and logic
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl FromStr for ArithmeticOp {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "add" => ArithmeticOp::Add,
            "sub" => ArithmeticOp::Sub,
            "neg" => ArithmeticOp::Neg,
            "eq" => ArithmeticOp::Eq,
            "gt" => ArithmeticOp::Gt,
            "lt" => ArithmeticOp::Lt,
            "and" => ArithmeticOp::And,
            "or" => ArithmeticOp::Or,
            "not" => ArithmeticOp::Not,
            _ => return UnknownOperatorSnafu { op: s }.fail(),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandKind {
    // Stack basics
    Arithmetic,
    Push,
    Pop,

    // Control
    Label,
    Goto,
    IfGoto,

    // Functions
    Function,
    Call,
    Return,
}

impl CommandKind {
    /// Kinds that carry an integer second argument.
    pub fn takes_index(&self) -> bool {
        matches!(
            self,
            CommandKind::Push | CommandKind::Pop | CommandKind::Function | CommandKind::Call
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandKind::Arithmetic => "arithmetic",
            CommandKind::Push => "push",
            CommandKind::Pop => "pop",
            CommandKind::Label => "label",
            CommandKind::Goto => "goto",
            CommandKind::IfGoto => "if-goto",
            CommandKind::Function => "function",
            CommandKind::Call => "call",
            CommandKind::Return => "return",
        })
    }
}

/// One cleaned VM command line together with its classification.
///
/// Arguments stay as raw text until asked for; see `parser` for the
/// accessors.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Command {
    pub(crate) kind: CommandKind,
    pub(crate) text: String,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
