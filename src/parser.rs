use nom::{
    bytes::complete::is_not,
    character::complete::{digit1, space0},
    combinator::{all_consuming, map_res},
    multi::many0,
    sequence::preceded,
    IResult,
};

use crate::ast::{Command, CommandKind};
use crate::error::{InvalidIndexSnafu, InvalidStateSnafu, MissingArgumentSnafu, Result};

fn integer(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |c: &str| c.parse())(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    preceded(space0, is_not(" \t\r\n"))(input)
}

fn words(line: &str) -> Vec<&str> {
    many0(word)(line).map(|(_, words)| words).unwrap_or_default()
}

fn keyword(token: &str) -> CommandKind {
    match token {
        "push" => CommandKind::Push,
        "pop" => CommandKind::Pop,
        "label" => CommandKind::Label,
        "goto" => CommandKind::Goto,
        "if-goto" => CommandKind::IfGoto,
        "function" => CommandKind::Function,
        "call" => CommandKind::Call,
        "return" => CommandKind::Return,
        _ => CommandKind::Arithmetic,
    }
}

impl Command {
    /// Classify one comment-free, trimmed command line.
    pub fn classify(line: &str) -> Command {
        let line = line.trim();
        let kind = words(line).first().map_or(CommandKind::Arithmetic, |w| keyword(w));
        Command {
            kind,
            text: line.to_string(),
        }
    }

    fn word(&self, position: usize) -> Result<&str> {
        words(&self.text)
            .get(position)
            .copied()
            .ok_or_else(|| {
                MissingArgumentSnafu {
                    line: self.text.as_str(),
                    position,
                }
                .build()
            })
    }

    /// The operator name for arithmetic commands, otherwise the token after
    /// the keyword. `return` has no arguments.
    pub fn arg1(&self) -> Result<&str> {
        match self.kind {
            CommandKind::Arithmetic => Ok(&self.text),
            CommandKind::Return => InvalidStateSnafu {
                kind: self.kind,
                accessor: "arg1",
            }
            .fail(),
            _ => self.word(1),
        }
    }

    /// The integer argument of push, pop, function and call.
    pub fn arg2(&self) -> Result<u16> {
        if !self.kind.takes_index() {
            return InvalidStateSnafu {
                kind: self.kind,
                accessor: "arg2",
            }
            .fail();
        }
        let token = self.word(2)?;
        match all_consuming(integer)(token) {
            Ok((_, value)) => Ok(value),
            Err(_) => InvalidIndexSnafu { token }.fail(),
        }
    }
}

/// Strip comments and blank lines, classifying what is left.
///
/// Line numbers are 1-based and refer to the original text.
pub fn parse(input: &str) -> Vec<(usize, Command)> {
    let mut commands = vec![];

    for (number, line) in input.lines().enumerate() {
        let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
        if line.is_empty() {
            continue;
        }
        commands.push((number + 1, Command::classify(line)));
    }

    commands
}
