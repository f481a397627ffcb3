//! Error type shared by the classifier, the code generator and the driver.
//!
//! Every failure is fatal for the run: the driver reports it and discards
//! whatever output was produced so far.

use std::io;
use std::path::PathBuf;

use snafu::Snafu;

use crate::ast::{CommandKind, Segment};

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranslateError {
    #[snafu(display("{accessor} is not available on a {kind} command"))]
    InvalidState {
        kind: CommandKind,
        accessor: &'static str,
    },

    #[snafu(display("'{line}' is missing argument {position}"))]
    MissingArgument { line: String, position: usize },

    #[snafu(display("'{token}' is not a valid non-negative integer"))]
    InvalidIndex { token: String },

    #[snafu(display("unknown arithmetic command '{op}'"))]
    UnknownOperator { op: String },

    #[snafu(display("unknown segment '{segment}'"))]
    UnknownSegment { segment: String },

    #[snafu(display("cannot pop into the constant segment"))]
    PopConstant,

    #[snafu(display("{segment} index {index} out of range (max {max})"))]
    IndexOutOfRange {
        segment: Segment,
        index: u16,
        max: u16,
    },

    #[snafu(display("bootstrap code must be the first thing written"))]
    BootstrapNotFirst,

    #[snafu(display("failed to write assembly: {source}"))]
    Write { source: io::Error },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    Read { path: PathBuf, source: io::Error },

    #[snafu(display("failed to create {}: {source}", path.display()))]
    Create { path: PathBuf, source: io::Error },

    #[snafu(display("failed to list {}: {source}", path.display()))]
    ListDir { path: PathBuf, source: io::Error },

    #[snafu(display("{message}"))]
    Usage { message: String },

    #[snafu(display("expected a .vm file or a directory, got {}", path.display()))]
    NotVmFile { path: PathBuf },

    #[snafu(display("no .vm files found in {}", path.display()))]
    NoSources { path: PathBuf },

    #[snafu(display("{file}:{line}: {source}"))]
    AtLine {
        file: String,
        line: usize,
        #[snafu(source(from(TranslateError, Box::new)))]
        source: Box<TranslateError>,
    },
}
