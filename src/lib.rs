//! Translator from the Hack stack VM language to Hack assembly.
//!
//! - `parser` strips comments and classifies each command line.
//! - `translator` turns classified commands into assembly.
//! - `hack` models the target registers and instruction shapes.
//! - this module drives a whole run: one `.vm` file, or every `.vm` file in
//!   a directory translated into a single output with bootstrap code.

pub mod ast;
pub mod config;
pub mod error;
pub mod hack;
pub mod parser;
pub mod translator;

#[cfg(test)]
mod emulator;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use snafu::{ensure, ResultExt};

use config::Config;
use error::{AtLineSnafu, CreateSnafu, ListDirSnafu, NoSourcesSnafu, NotVmFileSnafu, ReadSnafu};
use translator::Translator;

pub use error::{Result, TranslateError};

const SOURCE_EXTENSION: &str = "vm";
const TARGET_EXTENSION: &str = "asm";

/// One VM source unit, named by its file stem.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub text: String,
}

/// What a run reads and writes.
#[derive(Debug, PartialEq, Eq)]
pub struct Plan {
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    /// Only multi-unit (directory) translations get bootstrap code.
    pub bootstrap: bool,
}

fn is_vm_file(path: &Path) -> bool {
    path.is_file() && path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Work out the sources and output file for `input`.
pub fn plan(input: &Path) -> Result<Plan> {
    if input.is_dir() {
        let dir = input.canonicalize().context(ReadSnafu { path: input })?;
        let mut sources = fs::read_dir(&dir)
            .context(ListDirSnafu { path: &dir })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_vm_file(path))
            .collect::<Vec<_>>();
        ensure!(!sources.is_empty(), NoSourcesSnafu { path: &dir });
        sources.sort();

        let output = dir.join(format!("{}.{}", stem(&dir), TARGET_EXTENSION));
        Ok(Plan {
            sources,
            output,
            bootstrap: true,
        })
    } else {
        ensure!(is_vm_file(input), NotVmFileSnafu { path: input });
        Ok(Plan {
            sources: vec![input.to_path_buf()],
            output: input.with_extension(TARGET_EXTENSION),
            bootstrap: false,
        })
    }
}

/// Translate `sources` in order into `out`, bootstrap first if asked.
///
/// Errors carry the source name and line of the offending command.
pub fn translate_sources<W: Write>(
    sources: &[Source],
    bootstrap: bool,
    annotate: bool,
    out: W,
) -> Result<W> {
    let mut translator = Translator::new(out).annotate(annotate);
    if bootstrap {
        translator.write_bootstrap()?;
    }

    for source in sources {
        info!("translating {}", source.name);
        translator.set_file_name(&source.name);
        for (line, command) in parser::parse(&source.text) {
            translator.translate(&command).context(AtLineSnafu {
                file: source.name.as_str(),
                line,
            })?;
        }
    }

    translator.finish()
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).context(ReadSnafu { path })?;
            Ok(Source {
                name: stem(path),
                text,
            })
        })
        .collect()
}

/// Translate what `config` names and return the path written.
///
/// A failed run removes its partial output.
pub fn run(config: &Config) -> Result<PathBuf> {
    let plan = plan(config.input())?;
    let sources = read_sources(&plan.sources)?;

    let file = File::create(&plan.output).context(CreateSnafu { path: &plan.output })?;
    let out = BufWriter::new(file);
    if let Err(e) = translate_sources(&sources, plan.bootstrap, config.annotate, out) {
        if let Err(rm) = fs::remove_file(&plan.output) {
            warn!("could not remove {}: {}", plan.output.display(), rm);
        }
        return Err(e);
    }

    info!("wrote {}", plan.output.display());
    Ok(plan.output)
}
