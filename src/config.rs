use std::path::{Path, PathBuf};

use snafu::ensure;

use crate::error::{Result, UsageSnafu};

pub const USAGE: &str = "usage: vmil [--annotate] <File.vm | Directory>";

#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    /// Emit each VM command as a comment before its code.
    pub annotate: bool,
}

impl Config {
    pub fn new(args: &[String]) -> Result<Self> {
        let mut input = None;
        let mut annotate = false;

        for arg in args.iter().skip(1) {
            match arg.as_str() {
                "--annotate" | "-a" => annotate = true,
                flag if flag.starts_with('-') => {
                    return UsageSnafu {
                        message: format!("unknown option {}\n{}", flag, USAGE),
                    }
                    .fail()
                }
                path => {
                    ensure!(
                        input.is_none(),
                        UsageSnafu {
                            message: format!("too many arguments\n{}", USAGE),
                        }
                    );
                    input = Some(PathBuf::from(path));
                }
            }
        }

        match input {
            Some(input) => Ok(Config { input, annotate }),
            None => UsageSnafu {
                message: format!("not enough arguments\n{}", USAGE),
            }
            .fail(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslateError;
    use test_log::test;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("vmil")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_single_input() {
        let config = Config::new(&args(&["Prog/Main.vm"])).unwrap();
        assert_eq!(config.input(), Path::new("Prog/Main.vm"));
        assert!(!config.annotate);
    }

    #[test]
    fn test_annotate_flag() {
        let config = Config::new(&args(&["--annotate", "Prog"])).unwrap();
        assert_eq!(config.input(), Path::new("Prog"));
        assert!(config.annotate);
    }

    #[test]
    fn test_bad_arguments() {
        let cases: [&[&str]; 3] = [&[], &["a.vm", "b.vm"], &["--verbose", "a.vm"]];
        for list in cases {
            assert!(
                matches!(Config::new(&args(list)), Err(TranslateError::Usage { .. })),
                "{:?}",
                list
            );
        }
    }
}
