use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::processor::ParseOptions;
use crate::writer::GenerateOptions;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file with default `parse` / `generate` options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and check a source file, print the program as JSON
    Parse {
        /// Input .bas source file
        input: PathBuf,
        #[command(flatten)]
        options: ParseFlags,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Parse, check and regenerate a source file
    Generate {
        /// Input .bas source file
        input: PathBuf,
        #[command(flatten)]
        parse: ParseFlags,
        #[command(flatten)]
        options: GenerateFlags,
        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Where to write the minification mapping as JSON
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Parse and check a source file
    Check {
        /// Input .bas source file
        input: PathBuf,
        #[command(flatten)]
        options: ParseFlags,
    },
}

#[derive(Args, Debug, Default)]
pub struct ParseFlags {
    /// Keep empty numbered lines as no-op statements
    #[arg(long)]
    pub keep_empty_lines: bool,
    /// Reject GOTO targets that do not exist
    #[arg(long = "check-goto")]
    pub check_goto_targets: bool,
}

#[derive(Args, Debug, Default)]
pub struct GenerateFlags {
    /// Rename private identifiers
    #[arg(long)]
    pub minify: bool,
    /// Keep comments in the output
    #[arg(long)]
    pub comments: bool,
    /// Strip optional whitespace
    #[arg(long)]
    pub optimize_space: bool,
}

/// Contents of the `--config` file. Flags given on the command line are
/// switched on in addition to whatever the file enables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub generate: GenerateOptions,
}

impl Config {
    pub fn parse_options(&self, flags: &ParseFlags) -> ParseOptions {
        ParseOptions {
            keep_empty_lines: self.parse.keep_empty_lines || flags.keep_empty_lines,
            check_goto_targets: self.parse.check_goto_targets || flags.check_goto_targets,
        }
    }

    pub fn generate_options(&self, flags: &GenerateFlags) -> GenerateOptions {
        GenerateOptions {
            minify: self.generate.minify || flags.minify,
            comments: self.generate.comments || flags.comments,
            optimize_space: self.generate.optimize_space || flags.optimize_space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "dvmbasic",
            "generate",
            "in.bas",
            "--minify",
            "--optimize-space",
            "--check-goto",
            "--mapping",
            "map.json",
            "--config",
            "cfg.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Command::Generate {
                input,
                parse,
                options,
                output,
                mapping,
            } => {
                assert_eq!(input, PathBuf::from("in.bas"));
                assert!(parse.check_goto_targets && !parse.keep_empty_lines);
                assert!(options.minify && options.optimize_space && !options.comments);
                assert_eq!(output, None);
                assert_eq!(mapping, Some(PathBuf::from("map.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_flags_or_into_config() {
        let config: Config =
            serde_json::from_str(r#"{"parse": {"check_goto_targets": true}, "generate": {"comments": true}}"#)
                .unwrap();
        let parse = config.parse_options(&ParseFlags {
            keep_empty_lines: true,
            check_goto_targets: false,
        });
        assert_eq!(
            parse,
            ParseOptions {
                keep_empty_lines: true,
                check_goto_targets: true
            }
        );
        let generate = config.generate_options(&GenerateFlags::default());
        assert_eq!(
            generate,
            GenerateOptions {
                minify: false,
                comments: true,
                optimize_space: false
            }
        );
    }
}
