pub mod cli;
pub mod error;
pub mod model;
pub mod processor;
pub mod writer;

pub use error::{Error, Result};
pub use processor::{ParseOptions, parse, parse_with};
pub use writer::{GenerateOptions, Generated, Mapping, generate};

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn run() -> anyhow::Result<()> {
    init_logging();
    execute(cli::Cli::parse())
}

fn execute(args: cli::Cli) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Reading {}", path.display()))?;
            serde_json::from_str::<cli::Config>(&json)
                .with_context(|| format!("Parsing config {}", path.display()))?
        }
        None => cli::Config::default(),
    };

    match args.command {
        cli::Command::Parse {
            input,
            options,
            pretty,
        } => {
            let options = config.parse_options(&options);
            let program = parse_file(&input, &options)?;
            let json = if pretty {
                serde_json::to_string_pretty(&program)?
            } else {
                serde_json::to_string(&program)?
            };
            println!("{json}");
        }
        cli::Command::Generate {
            input,
            parse,
            options,
            output,
            mapping,
        } => {
            let program = parse_file(&input, &config.parse_options(&parse))?;
            let options = config.generate_options(&options);
            let generated = generate(program, &options);

            // 1. ── Code ───────────────────────────────────────────────
            match &output {
                Some(path) => std::fs::write(path, &generated.code)
                    .with_context(|| format!("Writing {}", path.display()))?,
                None => println!("{}", generated.code),
            }

            // 2. ── Mapping ────────────────────────────────────────────
            match (generated.mapping, mapping) {
                (Some(names), Some(path)) => {
                    let json = serde_json::to_string_pretty(&names)?;
                    std::fs::write(&path, json)
                        .with_context(|| format!("Writing {}", path.display()))?;
                    info!(path = %path.display(), "wrote minification mapping");
                }
                (Some(_), None) => warn!("minified without --mapping; mapping discarded"),
                (None, Some(_)) => warn!("--mapping ignored without --minify"),
                (None, None) => {}
            }
        }
        cli::Command::Check { input, options } => {
            let program = parse_file(&input, &config.parse_options(&options))?;
            println!(
                "{}: ok ({} functions)",
                input.display(),
                program.functions.len()
            );
        }
    }

    Ok(())
}

fn parse_file(path: &Path, options: &ParseOptions) -> anyhow::Result<model::Program> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    parse_with(&src, options)
        .map_err(|e| anyhow::anyhow!(e.render(&src)))
        .with_context(|| format!("Parsing {}", path.display()))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed by an embedding host.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("dvmbasic-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_config_reaches_check() {
        let input = scratch_file("goto.bas", "Function A() Uint64\n10 GOTO 99\nEnd Function");
        let config = scratch_file("goto.json", r#"{"parse": {"check_goto_targets": true}}"#);
        let input = input.to_str().unwrap();
        let config = config.to_str().unwrap();

        let test_cases = vec![
            (vec!["dvmbasic", "check", input], true),
            (vec!["dvmbasic", "check", input, "--check-goto"], false),
            (vec!["dvmbasic", "check", input, "--config", config], false),
            (vec!["dvmbasic", "generate", input, "--config", config], false),
        ];
        for (argv, ok) in test_cases {
            let cli = cli::Cli::try_parse_from(argv.clone()).unwrap();
            assert_eq!(execute(cli).is_ok(), ok, "{argv:?}");
        }
    }
}
