//! Front end: source text in, checked `Program` out.
//!
//! `parse` runs grammar → source line check → builder → context → line
//! check → name check and stops at the first failure. Nothing partial is ever returned.
pub mod builder;
pub mod check;
pub mod context;
pub mod flow;
pub mod infer;
pub mod lexer;
pub mod script_parser;
pub mod syntax;
pub mod walk;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::Program;
use context::Context;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep statement-less, comment-less lines as `NoOp` statements.
    pub keep_empty_lines: bool,
    /// Also reject GOTO targets that name no line of their function.
    pub check_goto_targets: bool,
}

/// Grammar and builder only. The result is not name- or line-checked.
pub fn evaluate(src: &str, options: &ParseOptions) -> Result<Program> {
    let tree = script_parser::parse_source(src)?;
    debug!(functions = tree.functions.len(), "source matched grammar");
    Ok(builder::build_program(tree, options))
}

/// Parses and checks `src` with default options.
pub fn parse(src: &str) -> Result<Program> {
    parse_with(src, &ParseOptions::default())
}

pub fn parse_with(src: &str, options: &ParseOptions) -> Result<Program> {
    let tree = script_parser::parse_source(src)?;
    debug!(functions = tree.functions.len(), "source matched grammar");
    check::check_source_lines(&tree)?;
    let program = builder::build_program(tree, options);
    let context = Context::from_program(&program);

    check::check_lines(&program)?;
    check::check_names(&program, &context)?;
    if options.check_goto_targets {
        flow::check_goto_targets(&program)?;
    }
    debug!(functions = program.functions.len(), "program checked");
    Ok(program)
}
