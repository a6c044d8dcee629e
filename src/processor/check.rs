//! Name and line checks run by `parse`. Both stop at the first violation.

use std::collections::BTreeSet;

use super::context::Context;
use super::syntax::SourceTree;
use super::walk::{ExprHandler, walk_program};
use crate::error::{Error, Result};
use crate::model::{FunctionCall, Program, StatementKind};

struct NameChecker<'a> {
    context: &'a Context,
}

impl ExprHandler for NameChecker<'_> {
    type Error = Error;

    fn on_call(&mut self, scope: &str, call: &FunctionCall) -> Result<()> {
        match self.context.resolve_call(scope, &call.name) {
            None => Err(Error::NotFound {
                what: "function",
                name: call.name.clone(),
            }),
            Some((_, info)) if !info.kind.is_callable() => Err(Error::UsedAsFunction {
                kind: info.kind,
                name: call.name.clone(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn on_name(&mut self, scope: &str, name: &str) -> Result<()> {
        match self.context.resolve(scope, name) {
            None => Err(Error::NotFound {
                what: "name",
                name: name.to_string(),
            }),
            Some((_, info)) if info.kind.is_callable() => Err(Error::UsedAsValue {
                kind: info.kind,
                name: name.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Every call must reach a function or native; every bare name must reach
/// an argument or variable visible from its function.
pub fn check_names(program: &Program, context: &Context) -> Result<()> {
    walk_program(program, &mut NameChecker { context })
}

/// No two executable statements of one function may share a line number.
/// `DIM a, b` expands to several statements on one line and counts once;
/// a change of type ends the group.
pub fn check_lines(program: &Program) -> Result<()> {
    for function in &program.functions {
        let mut previous = None;
        let lines = function
            .statements
            .iter()
            .filter(|s| s.kind.is_executable())
            .filter(|statement| {
                let dim_type = match &statement.kind {
                    StatementKind::Dim(dim) => Some(dim.ty),
                    _ => None,
                };
                let key = (statement.line, dim_type);
                let same_dim_group = dim_type.is_some() && previous == Some(key);
                previous = Some(key);
                !same_dim_group
            })
            .map(|statement| statement.line);
        report_duplicates(&function.name, lines)?;
    }
    Ok(())
}

/// Same rule over the matched source, where one line node is one statement.
/// Catches `10 DIM a AS Uint64` twice, which the model can no longer tell
/// apart from `10 DIM a, a AS Uint64`.
pub fn check_source_lines(tree: &SourceTree) -> Result<()> {
    for function in &tree.functions {
        let lines = function
            .lines
            .iter()
            .filter(|line| line.statement.is_some())
            .map(|line| line.number);
        report_duplicates(&function.name, lines)?;
    }
    Ok(())
}

fn report_duplicates(function: &str, lines: impl Iterator<Item = u64>) -> Result<()> {
    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<u64> = lines.filter(|line| !seen.insert(*line)).collect();
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(Error::DuplicateLines {
        function: function.to_string(),
        lines: duplicates.into_iter().collect(),
    })
}
