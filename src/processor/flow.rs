//! Optional GOTO target verification. Off unless
//! `ParseOptions::check_goto_targets` is set.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{Program, StatementKind};

/// Every `GOTO n`, `THEN GOTO n` and `ELSE GOTO n` must name an executable
/// line of the same function.
pub fn check_goto_targets(program: &Program) -> Result<()> {
    for function in &program.functions {
        let lines: HashSet<u64> = function
            .statements
            .iter()
            .filter(|s| s.kind.is_executable())
            .map(|s| s.line)
            .collect();

        for statement in &function.statements {
            let targets = match &statement.kind {
                StatementKind::Goto(target) => vec![*target],
                StatementKind::Branch(branch) => {
                    std::iter::once(branch.then).chain(branch.otherwise).collect()
                }
                _ => continue,
            };
            if let Some(target) = targets.into_iter().find(|t| !lines.contains(t)) {
                return Err(Error::UnknownGotoTarget {
                    function: function.name.clone(),
                    line: statement.line,
                    target,
                });
            }
        }
    }
    Ok(())
}
