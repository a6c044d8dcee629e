//! Renames private identifiers to short synthetic names.
//!
//! Natives and functions starting with an uppercase letter are the
//! contract's public surface and keep their names. Everything else gets a
//! fresh name per declaration: `f…` for functions, `a…` for arguments,
//! `v…` for variables. Each occurrence is renamed after the declaration it
//! resolves to from its own function, so locals with the same spelling in
//! different functions stay distinct.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FunctionCall, Program, StatementKind};
use crate::processor::context::{Context, NameKind, Symbol};
use crate::processor::walk::{ExprHandlerMut, walk_program_mut};

/// Words the parser reads as keywords in statement position.
const RESERVED: &[&str] = &[
    "as", "dim", "else", "end", "function", "goto", "if", "let", "return", "string", "then",
    "uint64",
];

/// New name → what it used to be.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub names: IndexMap<String, MappedName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedName {
    pub name: String,
    pub kind: NameKind,
    /// Original name of the owning function, for arguments and variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Mapping {
    /// Original spelling of a synthetic name.
    pub fn original(&self, new_name: &str) -> Option<&str> {
        self.names.get(new_name).map(|m| m.name.as_str())
    }
}

pub fn is_preserved(name: &str, kind: NameKind) -> bool {
    match kind {
        NameKind::BuiltinFunction => true,
        NameKind::Function => name.starts_with(|c: char| c.is_ascii_uppercase()),
        NameKind::Variable | NameKind::Argument => false,
    }
}

/// Base-36 suffix: 0-9, then a-z, then 10, 11, ...
fn suffix(mut n: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[n % 36]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

struct NameGenerator {
    counters: HashMap<char, usize>,
    /// Lowercased names that must never be produced.
    taken: HashSet<String>,
}

impl NameGenerator {
    fn next(&mut self, kind: NameKind) -> String {
        let prefix = match kind {
            NameKind::Function | NameKind::BuiltinFunction => 'f',
            NameKind::Argument => 'a',
            NameKind::Variable => 'v',
        };
        let counter = self.counters.entry(prefix).or_default();
        loop {
            let candidate = format!("{prefix}{}", suffix(*counter));
            *counter += 1;
            let lower = candidate.to_ascii_lowercase();
            if !self.taken.contains(&lower) && !RESERVED.contains(&lower.as_str()) {
                self.taken.insert(lower);
                return candidate;
            }
        }
    }
}

/// Rewrites `program` in place and returns the applied mapping.
pub fn minify(context: &Context, program: &mut Program) -> Mapping {
    let mut generator = NameGenerator {
        counters: HashMap::new(),
        taken: context
            .symbols()
            .filter(|(symbol, info)| is_preserved(symbol.name(), info.kind))
            .map(|(symbol, _)| symbol.name().to_ascii_lowercase())
            .collect(),
    };

    let mut renames: HashMap<Symbol, String> = HashMap::new();
    let mut mapping = Mapping::default();
    for (symbol, info) in context.symbols() {
        if is_preserved(symbol.name(), info.kind) {
            continue;
        }
        let new_name = generator.next(info.kind);
        mapping.names.insert(
            new_name.clone(),
            MappedName {
                name: symbol.name().to_string(),
                kind: info.kind,
                owner: info.owner.clone(),
            },
        );
        renames.insert(symbol, new_name);
    }
    debug!(renamed = renames.len(), "minification mapping built");

    let renamer = Renamer { context, renames: &renames };
    walk_program_mut(program, &mut RenameExpressions(&renamer));
    for function in &mut program.functions {
        let scope = function.name.clone();
        for arg in &mut function.args {
            renamer.value(&scope, &mut arg.name);
        }
        for statement in &mut function.statements {
            match &mut statement.kind {
                StatementKind::Dim(dim) => renamer.value(&scope, &mut dim.name),
                StatementKind::Let(assignment) => renamer.value(&scope, &mut assignment.name),
                _ => {}
            }
        }
        if let Some(new_name) = renames.get(&Symbol::Global(scope)) {
            function.name = new_name.clone();
        }
    }

    mapping
}

struct Renamer<'a> {
    context: &'a Context,
    renames: &'a HashMap<Symbol, String>,
}

impl Renamer<'_> {
    fn value(&self, scope: &str, name: &mut String) {
        if let Some((symbol, _)) = self.context.resolve(scope, name) {
            self.apply(&symbol, name);
        }
    }

    fn call(&self, scope: &str, name: &mut String) {
        if let Some((symbol, _)) = self.context.resolve_call(scope, name) {
            self.apply(&symbol, name);
        }
    }

    fn apply(&self, symbol: &Symbol, name: &mut String) {
        if let Some(new_name) = self.renames.get(symbol) {
            *name = new_name.clone();
        }
    }
}

struct RenameExpressions<'a, 'b>(&'a Renamer<'b>);

impl ExprHandlerMut for RenameExpressions<'_, '_> {
    fn on_name(&mut self, scope: &str, name: &mut String) {
        self.0.value(scope, name);
    }

    fn on_call(&mut self, scope: &str, call: &mut FunctionCall) {
        self.0.call(scope, &mut call.name);
    }
}
