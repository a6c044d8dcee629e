//! Symbol context: every name a program can refer to.
//!
//! Built-ins and functions are global. Arguments and `DIM` variables are
//! keyed by their owning function, so two functions may both declare `x`
//! without clashing. Lookups from inside a function try its locals first.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::builtins::BUILTINS;
use crate::model::{DvmType, Program, StatementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameKind {
    Variable,
    Argument,
    Function,
    BuiltinFunction,
}

impl NameKind {
    pub fn is_callable(self) -> bool {
        matches!(self, NameKind::Function | NameKind::BuiltinFunction)
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Variable => "variable",
            NameKind::Argument => "argument",
            NameKind::Function => "function",
            NameKind::BuiltinFunction => "builtin-function",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    pub kind: NameKind,
    pub declared_type: DvmType,
    /// Owning function for arguments and variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Identity of a declaration, as opposed to its spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Global(String),
    Local { function: String, name: String },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Global(name) | Symbol::Local { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    globals: IndexMap<String, NameInfo>,
    locals: IndexMap<String, IndexMap<String, NameInfo>>,
}

impl Context {
    /// Context holding only the native catalog.
    pub fn with_builtins() -> Self {
        let mut context = Context::default();
        for builtin in BUILTINS {
            context.globals.insert(
                builtin.name.to_string(),
                NameInfo {
                    kind: NameKind::BuiltinFunction,
                    declared_type: builtin.returns.unwrap_or(DvmType::Unknown),
                    owner: None,
                },
            );
        }
        context
    }

    /// Catalog, then every function, then each function's arguments and
    /// `DIM`s. A later entry replaces an earlier one in the same scope.
    pub fn from_program(program: &Program) -> Self {
        let mut context = Context::with_builtins();
        for function in &program.functions {
            context.declare_global(&function.name, NameKind::Function, function.return_type);
        }
        for function in &program.functions {
            for arg in &function.args {
                context.declare_local(&function.name, &arg.name, NameKind::Argument, arg.ty);
            }
            for statement in &function.statements {
                if let StatementKind::Dim(dim) = &statement.kind {
                    context.declare_local(&function.name, &dim.name, NameKind::Variable, dim.ty);
                }
            }
        }
        context
    }

    pub fn declare_global(&mut self, name: &str, kind: NameKind, declared_type: DvmType) {
        self.globals.insert(
            name.to_string(),
            NameInfo {
                kind,
                declared_type,
                owner: None,
            },
        );
    }

    pub fn declare_local(&mut self, function: &str, name: &str, kind: NameKind, declared_type: DvmType) {
        self.locals.entry(function.to_string()).or_default().insert(
            name.to_string(),
            NameInfo {
                kind,
                declared_type,
                owner: Some(function.to_string()),
            },
        );
    }

    /// What `name` means inside `function`.
    pub fn resolve(&self, function: &str, name: &str) -> Option<(Symbol, &NameInfo)> {
        if let Some(info) = self.locals.get(function).and_then(|scope| scope.get(name)) {
            let symbol = Symbol::Local {
                function: function.to_string(),
                name: name.to_string(),
            };
            return Some((symbol, info));
        }
        self.globals
            .get(name)
            .map(|info| (Symbol::Global(name.to_string()), info))
    }

    /// Like [`resolve`](Self::resolve), retrying with the uppercased name so
    /// natives can be called in any case.
    pub fn resolve_call(&self, function: &str, name: &str) -> Option<(Symbol, &NameInfo)> {
        self.resolve(function, name).or_else(|| {
            let upper = name.to_uppercase();
            if upper == name {
                None
            } else {
                self.resolve(function, &upper)
            }
        })
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&NameInfo> {
        match symbol {
            Symbol::Global(name) => self.globals.get(name),
            Symbol::Local { function, name } => self.locals.get(function)?.get(name),
        }
    }

    /// Every declaration: globals first, then each function's locals, in
    /// declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = (Symbol, &NameInfo)> + '_ {
        let globals = self
            .globals
            .iter()
            .map(|(name, info)| (Symbol::Global(name.clone()), info));
        let locals = self.locals.iter().flat_map(|(function, scope)| {
            scope.iter().map(move |(name, info)| {
                let symbol = Symbol::Local {
                    function: function.clone(),
                    name: name.clone(),
                };
                (symbol, info)
            })
        });
        globals.chain(locals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build::*;

    fn sample() -> Program {
        Program {
            headers: vec![],
            functions: vec![
                function(
                    "Initialize",
                    vec![arg("x", DvmType::String)],
                    DvmType::Uint64,
                    vec![declare("x", DvmType::Uint64, 10), return_value(0, 20)],
                ),
                function(
                    "STRLEN",
                    vec![],
                    DvmType::String,
                    vec![return_expression(text("s"), 10)],
                ),
                function("other", vec![arg("y", DvmType::Uint64)], DvmType::Uint64, vec![]),
            ],
        }
    }

    #[test]
    fn test_builtins_seeded() {
        let context = Context::with_builtins();
        let (_, info) = context.resolve("any", "PANIC").unwrap();
        assert_eq!(info.kind, NameKind::BuiltinFunction);
        assert_eq!(info.declared_type, DvmType::Unknown);
        let (_, info) = context.resolve("any", "STRLEN").unwrap();
        assert_eq!(info.declared_type, DvmType::Uint64);
    }

    #[test]
    fn test_resolution_and_shadowing() {
        let context = Context::from_program(&sample());
        let test_cases = vec![
            ("Initialize", "x", Some((NameKind::Variable, DvmType::Uint64))),
            ("other", "x", None),
            ("other", "y", Some((NameKind::Argument, DvmType::Uint64))),
            ("other", "STRLEN", Some((NameKind::Function, DvmType::String))),
            ("other", "Initialize", Some((NameKind::Function, DvmType::Uint64))),
            ("other", "strlen", None),
        ];
        for (function, name, expected) in test_cases {
            let got = context
                .resolve(function, name)
                .map(|(_, info)| (info.kind, info.declared_type));
            assert_eq!(got, expected, "{function}/{name}");
        }
    }

    #[test]
    fn test_resolve_call_uppercase_fallback() {
        let context = Context::from_program(&sample());
        let (symbol, _) = context.resolve_call("other", "address_raw").unwrap();
        assert_eq!(symbol, Symbol::Global("ADDRESS_RAW".into()));
        assert!(context.resolve_call("other", "nothing").is_none());
    }

    #[test]
    fn test_symbols_order() {
        let context = Context::from_program(&sample());
        let locals: Vec<_> = context
            .symbols()
            .filter(|(s, _)| matches!(s, Symbol::Local { .. }))
            .map(|(s, i)| (s.name().to_string(), i.owner.clone().unwrap()))
            .collect();
        assert_eq!(
            locals,
            vec![
                ("x".to_string(), "Initialize".to_string()),
                ("y".to_string(), "other".to_string())
            ]
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NameKind::BuiltinFunction.to_string(), "builtin-function");
        assert_eq!(NameKind::Argument.to_string(), "argument");
    }
}
