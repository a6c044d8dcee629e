//! The program model every pass reads or rewrites.
//!
//! A `Program` is produced once by the builder, validated in place by the
//! checkers, optionally renamed by the minifier, and finally rendered back
//! to source text by the writer.

pub mod build;
pub mod builtins;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value domains of the language. `Unknown` is only ever an inferred
/// operation type, never a declared one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DvmType {
    Uint64,
    String,
    Unknown,
}

impl DvmType {
    /// Type keyword as written in source.
    pub fn keyword(self) -> &'static str {
        match self {
            DvmType::Uint64 => "Uint64",
            DvmType::String => "String",
            DvmType::Unknown => "Unknown",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "Uint64" => Some(DvmType::Uint64),
            "String" => Some(DvmType::String),
            _ => None,
        }
    }
}

impl fmt::Display for DvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Entire program as it comes out of the builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Free-standing comments that do not precede any function.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(rename = "return")]
    pub return_type: DvmType,
    pub args: Vec<Argument>,
    pub statements: Vec<Statement>,
    /// Comments written before `Function` or inside the header.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: DvmType,
}

/// One statement record, tagged with the source line it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub line: u64,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementKind {
    /// A numbered line without statement or comment.
    NoOp,
    Comment(String),
    Return(Expression),
    Expression(Expression),
    Branch(Branch),
    Dim(Dim),
    Let(Let),
    Goto(u64),
}

impl StatementKind {
    /// Comments and no-ops do not occupy their line number.
    pub fn is_executable(&self) -> bool {
        !matches!(self, StatementKind::NoOp | StatementKind::Comment(_))
    }
}

/// `IF cond THEN GOTO then [ELSE GOTO otherwise]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: Expression,
    pub then: u64,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<u64>,
}

/// One declared name; `DIM a, b AS T` yields two of these on the same line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dim {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: DvmType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Let {
    pub name: String,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Literal {
    Uint64(u64),
    String(String),
}

impl Literal {
    pub fn dvm_type(&self) -> DvmType {
        match self {
            Literal::Uint64(_) => DvmType::Uint64,
            Literal::String(_) => DvmType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expression {
    Value(Literal),
    Name(String),
    Call(FunctionCall),
    Operation(Operation),
}

/// Operator application with one (`!`) or two operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operator: Operator,
    pub operands: Vec<Expression>,
    pub operation_type: DvmType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalcOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitwiseOperator {
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Logical(LogicalOperator),
    Calc(CalcOperator),
    Bitwise(BitwiseOperator),
}

impl Operator {
    /// Every operator with its canonical spelling. `&&` and `||` are read
    /// as aliases of `&` and `|` but never written.
    pub const SYMBOLS: &'static [(&'static str, Operator)] = &[
        ("==", Operator::Logical(LogicalOperator::Eq)),
        ("!=", Operator::Logical(LogicalOperator::Ne)),
        ("<", Operator::Logical(LogicalOperator::Lt)),
        (">", Operator::Logical(LogicalOperator::Gt)),
        ("<=", Operator::Logical(LogicalOperator::Le)),
        (">=", Operator::Logical(LogicalOperator::Ge)),
        ("+", Operator::Calc(CalcOperator::Add)),
        ("-", Operator::Calc(CalcOperator::Sub)),
        ("*", Operator::Calc(CalcOperator::Mul)),
        ("/", Operator::Calc(CalcOperator::Div)),
        ("%", Operator::Calc(CalcOperator::Mod)),
        ("&", Operator::Bitwise(BitwiseOperator::And)),
        ("|", Operator::Bitwise(BitwiseOperator::Or)),
        ("^", Operator::Bitwise(BitwiseOperator::Xor)),
        ("<<", Operator::Bitwise(BitwiseOperator::Shl)),
        (">>", Operator::Bitwise(BitwiseOperator::Shr)),
        ("!", Operator::Bitwise(BitwiseOperator::Not)),
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    pub fn symbol(self) -> &'static str {
        Self::SYMBOLS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(s, _)| *s)
            .unwrap_or("?")
    }

    pub fn is_unary(self) -> bool {
        self == Operator::Bitwise(BitwiseOperator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
