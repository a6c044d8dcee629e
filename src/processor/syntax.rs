//! Concrete parse tree produced by the grammar matcher.
//!
//! It mirrors the source closely: parentheses are kept, comments are kept
//! raw (delimiters included) together with the structural position they
//! were found at, and `&&`/`||` are already folded into `&`/`|`. The builder turns
//! this into the `model::Program`.

use crate::model::{DvmType, Operator};

#[derive(Debug, Clone, PartialEq)]
pub struct SourceTree {
    pub functions: Vec<FunctionNode>,
    /// Comments after the last function.
    pub trailing_comments: Vec<CommentNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub raw: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub offset: usize,
    pub args: Vec<ArgNode>,
    pub return_type: DvmType,
    /// Comments before `Function` and inside the header outside the
    /// argument list, in source order.
    pub comments: Vec<CommentNode>,
    pub lines: Vec<LineNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgNode {
    pub name: String,
    pub ty: DvmType,
    /// Comments between the previous separator and the next one.
    pub comments: Vec<CommentNode>,
}

/// `<number> [statement] [comments]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    pub number: u64,
    pub offset: usize,
    pub statement: Option<StatementNode>,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementNode {
    Dim { names: Vec<String>, ty: DvmType },
    Let { name: String, value: ExprNode },
    Goto(u64),
    Branch {
        condition: ExprNode,
        then: u64,
        otherwise: Option<u64>,
    },
    Return(ExprNode),
    Expression(ExprNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Number(u64),
    Str(String),
    Name(String),
    Call { name: String, args: Vec<ExprNode> },
    Paren(Box<ExprNode>),
    /// `! primary`
    Not(Box<ExprNode>),
    Binary {
        operator: Operator,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
}
