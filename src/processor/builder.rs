//! Turns the matched `SourceTree` into the `Program` model.
//!
//! Parentheses disappear here (the tree shape already encodes grouping),
//! comments lose their delimiters, and every operation gets its type from
//! [`infer`](super::infer).

use tracing::trace;

use super::ParseOptions;
use super::infer::{infer, operand_hint};
use super::syntax::*;
use crate::model::*;

pub fn build_program(tree: SourceTree, options: &ParseOptions) -> Program {
    let functions = tree
        .functions
        .into_iter()
        .map(|f| build_function(f, options))
        .collect();
    Program {
        headers: clean_comments(tree.trailing_comments),
        functions,
    }
}

fn build_function(node: FunctionNode, options: &ParseOptions) -> Function {
    let mut statements = Vec::new();
    for line in node.lines {
        build_line(line, options, &mut statements);
    }
    trace!(function = %node.name, statements = statements.len(), "built function");

    // Comments inside the argument list follow the header ones, marked
    // with the argument they sit next to.
    let mut comments = clean_comments(node.comments);
    let mut args = Vec::with_capacity(node.args.len());
    for arg in node.args {
        comments.extend(
            clean_comments(arg.comments)
                .into_iter()
                .map(|text| format!("@arg={}:{text}", arg.name)),
        );
        args.push(Argument {
            name: arg.name,
            ty: arg.ty,
        });
    }

    Function {
        name: node.name,
        return_type: node.return_type,
        args,
        statements,
        comments,
    }
}

fn build_line(line: LineNode, options: &ParseOptions, out: &mut Vec<Statement>) {
    let number = line.number;
    let push = |out: &mut Vec<Statement>, kind| out.push(Statement { line: number, kind });

    match line.statement {
        Some(StatementNode::Dim { names, ty }) => {
            for name in names {
                push(out, StatementKind::Dim(Dim { name, ty }));
            }
        }
        Some(StatementNode::Let { name, value }) => push(
            out,
            StatementKind::Let(Let {
                name,
                expression: build_expression(value),
            }),
        ),
        Some(StatementNode::Goto(target)) => push(out, StatementKind::Goto(target)),
        Some(StatementNode::Branch {
            condition,
            then,
            otherwise,
        }) => push(
            out,
            StatementKind::Branch(Branch {
                condition: build_expression(condition),
                then,
                otherwise,
            }),
        ),
        Some(StatementNode::Return(e)) => push(out, StatementKind::Return(build_expression(e))),
        Some(StatementNode::Expression(e)) => {
            push(out, StatementKind::Expression(build_expression(e)))
        }
        None => {
            if options.keep_empty_lines && line.comments.is_empty() {
                push(out, StatementKind::NoOp);
            }
        }
    }

    for text in clean_comments(line.comments) {
        push(out, StatementKind::Comment(text));
    }
}

pub fn build_expression(node: ExprNode) -> Expression {
    match node {
        ExprNode::Number(n) => Expression::Value(Literal::Uint64(n)),
        ExprNode::Str(s) => Expression::Value(Literal::String(s)),
        ExprNode::Name(n) => Expression::Name(n),
        ExprNode::Call { name, args } => Expression::Call(FunctionCall {
            name,
            args: args.into_iter().map(build_expression).collect(),
        }),
        ExprNode::Paren(inner) => build_expression(*inner),
        ExprNode::Not(inner) => {
            let operand = build_expression(*inner);
            let operator = Operator::Bitwise(BitwiseOperator::Not);
            Expression::Operation(Operation {
                operator,
                operation_type: infer(operator, None, operand_hint(&operand)),
                operands: vec![operand],
            })
        }
        ExprNode::Binary { operator, lhs, rhs } => {
            let left = build_expression(*lhs);
            let right = build_expression(*rhs);
            Expression::Operation(Operation {
                operator,
                operation_type: infer(operator, operand_hint(&left), operand_hint(&right)),
                operands: vec![left, right],
            })
        }
    }
}

/// Strips `//` or `/* */` and surrounding whitespace; empty comments vanish.
pub fn clean_comment(raw: &str) -> String {
    let body = if let Some(rest) = raw.strip_prefix("//") {
        rest
    } else if let Some(rest) = raw.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        raw
    };
    body.trim().to_string()
}

fn clean_comments(comments: Vec<CommentNode>) -> Vec<String> {
    comments
        .iter()
        .map(|c| clean_comment(&c.raw))
        .filter(|c| !c.is_empty())
        .collect()
}
