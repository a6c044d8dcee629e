//! Shorthand constructors for building a `Program` by hand.
//!
//! Operations built here carry the operation type you pass in; nothing is
//! inferred.

use super::*;

pub fn int(value: u64) -> Expression {
    Expression::Value(Literal::Uint64(value))
}

pub fn text(value: impl Into<String>) -> Expression {
    Expression::Value(Literal::String(value.into()))
}

pub fn name(n: impl Into<String>) -> Expression {
    Expression::Name(n.into())
}

pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Expression {
    Expression::Call(FunctionCall {
        name: name.into(),
        args,
    })
}

pub fn op(operator: Operator, left: Expression, right: Expression, ty: DvmType) -> Expression {
    Expression::Operation(Operation {
        operator,
        operands: vec![left, right],
        operation_type: ty,
    })
}

pub fn not(operand: Expression) -> Expression {
    Expression::Operation(Operation {
        operator: Operator::Bitwise(BitwiseOperator::Not),
        operands: vec![operand],
        operation_type: DvmType::Uint64,
    })
}

pub fn statement(line: u64, kind: StatementKind) -> Statement {
    Statement { line, kind }
}

pub fn call_statement(name: impl Into<String>, args: Vec<Expression>, line: u64) -> Statement {
    statement(line, StatementKind::Expression(call(name, args)))
}

pub fn store(key: Expression, value: Expression, line: u64) -> Statement {
    call_statement("STORE", vec![key, value], line)
}

pub fn declare(name: impl Into<String>, ty: DvmType, line: u64) -> Statement {
    statement(
        line,
        StatementKind::Dim(Dim {
            name: name.into(),
            ty,
        }),
    )
}

pub fn declare_many(names: &[&str], ty: DvmType, line: u64) -> Vec<Statement> {
    names.iter().map(|n| declare(*n, ty, line)).collect()
}

pub fn assign(name: impl Into<String>, expression: Expression, line: u64) -> Statement {
    statement(
        line,
        StatementKind::Let(Let {
            name: name.into(),
            expression,
        }),
    )
}

pub fn return_value(value: u64, line: u64) -> Statement {
    return_expression(int(value), line)
}

pub fn return_expression(expression: Expression, line: u64) -> Statement {
    statement(line, StatementKind::Return(expression))
}

pub fn if_then(condition: Expression, then: u64, line: u64) -> Statement {
    statement(
        line,
        StatementKind::Branch(Branch {
            condition,
            then,
            otherwise: None,
        }),
    )
}

pub fn if_then_else(condition: Expression, then: u64, otherwise: u64, line: u64) -> Statement {
    statement(
        line,
        StatementKind::Branch(Branch {
            condition,
            then,
            otherwise: Some(otherwise),
        }),
    )
}

pub fn goto(target: u64, line: u64) -> Statement {
    statement(line, StatementKind::Goto(target))
}

pub fn comment(text: impl Into<String>, line: u64) -> Statement {
    statement(line, StatementKind::Comment(text.into()))
}

pub fn function(
    name: impl Into<String>,
    args: Vec<Argument>,
    return_type: DvmType,
    statements: Vec<Statement>,
) -> Function {
    Function {
        name: name.into(),
        return_type,
        args,
        statements,
        comments: Vec::new(),
    }
}

pub fn arg(name: impl Into<String>, ty: DvmType) -> Argument {
    Argument {
        name: name.into(),
        ty,
    }
}
