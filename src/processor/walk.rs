//! One recursive traversal over every expression in a program.
//!
//! Passes plug in per-variant callbacks through [`ExprHandler`] (read-only)
//! or [`ExprHandlerMut`] (rewriting). Operands and call arguments are
//! visited before the node that holds them. Each callback receives the name
//! of the function the expression lives in.

use crate::model::*;

pub trait ExprHandler {
    type Error;

    fn on_value(&mut self, _scope: &str, _value: &Literal) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_name(&mut self, _scope: &str, _name: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_call(&mut self, _scope: &str, _call: &FunctionCall) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_operation(&mut self, _scope: &str, _operation: &Operation) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn walk_program<H: ExprHandler>(program: &Program, handler: &mut H) -> Result<(), H::Error> {
    for function in &program.functions {
        for statement in &function.statements {
            if let Some(expression) = statement_expression(&statement.kind) {
                walk_expression(&function.name, expression, handler)?;
            }
        }
    }
    Ok(())
}

pub fn walk_expression<H: ExprHandler>(
    scope: &str,
    expression: &Expression,
    handler: &mut H,
) -> Result<(), H::Error> {
    match expression {
        Expression::Value(value) => handler.on_value(scope, value),
        Expression::Name(name) => handler.on_name(scope, name),
        Expression::Call(call) => {
            for arg in &call.args {
                walk_expression(scope, arg, handler)?;
            }
            handler.on_call(scope, call)
        }
        Expression::Operation(operation) => {
            for operand in &operation.operands {
                walk_expression(scope, operand, handler)?;
            }
            handler.on_operation(scope, operation)
        }
    }
}

/// The expression a statement carries, if any.
pub fn statement_expression(kind: &StatementKind) -> Option<&Expression> {
    match kind {
        StatementKind::Return(e) | StatementKind::Expression(e) => Some(e),
        StatementKind::Branch(branch) => Some(&branch.condition),
        StatementKind::Let(assignment) => Some(&assignment.expression),
        StatementKind::NoOp
        | StatementKind::Comment(_)
        | StatementKind::Dim(_)
        | StatementKind::Goto(_) => None,
    }
}

/// Rewriting counterpart of [`ExprHandler`]. Infallible.
pub trait ExprHandlerMut {
    fn on_name(&mut self, _scope: &str, _name: &mut String) {}

    fn on_call(&mut self, _scope: &str, _call: &mut FunctionCall) {}
}

pub fn walk_program_mut<H: ExprHandlerMut>(program: &mut Program, handler: &mut H) {
    for function in &mut program.functions {
        let scope = function.name.clone();
        for statement in &mut function.statements {
            if let Some(expression) = statement_expression_mut(&mut statement.kind) {
                walk_expression_mut(&scope, expression, handler);
            }
        }
    }
}

pub fn walk_expression_mut<H: ExprHandlerMut>(
    scope: &str,
    expression: &mut Expression,
    handler: &mut H,
) {
    match expression {
        Expression::Value(_) => {}
        Expression::Name(name) => handler.on_name(scope, name),
        Expression::Call(call) => {
            for arg in &mut call.args {
                walk_expression_mut(scope, arg, handler);
            }
            handler.on_call(scope, call);
        }
        Expression::Operation(operation) => {
            for operand in &mut operation.operands {
                walk_expression_mut(scope, operand, handler);
            }
        }
    }
}

fn statement_expression_mut(kind: &mut StatementKind) -> Option<&mut Expression> {
    match kind {
        StatementKind::Return(e) | StatementKind::Expression(e) => Some(e),
        StatementKind::Branch(branch) => Some(&mut branch.condition),
        StatementKind::Let(assignment) => Some(&mut assignment.expression),
        _ => None,
    }
}
