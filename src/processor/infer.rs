//! Shallow operation-type inference.
//!
//! Each operation is typed once, when it is built, from its operator and
//! what its immediate operands reveal. Names and calls reveal nothing.

use crate::model::{CalcOperator, DvmType, Expression, LogicalOperator, Operator};

/// What an operand says about the type of the operation it feeds.
pub fn operand_hint(operand: &Expression) -> Option<DvmType> {
    match operand {
        Expression::Value(literal) => Some(literal.dvm_type()),
        Expression::Operation(op) if op.operation_type != DvmType::Unknown => match op.operator {
            Operator::Logical(_) => Some(DvmType::Uint64),
            _ => Some(op.operation_type),
        },
        _ => None,
    }
}

/// Result type of `left <operator> right`. For the unary `!` pass the
/// operand as `right` and `None` as `left`.
pub fn infer(operator: Operator, left: Option<DvmType>, right: Option<DvmType>) -> DvmType {
    match operator {
        Operator::Bitwise(_) => DvmType::Uint64,
        Operator::Logical(LogicalOperator::Eq | LogicalOperator::Ne) => guess(left, right),
        Operator::Logical(_) => DvmType::Uint64,
        Operator::Calc(CalcOperator::Add) => guess(left, right),
        Operator::Calc(_) => DvmType::Uint64,
    }
}

/// Right operand wins when both decide.
fn guess(left: Option<DvmType>, right: Option<DvmType>) -> DvmType {
    right.or(left).unwrap_or(DvmType::Unknown)
}

/// Convenience over [`infer`] for two already built operands.
pub fn infer_binary(operator: Operator, left: &Expression, right: &Expression) -> DvmType {
    infer(operator, operand_hint(left), operand_hint(right))
}
