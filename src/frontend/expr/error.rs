//! 表达式求值错误

use crate::frontend::types::Kind;

/// Expression evaluation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    /// 标识符无法解析
    #[error("unresolved identifier '{0}'")]
    Unresolved(String),
    /// 需要查找能力但未提供
    #[error("identifier '{0}' cannot be evaluated without a store")]
    NoStore(String),
    /// 除零
    #[error("{op}: division by zero")]
    DivisionByZero { op: &'static str },
    /// 操作数类型不符合运算符要求
    #[error("{op}: operand type mismatch ({lhs} and {rhs})")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    /// 移位量不是合法的无符号整数
    #[error("{op}: invalid shift amount {amount}")]
    InvalidShift { op: &'static str, amount: String },
    /// 运算符没有可用的逆运算
    #[error("cannot invert expression '{0}'")]
    NotInvertible(String),
    /// 需要字面量的地方出现了不可求值的表达式
    #[error("expression '{0}' cannot be evaluated")]
    NotEvaluable(String),
}

/// Coercion error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoerceError {
    #[error("cannot evaluate a value")]
    NotEvaluable,
    #[error("{bits}-bit integer overflow: {value}")]
    Overflow { bits: u64, value: String },
    #[error("cannot coerce the expression to the {0} type")]
    Mismatch(Kind),
    #[error("unsupported type {0}")]
    Unsupported(Kind),
}
