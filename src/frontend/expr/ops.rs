//! 运算符
//!
//! 每个运算符都立即构造树节点；当所有操作数都可求值时同时折叠出字面量。

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use super::{BinaryOp, Expr, ExprError, ExprTree, UnaryOp, Value};

fn mismatch(
    op: BinaryOp,
    lval: &Value,
    rval: &Value,
) -> ExprError {
    ExprError::TypeMismatch {
        op: op.symbol(),
        lhs: lval.type_name(),
        rhs: rval.type_name(),
    }
}

fn ints<'a>(
    op: BinaryOp,
    lval: &'a Value,
    rval: &'a Value,
) -> Result<(&'a BigInt, &'a BigInt), ExprError> {
    match (lval, rval) {
        (Value::Int(l), Value::Int(r)) => Ok((l, r)),
        _ => Err(mismatch(op, lval, rval)),
    }
}

fn shift_amount(
    op: BinaryOp,
    amount: &BigInt,
) -> Result<usize, ExprError> {
    amount.to_usize().ok_or_else(|| ExprError::InvalidShift {
        op: op.symbol(),
        amount: amount.to_string(),
    })
}

fn equals(
    lval: &Value,
    rval: &Value,
) -> Result<bool, ExprError> {
    match (lval, rval) {
        (Value::Int(l), Value::Int(r)) => Ok(l == r),
        (Value::Bool(l), r) => Ok(*l == r.truthy()),
        (Value::Str(l), Value::Str(r)) => Ok(l == r),
        (Value::Char(l), Value::Char(r)) => Ok(l == r),
        (Value::Null, Value::Null) => Ok(true),
        _ => Err(mismatch(BinaryOp::Eq, lval, rval)),
    }
}

/// Fold a binary operator over two literals.
pub fn fold_binary(
    op: BinaryOp,
    lval: &Value,
    rval: &Value,
) -> Result<Value, ExprError> {
    let ret = match op {
        BinaryOp::LogicalAnd => Value::Bool(lval.truthy() && rval.truthy()),
        BinaryOp::LogicalOr => Value::Bool(lval.truthy() || rval.truthy()),
        BinaryOp::Eq => Value::Bool(equals(lval, rval)?),
        BinaryOp::Ne => Value::Bool(!equals(lval, rval)?),
        _ => {
            let (l, r) = ints(op, lval, rval)?;
            match op {
                BinaryOp::Add => Value::Int(l + r),
                BinaryOp::Sub => Value::Int(l - r),
                BinaryOp::Mul => Value::Int(l * r),
                BinaryOp::Div | BinaryOp::Rem if r.is_zero() => {
                    return Err(ExprError::DivisionByZero { op: op.symbol() });
                }
                BinaryOp::Div => Value::Int(l / r),
                BinaryOp::Rem => Value::Int(l % r),
                BinaryOp::And => Value::Int(l & r),
                BinaryOp::Or => Value::Int(l | r),
                BinaryOp::Xor => Value::Int(l ^ r),
                BinaryOp::Lsh => Value::Int(l << shift_amount(op, r)?),
                BinaryOp::Rsh => Value::Int(l >> shift_amount(op, r)?),
                BinaryOp::Lt => Value::Bool(l < r),
                BinaryOp::Le => Value::Bool(l <= r),
                BinaryOp::Gt => Value::Bool(l > r),
                BinaryOp::Ge => Value::Bool(l >= r),
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::Eq | BinaryOp::Ne => {
                    unreachable!("handled above")
                }
            }
        }
    };
    Ok(ret)
}

/// Fold a unary operator over a literal.
pub fn fold_unary(
    op: UnaryOp,
    val: &Value,
) -> Result<Value, ExprError> {
    let int = |v: &Value| match v {
        Value::Int(i) => Ok(i.clone()),
        other => Err(ExprError::TypeMismatch {
            op: op.symbol(),
            lhs: other.type_name(),
            rhs: "none",
        }),
    };
    Ok(match op {
        UnaryOp::Positive => Value::Int(int(val)?),
        UnaryOp::Negative => Value::Int(-int(val)?),
        UnaryOp::Neg => Value::Int(!int(val)?),
        UnaryOp::Not => Value::Bool(!val.truthy()),
        UnaryOp::Ptr => val.clone(),
    })
}

impl Expr {
    fn build(
        tree: ExprTree,
        operands: &[&Expr],
        fold: impl FnOnce() -> Result<Value, ExprError>,
    ) -> Result<Expr, ExprError> {
        let tree = Some(Arc::new(tree));
        if !super::can_eval(operands) {
            return Ok(Expr {
                value: Value::Null,
                req_param: true,
                tree,
            });
        }
        Ok(Expr {
            value: fold()?,
            req_param: false,
            tree,
        })
    }

    /// Apply a binary operator
    pub fn binary(
        &self,
        op: BinaryOp,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        Self::build(
            ExprTree::Binary(op, self.node(), rval.node()),
            &[self, rval],
            || fold_binary(op, &self.value, &rval.value),
        )
    }

    /// Apply a unary operator
    pub fn unary(
        &self,
        op: UnaryOp,
    ) -> Result<Expr, ExprError> {
        Self::build(ExprTree::Unary(op, self.node()), &[self], || {
            fold_unary(op, &self.value)
        })
    }

    /// `self ? lval : rval`
    pub fn ternary(
        &self,
        lval: &Expr,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        Self::build(
            ExprTree::Ternary(self.node(), lval.node(), rval.node()),
            &[self, lval, rval],
            || {
                Ok(if self.as_bool() {
                    lval.value.clone()
                } else {
                    rval.value.clone()
                })
            },
        )
    }

    pub fn add(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Add, rval)
    }

    pub fn sub(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Sub, rval)
    }

    pub fn mul(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Mul, rval)
    }

    /// Truncating division; a zero divisor is an error.
    pub fn div(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Div, rval)
    }

    /// C-like remainder; a zero divisor is an error.
    pub fn rem(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Rem, rval)
    }

    pub fn and(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::And, rval)
    }

    pub fn or(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Or, rval)
    }

    pub fn xor(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Xor, rval)
    }

    /// `rval` must be a non-negative machine-sized integer.
    pub fn lsh(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Lsh, rval)
    }

    /// `rval` must be a non-negative machine-sized integer.
    pub fn rsh(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Rsh, rval)
    }

    /// Same-kind equality; two null values are equal.
    pub fn eq(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Eq, rval)
    }

    pub fn ne(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Ne, rval)
    }

    pub fn lt(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Lt, rval)
    }

    pub fn le(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Le, rval)
    }

    pub fn gt(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Gt, rval)
    }

    pub fn ge(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::Ge, rval)
    }

    pub fn logical_and(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::LogicalAnd, rval)
    }

    pub fn logical_or(
        &self,
        rval: &Expr,
    ) -> Result<Expr, ExprError> {
        self.binary(BinaryOp::LogicalOr, rval)
    }

    pub fn positive(&self) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Positive)
    }

    pub fn negative(&self) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Negative)
    }

    /// Bitwise complement
    pub fn neg(&self) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Neg)
    }

    /// Boolean negation
    pub fn not(&self) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Not)
    }

    /// Dereference marker; evaluates to its operand.
    pub fn ptr(&self) -> Result<Expr, ExprError> {
        self.unary(UnaryOp::Ptr)
    }
}
