//! 代数求逆
//!
//! 给定只含一个标识符的表达式 `e(x)` 和目标表达式 `y`，求出 `x` 关于
//! `y` 的表达式。只支持 `+ - * /` 以及一元正负号。

use std::sync::Arc;

use super::{BinaryOp, Expr, ExprError, ExprTree, UnaryOp};

/// An isolated identifier and the expression that computes it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub ident: String,
    pub expr: Expr,
}

fn invert(
    node: &Arc<ExprTree>,
    target: Expr,
) -> Result<Resolved, ExprError> {
    match node.as_ref() {
        ExprTree::Ident(name) => Ok(Resolved {
            ident: name.clone(),
            expr: target,
        }),
        ExprTree::Unary(UnaryOp::Positive, val) => invert(val, target),
        ExprTree::Unary(UnaryOp::Negative, val) => invert(val, target.negative()?),
        ExprTree::Binary(op, lval, rval) if op.inverse().is_some() => {
            if lval.has_ident() {
                // lval op rval = t  =>  lval = t inv rval
                let rval = Expr::from_tree(Arc::clone(rval));
                let inverse = op.inverse().unwrap_or(*op);
                return invert(lval, target.binary(inverse, &rval)?);
            }
            let lval = Expr::from_tree(Arc::clone(lval));
            let next = match op {
                BinaryOp::Add => target.sub(&lval)?,
                BinaryOp::Mul => target.div(&lval)?,
                // lval - rval = t  =>  rval = lval - t
                BinaryOp::Sub => lval.sub(&target)?,
                // lval / rval = t  =>  rval = lval / t
                _ => lval.div(&target)?,
            };
            invert(rval, next)
        }
        _ => Err(ExprError::NotInvertible(node.to_string())),
    }
}

impl Expr {
    /// Solve `self == target` for the single identifier in `self`.
    ///
    /// For `x + 2` and target `y` this yields `x` and `(y - 2)`.
    pub fn resolve(
        &self,
        target: &Expr,
    ) -> Result<Resolved, ExprError> {
        let Some(tree) = &self.tree else {
            return Err(ExprError::NotInvertible(String::new()));
        };
        if !tree.has_ident() {
            return Err(ExprError::NotInvertible(tree.to_string()));
        }
        let ret = invert(tree, target.clone())?;
        tracing::trace!("resolved {} = {} as {} = {}", self, target, ret.ident, ret.expr);
        Ok(ret)
    }

    /// First identifier of an unevaluable expression, renamed to `to`.
    ///
    /// The returned `ident` is the original name.
    pub fn resolve_to(
        &self,
        to: &str,
    ) -> Option<Resolved> {
        if self.can_eval() {
            return None;
        }
        let ident = self.tree()?.first_ident()?.to_string();
        let expr = if to.is_empty() {
            Expr::ident(ident.clone())
        } else {
            Expr::ident(to)
        };
        Some(Resolved { ident, expr })
    }

    /// Name of the first identifier, if the expression needs one
    pub fn ident_name(&self) -> Option<String> {
        self.resolve_to("").map(|r| r.ident)
    }

    /// `x` or `*x`
    pub fn is_ident(&self) -> bool {
        match self.tree() {
            Some(ExprTree::Ident(_)) => true,
            Some(ExprTree::Unary(UnaryOp::Ptr, val)) => matches!(val.as_ref(), ExprTree::Ident(_)),
            _ => false,
        }
    }
}
