//! 常量表达式引擎
//!
//! 表达式同时保存两种表示：已折叠的字面量值，以及构造它的表达式树。
//! 所有运算符在构造时尝试立即折叠；含有未解析标识符的表达式保留树，
//! 直到通过 [`ExprStore`] 求值。
//!
//! # 模块结构
//!
//! - [`ops`] - 运算符与折叠
//! - [`solve`] - 代数求逆
//! - [`coerce`] - 按类型收窄字面量

pub mod coerce;
pub mod error;
pub mod ops;
pub mod solve;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde::{Serialize, Serializer};

pub use error::{CoerceError, ExprError};
pub use solve::Resolved;

/// Literal value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(BigInt),
    Str(String),
    Char(char),
    Bool(bool),
    /// Only produced by coercion to a floating point kind
    Float(f64),
}

impl Value {
    /// Name of the value kind, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Char(_) => "char",
            Value::Bool(_) => "boolean",
            Value::Float(_) => "float",
        }
    }

    /// C-style truthiness
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(v) => !v.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::Char(c) => *c != '\0',
            Value::Bool(b) => *b,
            Value::Float(f) => *f != 0.0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Bool(true) => f.write_str("TRUE"),
            Value::Bool(false) => f.write_str("FALSE"),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(v) => match v.to_i64() {
                Some(i) => serializer.serialize_i64(i),
                None => match v.to_u64() {
                    Some(u) => serializer.serialize_u64(u),
                    None => serializer.serialize_str(&v.to_string()),
                },
            },
            Value::Str(s) => serializer.serialize_str(s),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(BigInt::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Positive,
    /// `-x`
    Negative,
    /// `~x`
    Neg,
    /// `!x`
    Not,
    /// `*x`, kept in the tree only
    Ptr,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Positive => "+",
            UnaryOp::Negative => "-",
            UnaryOp::Neg => "~",
            UnaryOp::Not => "!",
            UnaryOp::Ptr => "*",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Lsh,
    Rsh,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Lsh => "<<",
            BinaryOp::Rsh => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        }
    }

    /// Inverse operator used by [`Expr::resolve`]
    pub fn inverse(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Add => Some(BinaryOp::Sub),
            BinaryOp::Sub => Some(BinaryOp::Add),
            BinaryOp::Mul => Some(BinaryOp::Div),
            BinaryOp::Div => Some(BinaryOp::Mul),
            _ => None,
        }
    }
}

/// Operators that produce a boolean
pub fn is_bool_op(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::LogicalOr
            | BinaryOp::LogicalAnd
            | BinaryOp::Ge
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Lt
            | BinaryOp::Eq
            | BinaryOp::Ne
    )
}

/// Expression tree
///
/// Immutable once built; operators share subtrees through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprTree {
    Value(Value),
    Ident(String),
    Unary(UnaryOp, Arc<ExprTree>),
    Binary(BinaryOp, Arc<ExprTree>, Arc<ExprTree>),
    /// cond, then, else
    Ternary(Arc<ExprTree>, Arc<ExprTree>, Arc<ExprTree>),
}

impl ExprTree {
    /// Evaluate the tree, resolving identifiers through `store`.
    pub fn eval(
        &self,
        store: Option<&dyn ExprStore>,
    ) -> Result<Expr, ExprError> {
        match self {
            ExprTree::Value(v) => Ok(Expr::value(v.clone())),
            ExprTree::Ident(name) => {
                let store = store.ok_or_else(|| ExprError::NoStore(name.clone()))?;
                store
                    .lookup_expr(name)
                    .ok_or_else(|| ExprError::Unresolved(name.clone()))
            }
            ExprTree::Unary(op, val) => val.eval(store)?.unary(*op),
            ExprTree::Binary(op, lval, rval) => {
                let lval = lval.eval(store)?;
                let rval = rval.eval(store)?;
                lval.binary(*op, &rval)
            }
            ExprTree::Ternary(cond, lval, rval) => {
                let cond = cond.eval(store)?;
                let lval = lval.eval(store)?;
                let rval = rval.eval(store)?;
                cond.ternary(&lval, &rval)
            }
        }
    }

    /// Whether any leaf is an identifier
    pub fn has_ident(&self) -> bool {
        match self {
            ExprTree::Value(_) => false,
            ExprTree::Ident(_) => true,
            ExprTree::Unary(_, val) => val.has_ident(),
            ExprTree::Binary(_, lval, rval) => lval.has_ident() || rval.has_ident(),
            ExprTree::Ternary(cond, lval, rval) => {
                cond.has_ident() || lval.has_ident() || rval.has_ident()
            }
        }
    }

    /// First identifier in evaluation order
    pub fn first_ident(&self) -> Option<&str> {
        match self {
            ExprTree::Value(_) => None,
            ExprTree::Ident(name) => Some(name),
            ExprTree::Unary(_, val) => val.first_ident(),
            ExprTree::Binary(_, lval, rval) => lval.first_ident().or_else(|| rval.first_ident()),
            ExprTree::Ternary(cond, lval, rval) => cond
                .first_ident()
                .or_else(|| lval.first_ident())
                .or_else(|| rval.first_ident()),
        }
    }
}

impl fmt::Display for ExprTree {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ExprTree::Value(v) => write!(f, "{}", v),
            ExprTree::Ident(name) => f.write_str(name),
            ExprTree::Unary(op, val) => write!(f, "{}{}", op.symbol(), val),
            ExprTree::Binary(op, lval, rval) => write!(f, "({} {} {})", lval, op.symbol(), rval),
            ExprTree::Ternary(cond, lval, rval) => write!(f, "({} ? {} : {})", cond, lval, rval),
        }
    }
}

/// Identifier lookup capability used during evaluation
pub trait ExprStore {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr>;
}

impl ExprStore for HashMap<String, Expr> {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr> {
        self.get(name).cloned()
    }
}

impl ExprStore for IndexMap<String, Expr> {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr> {
        self.get(name).cloned()
    }
}

/// Positional store: every lookup returns the next argument, whatever the
/// name. Identifiers are visited left to right.
#[derive(Debug, Default)]
pub struct Args {
    args: RefCell<VecDeque<Expr>>,
}

impl Args {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            args: RefCell::new(values.into_iter().map(Expr::value).collect()),
        }
    }

    /// Arguments not consumed yet
    pub fn remaining(&self) -> usize {
        self.args.borrow().len()
    }
}

impl ExprStore for Args {
    fn lookup_expr(
        &self,
        _name: &str,
    ) -> Option<Expr> {
        self.args.borrow_mut().pop_front()
    }
}

/// Constant expression
///
/// Either a folded literal (`can_eval()`), or a tree that still needs an
/// [`ExprStore`]. The default value is the empty expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expr {
    value: Value,
    req_param: bool,
    tree: Option<Arc<ExprTree>>,
}

/// True when every expression can be evaluated immediately.
pub fn can_eval(exprs: &[&Expr]) -> bool {
    exprs.iter().all(|e| e.can_eval())
}

impl Expr {
    /// Literal expression
    pub fn value(v: impl Into<Value>) -> Self {
        let value = v.into();
        Self {
            tree: Some(Arc::new(ExprTree::Value(value.clone()))),
            value,
            req_param: false,
        }
    }

    /// Identifier leaf, unevaluable until a store resolves it
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            value: Value::Null,
            req_param: true,
            tree: Some(Arc::new(ExprTree::Ident(name.into()))),
        }
    }

    /// Wrap an existing tree, folding it when it has no identifiers.
    pub fn from_tree(tree: Arc<ExprTree>) -> Self {
        if !tree.has_ident() {
            if let Ok(folded) = tree.eval(None) {
                return Self {
                    value: folded.value,
                    req_param: false,
                    tree: Some(tree),
                };
            }
        }
        Self {
            value: Value::Null,
            req_param: true,
            tree: Some(tree),
        }
    }

    pub(crate) fn with_value(
        &self,
        value: Value,
    ) -> Self {
        Self {
            value,
            req_param: false,
            tree: self.tree.clone(),
        }
    }

    /// Tree node for this expression, a literal leaf when there is no tree.
    pub(crate) fn node(&self) -> Arc<ExprTree> {
        match &self.tree {
            Some(tree) => Arc::clone(tree),
            None => Arc::new(ExprTree::Value(self.value.clone())),
        }
    }

    /// Folded literal is available
    pub fn can_eval(&self) -> bool {
        !self.req_param
    }

    /// No value and no tree
    pub fn is_empty(&self) -> bool {
        self.tree.is_none() && matches!(self.value, Value::Null)
    }

    pub fn tree(&self) -> Option<&ExprTree> {
        self.tree.as_deref()
    }

    /// The folded value; `Null` for unevaluable expressions.
    pub fn literal(&self) -> &Value {
        &self.value
    }

    /// Evaluate against `store`, failing when the result is still not a
    /// literal.
    pub fn eval(
        &self,
        store: Option<&dyn ExprStore>,
    ) -> Result<Expr, ExprError> {
        if self.can_eval() {
            return Ok(self.clone());
        }
        let Some(tree) = &self.tree else {
            return Err(ExprError::NotEvaluable(String::new()));
        };
        let ret = tree.eval(store)?;
        if !ret.can_eval() {
            return Err(ExprError::NotEvaluable(self.to_string()));
        }
        Ok(ret)
    }

    pub fn big_int(&self) -> Option<&BigInt> {
        match &self.value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn int64(&self) -> Option<i64> {
        self.big_int().and_then(ToPrimitive::to_i64)
    }

    pub fn uint64(&self) -> Option<u64> {
        self.big_int().and_then(ToPrimitive::to_u64)
    }

    pub fn as_bool(&self) -> bool {
        self.value.truthy()
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self.value {
            Value::Char(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }
}

impl fmt::Display for Expr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.tree {
            Some(tree) if !self.can_eval() => write!(f, "{}", tree),
            _ if self.is_empty() => Ok(()),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if self.can_eval() {
            self.value.serialize(serializer)
        } else {
            serializer.serialize_str(&self.to_string())
        }
    }
}

#[cfg(test)]
mod tests;
