//! 解析错误
//!
//! 单个文件解析失败的原因。各组件的错误通过 `#[from]` 汇总到 [`ParseError`]。

use thiserror::Error;

use crate::frontend::expr::{CoerceError, ExprError};
use crate::frontend::lexer::LexError;
use crate::frontend::module::ModuleError;
use crate::frontend::types::BuildError;

/// File parse error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    #[error("expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("coercion error: {0}")]
    Coerce(#[from] CoerceError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Reported by the grammar driving the parse
    #[error("line {line}: {message}")]
    Grammar { line: usize, message: String },
}

impl ParseError {
    pub fn grammar(
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        ParseError::Grammar {
            line,
            message: message.into(),
        }
    }
}
