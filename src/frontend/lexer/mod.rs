//! Lexer module
//!
//! Context-sensitive MIDL tokenizer. Attribute keywords are reserved only
//! inside `[...]` attribute lists, so the lexer tracks bracket nesting and
//! classifies names against that snapshot.

mod literals;
pub mod state;
mod tokenizer;
pub mod tokens;

use std::borrow::Cow;

pub use literals::parse_int;
pub use state::{classify, BracketContext, Classified};
pub use tokenizer::Lexer;
pub use tokens::*;

impl Lexer {
    /// Source spelling of a token.
    ///
    /// Grammar rules that accept a reserved word where a name is expected use
    /// this to recover the text.
    pub fn token_name(token: &Token) -> Cow<'_, str> {
        token.kind.name()
    }
}

/// Tokenize source code
///
/// The returned stream always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tracing::debug!("tokenizing {} bytes", source.len());
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.lex();
        let eof = token.is_eof();
        tokens.push(token);
        if eof {
            break;
        }
    }

    if let Some(err) = lexer.take_error() {
        return Err(err);
    }
    tracing::debug!("produced {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests;
