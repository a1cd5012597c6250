//! Lexer state management
//!
//! Bracket nesting and context-sensitive keyword recognition. MIDL attribute
//! keywords are positional rather than globally reserved, so whether a name
//! is a keyword depends on which brackets surround it.

use super::tokens::Keyword;

/// Snapshot of the bracket nesting at the lexer cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BracketContext {
    /// `[...]` attribute list depth
    pub square: usize,
    /// `(...)` depth, counting only parentheses opened inside an
    /// attribute list
    pub paren: usize,
    /// `{...}` body depth
    pub curly: usize,
}

impl BracketContext {
    /// Create a snapshot from explicit depths
    pub fn new(
        square: usize,
        paren: usize,
        curly: usize,
    ) -> Self {
        Self {
            square,
            paren,
            curly,
        }
    }

    /// Track an opening or closing bracket character.
    pub(super) fn track(
        &mut self,
        c: char,
    ) {
        match c {
            '[' => self.square += 1,
            ']' => {
                self.square = self.square.saturating_sub(1);
                if self.square == 0 {
                    self.paren = 0;
                }
            }
            '(' if self.square > 0 => self.paren += 1,
            ')' if self.square > 0 => self.paren = self.paren.saturating_sub(1),
            '{' => self.curly += 1,
            '}' => self.curly = self.curly.saturating_sub(1),
            _ => {}
        }
    }

    /// Inside `{...}` body text and outside an attribute list.
    pub fn in_body(&self) -> bool {
        self.curly > 0 && self.square == 0
    }

    /// Inside an attribute list and inside parentheses within it.
    pub fn in_attribute_args(&self) -> bool {
        self.square > 0 && self.paren > 0
    }
}

/// Classification result for a scanned name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Keyword(Keyword),
    Identifier,
}

/// Decide whether `name` is a keyword in the given bracket context.
///
/// Core words are always reserved. An attribute word is demoted to a plain
/// identifier when it appears in body text outside attribute lists, or
/// inside the parenthesised arguments of an attribute, unless it is one of
/// the sticky pointer kinds.
pub fn classify(
    name: &str,
    ctx: BracketContext,
) -> Classified {
    let Some(kw) = Keyword::lookup(name) else {
        return Classified::Identifier;
    };

    if !kw.is_attribute() {
        return Classified::Keyword(kw);
    }

    if ctx.in_body() {
        return Classified::Identifier;
    }

    if ctx.in_attribute_args() && !kw.is_sticky() {
        return Classified::Identifier;
    }

    Classified::Keyword(kw)
}
