//! Tokenizer implementation
//! Main lexer structure and token generation logic

use super::literals::{is_identifier_char, is_identifier_start, scan_char, scan_number, scan_string, scan_uuid};
use super::state::{classify, BracketContext, Classified};
use super::tokens::{Keyword, LexError, LexErrorKind, Token, TokenKind};
use crate::util::span::{Position, Span};

/// Main lexer structure
///
/// The buffer is owned so that parser actions can re-inject text at the
/// cursor with [`Lexer::push`].
pub struct Lexer {
    buf: Vec<char>,
    pos: usize,
    line: usize,
    line_start: usize,
    start: Position,
    ctx: BracketContext,
    error: Option<LexError>,
}

impl Lexer {
    /// Create a new lexer for the given source
    pub fn new(source: &str) -> Self {
        Self {
            buf: source.chars().collect(),
            pos: 0,
            line: 1,
            line_start: 0,
            start: Position::with_offset(1, 1, 0),
            ctx: BracketContext::default(),
            error: None,
        }
    }

    /// Current position
    pub fn position(&self) -> Position {
        Position::with_offset(self.line, self.pos - self.line_start + 1, self.pos)
    }

    /// Current line number (1-indexed)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Bracket nesting snapshot at the cursor
    pub fn context(&self) -> BracketContext {
        self.ctx
    }

    /// The first error hit by the lexer, if any
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    /// Take the latched error out of the lexer
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    /// Re-inject `text` at the cursor, followed by a newline.
    pub fn push(
        &mut self,
        text: &str,
    ) {
        let tail = self.buf.split_off(self.pos);
        self.buf.extend(text.chars());
        self.buf.push('\n');
        self.buf.extend(tail);
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.buf.get(self.pos).copied()
    }

    pub(super) fn peek_at(
        &self,
        n: usize,
    ) -> Option<char> {
        self.buf.get(self.pos + n).copied()
    }

    pub(super) fn advance(&mut self) -> Option<char> {
        let c = self.buf.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Build an error for the current line without latching it.
    pub(super) fn make_error(
        &self,
        kind: LexErrorKind,
    ) -> LexError {
        let line_start = self.buf[..self.pos.min(self.buf.len())]
            .iter()
            .rposition(|&c| c == '\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = self.buf[line_start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|i| line_start + i)
            .unwrap_or(self.buf.len());
        LexError {
            kind,
            line: self.line,
            source_line: self.buf[line_start..line_end]
                .iter()
                .collect::<String>()
                .trim_end_matches('\r')
                .to_string(),
        }
    }

    /// Latch an error; every later [`Lexer::lex`] call returns EOF.
    fn fail(
        &mut self,
        err: LexError,
    ) -> Token {
        tracing::debug!("lexer error: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.eof()
    }

    fn eof(&self) -> Token {
        let pos = self.position();
        Token {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos),
        }
    }

    fn make_token(
        &self,
        kind: TokenKind,
    ) -> Token {
        Token {
            kind,
            span: Span::new(self.start, self.position()),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip a `/* ... */` comment; the cursor is on the opening `/`.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(self.make_error(LexErrorKind::UnexpectedEof("comment"))),
            }
        }
    }

    /// Handle `#name ...`; the cursor is on `#`.
    ///
    /// Returns `true` for `#define`, which becomes a token. Any other pragma
    /// swallows the rest of the line.
    fn scan_pragma(&mut self) -> bool {
        self.advance();
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        if name == "define" {
            return true;
        }
        tracing::trace!("skipping pragma #{}", name);
        self.skip_line();
        false
    }

    /// Return the next token. After an error this is always EOF.
    pub fn lex(&mut self) -> Token {
        if self.error.is_some() {
            return self.eof();
        }

        loop {
            self.skip_whitespace();
            self.start = self.position();

            let Some(c) = self.peek() else {
                return self.eof();
            };

            let result = match c {
                '/' if self.peek_at(1) == Some('/') => {
                    self.skip_line();
                    continue;
                }
                '/' if self.peek_at(1) == Some('*') => match self.skip_block_comment() {
                    Ok(()) => continue,
                    Err(err) => Err(err),
                },
                '#' => {
                    if self.scan_pragma() {
                        Ok(TokenKind::Define)
                    } else {
                        continue;
                    }
                }
                '"' => scan_string(self).map(TokenKind::StringLiteral),
                '\'' => scan_char(self).map(TokenKind::CharLiteral),
                c if c.is_ascii_digit() => scan_number(self).map(TokenKind::IntLiteral),
                c if is_identifier_start(c) => self.scan_identifier(),
                _ => self.scan_operator(c),
            };

            return match result {
                Ok(kind) => self.make_token(kind),
                Err(err) => self.fail(err),
            };
        }
    }

    fn scan_identifier(&mut self) -> Result<TokenKind, LexError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }

        match classify(&name, self.ctx) {
            Classified::Keyword(Keyword::Uuid) => scan_uuid(self).map(TokenKind::UuidLiteral),
            Classified::Keyword(kw) => Ok(TokenKind::Keyword(kw)),
            Classified::Identifier => Ok(TokenKind::Identifier(name)),
        }
    }

    fn scan_operator(
        &mut self,
        c: char,
    ) -> Result<TokenKind, LexError> {
        // ??< and ??> stand for { and }
        if c == '?' && self.peek_at(1) == Some('?') {
            let sub = match self.peek_at(2) {
                Some('<') => Some(('{', TokenKind::LBrace)),
                Some('>') => Some(('}', TokenKind::RBrace)),
                _ => None,
            };
            if let Some((bracket, kind)) = sub {
                self.pos += 3;
                self.ctx.track(bracket);
                return Ok(kind);
            }
        }

        let two = match (c, self.peek_at(1)) {
            ('&', Some('&')) => Some(TokenKind::LogicalAnd),
            ('|', Some('|')) => Some(TokenKind::LogicalOr),
            ('<', Some('<')) => Some(TokenKind::Lsh),
            ('>', Some('>')) => Some(TokenKind::Rsh),
            ('<', Some('=')) => Some(TokenKind::Le),
            ('>', Some('=')) => Some(TokenKind::Ge),
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::Neq),
            ('.', Some('.')) => Some(TokenKind::DotDot),
            _ => None,
        };
        if let Some(kind) = two {
            self.advance();
            self.advance();
            return Ok(kind);
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => TokenKind::Amp,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '!' => TokenKind::Not,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '=' => TokenKind::Eq,
            '?' => TokenKind::Question,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            other => return Err(self.make_error(LexErrorKind::UnexpectedChar(other))),
        };
        self.advance();
        self.ctx.track(c);
        Ok(kind)
    }
}
