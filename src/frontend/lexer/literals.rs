//! Literal scanning
//!
//! String, character, integer and UUID literals. Each scanner starts with the
//! cursor on the first character of the literal and leaves it just past the
//! end.

use num_bigint::BigInt;
use num_traits::Num;
use uuid::Uuid;

use super::tokenizer::Lexer;
use super::tokens::{LexError, LexErrorKind};

/// Length of the textual form `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
const UUID_TEXT_LEN: usize = 36;

pub(super) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(super) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn escape(c: char) -> Option<char> {
    Some(match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        _ => return None,
    })
}

/// Scan the body of a quoted literal up to the closing `quote`.
fn scan_quoted(
    lexer: &mut Lexer,
    quote: char,
    what: &'static str,
) -> Result<String, LexError> {
    lexer.advance();
    let mut value = String::new();
    loop {
        match lexer.peek() {
            None => return Err(lexer.make_error(LexErrorKind::UnterminatedLiteral(what))),
            Some('\n') => return Err(lexer.make_error(LexErrorKind::UnescapedNewline(what))),
            Some(c) if c == quote => {
                lexer.advance();
                return Ok(value);
            }
            Some('\\') => {
                lexer.advance();
                let Some(c) = lexer.peek() else {
                    return Err(lexer.make_error(LexErrorKind::UnterminatedLiteral(what)));
                };
                let Some(resolved) = escape(c) else {
                    return Err(lexer.make_error(LexErrorKind::InvalidEscape(c)));
                };
                lexer.advance();
                value.push(resolved);
            }
            Some(c) => {
                lexer.advance();
                value.push(c);
            }
        }
    }
}

/// `"..."`
pub(super) fn scan_string(lexer: &mut Lexer) -> Result<String, LexError> {
    scan_quoted(lexer, '"', "string")
}

/// `'c'`; exactly one (possibly escaped) character.
pub(super) fn scan_char(lexer: &mut Lexer) -> Result<char, LexError> {
    let text = scan_quoted(lexer, '\'', "char")?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(lexer.make_error(LexErrorKind::UnterminatedLiteral("char"))),
    }
}

/// Parse integer literal text: radix prefixes, C octal, and `u`/`l` suffixes.
pub fn parse_int(text: &str) -> Option<BigInt> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let lower = digits.to_ascii_lowercase();

    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let body = body.replace('_', "");
    if body.is_empty() {
        return None;
    }
    BigInt::from_str_radix(&body, radix).ok()
}

/// Maximal alphanumeric/underscore run parsed as an arbitrary-precision
/// integer.
pub(super) fn scan_number(lexer: &mut Lexer) -> Result<BigInt, LexError> {
    let mut text = String::new();
    while let Some(c) = lexer.peek() {
        if !is_identifier_char(c) {
            break;
        }
        text.push(c);
        lexer.advance();
    }
    parse_int(&text).ok_or_else(|| lexer.make_error(LexErrorKind::InvalidNumber(text)))
}

fn skip_blanks(lexer: &mut Lexer) {
    while matches!(lexer.peek(), Some(c) if c.is_whitespace()) {
        lexer.advance();
    }
}

fn expect(
    lexer: &mut Lexer,
    want: char,
    seen: &mut String,
) -> Result<(), LexError> {
    skip_blanks(lexer);
    match lexer.peek() {
        Some(c) if c == want => {
            lexer.advance();
            seen.push(c);
            Ok(())
        }
        Some(c) => {
            seen.push(c);
            Err(lexer.make_error(LexErrorKind::InvalidUuid(seen.clone())))
        }
        None => Err(lexer.make_error(LexErrorKind::UnexpectedEof("uuid"))),
    }
}

/// `( ["] xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx ["] )`, scanned right after
/// the `uuid` keyword.
pub(super) fn scan_uuid(lexer: &mut Lexer) -> Result<Uuid, LexError> {
    let mut seen = String::from("uuid");
    expect(lexer, '(', &mut seen)?;
    skip_blanks(lexer);

    let quote = match lexer.peek() {
        Some(q @ ('"' | '\'')) => {
            lexer.advance();
            seen.push(q);
            Some(q)
        }
        _ => None,
    };

    let mut text = String::with_capacity(UUID_TEXT_LEN);
    for _ in 0..UUID_TEXT_LEN {
        match lexer.peek() {
            Some(c) if c.is_ascii_hexdigit() || c == '-' => {
                lexer.advance();
                text.push(c);
            }
            Some(c) => {
                seen.push_str(&text);
                seen.push(c);
                return Err(lexer.make_error(LexErrorKind::InvalidUuid(seen)));
            }
            None => return Err(lexer.make_error(LexErrorKind::UnexpectedEof("uuid"))),
        }
    }
    seen.push_str(&text);

    if !is_uuid_shape(&text) {
        return Err(lexer.make_error(LexErrorKind::InvalidUuid(seen)));
    }

    if let Some(q) = quote {
        match lexer.peek() {
            Some(c) if c == q => {
                lexer.advance();
                seen.push(c);
            }
            _ => return Err(lexer.make_error(LexErrorKind::InvalidUuid(seen))),
        }
    }
    expect(lexer, ')', &mut seen)?;

    Uuid::parse_str(&text).map_err(|_| lexer.make_error(LexErrorKind::InvalidUuid(seen)))
}

/// 8-4-4-4-12 hex groups.
fn is_uuid_shape(text: &str) -> bool {
    let groups: Vec<&str> = text.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(g, n)| g.len() == n && g.chars().all(|c| c.is_ascii_hexdigit()))
}
