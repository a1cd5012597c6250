//! Token types

use std::borrow::Cow;
use std::fmt;

use num_bigint::BigInt;
use uuid::Uuid;

use crate::util::span::Span;

/// Lexer error: what went wrong plus the line it went wrong on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {kind}\n\t{source_line}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// 1-based line number
    pub line: usize,
    /// The offending source line
    pub source_line: String,
}

/// Lexer error kinds
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected EOF in {0}")]
    UnexpectedEof(&'static str),
    #[error("unterminated {0} literal")]
    UnterminatedLiteral(&'static str),
    #[error("unescaped newline in {0} literal")]
    UnescapedNewline(&'static str),
    #[error("invalid escape sequence: \\{0}")]
    InvalidEscape(char),
    #[error("invalid integer literal: {0}")]
    InvalidNumber(String),
    #[error("invalid uuid literal: {0}")]
    InvalidUuid(String),
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),
}

/// Reserved words.
///
/// Core words are reserved everywhere. Attribute words are positional:
/// see [`super::state::classify`] for the rules that demote them back to
/// plain identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // core declaration words
    Import,
    Interface,
    Typedef,
    Struct,
    Union,
    Enum,
    Const,
    Switch,
    Case,
    Default,
    Sizeof,
    Pipe,
    CppQuote,
    Coclass,
    Library,
    Dispinterface,
    Properties,
    Methods,
    Importlib,
    Safearray,

    // base types
    Void,
    Char,
    WChar,
    Int,
    Long,
    Short,
    Small,
    Hyper,
    Int3264,
    Int8,
    Int16,
    Int32,
    Int64,
    Unsigned,
    Signed,
    Float,
    Double,
    Boolean,
    Byte,
    HandleT,
    ErrorStatusT,

    // literals
    True,
    False,
    Null,

    // attribute words
    FirstIs,
    LastIs,
    LengthIs,
    MinIs,
    MaxIs,
    SizeIs,
    Ref,
    Unique,
    Ptr,
    String,
    ContextHandle,
    SwitchIs,
    SwitchType,
    Ignore,
    In,
    Out,
    TransmitAs,
    Handle,
    Idempotent,
    Broadcast,
    Maybe,
    ReflectDeletions,
    Uuid,
    Version,
    Endpoint,
    Exceptions,
    Local,
    PointerDefault,
    V1Enum,
    MsUnion,
    Range,
    DisableConsistencyCheck,
    Object,
    Callback,
    IidIs,
    Retval,
    HelpString,
    Dual,
    PropGet,
    PropPut,
    PropPutRef,
    Id,
    Hidden,
    Nonextensible,
    Restricted,
    DefaultValue,
    Odl,
    OleAutomation,
    Source,
    Optional,
    AppObject,
    Annotation,
    CallAs,
    WireMarshal,
    Public,
    Pad,
    NoSizeLimit,
    NullIf,
    NullTerminated,
    Utf8,
    MultiSize,
    Rune,
    Hex,
}

/// (spelling, keyword) table, used for both lookup directions.
pub(super) const KEYWORDS: &[(&str, Keyword)] = &[
    ("import", Keyword::Import),
    ("interface", Keyword::Interface),
    ("typedef", Keyword::Typedef),
    ("struct", Keyword::Struct),
    ("union", Keyword::Union),
    ("enum", Keyword::Enum),
    ("const", Keyword::Const),
    ("switch", Keyword::Switch),
    ("case", Keyword::Case),
    ("default", Keyword::Default),
    ("sizeof", Keyword::Sizeof),
    ("pipe", Keyword::Pipe),
    ("cpp_quote", Keyword::CppQuote),
    ("coclass", Keyword::Coclass),
    ("library", Keyword::Library),
    ("dispinterface", Keyword::Dispinterface),
    ("properties", Keyword::Properties),
    ("methods", Keyword::Methods),
    ("importlib", Keyword::Importlib),
    ("SAFEARRAY", Keyword::Safearray),
    ("void", Keyword::Void),
    ("char", Keyword::Char),
    ("wchar_t", Keyword::WChar),
    ("int", Keyword::Int),
    ("long", Keyword::Long),
    ("short", Keyword::Short),
    ("small", Keyword::Small),
    ("hyper", Keyword::Hyper),
    ("__int3264", Keyword::Int3264),
    ("__int8", Keyword::Int8),
    ("__int16", Keyword::Int16),
    ("__int32", Keyword::Int32),
    ("__int64", Keyword::Int64),
    ("unsigned", Keyword::Unsigned),
    ("signed", Keyword::Signed),
    ("float", Keyword::Float),
    ("double", Keyword::Double),
    ("boolean", Keyword::Boolean),
    ("byte", Keyword::Byte),
    ("handle_t", Keyword::HandleT),
    ("error_status_t", Keyword::ErrorStatusT),
    ("TRUE", Keyword::True),
    ("FALSE", Keyword::False),
    ("NULL", Keyword::Null),
    ("first_is", Keyword::FirstIs),
    ("last_is", Keyword::LastIs),
    ("length_is", Keyword::LengthIs),
    ("min_is", Keyword::MinIs),
    ("max_is", Keyword::MaxIs),
    ("size_is", Keyword::SizeIs),
    ("ref", Keyword::Ref),
    ("unique", Keyword::Unique),
    ("ptr", Keyword::Ptr),
    ("string", Keyword::String),
    ("context_handle", Keyword::ContextHandle),
    ("switch_is", Keyword::SwitchIs),
    ("switch_type", Keyword::SwitchType),
    ("ignore", Keyword::Ignore),
    ("in", Keyword::In),
    ("out", Keyword::Out),
    ("transmit_as", Keyword::TransmitAs),
    ("handle", Keyword::Handle),
    ("idempotent", Keyword::Idempotent),
    ("broadcast", Keyword::Broadcast),
    ("maybe", Keyword::Maybe),
    ("reflect_deletions", Keyword::ReflectDeletions),
    ("uuid", Keyword::Uuid),
    ("version", Keyword::Version),
    ("endpoint", Keyword::Endpoint),
    ("exceptions", Keyword::Exceptions),
    ("local", Keyword::Local),
    ("pointer_default", Keyword::PointerDefault),
    ("v1_enum", Keyword::V1Enum),
    ("ms_union", Keyword::MsUnion),
    ("range", Keyword::Range),
    ("disable_consistency_check", Keyword::DisableConsistencyCheck),
    ("object", Keyword::Object),
    ("callback", Keyword::Callback),
    ("iid_is", Keyword::IidIs),
    ("retval", Keyword::Retval),
    ("helpstring", Keyword::HelpString),
    ("dual", Keyword::Dual),
    ("propget", Keyword::PropGet),
    ("propput", Keyword::PropPut),
    ("propputref", Keyword::PropPutRef),
    ("id", Keyword::Id),
    ("hidden", Keyword::Hidden),
    ("nonextensible", Keyword::Nonextensible),
    ("restricted", Keyword::Restricted),
    ("defaultvalue", Keyword::DefaultValue),
    ("odl", Keyword::Odl),
    ("oleautomation", Keyword::OleAutomation),
    ("source", Keyword::Source),
    ("optional", Keyword::Optional),
    ("appobject", Keyword::AppObject),
    ("annotation", Keyword::Annotation),
    ("call_as", Keyword::CallAs),
    ("wire_marshal", Keyword::WireMarshal),
    ("public", Keyword::Public),
    ("pad", Keyword::Pad),
    ("no_size_limit", Keyword::NoSizeLimit),
    ("null_if", Keyword::NullIf),
    ("null_terminated", Keyword::NullTerminated),
    ("utf8", Keyword::Utf8),
    ("multi_size", Keyword::MultiSize),
    ("rune", Keyword::Rune),
    ("hex", Keyword::Hex),
];

impl Keyword {
    /// Look a spelling up in the keyword table
    pub fn lookup(s: &str) -> Option<Keyword> {
        KEYWORDS.iter().find(|(name, _)| *name == s).map(|(_, kw)| *kw)
    }

    /// Source spelling of the keyword
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == self)
            .map(|(name, _)| *name)
            .unwrap_or("<keyword>")
    }

    /// Attribute words are only reserved inside attribute lists.
    pub fn is_attribute(self) -> bool {
        (self as u16) >= (Keyword::FirstIs as u16)
    }

    /// Attribute words that stay reserved inside `[...(...)...]`,
    /// e.g. `pointer_default(unique)`.
    pub fn is_sticky(self) -> bool {
        matches!(self, Keyword::Ref | Keyword::Unique | Keyword::Ptr)
    }
}

impl fmt::Display for Keyword {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers and keywords
    Identifier(String),
    Keyword(Keyword),

    // Literals
    IntLiteral(BigInt),
    StringLiteral(String),
    CharLiteral(char),
    UuidLiteral(Uuid),

    /// `#define`
    Define,

    // Two-character operators
    LogicalAnd,
    LogicalOr,
    Lsh,
    Rsh,
    Le,
    Ge,
    EqEq,
    Neq,
    DotDot,

    // Single-character operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Not,
    Lt,
    Gt,
    Eq,
    Question,
    Dot,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,

    // Special
    Eof,
}

impl TokenKind {
    /// Source spelling of the token, used by grammar actions that accept a
    /// reserved word where a name is expected.
    pub fn name(&self) -> Cow<'_, str> {
        let s = match self {
            TokenKind::Identifier(name) => return Cow::Borrowed(name),
            TokenKind::Keyword(kw) => kw.as_str(),
            TokenKind::IntLiteral(v) => return Cow::Owned(v.to_string()),
            TokenKind::StringLiteral(s) => return Cow::Owned(format!("{:?}", s)),
            TokenKind::CharLiteral(c) => return Cow::Owned(format!("{:?}", c)),
            TokenKind::UuidLiteral(u) => return Cow::Owned(u.to_string()),
            TokenKind::Define => "#define",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::Lsh => "<<",
            TokenKind::Rsh => ">>",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::EqEq => "==",
            TokenKind::Neq => "!=",
            TokenKind::DotDot => "..",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Not => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "=",
            TokenKind::Question => "?",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Eof => "EOF",
        };
        Cow::Borrowed(s)
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl From<TokenKind> for Token {
    fn from(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::dummy(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.kind.name())
    }
}
