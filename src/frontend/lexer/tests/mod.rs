//! Lexer 单元测试
//!
//! 测试词法分析器的分词、上下文关键字与错误锁存
use crate::frontend::lexer::{tokenize, Keyword, LexErrorKind, Lexer, TokenKind};
use num_bigint::BigInt;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

fn int(v: i64) -> TokenKind {
    TokenKind::IntLiteral(BigInt::from(v))
}

#[cfg(test)]
mod lexer_basic_tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_whitespace_and_lines() {
        let mut lexer = Lexer::new("  \n\n\t a");
        let token = lexer.lex();
        assert_eq!(token.kind, ident("a"));
        assert_eq!(token.span.start.line, 3);
        assert_eq!(lexer.line(), 3);
    }

    #[test]
    fn test_simple_declaration() {
        assert_eq!(
            kinds("typedef long LONG;"),
            vec![
                TokenKind::Keyword(Keyword::Typedef),
                TokenKind::Keyword(Keyword::Long),
                ident("LONG"),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("&& || << >> <= >= == != .."),
            vec![
                TokenKind::LogicalAnd,
                TokenKind::LogicalOr,
                TokenKind::Lsh,
                TokenKind::Rsh,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::Neq,
                TokenKind::DotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_char_fallback() {
        assert_eq!(
            kinds("& | < > = ! ~ ^ ? : ."),
            vec![
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eq,
                TokenKind::Not,
                TokenKind::Tilde,
                TokenKind::Caret,
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trigraph_braces() {
        assert_eq!(
            kinds("struct s ??< long x; ??>"),
            vec![
                TokenKind::Keyword(Keyword::Struct),
                ident("s"),
                TokenKind::LBrace,
                TokenKind::Keyword(Keyword::Long),
                ident("x"),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_trigraph_tracks_body() {
        // `string` is demoted inside the trigraph body
        assert_eq!(kinds("??< string ??>")[1], ident("string"));
    }

    #[test]
    fn test_push_reinjects_text() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.lex().kind, ident("a"));
        lexer.push("x y");
        assert_eq!(lexer.lex().kind, ident("x"));
        assert_eq!(lexer.lex().kind, ident("y"));
        assert_eq!(lexer.lex().kind, ident("b"));
        assert!(lexer.lex().is_eof());
    }

    #[test]
    fn test_push_appends_newline() {
        let mut lexer = Lexer::new("z");
        lexer.push("// comment");
        assert_eq!(lexer.lex().kind, ident("z"));
    }

    #[test]
    fn test_token_name() {
        let tokens = tokenize("string x").unwrap();
        assert_eq!(Lexer::token_name(&tokens[0]), "string");
        assert_eq!(Lexer::token_name(&tokens[1]), "x");
    }
}

#[cfg(test)]
mod lexer_comment_tests {
    use super::*;

    #[test]
    fn test_line_comment() {
        assert_eq!(kinds("a // b c\nd"), vec![ident("a"), ident("d"), TokenKind::Eof]);
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(
            kinds("a /* b\n * c */ d"),
            vec![ident("a"), ident("d"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("a /* never closed").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedEof("comment"));
    }

    #[test]
    fn test_pragma_skipped() {
        assert_eq!(
            kinds("#pragma pack(4)\nlong"),
            vec![TokenKind::Keyword(Keyword::Long), TokenKind::Eof]
        );
    }

    #[test]
    fn test_define_is_token() {
        assert_eq!(
            kinds("#define MAX 10"),
            vec![TokenKind::Define, ident("MAX"), int(10), TokenKind::Eof]
        );
    }
}

#[cfg(test)]
mod lexer_literal_tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(
            kinds("0 42 0x10 010 7L 0xFFu"),
            vec![int(0), int(42), int(16), int(8), int(7), int(255), TokenKind::Eof]
        );
    }

    #[test]
    fn test_big_integer() {
        let toks = kinds("0xFFFFFFFFFFFFFFFFFF");
        let expected = BigInt::parse_bytes(b"FFFFFFFFFFFFFFFFFF", 16).unwrap();
        assert_eq!(toks[0], TokenKind::IntLiteral(expected));
    }

    #[test]
    fn test_invalid_integer() {
        let err = tokenize("12ab").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidNumber(ref s) if s == "12ab"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\tb\n\"q\"\\""#)[0],
            TokenKind::StringLiteral("a\tb\n\"q\"\\".to_string())
        );
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(kinds("'x'")[0], TokenKind::CharLiteral('x'));
        assert_eq!(kinds(r"'\''")[0], TokenKind::CharLiteral('\''));
    }

    #[test]
    fn test_invalid_escape() {
        let err = tokenize(r#""\q""#).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidEscape('q'));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedLiteral("string"));
    }

    #[test]
    fn test_unescaped_newline() {
        let err = tokenize("\"abc\ndef\"").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnescapedNewline("string"));
        assert_eq!(err.line, 1);
        assert_eq!(err.source_line, "\"abc");
    }

    #[test]
    fn test_uuid_literal() {
        let toks = kinds(r#"[uuid("12345678-1234-ABCD-EF00-0123456789AB")]"#);
        let expected = uuid::Uuid::parse_str("12345678-1234-abcd-ef00-0123456789ab").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::LBracket,
                TokenKind::UuidLiteral(expected),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unquoted_uuid_literal() {
        let toks = kinds("[uuid(12345678-1234-ABCD-EF00-0123456789AB), version(1.0)]");
        assert!(matches!(toks[1], TokenKind::UuidLiteral(_)));
        assert_eq!(toks[2], TokenKind::Comma);
        assert_eq!(toks[3], TokenKind::Keyword(Keyword::Version));
    }

    #[test]
    fn test_malformed_uuid() {
        let err = tokenize(r#"[uuid("1234-5678")]"#).unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidUuid(_)));

        let err = tokenize(r#"[uuid("12345678-1234-ABCD-EF00-0123456789AB"]"#).unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidUuid(_)));
    }
}

#[cfg(test)]
mod lexer_keyword_tests {
    use super::*;

    #[test]
    fn test_attribute_keywords_in_list() {
        assert_eq!(
            kinds("[in, out, size_is(n)]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Keyword(Keyword::In),
                TokenKind::Comma,
                TokenKind::Keyword(Keyword::Out),
                TokenKind::Comma,
                TokenKind::Keyword(Keyword::SizeIs),
                TokenKind::LParen,
                ident("n"),
                TokenKind::RParen,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_attribute_word_demoted_in_args() {
        let toks = kinds("[size_is(version)]");
        assert_eq!(toks[3], ident("version"));
        let toks = kinds("[switch_is(handle)]");
        assert_eq!(toks[3], ident("handle"));
    }

    #[test]
    fn test_sticky_pointer_words_in_args() {
        let toks = kinds("[pointer_default(unique)]");
        assert_eq!(toks[1], TokenKind::Keyword(Keyword::PointerDefault));
        assert_eq!(toks[3], TokenKind::Keyword(Keyword::Unique));
    }

    #[test]
    fn test_attribute_word_demoted_in_body() {
        let toks = kinds("struct s { long version; long string; }");
        assert_eq!(toks[4], ident("version"));
        assert_eq!(toks[7], ident("string"));
    }

    #[test]
    fn test_attribute_in_body_list_is_keyword() {
        let toks = kinds("struct s { [string] char *name; }");
        assert_eq!(toks[4], TokenKind::Keyword(Keyword::String));
    }

    #[test]
    fn test_parameter_list_keeps_direction_keywords() {
        let toks = kinds("{ void Op([in] long a); }");
        assert_eq!(toks[5], TokenKind::Keyword(Keyword::In));
    }

    #[test]
    fn test_core_keyword_in_body() {
        let toks = kinds("{ unsigned long x; }");
        assert_eq!(toks[1], TokenKind::Keyword(Keyword::Unsigned));
    }
}

#[cfg(test)]
mod lexer_error_tests {
    use super::*;

    #[test]
    fn test_error_is_latched() {
        let mut lexer = Lexer::new("a @ b c");
        assert_eq!(lexer.lex().kind, ident("a"));
        assert!(lexer.lex().is_eof());
        assert!(lexer.error().is_some());
        assert!(lexer.lex().is_eof());
        assert!(lexer.lex().is_eof());
        assert_eq!(lexer.error().unwrap().kind, LexErrorKind::UnexpectedChar('@'));
    }

    #[test]
    fn test_first_error_wins() {
        let mut lexer = Lexer::new("@ $");
        lexer.lex();
        lexer.lex();
        assert_eq!(lexer.error().unwrap().kind, LexErrorKind::UnexpectedChar('@'));
    }

    #[test]
    fn test_error_reports_line() {
        let err = tokenize("long a;\nlong $b;\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.source_line, "long $b;");
        let text = err.to_string();
        assert!(text.starts_with("line 2:"));
        assert!(text.contains("long $b;"));
    }
}
