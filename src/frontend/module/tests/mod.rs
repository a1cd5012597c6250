//! 注册表、前向引用与加载器单元测试

use std::path::Path;
use std::sync::Arc;

use crate::frontend::builder::{Declarator, Typedef};
use crate::frontend::driver::{self, Grammar, ParseContext};
use crate::frontend::error::ParseError;
use crate::frontend::expr::{Expr, ExprStore};
use crate::frontend::lexer::{Keyword, TokenKind};
use crate::frontend::module::*;
use crate::frontend::types::{type_size, Const, Export, Kind, Type};
use crate::util::config::FrontendConfig;

/// `import "name";` and `typedef BASE ALIAS;` only
struct MiniGrammar;

fn ident(ctx: &mut ParseContext<'_>) -> Result<String, ParseError> {
    match ctx.lex().kind {
        TokenKind::Identifier(name) => Ok(name),
        _ => Err(ctx.error("expected identifier")),
    }
}

fn semicolon(ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    match ctx.lex().kind {
        TokenKind::Semicolon => Ok(()),
        _ => Err(ctx.error("expected ';'")),
    }
}

impl Grammar for MiniGrammar {
    fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
    ) -> Result<(), ParseError> {
        loop {
            let token = ctx.lex();
            match token.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Keyword(Keyword::Import) => {
                    let name = match ctx.lex().kind {
                        TokenKind::StringLiteral(name) => name,
                        _ => return Err(ctx.error("expected file name")),
                    };
                    semicolon(ctx)?;
                    ctx.import(&[name])?;
                }
                TokenKind::Keyword(Keyword::Typedef) => {
                    let base = ident(ctx)?;
                    let alias = ident(ctx)?;
                    semicolon(ctx)?;
                    let ty = ctx.defer_type(&base);
                    ctx.export_typedef(Typedef {
                        ty,
                        declarators: vec![Declarator::plain(alias)],
                        ..Typedef::default()
                    })?;
                }
                other => {
                    return Err(ctx.error(format!("unexpected token {:?}", other)));
                }
            }
        }
    }
}

fn file_with(
    path: &str,
    name: &str,
    ty: Type,
) -> File {
    let mut file = File::new(path);
    file.export(Export::of_type(name, ty));
    file
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn test_store_is_idempotent() {
        let registry = Registry::new();
        let first = registry.store(file_with("a.idl", "X", Type::new(Kind::Int32)));
        let second = registry.store(file_with("a.idl", "X", Type::new(Kind::Int64)));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup_type("X"), Some(Type::new(Kind::Int32)));
    }

    #[test]
    fn test_files_sorted_by_path() {
        let registry = Registry::new();
        registry.store(File::new("b.idl"));
        registry.store(File::new("a.idl"));
        let paths: Vec<_> = registry.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![Path::new("a.idl"), Path::new("b.idl")]);
    }

    #[test]
    fn test_most_recent_registration_wins() {
        let registry = Registry::new();
        registry.store(file_with("z.idl", "X", Type::new(Kind::Int32)));
        registry.store(file_with("a.idl", "X", Type::new(Kind::Uint8)));
        assert_eq!(registry.lookup_type("X"), Some(Type::new(Kind::Uint8)));
    }

    #[test]
    fn test_lookup_const_and_expr() {
        let registry = Registry::new();
        let mut file = File::new("c.idl");
        file.export(Export::of_const(Const {
            name: "MAX".into(),
            kind: Kind::Int32,
            value: Expr::value(16),
        }));
        registry.store(file);
        assert_eq!(registry.lookup_const("MAX").map(|c| c.kind), Some(Kind::Int32));
        assert_eq!(registry.lookup_expr("MAX"), Some(Expr::value(16)));
        assert!(registry.lookup_expr("MIN").is_none());
    }

    #[test]
    fn test_lookup_by_alias() {
        let mut file = File::new("t.idl");
        let mut export = Export::of_type("_struct_S", Type::named(Kind::Struct, "S"));
        export.aliases = vec!["S".into()];
        file.export(export);
        assert!(file.lookup_type("S").is_some());
        assert_eq!(file.exports()[0].position, 0);
    }

    #[test]
    fn test_redefinition_keeps_positions_unique() {
        let mut file = File::new("r.idl");
        for (name, kind) in [
            ("A", Kind::Int32),
            ("B", Kind::Int32),
            ("A", Kind::Int64),
            ("C", Kind::Int32),
        ] {
            file.export(Export::of_type(name, Type::new(kind)));
        }

        let order: Vec<(&str, usize)> = file
            .exports()
            .iter()
            .map(|e| (e.name.as_str(), e.position))
            .collect();
        assert_eq!(order, vec![("B", 1), ("A", 2), ("C", 3)]);
        assert_eq!(file.lookup_type("A"), Some(Type::new(Kind::Int64)));
    }
}

#[cfg(test)]
mod bootstrap_tests {
    use super::*;

    #[test]
    fn test_bootstrap_registered() {
        let registry = Registry::with_bootstrap();
        assert!(registry.has_bootstrap());
        assert!(registry.load(Path::new(BOOTSTRAP_PATH)).unwrap().is_bootstrap());
        assert!(!Registry::new().has_bootstrap());
    }

    #[test]
    fn test_scalar_aliases() {
        let file = bootstrap();
        let dword = file.lookup_type("DWORD").unwrap();
        assert_eq!(dword.kind, Kind::Attribute);
        assert_eq!(dword.attrs.as_ref().unwrap().alias, "DWORD");
        assert_eq!(dword.base().kind, Kind::Uint32);
        assert_eq!(file.lookup_type("handle_t").unwrap().base().kind, Kind::Handle);
    }

    #[test]
    fn test_string_pointers() {
        let file = bootstrap();
        let lpwstr = file.lookup_type("LPWSTR").unwrap();
        let kinds: Vec<Kind> = lpwstr.flat().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Kind::Attribute, Kind::Pointer, Kind::WChar]);
        assert!(lpwstr.is_string());
    }

    #[test]
    fn test_guid() {
        let registry = Registry::with_bootstrap();
        let guid = registry.lookup_type("GUID").unwrap();
        assert_eq!(type_size(&registry, &guid), 16);
        assert!(registry.lookup_type("_struct__GUID").is_some());
        assert_eq!(
            registry.lookup_type("UUID").unwrap().base().tag,
            "_GUID"
        );
    }
}

#[cfg(test)]
mod deferred_tests {
    use super::*;

    #[test]
    fn test_defer_returns_reference() {
        let mut deferred = Deferred::new();
        let ty = deferred.defer("NEXT", 3);
        assert_eq!(ty, Type::reference("NEXT"));
        deferred.defer("NEXT", 9);
        assert_eq!(deferred.len(), 1);
        assert!(deferred.contains("NEXT"));
    }

    #[test]
    fn test_resolve_falls_back_to_union_tag() {
        let file = file_with("u.idl", "_union_U", Type::named(Kind::Union, "U"));
        let mut deferred = Deferred::new();
        deferred.defer("_struct_U", 1);
        let resolution = deferred.resolve(&file).unwrap();
        assert_eq!(resolution.canonical("_struct_U"), "_union_U");
        assert_eq!(resolution.canonical("other"), "other");

        let rewritten = resolution.rewrite_type(
            Type::pointer().with_elem(Type::reference("_struct_U")),
        );
        assert_eq!(rewritten.base().name, "_union_U");
    }

    #[test]
    fn test_resolve_unresolved_is_error() {
        let file = File::new("empty.idl");
        let mut deferred = Deferred::new();
        deferred.defer("MISSING", 7);
        match deferred.resolve(&file) {
            Err(ModuleError::Unresolved { name, line }) => {
                assert_eq!(name, "MISSING");
                assert_eq!(line, 7);
            }
            other => panic!("expected Unresolved, got {:?}", other),
        }
    }

    #[test]
    fn test_rewrite_file_touches_exports() {
        let mut file = file_with("f.idl", "P", Type::reference("_struct_U"));
        file.export(Export::of_type("_union_U", Type::named(Kind::Union, "U")));
        let mut deferred = Deferred::new();
        deferred.defer("_struct_U", 1);
        let resolution = deferred.resolve(&file).unwrap();
        let file = resolution.rewrite_file(file);
        assert_eq!(file.lookup_type("P").unwrap().name, "_union_U");
    }
}

#[cfg(test)]
mod driver_tests {
    use super::*;

    #[test]
    fn test_parse_requires_bootstrap() {
        let registry = Registry::new();
        let err = driver::parse("a.idl", "", &MiniGrammar, &registry, None).unwrap_err();
        assert!(matches!(err, ParseError::Module(ModuleError::MissingBootstrap)));
    }

    #[test]
    fn test_forward_reference_resolved_at_end() {
        let registry = Registry::with_bootstrap();
        let file = driver::parse(
            "fwd.idl",
            "typedef LATER A; typedef DWORD LATER;",
            &MiniGrammar,
            &registry,
            None,
        )
        .unwrap();
        assert_eq!(file.exports().len(), 2);
        assert_eq!(file.lookup_type("A").unwrap().base().name, "LATER");
        // nothing is registered by parse itself
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let registry = Registry::with_bootstrap();
        let err = driver::parse("bad.idl", "typedef NOPE A;", &MiniGrammar, &registry, None)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Module(ModuleError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_lexical_error_wins() {
        let registry = Registry::with_bootstrap();
        let err = driver::parse(
            "lex.idl",
            "typedef DWORD A;\nimport \"unterminated",
            &MiniGrammar,
            &registry,
            None,
        )
        .unwrap_err();
        match err {
            ParseError::Lex(err) => assert_eq!(err.line, 2),
            other => panic!("expected a lexical error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;

    fn loader(dir: &Path) -> Loader {
        let config = FrontendConfig {
            search_path: vec![dir.to_path_buf()],
            ..FrontendConfig::default()
        };
        Loader::new(
            &config,
            Arc::new(MiniGrammar),
            Arc::new(Registry::with_bootstrap()),
        )
    }

    #[test]
    fn test_load_twice_returns_same_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.idl"), "typedef DWORD COUNT;").unwrap();

        let mut loader = loader(dir.path());
        let first = loader.load("base").unwrap();
        let second = loader.load("base.idl").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.registry().len(), 2);
    }

    #[test]
    fn test_imports_are_registered_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.idl"), "typedef DWORD COUNT;").unwrap();
        std::fs::write(
            dir.path().join("top.idl"),
            "import \"ms-base.idl\";\ntypedef COUNT TOTAL;",
        )
        .unwrap();

        let mut loader = loader(dir.path());
        let top = loader.load("top").unwrap();
        assert_eq!(top.imports, vec!["ms-base.idl".to_string()]);
        assert_eq!(loader.registry().len(), 3);
        assert!(loader.registry().lookup_type("TOTAL").is_some());
    }

    #[test]
    fn test_cyclic_import() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.idl"), "import \"b.idl\";").unwrap();
        std::fs::write(dir.path().join("b.idl"), "import \"a.idl\";").unwrap();

        let mut loader = loader(dir.path());
        match loader.load("a") {
            Err(ModuleError::CyclicDependency { cycle }) => {
                assert!(cycle.ends_with("a.idl"));
                assert_eq!(cycle.matches(" -> ").count(), 2);
            }
            other => panic!("expected a cycle, got {:?}", other.map(|f| f.path.clone())),
        }
        // failed parses leave the registry untouched
        assert_eq!(loader.registry().len(), 1);
    }

    #[test]
    fn test_parse_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.idl"), "typedef ;").unwrap();

        let mut loader = loader(dir.path());
        match loader.load("bad") {
            Err(ModuleError::Parse { path, source }) => {
                assert!(path.ends_with("bad.idl"));
                assert!(matches!(*source, ParseError::Grammar { line: 1, .. }));
            }
            other => panic!("expected a parse error, got {:?}", other.map(|f| f.path.clone())),
        }
    }
}
