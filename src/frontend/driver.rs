//! 解析驱动
//!
//! 语法本身由外部的表驱动解析器提供（[`Grammar`]）。它从 [`ParseContext`]
//! 拉取词法单元，并在规约时调用上下文上的构造入口：导出符号、记录前向
//! 引用、查找类型和常量、导入其他文件。
//!
//! [`parse`] 在语法成功结束后解析前向引用，返回完整的 [`File`]。
//! 登记到注册表由调用方负责，失败时注册表保持不变。

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::frontend::builder::Typedef;
use crate::frontend::error::ParseError;
use crate::frontend::expr::{Expr, ExprStore};
use crate::frontend::lexer::{Lexer, Token};
use crate::frontend::module::{Deferred, File, ModuleError, Registry};
use crate::frontend::types::{
    ComClass, Const, DispatchInterface, Export, Interface, Kind, Library, Type, TypeStore,
};

/// Table-driven grammar run against a [`ParseContext`]
pub trait Grammar {
    fn parse(
        &self,
        ctx: &mut ParseContext<'_>,
    ) -> Result<(), ParseError>;
}

/// Loads the file an `import` statement names
pub trait Importer {
    fn import(
        &mut self,
        name: &str,
    ) -> Result<Arc<File>, ModuleError>;
}

/// Top-level definition produced by the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Import(Vec<String>),
    Interface(Interface),
    ComClass(ComClass),
    DispatchInterface(DispatchInterface),
    Library(Library),
}

/// State of one file parse
pub struct ParseContext<'a> {
    lexer: Lexer,
    file: File,
    registry: &'a Registry,
    importer: Option<&'a mut dyn Importer>,
    deferred: Deferred,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        path: impl Into<PathBuf>,
        source: &str,
        registry: &'a Registry,
        importer: Option<&'a mut dyn Importer>,
    ) -> Self {
        Self {
            lexer: Lexer::new(source),
            file: File::new(path),
            registry,
            importer,
            deferred: Deferred::new(),
        }
    }

    /// Next token; `Eof` forever after a lexical error
    pub fn lex(&mut self) -> Token {
        self.lexer.lex()
    }

    pub fn line(&self) -> usize {
        self.lexer.line()
    }

    pub fn token_name(token: &Token) -> Cow<'_, str> {
        Lexer::token_name(token)
    }

    /// Re-inject text at the cursor (macro expansion)
    pub fn push(
        &mut self,
        text: &str,
    ) {
        self.lexer.push(text);
    }

    /// Grammar error at the current line
    pub fn error(
        &self,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::grammar(self.line(), message)
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn deferred(&self) -> &Deferred {
        &self.deferred
    }

    /// Add a symbol to the file table, returning its position
    pub fn export(
        &mut self,
        export: Export,
    ) -> usize {
        self.file.export(export)
    }

    /// Expand a `typedef` statement and export every resulting symbol
    pub fn export_typedef(
        &mut self,
        typedef: Typedef,
    ) -> Result<Vec<usize>, ParseError> {
        let exports = typedef.to_exports()?;
        Ok(exports.into_iter().map(|e| self.export(e)).collect())
    }

    /// Current file first, then the registry
    pub fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.file
            .lookup_type(name)
            .or_else(|| self.registry.lookup_type(name))
    }

    pub fn lookup_const(
        &self,
        name: &str,
    ) -> Option<Const> {
        self.file
            .lookup_const(name)
            .or_else(|| self.registry.lookup_const(name))
    }

    /// Reference to a named type; unknown names are resolved when the
    /// parse finishes.
    pub fn defer_type(
        &mut self,
        name: &str,
    ) -> Type {
        if self.lookup_type(name).is_some() {
            return Type::reference(name);
        }
        let line = self.line();
        self.deferred.defer(name, line)
    }

    /// Evaluate `value` against the known constants, narrow it to `kind`
    /// and export it.
    ///
    /// Kinds without a literal form (`#define` uses `Invalid`) keep the
    /// evaluated value as is.
    pub fn store_const(
        &mut self,
        name: &str,
        kind: Kind,
        value: Expr,
    ) -> Result<Const, ParseError> {
        let value = value.eval(Some(&*self))?;
        let value = match kind {
            Kind::Invalid | Kind::Void => value,
            _ => value.coerce(kind)?,
        };
        let constant = Const {
            name: name.to_string(),
            kind,
            value,
        };
        self.export(Export::of_const(constant.clone()));
        Ok(constant)
    }

    /// Load imported files through the importer and record the names
    pub fn import(
        &mut self,
        names: &[String],
    ) -> Result<(), ParseError> {
        for name in names {
            if let Some(importer) = self.importer.as_deref_mut() {
                let file = importer.import(name)?;
                debug!("import '{}' -> {}", name, file.path.display());
            }
            self.file.imports.push(name.clone());
        }
        Ok(())
    }

    /// Add an interface; symbols of its body join the file table.
    pub fn add_interface(
        &mut self,
        iface: Interface,
    ) {
        for export in iface.exports() {
            if !self.file.export.contains_key(&export.name) {
                self.file.export(export.clone());
            }
        }
        self.file.interfaces.push(iface);
    }

    pub fn add_com_class(
        &mut self,
        class: ComClass,
    ) {
        self.file.com_classes.push(class);
    }

    pub fn add_dispatch_interface(
        &mut self,
        disp: DispatchInterface,
    ) {
        self.file.dispatch_interfaces.push(disp);
    }

    pub fn add_library(
        &mut self,
        lib: Library,
    ) {
        self.file.libraries.push(lib);
    }

    /// Record the top-level definitions of the file
    pub fn set_result(
        &mut self,
        definitions: Vec<Definition>,
    ) -> Result<(), ParseError> {
        for def in definitions {
            match def {
                Definition::Import(names) => self.import(&names)?,
                Definition::Interface(iface) => self.add_interface(iface),
                Definition::ComClass(class) => self.add_com_class(class),
                Definition::DispatchInterface(disp) => self.add_dispatch_interface(disp),
                Definition::Library(lib) => self.add_library(lib),
            }
        }
        Ok(())
    }

    /// Resolve the deferred references and return the finished file
    fn finish(self) -> Result<File, ParseError> {
        let resolution = self.deferred.resolve(&self)?;
        Ok(resolution.rewrite_file(self.file))
    }
}

impl TypeStore for ParseContext<'_> {
    fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        ParseContext::lookup_type(self, name)
    }
}

impl ExprStore for ParseContext<'_> {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr> {
        self.lookup_const(name).map(|c| c.value)
    }
}

/// Parse one file.
///
/// The bootstrap file must already be registered. The returned file is not
/// registered.
pub fn parse<'a>(
    path: impl Into<PathBuf>,
    source: &str,
    grammar: &dyn Grammar,
    registry: &'a Registry,
    importer: Option<&'a mut dyn Importer>,
) -> Result<File, ParseError> {
    if !registry.has_bootstrap() {
        return Err(ModuleError::MissingBootstrap.into());
    }

    let path = path.into();
    debug!("parsing {} ({} bytes)", path.display(), source.len());

    let mut ctx = ParseContext::new(path, source, registry, importer);
    let result = grammar.parse(&mut ctx);

    // after a lexical error the grammar only saw EOF
    if let Some(err) = ctx.lexer.take_error() {
        return Err(err.into());
    }
    result?;

    let file = ctx.finish()?;
    debug!(
        "parsed {}: {} exports, {} interfaces",
        file.path.display(),
        file.export.len(),
        file.interfaces.len()
    );
    Ok(file)
}
