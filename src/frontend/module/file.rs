//! 已解析文件
//!
//! 一个 IDL 文件解析后的全部内容：文件级符号表、接口和 COM 容器。

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use super::bootstrap::BOOTSTRAP_PATH;
use crate::frontend::expr::{Expr, ExprStore};
use crate::frontend::types::{
    ComClass, Const, DispatchInterface, Export, Interface, Library, Type, TypeStore,
};

/// Parsed file
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    pub path: PathBuf,
    pub imports: Vec<String>,
    /// File-level symbol table, including the symbols of every interface body
    #[serde(rename = "exports")]
    pub export: IndexMap<String, Export>,
    pub interfaces: Vec<Interface>,
    pub com_classes: Vec<ComClass>,
    pub dispatch_interfaces: Vec<DispatchInterface>,
    pub libraries: Vec<Library>,
    /// Position handed to the next export
    #[serde(skip)]
    next_position: usize,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_bootstrap(&self) -> bool {
        self.path == Path::new(BOOTSTRAP_PATH)
    }

    /// Add a symbol at the next position; a redefinition replaces the
    /// earlier entry and moves it after every existing symbol.
    pub fn export(
        &mut self,
        mut export: Export,
    ) -> usize {
        let position = self.next_position;
        self.next_position += 1;
        export.position = position;
        tracing::trace!("export {} at {}", export.name, position);
        self.export.insert(export.name.clone(), export);
        position
    }

    /// Exported symbols in declaration order
    pub fn exports(&self) -> Vec<&Export> {
        let mut ret: Vec<&Export> = self.export.values().collect();
        ret.sort_by_key(|e| e.position);
        ret
    }

    fn find(
        &self,
        name: &str,
    ) -> Option<&Export> {
        self.export
            .get(name)
            .or_else(|| self.export.values().find(|e| e.aliases.iter().any(|a| a == name)))
    }

    pub fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.find(name).and_then(|e| e.ty.clone())
    }

    pub fn lookup_const(
        &self,
        name: &str,
    ) -> Option<Const> {
        self.find(name).and_then(|e| e.constant.clone())
    }

    pub fn interface(
        &self,
        name: &str,
    ) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

impl TypeStore for File {
    fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        File::lookup_type(self, name)
    }
}

impl ExprStore for File {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr> {
        self.lookup_const(name).map(|c| c.value)
    }
}
