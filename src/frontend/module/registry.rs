//! 文件注册表
//!
//! 一次编译运行内共享的已解析文件表，由一把互斥锁保护。
//! 文件只增不减，按登记顺序保存。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::bootstrap::{bootstrap, BOOTSTRAP_PATH};
use super::File;
use crate::frontend::expr::{Expr, ExprStore};
use crate::frontend::types::{Const, Type, TypeStore};

/// 文件注册表
///
/// 跨文件查找按登记顺序倒序进行：后登记的文件优先。
#[derive(Debug, Default)]
pub struct Registry {
    /// 文件映射（path -> File），保持登记顺序
    files: Mutex<IndexMap<PathBuf, Arc<File>>>,
}

impl Registry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建已登记基础类型文件的注册表
    pub fn with_bootstrap() -> Self {
        let registry = Self::new();
        registry.store(bootstrap());
        registry
    }

    /// 获取已登记的文件
    pub fn load(
        &self,
        path: &Path,
    ) -> Option<Arc<File>> {
        self.files.lock().get(path).cloned()
    }

    /// 登记文件
    ///
    /// 同一路径已登记时保留原有文件并返回它。
    pub fn store(
        &self,
        file: File,
    ) -> Arc<File> {
        let mut files = self.files.lock();
        if let Some(existing) = files.get(&file.path) {
            tracing::debug!("{} is already registered", file.path.display());
            return Arc::clone(existing);
        }
        tracing::debug!(
            "register {} ({} exports)",
            file.path.display(),
            file.export.len()
        );
        let file = Arc::new(file);
        files.insert(file.path.clone(), Arc::clone(&file));
        file
    }

    /// 检查文件是否已登记
    pub fn contains(
        &self,
        path: &Path,
    ) -> bool {
        self.files.lock().contains_key(path)
    }

    pub fn has_bootstrap(&self) -> bool {
        self.contains(Path::new(BOOTSTRAP_PATH))
    }

    /// 全部已登记文件，按路径排序
    pub fn files(&self) -> Vec<Arc<File>> {
        let mut ret: Vec<Arc<File>> = self.files.lock().values().cloned().collect();
        ret.sort_by(|a, b| a.path.cmp(&b.path));
        ret
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// 在全部文件中查找类型
    pub fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.files
            .lock()
            .values()
            .rev()
            .find_map(|f| f.lookup_type(name))
    }

    /// 在全部文件中查找常量
    pub fn lookup_const(
        &self,
        name: &str,
    ) -> Option<Const> {
        self.files
            .lock()
            .values()
            .rev()
            .find_map(|f| f.lookup_const(name))
    }
}

impl TypeStore for Registry {
    fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        Registry::lookup_type(self, name)
    }
}

impl ExprStore for Registry {
    fn lookup_expr(
        &self,
        name: &str,
    ) -> Option<Expr> {
        self.lookup_const(name).map(|c| c.value)
    }
}
