//! 文件加载器
//!
//! 把导入名解析为路径，读取并解析文件，递归加载它导入的文件，
//! 最后登记到注册表。同一路径只解析一次，并检测循环导入。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::resolver::SearchPath;
use super::{File, ModuleError, Registry};
use crate::frontend::driver::{self, Grammar, Importer};
use crate::frontend::error::ParseError;
use crate::util::config::FrontendConfig;

/// 文件加载器
pub struct Loader {
    /// 导入路径解析
    search_path: SearchPath,
    /// 语法
    grammar: Arc<dyn Grammar>,
    /// 共享注册表
    registry: Arc<Registry>,
    /// 当前加载栈（用于报告循环路径）
    load_stack: Vec<PathBuf>,
}

impl Loader {
    /// 创建新的加载器
    pub fn new(
        config: &FrontendConfig,
        grammar: Arc<dyn Grammar>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            search_path: SearchPath::from_config(config),
            grammar,
            registry,
            load_stack: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// 按导入名加载文件
    pub fn load(
        &mut self,
        name: &str,
    ) -> Result<Arc<File>, ModuleError> {
        let path = self.search_path.resolve(name)?;
        self.load_path(&path)
    }

    /// 加载指定路径的文件
    ///
    /// 已登记的路径直接返回登记的文件，不再解析。
    pub fn load_path(
        &mut self,
        path: &Path,
    ) -> Result<Arc<File>, ModuleError> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(file) = self.registry.load(&path) {
            debug!("{} is already loaded", path.display());
            return Ok(file);
        }

        // 检查循环依赖
        if self.load_stack.contains(&path) {
            let cycle = self.format_cycle(&path);
            return Err(ModuleError::CyclicDependency { cycle });
        }

        let source = std::fs::read_to_string(&path).map_err(|source| ModuleError::Io {
            path: path.display().to_string(),
            source,
        })?;

        self.load_stack.push(path.clone());
        let grammar = Arc::clone(&self.grammar);
        let registry = Arc::clone(&self.registry);
        let result = driver::parse(
            path.clone(),
            &source,
            &*grammar,
            &registry,
            Some(self as &mut dyn Importer),
        );
        self.load_stack.pop();

        let file = result.map_err(|err| match err {
            // 内层导入的错误原样上抛
            ParseError::Module(
                err @ (ModuleError::CyclicDependency { .. } | ModuleError::Parse { .. }),
            ) => err,
            err => ModuleError::Parse {
                path: path.display().to_string(),
                source: Box::new(err),
            },
        })?;
        Ok(self.registry.store(file))
    }

    /// 格式化循环依赖路径
    fn format_cycle(
        &self,
        current: &Path,
    ) -> String {
        let mut cycle_parts = Vec::new();
        let mut found = false;
        for path in &self.load_stack {
            if path == current {
                found = true;
            }
            if found {
                cycle_parts.push(path.display().to_string());
            }
        }
        cycle_parts.push(current.display().to_string());
        cycle_parts.join(" -> ")
    }
}

impl Importer for Loader {
    fn import(
        &mut self,
        name: &str,
    ) -> Result<Arc<File>, ModuleError> {
        self.load(name)
    }
}
