//! 导入路径解析
//!
//! 把 `import "ms-dtyp.idl";` 里的名字解析为文件系统路径。
//!
//! # 搜索顺序
//!
//! 1. 名字本身（绝对路径或相对当前目录）
//! 2. 搜索路径中的每个目录：`dir/name`，无扩展名时再试 `dir/name.idl`
//! 3. 去掉 `ms-`/`mc-` 前缀后重复以上步骤

use std::path::{Path, PathBuf};

use super::ModuleError;
use crate::util::config::FrontendConfig;

/// 导入文件搜索路径
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    /// 搜索目录，按顺序
    dirs: Vec<PathBuf>,
    /// 回退查找时忽略的前缀
    strip_prefixes: Vec<String>,
    /// 补全用的扩展名
    extension: String,
}

impl SearchPath {
    pub fn new(
        dirs: Vec<PathBuf>,
        strip_prefixes: Vec<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            dirs,
            strip_prefixes,
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &FrontendConfig) -> Self {
        Self::new(
            config.search_path.clone(),
            config.strip_prefixes.clone(),
            config.extension.clone(),
        )
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// 解析导入名
    pub fn resolve(
        &self,
        name: &str,
    ) -> Result<PathBuf, ModuleError> {
        if let Some(path) = self.find(name) {
            return Ok(path);
        }

        // ms-dtyp.idl -> dtyp.idl
        let stripped = self
            .strip_prefixes
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix.as_str()));
        if let Some(path) = stripped.and_then(|name| self.find(name)) {
            tracing::debug!("'{}' resolved without prefix: {}", name, path.display());
            return Ok(path);
        }

        let mut searched_paths = self.candidates(name);
        if let Some(stripped) = stripped {
            searched_paths.extend(self.candidates(stripped));
        }
        Err(ModuleError::NotFound {
            path: name.to_string(),
            searched_paths: searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })
    }

    fn find(
        &self,
        name: &str,
    ) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|p| p.is_file())
    }

    /// 按搜索顺序列出候选路径
    fn candidates(
        &self,
        name: &str,
    ) -> Vec<PathBuf> {
        let mut names = vec![PathBuf::from(name)];
        if Path::new(name).extension().is_none() && !self.extension.is_empty() {
            names.push(PathBuf::from(format!("{}.{}", name, self.extension)));
        }

        let mut ret = names.clone();
        if Path::new(name).is_absolute() {
            return ret;
        }
        for dir in &self.dirs {
            ret.extend(names.iter().map(|n| dir.join(n)));
        }
        ret
    }
}
