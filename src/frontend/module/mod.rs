//! 文件与符号注册
//!
//! 解析成功的文件登记到 [`Registry`]，之后的解析通过它跨文件查找类型和常量。
//!
//! # 模块结构
//!
//! - [`file`] - 单个已解析文件及其符号表
//! - [`registry`] - 文件注册表
//! - [`bootstrap`] - 内置的基础类型定义
//! - [`deferred`] - 前向引用的两阶段解析
//! - [`resolver`] - 导入名到文件路径的解析
//! - [`loader`] - 递归加载导入文件
//!
//! # 生命周期
//!
//! 文件只在完整解析成功后登记，登记后不再移除。解析失败不会改动注册表。

pub mod bootstrap;
pub mod deferred;
pub mod file;
pub mod loader;
pub mod registry;
pub mod resolver;

pub use bootstrap::{bootstrap, BOOTSTRAP_PATH};
pub use deferred::{Deferred, Resolution};
pub use file::File;
pub use loader::Loader;
pub use registry::Registry;
pub use resolver::SearchPath;

use crate::frontend::error::ParseError;

/// 模块系统错误
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// 导入文件未找到
    #[error("module not found: '{path}'")]
    NotFound {
        path: String,
        searched_paths: Vec<String>,
    },

    /// 循环导入
    #[error("cyclic dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    /// 解析结束时仍无法解析的类型引用
    #[error("unresolved type reference '{name}' (line {line})")]
    Unresolved { name: String, line: usize },

    /// 注册表中没有基础类型文件
    #[error("bootstrap file '{}' is not registered", bootstrap::BOOTSTRAP_PATH)]
    MissingBootstrap,

    /// 读取文件失败
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 导入文件解析失败
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<ParseError>,
    },
}

#[cfg(test)]
mod tests;
