//! 类型与声明模型
//!
//! 解析动作构造的全部实体：声明链上的 [`Type`] 节点、各声明位置的属性包、
//! 接口、操作、字段与 COM 容器。
//!
//! # 模块结构
//!
//! - [`kind`] - 类型种类与基本类型大小
//! - [`ty`] - 声明链节点
//! - [`attrs`] - 属性包与合并语义
//! - [`decl`] - 声明实体

pub mod attrs;
pub mod decl;
pub mod kind;
pub mod ty;

use thiserror::Error;

pub use attrs::*;
pub use decl::*;
pub use kind::{primitive_type_size, Kind};
pub use ty::{tag_name, type_size, Type};

/// Name-based type lookup used to expand [`Kind::Ref`] nodes
pub trait TypeStore {
    fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type>;
}

impl TypeStore for indexmap::IndexMap<String, Type> {
    fn lookup_type(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.get(name).cloned()
    }
}

/// Errors raised while building declarations
///
/// These indicate a grammar action bug rather than malformed input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("invalid type {0} for Type::append")]
    InvalidAppend(Kind),

    #[error("attribute `{attr}` is not allowed on {context}")]
    IllegalAttribute {
        attr: &'static str,
        context: &'static str,
    },

    #[error("typedef without a type")]
    EmptyTypedef,
}

#[cfg(test)]
mod tests;
