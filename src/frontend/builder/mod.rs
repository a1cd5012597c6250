//! 声明构造
//!
//! 语法动作使用的构造工具：属性、属性包和 typedef 展开。
//!
//! # 模块结构
//!
//! - [`attribute`] - 单个属性与位置限定
//! - [`pattr`] - 扁平属性包及其投影
//! - [`typedef`] - typedef 导出与 switch 类型补全

pub mod attribute;
pub mod pattr;
pub mod typedef;

pub use attribute::{AnyCtx, AttrContext, Attribute, Checked, FieldCtx, InterfaceCtx, ParamCtx, TypeCtx};
pub use pattr::{AttrList, PAttr};
pub use typedef::{content_hash, set_switch_type, Declarator, Typedef};
