//! 属性集合
//!
//! 每种声明位置（类型、字段、参数、操作、接口、COM 容器）各有一个属性包。
//! `TypeAttr::merge` 是右偏合并：参数中非默认的字段覆盖接收者，
//! `names` 与 `pointers` 记录被覆盖的历史。

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::Type;
use crate::frontend::expr::Expr;

/// Pointer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerType {
    #[default]
    None,
    Ref,
    Ptr,
    Unique,
    /// Implicit `ref`, never overrides an explicit pointer kind
    RefWeak,
}

impl PointerType {
    pub fn is_none(&self) -> bool {
        matches!(self, PointerType::None)
    }
}

/// Field and parameter usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Usage {
    pub context_handle: bool,
    pub is_string: bool,
}

/// Format extension flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Format {
    pub null_terminated: bool,
    pub utf8: bool,
    pub multi_size: bool,
    pub rune: bool,
    pub hex: bool,
}

/// Parameter direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Direction {
    pub r#in: bool,
    pub out: bool,
}

/// Interface version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "v{}", self.major)
        } else {
            write!(f, "v{}.{}", self.major, self.minor)
        }
    }
}

/// `range(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

/// Type attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TypeAttr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmit_as: Option<Box<Type>>,
    pub handle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_type: Option<Box<Type>>,
    pub usage: Usage,
    pub format: Format,
    pub pointer: PointerType,
    pub v1_enum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub disable_consistency_check: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub wire_marshal: String,
    pub public: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Aliases superseded by later merges
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Pointer kinds superseded by later merges
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pointers: Vec<PointerType>,
    pub pad: u64,
}

impl TypeAttr {
    /// `v1_enum` enums are 32-bit on the wire, others 16-bit.
    pub fn enum_type(&self) -> super::Kind {
        if self.v1_enum {
            super::Kind::Uint32
        } else {
            super::Kind::Uint16
        }
    }

    pub fn with_alias(
        mut self,
        alias: impl Into<String>,
    ) -> Self {
        self.alias = alias.into();
        self
    }

    /// Right-biased merge of `other` over a copy of `self`.
    pub fn merge(
        &self,
        other: &TypeAttr,
    ) -> TypeAttr {
        let mut ret = self.clone();

        if other.transmit_as.is_some() {
            ret.transmit_as = other.transmit_as.clone();
        }
        ret.handle |= other.handle;
        if other.switch_type.is_some() {
            ret.switch_type = other.switch_type.clone();
        }
        ret.usage.is_string |= other.usage.is_string;
        ret.usage.context_handle |= other.usage.context_handle;
        ret.format.null_terminated |= other.format.null_terminated;
        ret.format.utf8 |= other.format.utf8;
        ret.format.rune |= other.format.rune;
        ret.format.hex |= other.format.hex;
        ret.format.multi_size |= other.format.multi_size;

        // a weak ref only fills an empty slot
        if ret.pointer.is_none()
            || (!other.pointer.is_none() && other.pointer != PointerType::RefWeak)
        {
            if !ret.pointer.is_none() {
                ret.pointers.push(ret.pointer);
            }
            ret.pointer = match other.pointer {
                PointerType::RefWeak => PointerType::Ref,
                p => p,
            };
        }

        ret.v1_enum |= other.v1_enum;
        if other.range.is_some() {
            ret.range = other.range;
        }
        ret.disable_consistency_check |= other.disable_consistency_check;
        if !other.wire_marshal.is_empty() {
            ret.wire_marshal = other.wire_marshal.clone();
        }
        ret.public |= other.public;
        if !other.alias.is_empty() {
            if !ret.alias.is_empty() && ret.alias != other.alias {
                ret.names.push(std::mem::take(&mut ret.alias));
            }
            ret.alias = other.alias.clone();
        }
        if other.pad != 0 {
            ret.pad = other.pad;
        }

        ret
    }
}

/// Bounds of one array dimension
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dim {
    pub size_is: Expr,
    pub max_is: Expr,
    pub min_is: Expr,
    pub length_is: Expr,
    pub first_is: Expr,
    pub last_is: Expr,
    pub no_size_limit: bool,
}

impl Dim {
    /// No bound expressions at all; consumed without effect.
    pub fn is_empty(&self) -> bool {
        !self.no_size_limit && !self.is_conformant() && !self.is_varying()
    }

    /// Carries `size_is`/`max_is`/`min_is`
    pub fn is_conformant(&self) -> bool {
        !self.size_is.is_empty() || !self.max_is.is_empty() || !self.min_is.is_empty()
    }

    /// Carries `length_is`/`first_is`/`last_is`
    pub fn is_varying(&self) -> bool {
        !self.length_is.is_empty() || !self.first_is.is_empty() || !self.last_is.is_empty()
    }
}

/// Conformance attributes only
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SizeAttr {
    pub min_is: Vec<Expr>,
    pub max_is: Vec<Expr>,
    pub size_is: Vec<Expr>,
}

/// Field attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FieldAttr {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub first_is: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub last_is: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub length_is: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub min_is: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub max_is: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub size_is: Vec<Expr>,
    pub usage: Usage,
    pub format: Format,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub switch_is: Expr,
    pub ignore: bool,
    pub pointer: PointerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_type: Option<Box<Type>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safearray: Option<Box<Type>>,
    pub no_size_limit: bool,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub null_if: Expr,
}

impl FieldAttr {
    /// `None` when no conformance attribute is present
    pub fn size_attr(&self) -> Option<SizeAttr> {
        if self.size_is.is_empty() && self.max_is.is_empty() && self.min_is.is_empty() {
            return None;
        }
        Some(SizeAttr {
            min_is: self.min_is.clone(),
            max_is: self.max_is.clone(),
            size_is: self.size_is.clone(),
        })
    }

    /// One [`Dim`] per dimension, zipped from the six size-family lists.
    pub fn dim(&self) -> Vec<Dim> {
        let count = [
            &self.size_is,
            &self.max_is,
            &self.min_is,
            &self.first_is,
            &self.last_is,
            &self.length_is,
        ]
        .iter()
        .map(|exprs| exprs.len())
        .max()
        .unwrap_or(0)
        .max(usize::from(self.no_size_limit));

        let at = |exprs: &[Expr], i: usize| exprs.get(i).cloned().unwrap_or_default();

        (0..count)
            .map(|i| Dim {
                size_is: at(&self.size_is, i),
                max_is: at(&self.max_is, i),
                min_is: at(&self.min_is, i),
                length_is: at(&self.length_is, i),
                first_is: at(&self.first_is, i),
                last_is: at(&self.last_is, i),
                no_size_limit: self.no_size_limit,
            })
            .collect()
    }

    /// Projection onto the attributes a type node can carry
    pub fn type_attr(&self) -> TypeAttr {
        TypeAttr {
            switch_type: self.switch_type.clone(),
            range: self.range,
            pointer: self.pointer,
            usage: self.usage,
            format: self.format,
            ..TypeAttr::default()
        }
    }
}

/// Parameter attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParamAttr {
    #[serde(flatten)]
    pub field: FieldAttr,
    pub direction: Direction,
    pub disable_consistency_check: bool,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub iid_is: Expr,
    pub retval: bool,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub default_value: Expr,
    pub optional: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub annotation: String,
}

/// Operation attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OperationAttr {
    pub idempotent: bool,
    pub broadcast: bool,
    pub maybe: bool,
    pub reflect_deletions: bool,
    pub usage: Usage,
    pub format: Format,
    pub pointer: PointerType,
    pub callback: bool,
    pub prop_get: bool,
    pub prop_put: bool,
    pub prop_put_ref: bool,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub id: Expr,
    pub restricted: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub call_as: String,
}

/// Interface attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterfaceAttr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
    pub local: bool,
    pub pointer_default: PointerType,
    pub ms_union: bool,
    pub object: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help_string: String,
    pub dual: bool,
    pub hidden: bool,
    pub nonextensible: bool,
    pub odl: bool,
    pub ole_automation: bool,
}

/// `coclass` attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComClassAttr {
    #[serde(flatten)]
    pub interface: InterfaceAttr,
    pub app_object: bool,
}

/// `dispinterface` attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DispatchInterfaceAttr {
    #[serde(flatten)]
    pub interface: InterfaceAttr,
}

/// `library` attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LibraryAttr {
    #[serde(flatten)]
    pub interface: InterfaceAttr,
}

/// Attributes of an interface listed in a `coclass`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ComInterfaceAttr {
    pub default: bool,
    pub source: bool,
}
