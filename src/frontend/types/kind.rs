//! 类型种类
//!
//! `Kind` 是类型节点的选择子。除基本类型外，还包括声明链中的包装节点
//! （指针、数组、函数、属性）和按名引用的 `Ref`。

use std::fmt;

use serde::Serialize;

/// Type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    #[default]
    Invalid,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Int64,
    Uint32,
    Uint64,
    /// 32 bits for NDR, 64 bits for NDR64
    Int3264,
    /// 32 bits for NDR, 64 bits for NDR64
    Uint3264,
    Float32,
    Float64,
    UChar,
    Char,
    WChar,
    Enum,
    String,
    Struct,
    Union,
    CUnion,
    Func,
    Array,
    Pointer,
    Pipe,
    Boolean,
    /// Constant declarations only
    Void,
    Handle,
    Error,
    Interface,
    DispInterface,
    /// Reference by name, resolved through a [`super::TypeStore`]
    Ref,
    /// Attribute wrapper inside a declarator chain
    Attribute,
    /// Synthetic kind: struct, union, C union or enum
    Tag,
}

impl Kind {
    /// Signed numeric and character kinds
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int8
                | Kind::Int16
                | Kind::Int32
                | Kind::Int64
                | Kind::Int3264
                | Kind::Float32
                | Kind::Float64
                | Kind::Char
                | Kind::WChar
        )
    }

    /// Fixed-width integer kinds
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::Int8
                | Kind::Uint8
                | Kind::Int16
                | Kind::Uint16
                | Kind::Int32
                | Kind::Uint32
                | Kind::Int64
                | Kind::Uint64
        )
    }

    /// Kinds that may carry a tag name
    pub fn is_taggable(self) -> bool {
        matches!(self, Kind::Struct | Kind::Union | Kind::CUnion | Kind::Enum)
    }

    /// Declarator chain wrappers that [`super::Type::append`] may extend
    pub fn is_wrapper(self) -> bool {
        matches!(self, Kind::Pointer | Kind::Array | Kind::Func | Kind::Attribute)
    }

    /// Character-like kinds that make a trailing pointer or array a string
    pub fn is_char_like(self) -> bool {
        matches!(self, Kind::Char | Kind::UChar | Kind::WChar)
    }

    /// Bit width of an integer kind
    pub fn bits(self) -> Option<u64> {
        match self {
            Kind::Int8 | Kind::Uint8 => Some(8),
            Kind::Int16 | Kind::Uint16 => Some(16),
            Kind::Int32 | Kind::Uint32 => Some(32),
            Kind::Int64 | Kind::Uint64 => Some(64),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Int8 => "int8",
            Kind::Uint8 => "uint8",
            Kind::Int16 => "int16",
            Kind::Uint16 => "uint16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Int3264 => "int3264",
            Kind::Uint3264 => "uint3264",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::UChar => "uchar",
            Kind::Char => "char",
            Kind::WChar => "wchar",
            Kind::Enum => "enum",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Union => "union",
            Kind::CUnion => "c_union",
            Kind::Func => "func",
            Kind::Array => "array",
            Kind::Pointer => "pointer",
            Kind::Pipe => "pipe",
            Kind::Boolean => "boolean",
            Kind::Void => "void",
            Kind::Handle => "handle",
            Kind::Error => "error",
            Kind::Interface => "interface",
            Kind::DispInterface => "dispinterface",
            Kind::Ref => "ref",
            Kind::Attribute => "attribute",
            Kind::Tag => "tag",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire size in bytes of a primitive kind, 0 when unknown.
///
/// The 32/64 bit kinds report 5 so callers can tell them apart.
pub fn primitive_type_size(kind: Kind) -> usize {
    match kind {
        Kind::Boolean | Kind::Char | Kind::UChar | Kind::Int8 | Kind::Uint8 => 1,
        Kind::Uint16 | Kind::Int16 | Kind::WChar => 2,
        Kind::Float32 | Kind::Uint32 | Kind::Int32 | Kind::Error => 4,
        Kind::Float64 | Kind::Uint64 | Kind::Int64 => 8,
        Kind::Int3264 | Kind::Uint3264 => 5,
        _ => 0,
    }
}
