//! 解析得到的单个属性
//!
//! 每个 `[...]` 列表项对应一个 [`Attribute`]。属性能出现的位置由
//! [`AttrContext`] 标记类型限定，通过 [`Checked`] 在进入属性包之前检查。

use std::fmt;
use std::marker::PhantomData;

use uuid::Uuid;

use crate::frontend::expr::Expr;
use crate::frontend::types::{BuildError, PointerType, Range, Type, Version};

/// One parsed attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    FirstIs(Vec<Expr>),
    LastIs(Vec<Expr>),
    LengthIs(Vec<Expr>),
    MinIs(Vec<Expr>),
    MaxIs(Vec<Expr>),
    SizeIs(Vec<Expr>),
    /// `ref`, `unique` or `ptr`
    Pointer(PointerType),
    String,
    ContextHandle,
    NullTerminated,
    Utf8,
    MultiSize,
    Rune,
    Hex,
    SwitchIs(Expr),
    Ignore,
    In,
    Out,
    TransmitAs(Type),
    SwitchType(Type),
    Handle,
    Idempotent,
    Broadcast,
    Maybe,
    ReflectDeletions,
    Uuid(Uuid),
    Version(Version),
    Endpoint(Vec<String>),
    Exceptions(Vec<String>),
    Local,
    PointerDefault(PointerType),
    V1Enum,
    MsUnion,
    Range(Range),
    DisableConsistencyCheck,
    Object,
    Callback,
    Retval,
    IidIs(Expr),
    HelpString(String),
    Dual,
    PropGet,
    PropPut,
    PropPutRef,
    Id(Expr),
    Hidden,
    Nonextensible,
    Restricted,
    DefaultValue(Expr),
    Odl,
    OleAutomation,
    Default,
    Source,
    Optional,
    AppObject,
    Annotation(String),
    CallAs(String),
    WireMarshal(String),
    Public,
    Safearray(Type),
    Pad(u64),
    NoSizeLimit,
    NullIf(Expr),
}

impl Attribute {
    /// Source spelling of the attribute keyword
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::FirstIs(_) => "first_is",
            Attribute::LastIs(_) => "last_is",
            Attribute::LengthIs(_) => "length_is",
            Attribute::MinIs(_) => "min_is",
            Attribute::MaxIs(_) => "max_is",
            Attribute::SizeIs(_) => "size_is",
            Attribute::Pointer(PointerType::Ref) => "ref",
            Attribute::Pointer(PointerType::Unique) => "unique",
            Attribute::Pointer(_) => "ptr",
            Attribute::String => "string",
            Attribute::ContextHandle => "context_handle",
            Attribute::NullTerminated => "null_terminated",
            Attribute::Utf8 => "utf8",
            Attribute::MultiSize => "multi_size",
            Attribute::Rune => "rune",
            Attribute::Hex => "hex",
            Attribute::SwitchIs(_) => "switch_is",
            Attribute::Ignore => "ignore",
            Attribute::In => "in",
            Attribute::Out => "out",
            Attribute::TransmitAs(_) => "transmit_as",
            Attribute::SwitchType(_) => "switch_type",
            Attribute::Handle => "handle",
            Attribute::Idempotent => "idempotent",
            Attribute::Broadcast => "broadcast",
            Attribute::Maybe => "maybe",
            Attribute::ReflectDeletions => "reflect_deletions",
            Attribute::Uuid(_) => "uuid",
            Attribute::Version(_) => "version",
            Attribute::Endpoint(_) => "endpoint",
            Attribute::Exceptions(_) => "exceptions",
            Attribute::Local => "local",
            Attribute::PointerDefault(_) => "pointer_default",
            Attribute::V1Enum => "v1_enum",
            Attribute::MsUnion => "ms_union",
            Attribute::Range(_) => "range",
            Attribute::DisableConsistencyCheck => "disable_consistency_check",
            Attribute::Object => "object",
            Attribute::Callback => "callback",
            Attribute::Retval => "retval",
            Attribute::IidIs(_) => "iid_is",
            Attribute::HelpString(_) => "helpstring",
            Attribute::Dual => "dual",
            Attribute::PropGet => "propget",
            Attribute::PropPut => "propput",
            Attribute::PropPutRef => "propputref",
            Attribute::Id(_) => "id",
            Attribute::Hidden => "hidden",
            Attribute::Nonextensible => "nonextensible",
            Attribute::Restricted => "restricted",
            Attribute::DefaultValue(_) => "defaultvalue",
            Attribute::Odl => "odl",
            Attribute::OleAutomation => "oleautomation",
            Attribute::Default => "default",
            Attribute::Source => "source",
            Attribute::Optional => "optional",
            Attribute::AppObject => "appobject",
            Attribute::Annotation(_) => "annotation",
            Attribute::CallAs(_) => "call_as",
            Attribute::WireMarshal(_) => "wire_marshal",
            Attribute::Public => "public",
            Attribute::Safearray(_) => "safearray",
            Attribute::Pad(_) => "pad",
            Attribute::NoSizeLimit => "no_size_limit",
            Attribute::NullIf(_) => "null_if",
        }
    }

    /// Size, length, usage, format, switch and pointer attributes shared by
    /// fields and parameters
    fn is_member(&self) -> bool {
        matches!(
            self,
            Attribute::FirstIs(_)
                | Attribute::LastIs(_)
                | Attribute::LengthIs(_)
                | Attribute::MinIs(_)
                | Attribute::MaxIs(_)
                | Attribute::SizeIs(_)
                | Attribute::String
                | Attribute::ContextHandle
                | Attribute::NullTerminated
                | Attribute::Utf8
                | Attribute::Rune
                | Attribute::Hex
                | Attribute::MultiSize
                | Attribute::SwitchIs(_)
                | Attribute::Ignore
                | Attribute::Range(_)
                | Attribute::Pointer(_)
                | Attribute::SwitchType(_)
                | Attribute::NullIf(_)
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declaration site an attribute list belongs to
pub trait AttrContext {
    const NAME: &'static str;

    fn allows(attr: &Attribute) -> bool;
}

/// Struct and union members
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldCtx {}

/// Operation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamCtx {}

/// `typedef` and tagged type declarations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeCtx {}

/// `interface`, `coclass`, `dispinterface` and `library` headers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterfaceCtx {}

/// Operations and `coclass` members accept every attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyCtx {}

impl AttrContext for FieldCtx {
    const NAME: &'static str = "field";

    fn allows(attr: &Attribute) -> bool {
        attr.is_member()
    }
}

impl AttrContext for ParamCtx {
    const NAME: &'static str = "parameter";

    fn allows(attr: &Attribute) -> bool {
        attr.is_member()
            || matches!(
                attr,
                Attribute::In
                    | Attribute::Out
                    | Attribute::DisableConsistencyCheck
                    | Attribute::IidIs(_)
                    | Attribute::Retval
                    | Attribute::Optional
            )
    }
}

impl AttrContext for TypeCtx {
    const NAME: &'static str = "type";

    fn allows(attr: &Attribute) -> bool {
        matches!(
            attr,
            Attribute::TransmitAs(_)
                | Attribute::Handle
                | Attribute::SwitchType(_)
                | Attribute::String
                | Attribute::ContextHandle
                | Attribute::NullTerminated
                | Attribute::Utf8
                | Attribute::Rune
                | Attribute::Hex
                | Attribute::MultiSize
                | Attribute::Pointer(_)
                | Attribute::V1Enum
                | Attribute::Range(_)
                | Attribute::DisableConsistencyCheck
                | Attribute::WireMarshal(_)
        )
    }
}

impl AttrContext for InterfaceCtx {
    const NAME: &'static str = "interface";

    fn allows(attr: &Attribute) -> bool {
        matches!(
            attr,
            Attribute::Uuid(_)
                | Attribute::Version(_)
                | Attribute::Endpoint(_)
                | Attribute::Exceptions(_)
                | Attribute::Local
                | Attribute::PointerDefault(_)
                | Attribute::MsUnion
                | Attribute::Object
                | Attribute::HelpString(_)
                | Attribute::Dual
                | Attribute::Hidden
                | Attribute::Nonextensible
                | Attribute::Odl
                | Attribute::OleAutomation
        )
    }
}

impl AttrContext for AnyCtx {
    const NAME: &'static str = "any declaration";

    fn allows(_attr: &Attribute) -> bool {
        true
    }
}

/// An attribute known to be legal in context `C`
#[derive(Debug, Clone, PartialEq)]
pub struct Checked<C> {
    attr: Attribute,
    _ctx: PhantomData<C>,
}

impl<C: AttrContext> Checked<C> {
    pub fn new(attr: Attribute) -> Result<Self, BuildError> {
        if !C::allows(&attr) {
            return Err(BuildError::IllegalAttribute {
                attr: attr.name(),
                context: C::NAME,
            });
        }
        Ok(Self {
            attr,
            _ctx: PhantomData,
        })
    }

    pub fn attr(&self) -> &Attribute {
        &self.attr
    }

    pub fn into_inner(self) -> Attribute {
        self.attr
    }
}
