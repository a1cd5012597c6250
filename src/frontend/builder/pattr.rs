//! 扁平属性包
//!
//! 解析动作逐个应用属性到 [`PAttr`]，再投影到各声明位置的属性结构。
//! [`AttrList`] 在类型层面记住属性所属的位置，只接受 [`Checked`] 属性。

use std::marker::PhantomData;

use uuid::Uuid;

use super::attribute::{AttrContext, Attribute, Checked, FieldCtx, InterfaceCtx, ParamCtx, TypeCtx};
use crate::frontend::expr::Expr;
use crate::frontend::types::{
    BuildError, ComClassAttr, ComInterfaceAttr, Direction, DispatchInterfaceAttr, FieldAttr,
    Format, InterfaceAttr, LibraryAttr, OperationAttr, ParamAttr, PointerType, Range, Type,
    TypeAttr, Usage, Version,
};

/// Every attribute a declaration may carry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PAttr {
    pub first_is: Vec<Expr>,
    pub last_is: Vec<Expr>,
    pub length_is: Vec<Expr>,
    pub min_is: Vec<Expr>,
    pub max_is: Vec<Expr>,
    pub size_is: Vec<Expr>,
    pub pointer: PointerType,
    pub usage: Usage,
    pub format: Format,
    pub switch_is: Expr,
    pub ignore: bool,
    pub direction: Direction,
    pub transmit_as: Option<Box<Type>>,
    pub switch_type: Option<Box<Type>>,
    pub handle: bool,
    pub idempotent: bool,
    pub broadcast: bool,
    pub maybe: bool,
    pub reflect_deletions: bool,
    pub uuid: Option<Uuid>,
    pub version: Option<Version>,
    pub endpoints: Vec<String>,
    pub exceptions: Vec<String>,
    pub local: bool,
    pub pointer_default: PointerType,
    pub v1_enum: bool,
    pub ms_union: bool,
    pub range: Option<Range>,
    pub disable_consistency_check: bool,
    pub object: bool,
    pub callback: bool,
    pub iid_is: Expr,
    pub retval: bool,
    pub help_string: String,
    pub dual: bool,
    pub prop_get: bool,
    pub prop_put: bool,
    pub prop_put_ref: bool,
    pub id: Expr,
    pub hidden: bool,
    pub nonextensible: bool,
    pub restricted: bool,
    pub default_value: Expr,
    pub odl: bool,
    pub ole_automation: bool,
    pub default: bool,
    pub source: bool,
    pub optional: bool,
    pub app_object: bool,
    pub annotation: String,
    pub call_as: String,
    pub wire_marshal: String,
    pub public: bool,
    pub safearray: Option<Box<Type>>,
    pub alias: String,
    pub pad: u64,
    pub no_size_limit: bool,
    pub null_if: Expr,
}

macro_rules! overlay {
    ($dst:ident, $src:ident; vec: $($v:ident),*; flag: $($f:ident),*; opt: $($o:ident),*; expr: $($e:ident),*; text: $($t:ident),*) => {
        $( if !$src.$v.is_empty() { $dst.$v = $src.$v.clone(); } )*
        $( if $src.$f { $dst.$f = true; } )*
        $( if $src.$o.is_some() { $dst.$o = $src.$o.clone(); } )*
        $( if !$src.$e.is_empty() { $dst.$e = $src.$e.clone(); } )*
        $( if !$src.$t.is_empty() { $dst.$t = $src.$t.clone(); } )*
    };
}

impl PAttr {
    /// Apply one attribute.
    pub fn set(
        mut self,
        attr: Attribute,
    ) -> PAttr {
        match attr {
            Attribute::FirstIs(v) => self.first_is = v,
            Attribute::LastIs(v) => self.last_is = v,
            Attribute::LengthIs(v) => self.length_is = v,
            Attribute::MinIs(v) => self.min_is = v,
            Attribute::MaxIs(v) => self.max_is = v,
            Attribute::SizeIs(v) => self.size_is = v,
            Attribute::Pointer(p) => self.pointer = p,
            Attribute::String => self.usage.is_string = true,
            Attribute::ContextHandle => self.usage.context_handle = true,
            Attribute::NullTerminated => self.format.null_terminated = true,
            Attribute::Utf8 => self.format.utf8 = true,
            Attribute::MultiSize => self.format.multi_size = true,
            Attribute::Rune => self.format.rune = true,
            Attribute::Hex => self.format.hex = true,
            Attribute::SwitchIs(e) => self.switch_is = e,
            Attribute::Ignore => self.ignore = true,
            Attribute::In => self.direction.r#in = true,
            Attribute::Out => self.direction.out = true,
            Attribute::TransmitAs(t) => self.transmit_as = Some(Box::new(t)),
            Attribute::SwitchType(t) => self.switch_type = Some(Box::new(t)),
            Attribute::Handle => self.handle = true,
            Attribute::Idempotent => self.idempotent = true,
            Attribute::Broadcast => self.broadcast = true,
            Attribute::Maybe => self.maybe = true,
            Attribute::ReflectDeletions => self.reflect_deletions = true,
            Attribute::Uuid(u) => self.uuid = Some(u),
            Attribute::Version(v) => self.version = Some(v),
            Attribute::Endpoint(v) => self.endpoints = v,
            Attribute::Exceptions(v) => self.exceptions = v,
            Attribute::Local => self.local = true,
            Attribute::PointerDefault(p) => self.pointer_default = p,
            Attribute::V1Enum => self.v1_enum = true,
            Attribute::MsUnion => self.ms_union = true,
            Attribute::Range(r) => self.range = Some(r),
            Attribute::DisableConsistencyCheck => self.disable_consistency_check = true,
            Attribute::Object => self.object = true,
            Attribute::Callback => self.callback = true,
            Attribute::Retval => self.retval = true,
            Attribute::IidIs(e) => self.iid_is = e,
            Attribute::HelpString(s) => self.help_string = s,
            Attribute::Dual => self.dual = true,
            Attribute::PropGet => self.prop_get = true,
            Attribute::PropPut => self.prop_put = true,
            Attribute::PropPutRef => self.prop_put_ref = true,
            Attribute::Id(e) => self.id = e,
            Attribute::Hidden => self.hidden = true,
            Attribute::Nonextensible => self.nonextensible = true,
            Attribute::Restricted => self.restricted = true,
            Attribute::DefaultValue(e) => self.default_value = e,
            Attribute::Odl => self.odl = true,
            Attribute::OleAutomation => self.ole_automation = true,
            Attribute::Default => self.default = true,
            Attribute::Source => self.source = true,
            Attribute::Optional => self.optional = true,
            Attribute::AppObject => self.app_object = true,
            Attribute::Annotation(s) => self.annotation = s,
            Attribute::CallAs(s) => self.call_as = s,
            Attribute::WireMarshal(s) => self.wire_marshal = s,
            Attribute::Public => self.public = true,
            Attribute::Safearray(t) => self.safearray = Some(Box::new(t)),
            Attribute::Pad(n) => self.pad = n,
            Attribute::NoSizeLimit => self.no_size_limit = true,
            Attribute::NullIf(e) => self.null_if = e,
        }
        self
    }

    /// Overlay the non-default fields of `other`.
    pub fn merge(
        mut self,
        other: &PAttr,
    ) -> PAttr {
        overlay!(self, other;
            vec: first_is, last_is, length_is, min_is, max_is, size_is, endpoints, exceptions;
            flag: ignore, handle, idempotent, broadcast, maybe, reflect_deletions, local,
                v1_enum, ms_union, disable_consistency_check, object, callback, retval, dual,
                prop_get, prop_put, prop_put_ref, hidden, nonextensible, restricted, odl,
                ole_automation, default, source, optional, app_object, public, no_size_limit;
            opt: transmit_as, switch_type, uuid, version, range, safearray;
            expr: switch_is, iid_is, id, default_value, null_if;
            text: help_string, annotation, call_as, wire_marshal, alias
        );
        if !other.pointer.is_none() {
            self.pointer = other.pointer;
        }
        if !other.pointer_default.is_none() {
            self.pointer_default = other.pointer_default;
        }
        self.usage.is_string |= other.usage.is_string;
        self.usage.context_handle |= other.usage.context_handle;
        self.format.null_terminated |= other.format.null_terminated;
        self.format.multi_size |= other.format.multi_size;
        self.format.utf8 |= other.format.utf8;
        self.format.rune |= other.format.rune;
        self.format.hex |= other.format.hex;
        self.direction.r#in |= other.direction.r#in;
        self.direction.out |= other.direction.out;
        if other.pad != 0 {
            self.pad = other.pad;
        }
        self
    }

    pub fn field(&self) -> FieldAttr {
        FieldAttr {
            first_is: self.first_is.clone(),
            last_is: self.last_is.clone(),
            length_is: self.length_is.clone(),
            min_is: self.min_is.clone(),
            max_is: self.max_is.clone(),
            size_is: self.size_is.clone(),
            usage: self.usage,
            format: self.format,
            switch_is: self.switch_is.clone(),
            ignore: self.ignore,
            pointer: self.pointer,
            range: self.range,
            switch_type: self.switch_type.clone(),
            safearray: self.safearray.clone(),
            no_size_limit: self.no_size_limit,
            null_if: self.null_if.clone(),
        }
    }

    pub fn param(&self) -> ParamAttr {
        ParamAttr {
            field: self.field(),
            direction: self.direction,
            disable_consistency_check: self.disable_consistency_check,
            iid_is: self.iid_is.clone(),
            retval: self.retval,
            default_value: self.default_value.clone(),
            optional: self.optional,
            annotation: self.annotation.clone(),
        }
    }

    pub fn type_attr(&self) -> TypeAttr {
        TypeAttr {
            transmit_as: self.transmit_as.clone(),
            handle: self.handle,
            switch_type: self.switch_type.clone(),
            usage: self.usage,
            format: self.format,
            pointer: self.pointer,
            v1_enum: self.v1_enum,
            range: self.range,
            disable_consistency_check: self.disable_consistency_check,
            wire_marshal: self.wire_marshal.clone(),
            public: self.public,
            alias: self.alias.clone(),
            names: Vec::new(),
            pointers: Vec::new(),
            pad: self.pad,
        }
    }

    pub fn interface(&self) -> InterfaceAttr {
        InterfaceAttr {
            uuid: self.uuid,
            version: self.version,
            endpoints: self.endpoints.clone(),
            exceptions: self.exceptions.clone(),
            local: self.local,
            pointer_default: self.pointer_default,
            ms_union: self.ms_union,
            object: self.object,
            help_string: self.help_string.clone(),
            dual: self.dual,
            hidden: self.hidden,
            nonextensible: self.nonextensible,
            odl: self.odl,
            ole_automation: self.ole_automation,
        }
    }

    pub fn operation(&self) -> OperationAttr {
        OperationAttr {
            idempotent: self.idempotent,
            broadcast: self.broadcast,
            maybe: self.maybe,
            reflect_deletions: self.reflect_deletions,
            usage: self.usage,
            format: self.format,
            pointer: self.pointer,
            callback: self.callback,
            prop_get: self.prop_get,
            prop_put: self.prop_put,
            prop_put_ref: self.prop_put_ref,
            id: self.id.clone(),
            restricted: self.restricted,
            call_as: self.call_as.clone(),
        }
    }

    pub fn com_class(&self) -> ComClassAttr {
        ComClassAttr {
            interface: self.interface(),
            app_object: self.app_object,
        }
    }

    pub fn dispatch_interface(&self) -> DispatchInterfaceAttr {
        DispatchInterfaceAttr {
            interface: self.interface(),
        }
    }

    pub fn library(&self) -> LibraryAttr {
        LibraryAttr {
            interface: self.interface(),
        }
    }

    pub fn com_interface(&self) -> ComInterfaceAttr {
        ComInterfaceAttr {
            default: self.default,
            source: self.source,
        }
    }
}

/// Attribute list of one declaration site
#[derive(Debug, Clone, PartialEq)]
pub struct AttrList<C> {
    attrs: PAttr,
    _ctx: PhantomData<C>,
}

impl<C: AttrContext> Default for AttrList<C> {
    fn default() -> Self {
        Self {
            attrs: PAttr::default(),
            _ctx: PhantomData,
        }
    }
}

impl<C: AttrContext> AttrList<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        self,
        attr: Checked<C>,
    ) -> Self {
        Self {
            attrs: self.attrs.set(attr.into_inner()),
            _ctx: PhantomData,
        }
    }

    /// Check and apply a parsed `[...]` list.
    pub fn check<I>(attrs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Attribute>,
    {
        attrs
            .into_iter()
            .try_fold(Self::new(), |list, attr| Ok(list.push(Checked::new(attr)?)))
    }

    pub fn merge(
        self,
        other: &AttrList<C>,
    ) -> Self {
        Self {
            attrs: self.attrs.merge(&other.attrs),
            _ctx: PhantomData,
        }
    }

    pub fn attrs(&self) -> &PAttr {
        &self.attrs
    }
}

impl AttrList<FieldCtx> {
    pub fn field(&self) -> FieldAttr {
        self.attrs.field()
    }
}

impl AttrList<ParamCtx> {
    pub fn param(&self) -> ParamAttr {
        self.attrs.param()
    }
}

impl AttrList<TypeCtx> {
    pub fn type_attr(&self) -> TypeAttr {
        self.attrs.type_attr()
    }
}

impl AttrList<InterfaceCtx> {
    pub fn interface(&self) -> InterfaceAttr {
        self.attrs.interface()
    }
}
