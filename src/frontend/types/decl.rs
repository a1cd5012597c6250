//! 声明实体
//!
//! 接口、操作、常量、字段、参数以及结构体、联合体、枚举的定义体。

use indexmap::IndexMap;
use serde::Serialize;

use super::{
    ComClassAttr, ComInterfaceAttr, DispatchInterfaceAttr, FieldAttr, InterfaceAttr, Kind,
    LibraryAttr, OperationAttr, ParamAttr, Type,
};
use crate::frontend::expr::Expr;

/// Interface definition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Interface {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_name: String,
    pub attrs: InterfaceAttr,
    pub body: InterfaceBody,
}

impl Interface {
    /// COM interface: derived from a base, or marked `[object]`
    pub fn is_object(&self) -> bool {
        !self.base_name.is_empty() || self.attrs.object
    }

    pub fn exports(&self) -> Vec<&Export> {
        self.body.exports()
    }
}

/// Imports, exported symbols and operations of an interface
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterfaceBody {
    pub imports: Vec<String>,
    #[serde(rename = "exports")]
    pub export: IndexMap<String, Export>,
    pub operations: Vec<Operation>,
}

impl InterfaceBody {
    /// Exported symbols in declaration order
    pub fn exports(&self) -> Vec<&Export> {
        let mut ret: Vec<&Export> = self.export.values().collect();
        ret.sort_by_key(|e| e.position);
        ret
    }
}

/// Exported symbol: either a type or a constant
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Export {
    pub position: usize,
    pub name: String,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Const>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    /// Other names of a tagged declarator
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Export {
    pub fn of_type(
        name: impl Into<String>,
        ty: Type,
    ) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            ..Self::default()
        }
    }

    pub fn of_const(constant: Const) -> Self {
        Self {
            name: constant.name.clone(),
            constant: Some(constant),
            ..Self::default()
        }
    }
}

/// RPC call
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Operation {
    pub name: String,
    pub op_num: usize,
    #[serde(rename = "type")]
    pub ty: Type,
    pub params: Vec<Param>,
    pub attrs: OperationAttr,
}

impl Operation {
    /// Name with the `get_`/`put_`/`putref_` prefix of property accessors
    pub fn name(&self) -> String {
        if self.attrs.prop_get {
            format!("get_{}", self.name)
        } else if self.attrs.prop_put {
            format!("put_{}", self.name)
        } else if self.attrs.prop_put_ref {
            format!("putref_{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// `const` declaration or `#define`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Const {
    pub name: String,
    pub kind: Kind,
    pub value: Expr,
}

fn is_handle_type(ty: &Type) -> bool {
    if ty.is(Kind::Attribute) {
        return ty.elem.as_deref().is_some_and(|t| t.is(Kind::Handle));
    }
    ty.is(Kind::Handle)
}

/// Operation or function parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub attrs: ParamAttr,
}

impl Param {
    pub fn is_handle(&self) -> bool {
        is_handle_type(&self.ty)
    }
}

/// Array bounds; `-1` marks an unknown bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrayBound {
    pub upper: i64,
    pub lower: i64,
}

impl Default for ArrayBound {
    fn default() -> Self {
        Self {
            upper: -1,
            lower: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Array {
    pub bound: ArrayBound,
}

impl Array {
    /// `[N]`: lower bound 0, upper bound N - 1
    pub fn fixed(size: i64) -> Self {
        Self {
            bound: ArrayBound {
                lower: 0,
                upper: size.saturating_sub(1),
            },
        }
    }

    /// `[]` or `[*]`
    pub fn conformant() -> Self {
        Self::default()
    }

    pub fn is_fixed(&self) -> bool {
        self.bound.lower >= 0 && self.bound.upper >= 0
    }

    /// Element count, saturating at the `i64` range
    pub fn size(&self) -> i64 {
        self.bound
            .upper
            .saturating_sub(self.bound.lower)
            .saturating_add(1)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Func {
    pub params: Vec<Param>,
}

/// Struct or union member
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Field {
    #[serde(skip)]
    pub position: usize,
    pub name: String,
    pub attrs: FieldAttr,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(skip_serializing_if = "Expr::is_empty")]
    pub default_value: Expr,
}

impl Field {
    pub fn is_string(&self) -> bool {
        self.attrs.usage.is_string || self.ty.is_string()
    }

    pub fn is_handle(&self) -> bool {
        is_handle_type(&self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Enum {
    /// Requires a 32-bit representation
    pub is32: bool,
    #[serde(rename = "elements")]
    pub elems: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Element {
    pub value: String,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Union {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<UnionCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch: Option<UnionSwitch>,
}

impl Union {
    /// Encapsulated unions carry their own discriminant
    pub fn is_encapsulated(&self) -> bool {
        self.switch.is_some()
    }
}

/// One `case` group; no labels and `is_default` for `default:`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UnionCase {
    pub position: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Expr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arms: Vec<Field>,
    pub is_default: bool,
}

/// `switch (type name)` of an encapsulated union
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UnionSwitch {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Struct {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Struct {
    pub fn last_field(&self) -> Option<&Field> {
        self.fields.last()
    }
}

/// Interface reference inside a `coclass`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComInterface {
    pub name: String,
    pub attrs: ComInterfaceAttr,
}

/// `coclass` definition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComClass {
    pub name: String,
    pub attrs: ComClassAttr,
    pub interfaces: Vec<ComInterface>,
}

/// `dispinterface` definition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DispatchInterface {
    pub name: String,
    pub attrs: DispatchInterfaceAttr,
    pub properties: Vec<Field>,
    pub methods: Vec<Operation>,
}

/// `library` definition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Library {
    pub name: String,
    pub attrs: LibraryAttr,
    pub interfaces: Vec<Interface>,
    pub com_classes: Vec<ComClass>,
    pub dispatch_interfaces: Vec<DispatchInterface>,
}
