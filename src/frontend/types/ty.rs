//! 声明链节点
//!
//! 一个声明符由外向内的包装节点（指针、数组、函数、属性）组成，
//! 最终以非包装的基础类型结束。链只能在包装节点处延长。

use serde::Serialize;

use super::{Array, BuildError, Enum, Func, Kind, Struct, TypeAttr, TypeStore, Union};

/// Declarator chain node
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Type {
    pub kind: Kind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Tag of a struct, union or enum, possibly synthesized
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub func: Option<Func>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<Array>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Enum>,
    #[serde(rename = "struct", skip_serializing_if = "Option::is_none")]
    pub structure: Option<Struct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union: Option<Union>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrs: Option<TypeAttr>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<Type>>,
}

impl Type {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Named primitive or interface type
    pub fn named(
        kind: Kind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Reference by name
    pub fn reference(name: impl Into<String>) -> Self {
        Self::named(Kind::Ref, name)
    }

    pub fn pointer() -> Self {
        Self::new(Kind::Pointer)
    }

    pub fn array(array: Array) -> Self {
        Self {
            kind: Kind::Array,
            array: Some(array),
            ..Self::default()
        }
    }

    pub fn attribute(attrs: TypeAttr) -> Self {
        Self {
            kind: Kind::Attribute,
            attrs: Some(attrs),
            ..Self::default()
        }
    }

    pub fn func(func: Func) -> Self {
        Self {
            kind: Kind::Func,
            func: Some(func),
            ..Self::default()
        }
    }

    pub fn with_elem(
        mut self,
        elem: Type,
    ) -> Self {
        self.elem = Some(Box::new(elem));
        self
    }

    /// Kind test; [`Kind::Tag`] matches struct, union, C union and enum.
    pub fn is(
        &self,
        kind: Kind,
    ) -> bool {
        if kind == Kind::Tag {
            return self.kind.is_taggable();
        }
        self.kind == kind
    }

    /// Terminal node of the chain
    pub fn base(&self) -> &Type {
        let mut t = self;
        while let Some(elem) = &t.elem {
            t = elem;
        }
        t
    }

    pub fn base_mut(&mut self) -> &mut Type {
        match self.elem {
            Some(ref mut elem) => elem.base_mut(),
            None => self,
        }
    }

    /// Extend the chain at its terminal, which must be a wrapper node.
    pub fn append(
        mut self,
        tail: Type,
    ) -> Result<Type, BuildError> {
        let base = self.base_mut();
        if !base.kind.is_wrapper() {
            return Err(BuildError::InvalidAppend(base.kind));
        }
        base.elem = Some(Box::new(tail));
        Ok(self)
    }

    /// [`Type::append`] on an optional head; an empty head yields `tail`.
    pub fn append_chain(
        head: Option<Type>,
        tail: Type,
    ) -> Result<Type, BuildError> {
        match head {
            Some(head) => head.append(tail),
            None => Ok(tail),
        }
    }

    /// Chain nodes outer to inner, each detached from its `elem`
    pub fn flat(&self) -> Vec<Type> {
        let mut ret = Vec::new();
        let mut t = Some(self);
        while let Some(node) = t {
            ret.push(Type {
                kind: node.kind,
                name: node.name.clone(),
                tag: node.tag.clone(),
                func: node.func.clone(),
                array: node.array.clone(),
                enumeration: node.enumeration.clone(),
                structure: node.structure.clone(),
                union: node.union.clone(),
                attrs: node.attrs.clone(),
                alias: node.alias.clone(),
                elem: None,
            });
            t = node.elem.as_deref();
        }
        ret
    }

    /// Declared name, or the tag name of an anonymous tagged type
    pub fn type_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        if !self.is(Kind::Tag) {
            return "UNKNOWN".to_string();
        }
        tag_name(self.kind, &self.tag)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            Kind::Char
                | Kind::UChar
                | Kind::WChar
                | Kind::Boolean
                | Kind::Int8
                | Kind::Uint8
                | Kind::Int16
                | Kind::Uint16
                | Kind::Int32
                | Kind::Int3264
                | Kind::Uint3264
                | Kind::Uint32
                | Kind::Error
                | Kind::Int64
                | Kind::Uint64
                | Kind::Float32
                | Kind::Float64
        )
    }

    /// The string flag set on this node's attributes
    pub fn is_string(&self) -> bool {
        self.attrs.as_ref().is_some_and(|a| a.usage.is_string)
    }
}

/// Symbol name of a tagged type: `_struct_X`, `_union_X`, `_c_union_X`,
/// `_enum_X`.
pub fn tag_name(
    kind: Kind,
    tag: &str,
) -> String {
    let prefix = match kind {
        Kind::Enum => "_enum_",
        Kind::Struct => "_struct_",
        Kind::Union => "_union_",
        Kind::CUnion => "_c_union_",
        _ => "",
    };
    format!("{}{}", prefix, tag)
}

/// Fixed wire size of `ty` in bytes, 0 when not fixed or too large for
/// `usize`.
pub fn type_size(
    store: &dyn TypeStore,
    ty: &Type,
) -> usize {
    match ty.kind {
        Kind::Boolean | Kind::Char | Kind::UChar | Kind::Int8 | Kind::Uint8 => 1,
        Kind::Uint16 | Kind::Int16 | Kind::WChar => 2,
        Kind::Float32 | Kind::Uint32 | Kind::Int32 => 4,
        Kind::Float64 | Kind::Uint64 | Kind::Int64 => 8,
        Kind::Enum => {
            if ty.attrs.as_ref().is_some_and(|a| a.v1_enum) {
                4
            } else {
                2
            }
        }
        Kind::Struct => {
            let Some(s) = &ty.structure else {
                return 0;
            };
            let mut ret: usize = 0;
            for field in &s.fields {
                match type_size(store, &field.ty) {
                    0 => return 0,
                    size => match ret.checked_add(size) {
                        Some(sum) => ret = sum,
                        None => return 0,
                    },
                }
            }
            ret
        }
        Kind::Ref => store
            .lookup_type(&ty.name)
            .map_or(0, |resolved| type_size(store, &resolved)),
        Kind::Pointer => 4,
        Kind::Array => match (&ty.array, &ty.elem) {
            (Some(array), Some(elem)) if array.is_fixed() => usize::try_from(array.size())
                .ok()
                .and_then(|n| n.checked_mul(type_size(store, elem)))
                .unwrap_or(0),
            _ => 0,
        },
        Kind::Attribute => ty.elem.as_deref().map_or(0, |elem| type_size(store, elem)),
        _ => 0,
    }
}
