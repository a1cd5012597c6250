//! typedef 展开
//!
//! 一条 `typedef` 语句可以带多个声明符，例如
//! `typedef struct _S { ... } S, *PS;`。[`Typedef::to_exports`] 把它展开为
//! 导出符号列表：带标签的类型按标签名导出一次，每个声明符各导出一个
//! 属性包装的声明链。

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::frontend::types::{BuildError, Export, Field, Kind, Type, TypeAttr};

/// One declarator of a `typedef`; `ty` holds the pointer/array wrappers,
/// `None` for a plain name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Declarator {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
}

impl Declarator {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
        }
    }

    pub fn wrapped(
        name: impl Into<String>,
        ty: Type,
    ) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
        }
    }
}

/// `typedef [attrs] type declarator, ...;`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Typedef {
    #[serde(rename = "type")]
    pub ty: Type,
    pub attrs: TypeAttr,
    pub declarators: Vec<Declarator>,
}

/// Hex SHA-256 of `text`
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

impl Typedef {
    /// Assign a tag to a struct, union or enum; clears it on other kinds.
    ///
    /// The tag comes from the first plain declarator, else the first
    /// declarator, else a hash of the whole statement.
    pub fn set_tag_name(&mut self) -> bool {
        if !self.ty.is(Kind::Tag) {
            self.ty.tag.clear();
            return false;
        }
        if !self.ty.tag.is_empty() {
            return true;
        }

        let tag = self
            .declarators
            .iter()
            .find(|d| d.ty.is_none())
            .or_else(|| self.declarators.first())
            .map(|d| d.name.clone());

        self.ty.tag = match tag {
            Some(tag) => tag,
            // serializing plain data cannot fail
            None => content_hash(&serde_json::to_string(&*self).unwrap_or_default()),
        };
        true
    }

    /// Expand into exported symbols, tagged type first.
    pub fn to_exports(mut self) -> Result<Vec<Export>, BuildError> {
        let mut ret = Vec::new();

        // void * context handles drop the indirection
        if self.attrs.usage.context_handle {
            for decl in &mut self.declarators {
                if let Some(ty) = decl.ty.take() {
                    decl.ty = if ty.is(Kind::Pointer) {
                        ty.elem.map(|elem| *elem)
                    } else {
                        Some(ty)
                    };
                }
            }
        }

        if let Some(decl) = self.declarators.iter().find(|d| d.ty.is_none()) {
            self.attrs.alias = decl.name.clone();
        }

        if self.set_tag_name() {
            let aliases = self
                .declarators
                .iter()
                .filter(|d| d.ty.is_none())
                .map(|d| d.name.clone())
                .collect();
            ret.push(Export {
                aliases,
                ..Export::of_type(self.ty.type_name(), self.ty.clone())
            });
        }

        // in `typedef X *PY, Y, Z, *PZ;` PY aliases Y and PZ aliases Z
        let mut alias = self.attrs.alias.clone();

        for decl in self.declarators {
            let head = match decl.ty {
                None => {
                    alias = decl.name.clone();
                    None
                }
                Some(ty) if !alias.is_empty() => {
                    let inner = Type::attribute(self.attrs.clone().with_alias(alias.clone()));
                    Some(ty.append(inner)?)
                }
                Some(ty) => Some(ty),
            };

            let mut outer = Type::attribute(self.attrs.clone().with_alias(decl.name.clone()));
            outer.elem = head.map(Box::new);

            ret.push(Export::of_type(decl.name, outer.append(self.ty.clone())?));
        }

        Ok(ret)
    }
}

/// Fill in each field's `switch_type` from its own type or from the field
/// its `switch_is` names.
pub fn set_switch_type(fields: &mut [Field]) {
    for i in 0..fields.len() {
        let field = &fields[i];
        if field.attrs.switch_is.is_empty() || field.attrs.switch_type.is_some() {
            continue;
        }

        if let Some(switch_type) = field
            .ty
            .attrs
            .as_ref()
            .and_then(|attrs| attrs.switch_type.clone())
        {
            fields[i].attrs.switch_type = Some(switch_type);
            continue;
        }

        let Some(name) = field.attrs.switch_is.ident_name() else {
            continue;
        };
        let switch_type = fields
            .iter()
            .rev()
            .find(|f| f.name == name)
            .map(|f| Box::new(f.ty.clone()));
        if switch_type.is_some() {
            fields[i].attrs.switch_type = switch_type;
        }
    }
}
