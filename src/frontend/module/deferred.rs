//! 前向引用
//!
//! 解析过程中遇到尚未定义的类型名时，先生成按名引用的 `Ref` 节点并把
//! 名字记入待解析表。文件解析结束后 [`Deferred::resolve`] 逐个重新查找，
//! 得到的 [`Resolution`] 再把整棵声明树改写为规范名字，生成新树而不是
//! 原地修改共享节点。

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{File, ModuleError};
use crate::frontend::types::{
    DispatchInterface, Export, Field, Func, Interface, Kind, Library, Operation, Param, Struct,
    Type, TypeAttr, TypeStore, Union, UnionCase, UnionSwitch,
};

const STRUCT_TAG: &str = "_struct_";
const UNION_TAG: &str = "_union_";

/// Pending type references of one parse, keyed by name
#[derive(Debug, Clone, Default)]
pub struct Deferred {
    /// name -> line of first use
    pending: IndexMap<String, usize>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as pending and return the reference node standing in
    /// for it.
    pub fn defer(
        &mut self,
        name: impl Into<String>,
        line: usize,
    ) -> Type {
        let name = name.into();
        tracing::trace!("defer '{}' (line {})", name, line);
        self.pending.entry(name.clone()).or_insert(line);
        Type::reference(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.pending.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve every pending name against `store`.
    ///
    /// `_struct_X` that is not found is retried as `_union_X`. The first
    /// name that still cannot be found is an error.
    pub fn resolve(
        &self,
        store: &dyn TypeStore,
    ) -> Result<Resolution, ModuleError> {
        let mut renames = HashMap::new();

        for (name, &line) in &self.pending {
            if store.lookup_type(name).is_some() {
                continue;
            }
            let fallback = name
                .strip_prefix(STRUCT_TAG)
                .map(|tag| format!("{}{}", UNION_TAG, tag))
                .filter(|alt| store.lookup_type(alt).is_some());
            match fallback {
                Some(alt) => {
                    tracing::debug!("deferred '{}' resolved as '{}'", name, alt);
                    renames.insert(name.clone(), alt);
                }
                None => {
                    return Err(ModuleError::Unresolved {
                        name: name.clone(),
                        line,
                    });
                }
            }
        }

        tracing::debug!(
            "resolved {} deferred references ({} renamed)",
            self.pending.len(),
            renames.len()
        );
        Ok(Resolution { renames })
    }
}

/// Canonical names for the deferred references of one parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    renames: HashMap<String, String>,
}

impl Resolution {
    /// Canonical name of a resolved reference
    pub fn canonical<'a>(
        &'a self,
        name: &'a str,
    ) -> &'a str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Rewrite every `Ref` node in the tree to its canonical name
    pub fn rewrite_type(
        &self,
        mut ty: Type,
    ) -> Type {
        if ty.is(Kind::Ref) {
            if let Some(name) = self.renames.get(&ty.name) {
                ty.name = name.clone();
            }
        }
        ty.elem = ty.elem.map(|elem| Box::new(self.rewrite_type(*elem)));
        ty.func = ty.func.map(|func| Func {
            params: self.rewrite_params(func.params),
        });
        ty.structure = ty.structure.map(|s| Struct {
            fields: self.rewrite_fields(s.fields),
        });
        ty.union = ty.union.map(|u| self.rewrite_union(u));
        ty.attrs = ty.attrs.map(|attrs| self.rewrite_type_attr(attrs));
        ty
    }

    fn rewrite_boxed(
        &self,
        ty: Option<Box<Type>>,
    ) -> Option<Box<Type>> {
        ty.map(|ty| Box::new(self.rewrite_type(*ty)))
    }

    fn rewrite_type_attr(
        &self,
        mut attrs: TypeAttr,
    ) -> TypeAttr {
        attrs.transmit_as = self.rewrite_boxed(attrs.transmit_as);
        attrs.switch_type = self.rewrite_boxed(attrs.switch_type);
        attrs
    }

    fn rewrite_union(
        &self,
        u: Union,
    ) -> Union {
        Union {
            body: u
                .body
                .into_iter()
                .map(|case| UnionCase {
                    arms: self.rewrite_fields(case.arms),
                    ..case
                })
                .collect(),
            switch: u.switch.map(|switch| UnionSwitch {
                ty: Box::new(self.rewrite_type(*switch.ty)),
                ..switch
            }),
        }
    }

    fn rewrite_fields(
        &self,
        fields: Vec<Field>,
    ) -> Vec<Field> {
        fields
            .into_iter()
            .map(|mut f| {
                f.ty = self.rewrite_type(f.ty);
                f.attrs.switch_type = self.rewrite_boxed(f.attrs.switch_type);
                f.attrs.safearray = self.rewrite_boxed(f.attrs.safearray);
                f
            })
            .collect()
    }

    fn rewrite_params(
        &self,
        params: Vec<Param>,
    ) -> Vec<Param> {
        params
            .into_iter()
            .map(|mut p| {
                p.ty = self.rewrite_type(p.ty);
                p.attrs.field.switch_type = self.rewrite_boxed(p.attrs.field.switch_type);
                p.attrs.field.safearray = self.rewrite_boxed(p.attrs.field.safearray);
                p
            })
            .collect()
    }

    fn rewrite_operation(
        &self,
        op: Operation,
    ) -> Operation {
        Operation {
            ty: self.rewrite_type(op.ty),
            params: self.rewrite_params(op.params),
            ..op
        }
    }

    fn rewrite_exports(
        &self,
        exports: IndexMap<String, Export>,
    ) -> IndexMap<String, Export> {
        exports
            .into_iter()
            .map(|(name, mut export)| {
                export.ty = export.ty.map(|ty| self.rewrite_type(ty));
                (name, export)
            })
            .collect()
    }

    fn rewrite_interface(
        &self,
        mut iface: Interface,
    ) -> Interface {
        iface.body.export = self.rewrite_exports(iface.body.export);
        iface.body.operations = iface
            .body
            .operations
            .into_iter()
            .map(|op| self.rewrite_operation(op))
            .collect();
        iface
    }

    fn rewrite_dispatch_interface(
        &self,
        mut disp: DispatchInterface,
    ) -> DispatchInterface {
        disp.properties = self.rewrite_fields(disp.properties);
        disp.methods = disp
            .methods
            .into_iter()
            .map(|op| self.rewrite_operation(op))
            .collect();
        disp
    }

    fn rewrite_library(
        &self,
        mut lib: Library,
    ) -> Library {
        lib.interfaces = lib
            .interfaces
            .into_iter()
            .map(|i| self.rewrite_interface(i))
            .collect();
        lib.dispatch_interfaces = lib
            .dispatch_interfaces
            .into_iter()
            .map(|d| self.rewrite_dispatch_interface(d))
            .collect();
        lib
    }

    /// Rewrite every declaration of a parsed file
    pub fn rewrite_file(
        &self,
        mut file: File,
    ) -> File {
        if self.is_empty() {
            return file;
        }
        file.export = self.rewrite_exports(file.export);
        file.interfaces = file
            .interfaces
            .into_iter()
            .map(|i| self.rewrite_interface(i))
            .collect();
        file.dispatch_interfaces = file
            .dispatch_interfaces
            .into_iter()
            .map(|d| self.rewrite_dispatch_interface(d))
            .collect();
        file.libraries = file
            .libraries
            .into_iter()
            .map(|l| self.rewrite_library(l))
            .collect();
        file
    }
}
