//! 作用域与布局解析
//!
//! 把一个字段（或参数）的声明链与它的大小族属性对应起来：链上每个位置
//! 是否是数组、边界表达式是什么、是否是字符串、指针解引用深度是多少。
//!
//! # 步骤
//!
//! 1. 展开 `Ref` 节点，在属性包装处把链切分为作用域
//! 2. 指针编号（外层到内层，连续指针从 1 计数）
//! 3. 维度分配：非定长数组直接取下一个 `Dim`；指针在仍需数组时在其后插入
//!    一个合成数组；不带任何边界的 `Dim` 只占位
//! 4. 剩余的只含 varying 边界的 `Dim` 交给没有维度的定长数组
//! 5. 字符串检测（内层到外层）
//! 6. 维度编号，并重新计算指针深度

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

use crate::frontend::types::{
    Dim, Field, FieldAttr, Kind, Param, PointerType, Type, TypeAttr, TypeStore,
};

/// `Ref` expansions allowed along one chain
const MAX_EXPANSION: usize = 64;

/// Layout resolution error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unresolved type reference '{0}'")]
    Unresolved(String),

    #[error("type reference '{0}' expands recursively")]
    Recursive(String),
}

/// One position of a declarator chain
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScopedType {
    /// The chain node, without its `elem`
    #[serde(rename = "type")]
    pub ty: Type,
    /// Bounds of an array position
    pub dim: Dim,
    /// Zero-based index inside a contiguous run of arrays
    pub dimension: usize,
    /// 1-based dereference depth of a pointer position, 0 elsewhere
    pub pointer_depth: usize,
    pub is_string: bool,
    /// Array inferred from a size attribute on the preceding pointer
    pub synthetic: bool,
}

impl ScopedType {
    fn new(ty: Type) -> Self {
        Self {
            ty,
            ..Self::default()
        }
    }

    fn synthetic(dim: Dim) -> Self {
        Self {
            ty: Type::new(Kind::Array),
            dim,
            synthetic: true,
            ..Self::default()
        }
    }

    pub fn is(
        &self,
        kind: Kind,
    ) -> bool {
        self.ty.is(kind)
    }

    pub fn is_array(&self) -> bool {
        self.ty.is(Kind::Array)
    }

    pub fn is_pointer(&self) -> bool {
        self.ty.is(Kind::Pointer)
    }

    /// Declared fixed-size array
    pub fn is_fixed_array(&self) -> bool {
        self.is_array() && self.ty.array.as_ref().is_some_and(|a| a.is_fixed())
    }
}

/// A run of positions sharing one merged attribute
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scope {
    pub attrs: TypeAttr,
    pub types: Vec<ScopedType>,
}

/// Resolved layout of one field or parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub scopes: Vec<Scope>,
}

impl Layout {
    /// Every position, outer to inner
    pub fn types(&self) -> impl Iterator<Item = &ScopedType> {
        self.scopes.iter().flat_map(|s| s.types.iter())
    }

    /// The innermost position
    pub fn base(&self) -> Option<&ScopedType> {
        self.types().last()
    }

    pub fn arrays(&self) -> impl Iterator<Item = &ScopedType> {
        self.types().filter(|t| t.is_array())
    }

    pub fn is_string(&self) -> bool {
        self.types().any(|t| t.is_string)
    }

    /// Deepest pointer position
    pub fn pointer_depth(&self) -> usize {
        self.types().map(|t| t.pointer_depth).max().unwrap_or(0)
    }
}

/// Working slot: a position plus the scope it belongs to
#[derive(Debug)]
struct Slot {
    scope: usize,
    st: ScopedType,
}

pub fn field_layout(
    store: &dyn TypeStore,
    field: &Field,
) -> Result<Layout, LayoutError> {
    tracing::trace!("layout of field '{}'", field.name);
    layout(store, &field.ty, &field.attrs)
}

pub fn param_layout(
    store: &dyn TypeStore,
    param: &Param,
) -> Result<Layout, LayoutError> {
    tracing::trace!("layout of parameter '{}'", param.name);
    layout(store, &param.ty, &param.attrs.field)
}

/// Resolve the layout of a declarator chain under `attrs`
pub fn layout(
    store: &dyn TypeStore,
    ty: &Type,
    attrs: &FieldAttr,
) -> Result<Layout, LayoutError> {
    let mut nodes = Vec::new();
    expand(store, ty, &mut nodes, 0)?;

    let (mut scopes, mut slots) = split(attrs.type_attr(), nodes);

    number_pointers(&mut slots);
    assign_dims(&mut slots, attrs.dim());

    let known_string = attrs.usage.is_string || scopes.iter().any(|s| s.attrs.usage.is_string);
    detect_string(&mut slots, &scopes, known_string);

    number_dimensions(&mut slots);
    number_pointers(&mut slots);

    for slot in slots {
        scopes[slot.scope].types.push(slot.st);
    }
    let ret = Layout { scopes };
    tracing::trace!(
        "{} scopes, {} arrays, pointer depth {}",
        ret.scopes.len(),
        ret.arrays().count(),
        ret.pointer_depth()
    );
    Ok(ret)
}

/// Flatten the chain, splicing in the chains of referenced typedefs
fn expand(
    store: &dyn TypeStore,
    ty: &Type,
    out: &mut Vec<Type>,
    depth: usize,
) -> Result<(), LayoutError> {
    for node in ty.flat() {
        if !node.is(Kind::Ref) {
            out.push(node);
            continue;
        }
        if depth >= MAX_EXPANSION {
            return Err(LayoutError::Recursive(node.name));
        }
        let resolved = store
            .lookup_type(&node.name)
            .ok_or_else(|| LayoutError::Unresolved(node.name.clone()))?;
        expand(store, &resolved, out, depth + 1)?;
    }
    Ok(())
}

/// Split at attribute wrappers; consecutive wrappers merge into one
/// boundary, wrappers before the first position merge into the first scope.
fn split(
    first: TypeAttr,
    nodes: Vec<Type>,
) -> (Vec<Scope>, Vec<Slot>) {
    let mut scopes = vec![Scope {
        attrs: first,
        types: Vec::new(),
    }];
    let mut slots: Vec<Slot> = Vec::new();
    let mut pending: Option<TypeAttr> = None;

    for node in nodes {
        if node.is(Kind::Attribute) {
            let attrs = node.attrs.unwrap_or_default();
            pending = Some(match pending {
                Some(prev) => prev.merge(&attrs),
                None => attrs,
            });
            continue;
        }

        if let Some(attrs) = pending.take() {
            let current = scopes.len() - 1;
            if slots.iter().any(|s| s.scope == current) {
                scopes.push(Scope {
                    attrs,
                    types: Vec::new(),
                });
            } else {
                scopes[current].attrs = scopes[current].attrs.merge(&attrs);
            }
        }

        slots.push(Slot {
            scope: scopes.len() - 1,
            st: ScopedType::new(node),
        });
    }

    (scopes, slots)
}

/// 1-based depth inside each run of pointers, outer to inner. Synthetic
/// arrays do not break a run.
fn number_pointers(slots: &mut [Slot]) {
    let mut run = 0;
    for slot in slots.iter_mut() {
        if slot.st.is_pointer() {
            run += 1;
            slot.st.pointer_depth = run;
        } else if !slot.st.synthetic {
            run = 0;
        }
    }
}

fn assign_dims(
    slots: &mut Vec<Slot>,
    dims: Vec<Dim>,
) {
    let mut dims: VecDeque<Dim> = dims.into();
    let declared = slots
        .iter()
        .filter(|s| s.st.is_array() && !s.st.is_fixed_array())
        .count();
    // dimensions left for pointers once declared arrays take theirs
    let mut needed = dims.len().saturating_sub(declared);

    let mut i = 0;
    while i < slots.len() && !dims.is_empty() {
        let st = &slots[i].st;
        if st.is_array() && !st.is_fixed_array() {
            if let Some(dim) = dims.pop_front() {
                slots[i].st.dim = dim;
            }
        } else if st.is_pointer() && needed > 0 {
            needed -= 1;
            if let Some(dim) = dims.pop_front().filter(|d| !d.is_empty()) {
                let scope = slots[i].scope;
                slots.insert(
                    i + 1,
                    Slot {
                        scope,
                        st: ScopedType::synthetic(dim),
                    },
                );
                i += 1;
            }
        }
        i += 1;
    }

    // length_is on a fixed array
    for slot in slots.iter_mut() {
        if dims.is_empty() {
            break;
        }
        if slot.st.is_fixed_array()
            && slot.st.dim.is_empty()
            && dims.front().is_some_and(|d| !d.is_conformant())
        {
            if let Some(dim) = dims.pop_front() {
                slot.st.dim = dim;
            }
        }
    }
}

/// Mark the position wrapping the innermost character run as a string.
///
/// Without an explicit `string` attribute a `ref` pointer or a fixed array
/// is a plain buffer.
fn detect_string(
    slots: &mut [Slot],
    scopes: &[Scope],
    known_string: bool,
) {
    let mut is_string = false;
    for slot in slots.iter_mut().rev() {
        let st = &mut slot.st;
        if st.ty.kind.is_char_like() {
            is_string = true;
            continue;
        }
        if st.is_pointer() || st.is_array() {
            if is_string {
                let buffer = !known_string
                    && if st.is_pointer() {
                        scopes[slot.scope].attrs.pointer == PointerType::Ref
                    } else {
                        st.is_fixed_array()
                    };
                st.is_string = !buffer;
                is_string = false;
            }
            continue;
        }
        is_string = false;
    }
}

/// Zero-based index inside each contiguous run of arrays
fn number_dimensions(slots: &mut [Slot]) {
    let mut run = 0;
    for slot in slots.iter_mut() {
        if slot.st.is_array() {
            slot.st.dimension = run;
            run += 1;
        } else {
            run = 0;
        }
    }
}
