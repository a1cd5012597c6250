//! 类型模型单元测试

use crate::frontend::expr::Expr;
use crate::frontend::types::*;
use indexmap::IndexMap;

#[cfg(test)]
mod merge_tests {
    use super::*;

    fn with_pointer(pointer: PointerType) -> TypeAttr {
        TypeAttr {
            pointer,
            ..TypeAttr::default()
        }
    }

    #[test]
    fn test_weak_ref_never_overrides() {
        let ret = with_pointer(PointerType::Ref).merge(&with_pointer(PointerType::RefWeak));
        assert_eq!(ret.pointer, PointerType::Ref);
        assert!(ret.pointers.is_empty());

        let ret = with_pointer(PointerType::Unique).merge(&with_pointer(PointerType::RefWeak));
        assert_eq!(ret.pointer, PointerType::Unique);
    }

    #[test]
    fn test_weak_ref_fills_empty_slot_as_ref() {
        let ret = TypeAttr::default().merge(&with_pointer(PointerType::RefWeak));
        assert_eq!(ret.pointer, PointerType::Ref);
    }

    #[test]
    fn test_explicit_pointer_overrides_and_records_history() {
        let ret = with_pointer(PointerType::Ref).merge(&with_pointer(PointerType::Unique));
        assert_eq!(ret.pointer, PointerType::Unique);
        assert_eq!(ret.pointers, vec![PointerType::Ref]);
    }

    #[test]
    fn test_empty_other_keeps_pointer() {
        let ret = with_pointer(PointerType::Ptr).merge(&TypeAttr::default());
        assert_eq!(ret.pointer, PointerType::Ptr);
        assert!(ret.pointers.is_empty());
    }

    #[test]
    fn test_alias_history() {
        let a = TypeAttr::default().with_alias("A");
        let ret = a.merge(&TypeAttr::default().with_alias("B"));
        assert_eq!(ret.alias, "B");
        assert_eq!(ret.names, vec!["A".to_string()]);

        // same alias is not recorded twice
        let ret = ret.merge(&TypeAttr::default().with_alias("B"));
        assert_eq!(ret.names, vec!["A".to_string()]);
    }

    #[test]
    fn test_merge_is_right_biased() {
        let left = TypeAttr {
            wire_marshal: "L".into(),
            pad: 2,
            range: Some(Range { min: 0, max: 1 }),
            ..TypeAttr::default()
        };
        let right = TypeAttr {
            wire_marshal: "R".into(),
            handle: true,
            ..TypeAttr::default()
        };
        let ret = left.merge(&right);
        assert_eq!(ret.wire_marshal, "R");
        assert_eq!(ret.pad, 2);
        assert_eq!(ret.range, Some(Range { min: 0, max: 1 }));
        assert!(ret.handle);
        // receiver untouched
        assert_eq!(left.wire_marshal, "L");
    }

    #[test]
    fn test_enum_type() {
        assert_eq!(TypeAttr::default().enum_type(), Kind::Uint16);
        let v1 = TypeAttr {
            v1_enum: true,
            ..TypeAttr::default()
        };
        assert_eq!(v1.enum_type(), Kind::Uint32);
    }
}

#[cfg(test)]
mod field_attr_tests {
    use super::*;

    #[test]
    fn test_dim_zips_lists() {
        let attr = FieldAttr {
            size_is: vec![Expr::ident("a"), Expr::ident("b")],
            length_is: vec![Expr::ident("c")],
            ..FieldAttr::default()
        };
        let dims = attr.dim();
        assert_eq!(dims.len(), 2);
        assert_eq!(dims[0].size_is, Expr::ident("a"));
        assert_eq!(dims[0].length_is, Expr::ident("c"));
        assert_eq!(dims[1].size_is, Expr::ident("b"));
        assert!(dims[1].length_is.is_empty());
        assert!(dims[0].is_conformant() && dims[0].is_varying());
        assert!(!dims[1].is_varying());
    }

    #[test]
    fn test_dim_placeholder_is_empty() {
        let attr = FieldAttr {
            size_is: vec![Expr::default(), Expr::ident("n")],
            ..FieldAttr::default()
        };
        let dims = attr.dim();
        assert!(dims[0].is_empty());
        assert!(!dims[1].is_empty());
    }

    #[test]
    fn test_no_size_limit_makes_one_dim() {
        let attr = FieldAttr {
            no_size_limit: true,
            ..FieldAttr::default()
        };
        let dims = attr.dim();
        assert_eq!(dims.len(), 1);
        assert!(!dims[0].is_empty());
        assert!(FieldAttr::default().dim().is_empty());
    }

    #[test]
    fn test_size_attr() {
        assert!(FieldAttr::default().size_attr().is_none());
        let attr = FieldAttr {
            max_is: vec![Expr::value(10)],
            ..FieldAttr::default()
        };
        let size = attr.size_attr().unwrap();
        assert_eq!(size.max_is.len(), 1);
        assert!(size.size_is.is_empty());
    }

    #[test]
    fn test_type_attr_projection() {
        let attr = FieldAttr {
            pointer: PointerType::Unique,
            usage: Usage {
                is_string: true,
                ..Usage::default()
            },
            ..FieldAttr::default()
        };
        let ta = attr.type_attr();
        assert_eq!(ta.pointer, PointerType::Unique);
        assert!(ta.usage.is_string);
        assert!(ta.alias.is_empty());
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;

    #[test]
    fn test_append_extends_terminal_wrapper() {
        let chain = Type::pointer()
            .append(Type::pointer())
            .unwrap()
            .append(Type::new(Kind::Char))
            .unwrap();
        let kinds: Vec<Kind> = chain.flat().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Kind::Pointer, Kind::Pointer, Kind::Char]);
        assert_eq!(chain.base().kind, Kind::Char);
        assert!(chain.flat().iter().all(|t| t.elem.is_none()));
    }

    #[test]
    fn test_append_rejects_non_wrapper_terminal() {
        let chain = Type::pointer().with_elem(Type::new(Kind::Int32));
        assert_eq!(
            chain.append(Type::new(Kind::Char)),
            Err(BuildError::InvalidAppend(Kind::Int32))
        );
    }

    #[test]
    fn test_append_chain_on_empty_head() {
        let ret = Type::append_chain(None, Type::new(Kind::Int8)).unwrap();
        assert_eq!(ret.kind, Kind::Int8);
    }

    #[test]
    fn test_tag_kind() {
        assert!(Type::new(Kind::Struct).is(Kind::Tag));
        assert!(Type::new(Kind::CUnion).is(Kind::Tag));
        assert!(!Type::new(Kind::Pointer).is(Kind::Tag));
    }

    #[test]
    fn test_type_name() {
        let mut t = Type::new(Kind::Union);
        t.tag = "U".into();
        assert_eq!(t.type_name(), "_union_U");
        assert_eq!(tag_name(Kind::CUnion, "C"), "_c_union_C");
        assert_eq!(Type::named(Kind::Int32, "LONG").type_name(), "LONG");
        assert_eq!(Type::pointer().type_name(), "UNKNOWN");
    }

    #[test]
    fn test_primitives() {
        assert!(Type::new(Kind::Int3264).is_primitive());
        assert!(!Type::new(Kind::Handle).is_primitive());
        assert_eq!(primitive_type_size(Kind::WChar), 2);
        assert_eq!(primitive_type_size(Kind::Uint3264), 5);
        assert_eq!(primitive_type_size(Kind::Struct), 0);
    }
}

#[cfg(test)]
mod size_tests {
    use super::*;

    fn empty() -> IndexMap<String, Type> {
        IndexMap::new()
    }

    fn field(ty: Type) -> Field {
        Field {
            ty,
            ..Field::default()
        }
    }

    #[test]
    fn test_struct_size() {
        let s = Type {
            kind: Kind::Struct,
            structure: Some(Struct {
                fields: vec![
                    field(Type::new(Kind::Int32)),
                    field(Type::new(Kind::Uint16)),
                    field(Type::array(Array::fixed(4)).with_elem(Type::new(Kind::Uint8))),
                ],
            }),
            ..Type::default()
        };
        assert_eq!(type_size(&empty(), &s), 10);
    }

    #[test]
    fn test_conformant_member_has_no_fixed_size() {
        let s = Type {
            kind: Kind::Struct,
            structure: Some(Struct {
                fields: vec![
                    field(Type::new(Kind::Int32)),
                    field(Type::array(Array::conformant()).with_elem(Type::new(Kind::Uint8))),
                ],
            }),
            ..Type::default()
        };
        assert_eq!(type_size(&empty(), &s), 0);
    }

    #[test]
    fn test_ref_goes_through_store() {
        let mut store = empty();
        store.insert(
            "DWORD".to_string(),
            Type::attribute(TypeAttr::default()).with_elem(Type::new(Kind::Uint32)),
        );
        assert_eq!(type_size(&store, &Type::reference("DWORD")), 4);
        assert_eq!(type_size(&store, &Type::reference("MISSING")), 0);
    }

    #[test]
    fn test_enum_size() {
        let mut e = Type::new(Kind::Enum);
        assert_eq!(type_size(&empty(), &e), 2);
        e.attrs = Some(TypeAttr {
            v1_enum: true,
            ..TypeAttr::default()
        });
        assert_eq!(type_size(&empty(), &e), 4);
    }

    #[test]
    fn test_oversized_array_has_no_fixed_size() {
        let huge = Type::array(Array::fixed(0x4000_0000_0000_0000)).with_elem(Type::new(Kind::Int64));
        assert_eq!(type_size(&empty(), &huge), 0);

        let bound = Array {
            bound: ArrayBound {
                lower: 0,
                upper: i64::MAX,
            },
        };
        assert_eq!(bound.size(), i64::MAX);
        let widest = Type::array(bound).with_elem(Type::new(Kind::Uint16));
        assert_eq!(type_size(&empty(), &widest), 0);
    }

    #[test]
    fn test_struct_size_overflow() {
        // each member is 2^63 bytes on 64-bit targets
        let half = || Type::array(Array::fixed(0x1000_0000_0000_0000)).with_elem(Type::new(Kind::Int64));
        let s = Type {
            kind: Kind::Struct,
            structure: Some(Struct {
                fields: vec![field(half()), field(half())],
            }),
            ..Type::default()
        };
        assert_eq!(type_size(&empty(), &s), 0);
    }
}

#[cfg(test)]
mod decl_tests {
    use super::*;

    #[test]
    fn test_operation_name() {
        let mut op = Operation {
            name: "Count".into(),
            ..Operation::default()
        };
        assert_eq!(op.name(), "Count");
        op.attrs.prop_get = true;
        assert_eq!(op.name(), "get_Count");
        op.attrs.prop_get = false;
        op.attrs.prop_put_ref = true;
        assert_eq!(op.name(), "putref_Count");
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version { major: 1, minor: 0 }.to_string(), "v1");
        assert_eq!(Version { major: 1, minor: 2 }.to_string(), "v1.2");
    }

    #[test]
    fn test_array_bounds() {
        assert!(Array::fixed(8).is_fixed());
        assert_eq!(Array::fixed(8).size(), 8);
        assert!(!Array::conformant().is_fixed());
    }

    #[test]
    fn test_handles() {
        let p = Param {
            ty: Type::attribute(TypeAttr::default()).with_elem(Type::new(Kind::Handle)),
            ..Param::default()
        };
        assert!(p.is_handle());
        let f = Field {
            ty: Type::new(Kind::Handle),
            ..Field::default()
        };
        assert!(f.is_handle());
        assert!(!Field::default().is_handle());
    }

    #[test]
    fn test_field_is_string() {
        let mut f = Field::default();
        assert!(!f.is_string());
        f.ty = Type::attribute(TypeAttr {
            usage: Usage {
                is_string: true,
                ..Usage::default()
            },
            ..TypeAttr::default()
        });
        assert!(f.is_string());
    }

    #[test]
    fn test_exports_sorted_by_position() {
        let mut body = InterfaceBody::default();
        for (position, name) in [(2, "b"), (0, "c"), (1, "a")] {
            body.export.insert(
                name.to_string(),
                Export {
                    position,
                    ..Export::of_type(name, Type::new(Kind::Int32))
                },
            );
        }
        let names: Vec<&str> = body.exports().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_interface_is_object() {
        let mut iface = Interface::default();
        assert!(!iface.is_object());
        iface.base_name = "IUnknown".into();
        assert!(iface.is_object());
    }

    #[test]
    fn test_serialize_type() {
        let t = Type::pointer().with_elem(Type::named(Kind::Int32, "LONG"));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["kind"], "pointer");
        assert_eq!(json["elem"]["name"], "LONG");
    }
}
