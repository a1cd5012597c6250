//! 基础类型文件
//!
//! 常用 Windows 类型别名和句柄类型，在任何 IDL 文件之前登记。

use super::File;
use crate::frontend::types::{Array, Export, Field, Kind, Struct, Type, TypeAttr, Usage};

/// Registry path of the built-in declarations
pub const BOOTSTRAP_PATH: &str = "<bootstrap>";

const SCALARS: &[(&str, Kind)] = &[
    ("handle_t", Kind::Handle),
    ("error_status_t", Kind::Error),
    ("wchar_t", Kind::WChar),
    ("BOOLEAN", Kind::Uint8),
    ("BYTE", Kind::Uint8),
    ("UCHAR", Kind::UChar),
    ("CHAR", Kind::Char),
    ("WCHAR", Kind::WChar),
    ("SHORT", Kind::Int16),
    ("USHORT", Kind::Uint16),
    ("WORD", Kind::Uint16),
    ("INT", Kind::Int32),
    ("UINT", Kind::Uint32),
    ("LONG", Kind::Int32),
    ("ULONG", Kind::Uint32),
    ("DWORD", Kind::Uint32),
    ("BOOL", Kind::Int32),
    ("HRESULT", Kind::Int32),
    ("HYPER", Kind::Int64),
    ("LONGLONG", Kind::Int64),
    ("ULONGLONG", Kind::Uint64),
    ("INT64", Kind::Int64),
    ("UINT64", Kind::Uint64),
    ("LONG64", Kind::Int64),
    ("ULONG64", Kind::Uint64),
    ("DWORD64", Kind::Uint64),
    ("LONG_PTR", Kind::Int3264),
    ("ULONG_PTR", Kind::Uint3264),
    ("FLOAT", Kind::Float32),
    ("DOUBLE", Kind::Float64),
];

/// `typedef [attrs] ty name;`
fn typedef(
    file: &mut File,
    name: &str,
    attrs: TypeAttr,
    ty: Type,
) {
    let ty = Type::attribute(attrs.with_alias(name)).with_elem(ty);
    file.export(Export::of_type(name, ty));
}

/// `typedef [string] kind *name;`
fn string_pointer(
    file: &mut File,
    name: &str,
    kind: Kind,
) {
    let attrs = TypeAttr {
        usage: Usage {
            is_string: true,
            ..Usage::default()
        },
        ..TypeAttr::default()
    };
    typedef(file, name, attrs, Type::pointer().with_elem(Type::new(kind)));
}

fn field(
    name: &str,
    ty: Type,
) -> Field {
    Field {
        name: name.to_string(),
        ty,
        ..Field::default()
    }
}

fn guid() -> Type {
    let mut ty = Type::new(Kind::Struct);
    ty.tag = "_GUID".to_string();
    ty.structure = Some(Struct {
        fields: vec![
            field("Data1", Type::new(Kind::Uint32)),
            field("Data2", Type::new(Kind::Uint16)),
            field("Data3", Type::new(Kind::Uint16)),
            field(
                "Data4",
                Type::array(Array::fixed(8)).with_elem(Type::new(Kind::Uint8)),
            ),
        ],
    });
    ty
}

/// Build the bootstrap file
pub fn bootstrap() -> File {
    let mut file = File::new(BOOTSTRAP_PATH);

    for &(name, kind) in SCALARS {
        typedef(&mut file, name, TypeAttr::default(), Type::named(kind, name));
    }

    string_pointer(&mut file, "LPSTR", Kind::Char);
    string_pointer(&mut file, "LPCSTR", Kind::Char);
    string_pointer(&mut file, "LPWSTR", Kind::WChar);
    string_pointer(&mut file, "LPCWSTR", Kind::WChar);

    // typedef struct _GUID { ... } GUID, UUID;
    let guid = guid();
    let mut tagged = Export::of_type(guid.type_name(), guid.clone());
    tagged.aliases = vec!["GUID".to_string(), "UUID".to_string()];
    file.export(tagged);
    typedef(&mut file, "GUID", TypeAttr::default(), guid.clone());
    typedef(&mut file, "UUID", TypeAttr::default(), guid);

    tracing::trace!("bootstrap: {} exports", file.export.len());
    file
}
