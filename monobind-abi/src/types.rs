// Type vocabulary shared by the generator and the runtime bridge.

use serde::{Deserialize, Serialize};

use crate::handles::ObjectRef;

/// Value types that cross the boundary by pointer and come back boxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl PrimitiveType {
    /// Keyword the runtime's method descriptor parser expects.
    pub fn descriptor_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::I8 => "sbyte",
            PrimitiveType::U8 => "byte",
            PrimitiveType::I16 => "short",
            PrimitiveType::U16 => "ushort",
            PrimitiveType::I32 => "int",
            PrimitiveType::U32 => "uint",
            PrimitiveType::I64 => "long",
            PrimitiveType::U64 => "ulong",
            PrimitiveType::F32 => "single",
            PrimitiveType::F64 => "double",
        }
    }

    /// Zero value of this type.
    pub fn default_value(self) -> Primitive {
        match self {
            PrimitiveType::Bool => Primitive::Bool(false),
            PrimitiveType::Char => Primitive::Char(0),
            PrimitiveType::I8 => Primitive::I8(0),
            PrimitiveType::U8 => Primitive::U8(0),
            PrimitiveType::I16 => Primitive::I16(0),
            PrimitiveType::U16 => Primitive::U16(0),
            PrimitiveType::I32 => Primitive::I32(0),
            PrimitiveType::U32 => Primitive::U32(0),
            PrimitiveType::I64 => Primitive::I64(0),
            PrimitiveType::U64 => Primitive::U64(0),
            PrimitiveType::F32 => Primitive::F32(0.0),
            PrimitiveType::F64 => Primitive::F64(0.0),
        }
    }
}

/// A parameter or return type from the symbol table.
///
/// Serialized as a bare keyword (`"i32"`, `"string"`, `"void"`) or, for class
/// references, as `{ "object": "Ns.Class" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Void,
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    /// Reference to a managed class, by dotted qualified name.
    Object(String),
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        Some(match self {
            TypeRef::Bool => PrimitiveType::Bool,
            TypeRef::Char => PrimitiveType::Char,
            TypeRef::I8 => PrimitiveType::I8,
            TypeRef::U8 => PrimitiveType::U8,
            TypeRef::I16 => PrimitiveType::I16,
            TypeRef::U16 => PrimitiveType::U16,
            TypeRef::I32 => PrimitiveType::I32,
            TypeRef::U32 => PrimitiveType::U32,
            TypeRef::I64 => PrimitiveType::I64,
            TypeRef::U64 => PrimitiveType::U64,
            TypeRef::F32 => PrimitiveType::F32,
            TypeRef::F64 => PrimitiveType::F64,
            TypeRef::Void | TypeRef::String | TypeRef::Object(_) => return None,
        })
    }

    /// Qualified class name for object references.
    pub fn object_class(&self) -> Option<&str> {
        match self {
            TypeRef::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Name used inside a method descriptor (`int`, `string`, `Ns.Class`).
    pub fn descriptor_name(&self) -> &str {
        match self {
            TypeRef::Void => "void",
            TypeRef::String => "string",
            TypeRef::Object(name) => name,
            other => other
                .primitive()
                .map(PrimitiveType::descriptor_name)
                .unwrap_or("void"),
        }
    }
}

/// How a method is called across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Allocates a proxy and runs the managed `.ctor` on a fresh object.
    Constructor,
    /// Called on the object behind a proxy's boundary handle.
    Instance,
    /// No receiver.
    Static,
}

impl MethodKind {
    /// Invoked on an object: the caller's receiver, or the fresh instance a
    /// constructor allocates.
    pub fn has_receiver(self) -> bool {
        !matches!(self, MethodKind::Static)
    }
}

/// What a thunk does when resolution fails or the managed method throws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Degrade to the return type's default value with no signal.
    #[default]
    Silent,
    /// Report the failure: a status out-parameter in C, `Err` in Rust.
    Status,
}

/// A primitive value in its runtime representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Char(u16),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Primitive {
    pub fn ty(self) -> PrimitiveType {
        match self {
            Primitive::Bool(_) => PrimitiveType::Bool,
            Primitive::Char(_) => PrimitiveType::Char,
            Primitive::I8(_) => PrimitiveType::I8,
            Primitive::U8(_) => PrimitiveType::U8,
            Primitive::I16(_) => PrimitiveType::I16,
            Primitive::U16(_) => PrimitiveType::U16,
            Primitive::I32(_) => PrimitiveType::I32,
            Primitive::U32(_) => PrimitiveType::U32,
            Primitive::I64(_) => PrimitiveType::I64,
            Primitive::U64(_) => PrimitiveType::U64,
            Primitive::F32(_) => PrimitiveType::F32,
            Primitive::F64(_) => PrimitiveType::F64,
        }
    }
}

/// One slot of the positional argument vector passed to `invoke`.
///
/// Value types travel by value (the runtime reads them through a pointer);
/// reference types travel as object references, null included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManagedArg {
    Value(Primitive),
    Object(ObjectRef),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ref_parses_keywords_and_objects() {
        let types: Vec<TypeRef> =
            serde_json::from_str(r#"["i32", "string", "void", {"object": "Ns.Counter"}]"#).unwrap();
        assert_eq!(
            types,
            vec![
                TypeRef::I32,
                TypeRef::String,
                TypeRef::Void,
                TypeRef::Object("Ns.Counter".into()),
            ]
        );
    }

    #[test]
    fn descriptor_names_follow_runtime_keywords() {
        assert_eq!(TypeRef::I32.descriptor_name(), "int");
        assert_eq!(TypeRef::U64.descriptor_name(), "ulong");
        assert_eq!(TypeRef::F32.descriptor_name(), "single");
        assert_eq!(TypeRef::String.descriptor_name(), "string");
        assert_eq!(TypeRef::Object("A.B".into()).descriptor_name(), "A.B");
    }

    #[test]
    fn only_static_methods_lack_a_receiver() {
        assert!(MethodKind::Constructor.has_receiver());
        assert!(MethodKind::Instance.has_receiver());
        assert!(!MethodKind::Static.has_receiver());
    }

    #[test]
    fn error_policy_defaults_to_silent() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Silent);
        let p: ErrorPolicy = serde_json::from_str("\"status\"").unwrap();
        assert_eq!(p, ErrorPolicy::Status);
    }
}
