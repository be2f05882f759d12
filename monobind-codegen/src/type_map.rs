// Managed type → C type mapping for the definitions surface.

use monobind_abi::{PrimitiveType, TypeRef};

use crate::naming;

/// Mapped type information for code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// C type as a thunk parameter (e.g. "int32_t", "const char*", "Ns_Counter*").
    pub c_param_type: String,
    /// C type as a thunk return value (strings come back as owned `char*`).
    pub c_return_type: String,
    /// Literal returned when the call degrades.
    pub default_value: &'static str,
    pub conversion: ConversionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Nothing crosses the boundary.
    Void,
    /// Passed by address, returned boxed.
    Primitive(PrimitiveType),
    /// UTF-8 in, `MonoString*` on the managed side.
    String,
    /// Proxy on the native side, boundary handle target on the managed side.
    Object,
}

/// C spelling of a primitive.
pub fn c_primitive(ty: PrimitiveType) -> &'static str {
    match ty {
        PrimitiveType::Bool => "bool",
        PrimitiveType::Char => "uint16_t",
        PrimitiveType::I8 => "int8_t",
        PrimitiveType::U8 => "uint8_t",
        PrimitiveType::I16 => "int16_t",
        PrimitiveType::U16 => "uint16_t",
        PrimitiveType::I32 => "int32_t",
        PrimitiveType::U32 => "uint32_t",
        PrimitiveType::I64 => "int64_t",
        PrimitiveType::U64 => "uint64_t",
        PrimitiveType::F32 => "float",
        PrimitiveType::F64 => "double",
    }
}

/// Map a symbol-table type to its C representation.
pub fn map_type(ty: &TypeRef) -> MappedType {
    match ty {
        TypeRef::Void => MappedType {
            c_param_type: "void".into(),
            c_return_type: "void".into(),
            default_value: "",
            conversion: ConversionKind::Void,
        },
        TypeRef::String => MappedType {
            c_param_type: "const char*".into(),
            c_return_type: "char*".into(),
            default_value: "0",
            conversion: ConversionKind::String,
        },
        TypeRef::Object(class) => {
            let ptr = format!("{}*", naming::to_c_identity(class));
            MappedType {
                c_param_type: ptr.clone(),
                c_return_type: ptr,
                default_value: "0",
                conversion: ConversionKind::Object,
            }
        }
        other => {
            // Every remaining variant is a primitive.
            let prim = other.primitive().unwrap_or(PrimitiveType::I32);
            let c = c_primitive(prim);
            MappedType {
                c_param_type: c.into(),
                c_return_type: c.into(),
                default_value: if prim == PrimitiveType::Bool { "false" } else { "0" },
                conversion: ConversionKind::Primitive(prim),
            }
        }
    }
}
