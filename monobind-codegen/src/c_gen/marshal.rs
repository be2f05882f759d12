// Per-value marshaling: native → managed for arguments, managed → native for
// results. Each conversion yields the statements that must run first and the
// final expression.

use monobind_abi::{PrimitiveType, TypeRef};

use crate::c_ir::CStmt;
use crate::naming::{self, generated_identifier};
use crate::type_map::{self, ConversionKind};

/// Output of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalContext {
    /// Native-side name the conversion started from.
    pub arg_name: String,
    /// Setup that must run before `ret` is used.
    pub support_before: Vec<CStmt>,
    /// Final expression.
    pub ret: String,
}

impl MarshalContext {
    fn new(arg_name: &str) -> Self {
        MarshalContext {
            arg_name: arg_name.to_string(),
            support_before: Vec::new(),
            ret: String::new(),
        }
    }
}

/// Convert a native argument into an argument-vector slot (`void*`).
pub fn to_managed(arg_name: &str, ty: &TypeRef) -> MarshalContext {
    let mut ctx = MarshalContext::new(arg_name);
    match type_map::map_type(ty).conversion {
        ConversionKind::Void => ctx.ret = "0".into(),
        ConversionKind::Primitive(PrimitiveType::Bool) => {
            // The runtime reads a one-byte MonoBoolean.
            let tmp = generated_identifier(&format!("{arg_name}_arg"));
            ctx.support_before.push(CStmt::decl("MonoBoolean", &tmp, arg_name));
            ctx.ret = format!("&{tmp}");
        }
        ConversionKind::Primitive(_) => ctx.ret = format!("&{arg_name}"),
        ConversionKind::String => {
            let tmp = generated_identifier(&format!("{arg_name}_str"));
            ctx.support_before.push(CStmt::decl(
                "MonoString*",
                &tmp,
                format!("{arg_name} ? mono_string_new({}, {arg_name}) : 0", naming::domain_var()),
            ));
            ctx.ret = tmp;
        }
        ConversionKind::Object => {
            let tmp = generated_identifier(&format!("{arg_name}_obj"));
            ctx.support_before.push(CStmt::decl(
                "MonoObject*",
                &tmp,
                format!("{arg_name} ? mono_gchandle_get_target({arg_name}->_handle) : 0"),
            ));
            ctx.ret = tmp;
        }
    }
    ctx
}

/// Convert the `MonoObject*` held in `result_var` back to the native type.
pub fn to_native(result_var: &str, ty: &TypeRef) -> MarshalContext {
    let mut ctx = MarshalContext::new(result_var);
    let mapped = type_map::map_type(ty);
    match mapped.conversion {
        ConversionKind::Void => {}
        ConversionKind::Primitive(PrimitiveType::Bool) => {
            ctx.ret = format!("*(MonoBoolean*) mono_object_unbox({result_var}) != 0");
        }
        ConversionKind::Primitive(prim) => {
            ctx.ret = format!("*({}*) mono_object_unbox({result_var})", type_map::c_primitive(prim));
        }
        ConversionKind::String => {
            let tmp = generated_identifier("ret");
            ctx.support_before.push(CStmt::decl(
                "char*",
                &tmp,
                format!("{result_var} ? mono_string_to_utf8((MonoString*) {result_var}) : 0"),
            ));
            ctx.ret = tmp;
        }
        ConversionKind::Object => {
            let class_id = ty.object_class().map(naming::to_c_identity).unwrap_or_default();
            let tmp = generated_identifier("ret");
            ctx.support_before.push(CStmt::decl(&mapped.c_return_type, &tmp, "0"));
            ctx.support_before.push(CStmt::if_then(
                format!("{result_var} != 0"),
                new_proxy(&tmp, &class_id, &format!("mono_object_get_class({result_var})"), result_var),
            ));
            ctx.ret = tmp;
        }
    }
    ctx
}

/// Allocate a proxy in `var` and root `object` behind a fresh boundary handle.
pub fn new_proxy(var: &str, class_id: &str, class_expr: &str, object: &str) -> Vec<CStmt> {
    vec![
        CStmt::assign(var, format!("({class_id}*) calloc(1, sizeof({class_id}))")),
        CStmt::assign(format!("{var}->_class"), class_expr),
        CStmt::assign(
            format!("{var}->_handle"),
            format!("mono_gchandle_new({object}, /*pinned=*/false)"),
        ),
    ]
}
