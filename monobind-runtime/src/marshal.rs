// Value marshaling across the native/managed boundary.
//
// Native → managed: primitives pass by value, strings are copied into a new
// managed string, objects are recovered from their proxy's boundary handle.
// Managed → native: boxed primitives are unboxed, strings copied out as
// UTF-8, objects wrapped in a fresh proxy.

use std::sync::Arc;

use monobind_abi::{DomainHandle, ManagedArg, ObjectRef, Primitive, TypeRef};

use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::proxy::ObjectProxy;

/// A value on the native side of a call.
#[derive(Debug, Clone)]
pub enum NativeValue {
    /// Result of a void method.
    Void,
    Primitive(Primitive),
    /// `None` is the null string.
    String(Option<String>),
    /// `None` is the null reference.
    Object(Option<Arc<ObjectProxy>>),
}

impl NativeValue {
    /// The zero value a degraded call returns for `ty`.
    pub fn default_for(ty: &TypeRef) -> NativeValue {
        match ty {
            TypeRef::Void => NativeValue::Void,
            TypeRef::String => NativeValue::String(None),
            TypeRef::Object(_) => NativeValue::Object(None),
            other => match other.primitive() {
                Some(p) => NativeValue::Primitive(p.default_value()),
                None => NativeValue::Void,
            },
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, NativeValue::Void)
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            NativeValue::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            NativeValue::Primitive(Primitive::I32(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => s.as_deref(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectProxy>> {
        match self {
            NativeValue::Object(o) => o.as_ref(),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Arc<ObjectProxy>> {
        match self {
            NativeValue::Object(o) => o,
            _ => None,
        }
    }
}

macro_rules! native_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for NativeValue {
                fn from(v: $ty) -> Self {
                    NativeValue::Primitive(Primitive::$variant(v))
                }
            }
        )*
    };
}

native_from_primitive!(
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::String(Some(s.to_string()))
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::String(Some(s))
    }
}

impl From<Arc<ObjectProxy>> for NativeValue {
    fn from(proxy: Arc<ObjectProxy>) -> Self {
        NativeValue::Object(Some(proxy))
    }
}

/// Convert one argument into its runtime representation.
///
/// `index` is only used for error messages.
pub fn to_managed(
    bridge: &Bridge,
    domain: DomainHandle,
    index: usize,
    ty: &TypeRef,
    value: &NativeValue,
) -> BridgeResult<ManagedArg> {
    let mismatch = || {
        BridgeError::ArgumentMismatch(format!(
            "argument {index}: expected {}, got {value:?}",
            ty.descriptor_name()
        ))
    };

    match (ty, value) {
        (TypeRef::String, NativeValue::String(s)) => {
            let obj = match s {
                Some(text) => bridge.api().new_string(domain, text),
                None => ObjectRef::null(),
            };
            Ok(ManagedArg::Object(obj))
        }
        (TypeRef::Object(_), NativeValue::Object(proxy)) => {
            let obj = proxy.as_ref().map_or(ObjectRef::null(), |p| p.target());
            Ok(ManagedArg::Object(obj))
        }
        (ty, NativeValue::Primitive(p)) if ty.primitive() == Some(p.ty()) => {
            Ok(ManagedArg::Value(*p))
        }
        _ => Err(mismatch()),
    }
}

/// Convert an invocation result back to the native representation.
///
/// A null result (void method, thrown exception, null reference) becomes the
/// default value of `ty`.
pub fn to_native(bridge: &Bridge, ty: &TypeRef, result: ObjectRef) -> NativeValue {
    if result.is_null() {
        return NativeValue::default_for(ty);
    }
    let api = bridge.api();
    match ty {
        TypeRef::Void => NativeValue::Void,
        TypeRef::String => NativeValue::String(api.string_to_utf8(result)),
        TypeRef::Object(_) => {
            let class = api.object_class(result);
            NativeValue::Object(Some(Arc::new(ObjectProxy::adopt(api, class, result))))
        }
        other => match other.primitive() {
            Some(p) => NativeValue::Primitive(
                api.unbox(result, p).unwrap_or_else(|| p.default_value()),
            ),
            None => NativeValue::default_for(other),
        },
    }
}
