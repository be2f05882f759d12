// Method descriptor text: `Ns.Class:Method(int,string)`.
//
// The generator embeds these strings in thunks and the runtime bridge feeds
// them to `build_method_descriptor`, so both sides must agree on the format.

use crate::types::TypeRef;

/// Managed name of an instance constructor.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Build a namespace-qualified descriptor for `method` on `class_qualified`.
///
/// `class_qualified` is the dotted name (`First.Second.Widget`, or just
/// `Widget` for the global namespace).
pub fn method_descriptor(class_qualified: &str, method: &str, params: &[TypeRef]) -> String {
    let mut out = String::with_capacity(class_qualified.len() + method.len() + 16);
    out.push_str(class_qualified);
    out.push(':');
    out.push_str(method);
    out.push('(');
    for (i, ty) in params.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(ty.descriptor_name());
    }
    out.push(')');
    out
}

/// Join a namespace and simple name into the dotted qualified name.
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}
