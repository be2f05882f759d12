// Per-class items: proxy struct, class cache, resolver, release function.

use crate::c_gen::c_string;
use crate::c_ir::{CFunction, CItem, CSignature, CStmt, Storage};
use crate::context::{BindingPlan, ClassPlan};
use crate::naming;

/// `typedef struct X X;` plus the proxy layout shared by every class.
pub fn proxy_struct(class_id: &str) -> Vec<CItem> {
    vec![
        CItem::Typedef {
            ty: format!("struct {class_id}"),
            name: class_id.to_string(),
        },
        CItem::Struct {
            name: class_id.to_string(),
            fields: vec![
                ("MonoClass*".into(), "_class".into()),
                ("uint32_t".into(), "_handle".into()),
            ],
        },
    ]
}

/// The lazily filled class handle.
pub fn class_cache(class: &ClassPlan) -> CItem {
    CItem::Global {
        storage: Storage::Static,
        ty: "MonoClass*".into(),
        name: class.cache_var.clone(),
        init: Some("0".into()),
    }
}

/// Resolver: brings up the runtime and assembly, then looks the class up.
/// A failed lookup leaves the cache null so the next call tries again.
pub fn class_lookup(plan: &BindingPlan, class: &ClassPlan) -> CItem {
    let image = naming::image_var(&plan.assembly_id);
    let resolve = vec![
        CStmt::call(format!("{}()", naming::initializer_fn())),
        CStmt::call(format!("{}()", naming::assembly_lookup_fn(&plan.assembly_id))),
        CStmt::if_then(format!("{image} == 0"), vec![CStmt::Return(None)]),
        CStmt::assign(
            &class.cache_var,
            format!(
                "mono_class_from_name({image}, {}, {})",
                c_string(&class.namespace),
                c_string(&class.name)
            ),
        ),
    ];
    CItem::Function(CFunction {
        sig: CSignature {
            storage: Storage::Static,
            ret: "void".into(),
            name: class.lookup_fn.clone(),
            params: vec![],
        },
        body: vec![CStmt::if_then(format!("{} == 0", class.cache_var), resolve)],
    })
}

/// Release function: frees the boundary handle, then the proxy. NULL is a no-op.
pub fn destroy(class: &ClassPlan) -> CItem {
    CItem::Function(CFunction {
        sig: CSignature {
            storage: Storage::Public,
            ret: "void".into(),
            name: class.destroy_fn.clone(),
            params: vec![(format!("{}*", class.class_id), "object".into())],
        },
        body: vec![
            CStmt::if_then("object == 0", vec![CStmt::Return(None)]),
            CStmt::call("mono_gchandle_free(object->_handle)"),
            CStmt::call("free(object)"),
        ],
    })
}
