// Invocation thunks: one exported C function per bound method.
//
// Emitted order: class resolution, method resolution, lifetime step,
// argument vector, invoke, result marshaling.

use monobind_abi::{BindStatus, ErrorPolicy, MethodKind};

use crate::c_ir::{CFunction, CItem, CSignature, CStmt, Storage};
use crate::c_gen::{c_string, marshal};
use crate::context::{BindingPlan, ClassPlan, ThunkPlan};
use crate::naming::{self, generated_identifier};
use crate::type_map;

/// Lower one thunk.
pub fn thunk(plan: &BindingPlan, class: &ClassPlan, thunk: &ThunkPlan) -> CItem {
    let lowering = ThunkLowering {
        class,
        thunk,
        report: plan.error_policy == ErrorPolicy::Status,
    };
    CItem::Function(CFunction {
        sig: lowering.signature(),
        body: lowering.body(),
    })
}

struct ThunkLowering<'a> {
    class: &'a ClassPlan,
    thunk: &'a ThunkPlan,
    /// Status out-parameter present.
    report: bool,
}

impl ThunkLowering<'_> {
    fn signature(&self) -> CSignature {
        let mut params = Vec::new();
        if self.thunk.kind == MethodKind::Instance {
            params.push((format!("{}*", self.class.class_id), "object".to_string()));
        }
        for p in &self.thunk.params {
            params.push((type_map::map_type(&p.ty).c_param_type, p.name.clone()));
        }
        if self.report {
            params.push(("monobind_status*".to_string(), "status".to_string()));
        }
        CSignature {
            storage: Storage::Public,
            ret: type_map::map_type(&self.thunk.returns).c_return_type,
            name: self.thunk.name.clone(),
            params,
        }
    }

    fn returns_value(&self) -> bool {
        self.thunk.kind == MethodKind::Constructor || !self.thunk.returns.is_void()
    }

    fn default_return(&self) -> CStmt {
        if self.returns_value() {
            CStmt::ret(type_map::map_type(&self.thunk.returns).default_value)
        } else {
            CStmt::Return(None)
        }
    }

    fn set_status(&self, status: BindStatus) -> Option<CStmt> {
        self.report.then(|| {
            CStmt::if_then("status", vec![CStmt::assign("*status", status.c_name())])
        })
    }

    /// Early exit with the default value, reporting `status` when enabled.
    fn bail(&self, status: BindStatus) -> Vec<CStmt> {
        self.set_status(status)
            .into_iter()
            .chain(std::iter::once(self.default_return()))
            .collect()
    }

    fn body(&self) -> Vec<CStmt> {
        let mut body = Vec::new();
        self.resolve_class(&mut body);
        self.resolve_method(&mut body);
        self.lifetime(&mut body);
        let args = self.marshal_args(&mut body);
        self.invoke(&mut body, &args);
        self.check_exception(&mut body);
        self.marshal_result(&mut body);
        body
    }

    fn resolve_class(&self, body: &mut Vec<CStmt>) {
        body.push(CStmt::call(format!("{}()", self.class.lookup_fn)));
        body.push(CStmt::if_then(
            format!("{} == 0", self.class.cache_var),
            self.bail(BindStatus::ClassNotFound),
        ));
    }

    /// Fresh descriptor every call; released before the null check.
    fn resolve_method(&self, body: &mut Vec<CStmt>) {
        let name = generated_identifier("method_name");
        let desc = generated_identifier("desc");
        let method = generated_identifier("method");
        body.push(CStmt::decl("const char", format!("{name}[]"), c_string(&self.thunk.descriptor)));
        body.push(CStmt::decl(
            "MonoMethodDesc*",
            &desc,
            format!("mono_method_desc_new({name}, /*include_namespace=*/true)"),
        ));
        body.push(CStmt::decl(
            "MonoMethod*",
            &method,
            format!("mono_method_desc_search_in_class({desc}, {})", self.class.cache_var),
        ));
        body.push(CStmt::call(format!("mono_method_desc_free({desc})")));
        body.push(CStmt::if_then(
            format!("{method} == 0"),
            self.bail(BindStatus::MethodNotFound),
        ));
    }

    fn lifetime(&self, body: &mut Vec<CStmt>) {
        let instance = generated_identifier("instance");
        match self.thunk.kind {
            MethodKind::Constructor => {
                let id = &self.class.class_id;
                body.push(CStmt::decl(format!("{id}*"), "object", "0"));
                body.push(CStmt::decl(
                    "MonoObject*",
                    &instance,
                    format!("mono_object_new({}, {})", naming::domain_var(), self.class.cache_var),
                ));
                body.extend(marshal::new_proxy("object", id, &self.class.cache_var, &instance));
            }
            MethodKind::Instance => {
                body.push(CStmt::decl(
                    "MonoObject*",
                    &instance,
                    "mono_gchandle_get_target(object->_handle)",
                ));
            }
            MethodKind::Static => {}
        }
    }

    /// Returns the argument-vector expression for the invoke call.
    fn marshal_args(&self, body: &mut Vec<CStmt>) -> String {
        if self.thunk.params.is_empty() {
            return "0".to_string();
        }
        let args = generated_identifier("args");
        body.push(CStmt::decl_uninit("void*", format!("{args}[{}]", self.thunk.params.len())));
        for (i, param) in self.thunk.params.iter().enumerate() {
            let ctx = marshal::to_managed(&param.name, &param.ty);
            body.extend(ctx.support_before);
            body.push(CStmt::assign(format!("{args}[{i}]"), ctx.ret));
        }
        args
    }

    fn invoke(&self, body: &mut Vec<CStmt>, args: &str) {
        let exception = generated_identifier("exception");
        let instance = if self.thunk.kind.has_receiver() {
            generated_identifier("instance")
        } else {
            "0".to_string()
        };
        let call = format!(
            "mono_runtime_invoke({}, {instance}, {args}, &{exception})",
            generated_identifier("method")
        );
        body.push(CStmt::decl("MonoObject*", &exception, "0"));
        if self.thunk.kind == MethodKind::Constructor || self.thunk.returns.is_void() {
            body.push(CStmt::call(call));
        } else {
            body.push(CStmt::decl("MonoObject*", generated_identifier("result"), call));
        }
    }

    fn check_exception(&self, body: &mut Vec<CStmt>) {
        let cond = format!("{} != 0", generated_identifier("exception"));
        if self.report {
            let mut on_throw: Vec<CStmt> = self.set_status(BindStatus::Exception).into_iter().collect();
            if self.thunk.kind == MethodKind::Constructor {
                on_throw.push(CStmt::call(format!("{}(object)", self.class.destroy_fn)));
            }
            on_throw.push(self.default_return());
            body.push(CStmt::if_then(cond, on_throw));
            body.extend(self.set_status(BindStatus::Ok));
        } else if self.thunk.kind != MethodKind::Constructor && !self.thunk.returns.is_void() {
            // No result to unbox.
            body.push(CStmt::if_then(cond, vec![self.default_return()]));
        }
    }

    fn marshal_result(&self, body: &mut Vec<CStmt>) {
        match self.thunk.kind {
            MethodKind::Constructor => body.push(CStmt::ret("object")),
            _ if self.thunk.returns.is_void() => {}
            _ => {
                let ctx = marshal::to_native(&generated_identifier("result"), &self.thunk.returns);
                body.extend(ctx.support_before);
                body.push(CStmt::ret(ctx.ret));
            }
        }
    }
}
