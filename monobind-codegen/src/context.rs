// Binding plan: everything the C lowering needs, resolved up front.
//
// The plan is the filtered symbol table with every generated name and
// descriptor computed. `inspect` prints it as JSON.

use serde::Serialize;

use monobind_abi::{method_descriptor, ErrorPolicy, MethodKind, TypeRef, CONSTRUCTOR_NAME};

use crate::naming;
use crate::schema::{BindingsFile, ClassDecl, MethodDecl};

#[derive(Debug, Clone, Serialize)]
pub struct BindingPlan {
    pub assembly: String,
    /// Assembly name as a C identifier fragment.
    pub assembly_id: String,
    pub error_policy: ErrorPolicy,
    pub units: Vec<UnitPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitPlan {
    pub name: String,
    pub file_name: String,
    pub classes: Vec<ClassPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassPlan {
    pub qualified_name: String,
    pub namespace: String,
    pub name: String,
    pub class_id: String,
    pub cache_var: String,
    pub lookup_fn: String,
    pub destroy_fn: String,
    pub thunks: Vec<ThunkPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThunkPlan {
    /// Exported C function name.
    pub name: String,
    pub kind: MethodKind,
    /// Text handed to the runtime's descriptor parser.
    pub descriptor: String,
    /// Explicit parameters only.
    pub params: Vec<ParamPlan>,
    pub returns: TypeRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamPlan {
    /// C parameter name.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl BindingPlan {
    /// Build the plan from an already filtered symbol table.
    pub fn build(file: &BindingsFile, error_policy: ErrorPolicy) -> Self {
        let assembly_id = naming::to_c_identity(&file.assembly);
        let units = file
            .units
            .iter()
            .map(|unit| UnitPlan {
                name: unit.name.clone(),
                file_name: naming::unit_file(&unit.name),
                classes: unit.classes().map(|c| ClassPlan::build(c, &assembly_id)).collect(),
            })
            .collect();
        BindingPlan {
            assembly: file.assembly.clone(),
            assembly_id,
            error_policy,
            units,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassPlan> {
        self.units.iter().flat_map(|u| u.classes.iter())
    }

    /// Every exported function name: thunks plus release functions.
    pub fn exported_names(&self) -> impl Iterator<Item = &str> {
        self.classes().flat_map(|c| {
            c.thunks
                .iter()
                .map(|t| t.name.as_str())
                .chain(std::iter::once(c.destroy_fn.as_str()))
        })
    }

    pub fn assembly_file_name(&self) -> String {
        naming::assembly_file(&self.assembly_id)
    }
}

impl ClassPlan {
    fn build(class: &ClassDecl, assembly_id: &str) -> Self {
        let qualified_name = class.qualified_name();
        let class_id = naming::to_c_identity(&qualified_name);
        let thunks = class
            .methods
            .iter()
            .map(|m| ThunkPlan::build(m, &qualified_name, &class_id))
            .collect();
        ClassPlan {
            cache_var: naming::class_cache_var(assembly_id, &class_id),
            lookup_fn: naming::class_lookup_fn(assembly_id, &class_id),
            destroy_fn: naming::destroy_fn(&class_id),
            namespace: class.namespace.clone(),
            name: class.name.clone(),
            qualified_name,
            class_id,
            thunks,
        }
    }
}

impl ThunkPlan {
    fn build(method: &MethodDecl, qualified_class: &str, class_id: &str) -> Self {
        let managed_name = match method.kind {
            MethodKind::Constructor => CONSTRUCTOR_NAME,
            _ => method.name.as_str(),
        };
        let params: Vec<ParamPlan> = method
            .explicit_params()
            .map(|p| ParamPlan {
                name: naming::escape_param(&p.name),
                ty: p.ty.clone(),
            })
            .collect();
        let types: Vec<TypeRef> = params.iter().map(|p| p.ty.clone()).collect();
        let export_name = if method.export_name.is_empty() {
            naming::export_base_name(method.kind, &method.name)
        } else {
            method.export_name.clone()
        };
        ThunkPlan {
            name: naming::thunk_name(class_id, &export_name),
            kind: method.kind,
            descriptor: method_descriptor(qualified_class, managed_name, &types),
            params,
            returns: match method.kind {
                MethodKind::Constructor => TypeRef::Object(qualified_class.to_string()),
                _ => method.returns.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Blocklist;
    use crate::filter::apply_filters;

    fn sample() -> BindingsFile {
        let mut file: BindingsFile = serde_json::from_str(
            r#"{
                "assembly": "Managed.Core",
                "units": [{
                    "name": "managed",
                    "decls": [{
                        "kind": "class", "namespace": "Ns", "name": "Counter",
                        "methods": [
                            { "name": ".ctor", "kind": "constructor" },
                            { "name": "Increment", "kind": "instance",
                              "params": [
                                  { "name": "this", "type": { "object": "Ns.Counter" }, "implicit": true },
                                  { "name": "int", "type": "i32" }
                              ],
                              "returns": "i32" }
                        ]
                    }]
                }]
            }"#,
        )
        .unwrap();
        apply_filters(&mut file, &Blocklist::default());
        file
    }

    #[test]
    fn plan_names_follow_the_scheme() {
        let plan = BindingPlan::build(&sample(), ErrorPolicy::Silent);
        assert_eq!(plan.assembly_id, "Managed_Core");
        assert_eq!(plan.assembly_file_name(), "Managed_Core_assembly.c");

        let counter = plan.classes().next().unwrap();
        assert_eq!(counter.class_id, "Ns_Counter");
        assert_eq!(counter.cache_var, "__Managed_Core_Ns_Counter_class");
        assert_eq!(counter.lookup_fn, "__lookup_class_Managed_Core_Ns_Counter");

        let ctor = &counter.thunks[0];
        assert_eq!(ctor.name, "Ns_Counter_new");
        assert_eq!(ctor.descriptor, "Ns.Counter:.ctor()");
        assert_eq!(ctor.returns, TypeRef::Object("Ns.Counter".into()));

        let inc = &counter.thunks[1];
        assert_eq!(inc.name, "Ns_Counter_Increment");
        assert_eq!(inc.descriptor, "Ns.Counter:Increment(int)");
        assert_eq!(inc.params.len(), 1);
        assert_eq!(inc.params[0].name, "int_");
    }

    #[test]
    fn exported_names_include_destroy() {
        let plan = BindingPlan::build(&sample(), ErrorPolicy::Silent);
        let names: Vec<&str> = plan.exported_names().collect();
        assert_eq!(names, ["Ns_Counter_new", "Ns_Counter_Increment", "Ns_Counter_destroy"]);
    }

    #[test]
    fn plan_serializes_for_inspection() {
        let plan = BindingPlan::build(&sample(), ErrorPolicy::Status);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["error_policy"], "status");
        assert_eq!(json["units"][0]["classes"][0]["thunks"][1]["kind"], "instance");
        assert_eq!(json["units"][0]["classes"][0]["thunks"][1]["params"][0]["type"], "i32");
    }
}
