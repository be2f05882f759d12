// C code generation orchestrator: lowers the binding plan into C files.

pub mod class;
pub mod marshal;
pub mod runtime;
pub mod thunk;

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::c_ir::{CFile, CItem, CSignature, Storage};
use crate::config::RuntimeConfig;
use crate::context::{BindingPlan, UnitPlan};
use crate::error::{CodegenError, CodegenResult};
use crate::naming;

/// One file to write into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Generate every artifact for one run: the support header, the runtime
/// file, the assembly file and one file per unit.
pub fn generate(plan: &BindingPlan, runtime: &RuntimeConfig, support_header: &str) -> Vec<Artifact> {
    let mut artifacts = vec![
        Artifact {
            file_name: support_header.to_string(),
            contents: runtime::support_header().render(),
        },
        Artifact {
            file_name: naming::RUNTIME_FILE.to_string(),
            contents: runtime::runtime_file(support_header, runtime).render(),
        },
        Artifact {
            file_name: plan.assembly_file_name(),
            contents: runtime::assembly_file(plan, support_header).render(),
        },
    ];
    for unit in &plan.units {
        artifacts.push(Artifact {
            file_name: unit.file_name.clone(),
            contents: unit_file(plan, unit, support_header).render(),
        });
    }
    artifacts
}

/// Write all artifacts into `out_dir`, creating it if needed.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> CodegenResult<()> {
    std::fs::create_dir_all(out_dir).map_err(|e| CodegenError::io(out_dir, e))?;
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.contents).map_err(|e| CodegenError::io(&path, e))?;
    }
    Ok(())
}

/// `<unit>.c`: extern references to the shared state, then per class the
/// proxy struct, cache, resolver, release function and thunks.
pub fn unit_file(plan: &BindingPlan, unit: &UnitPlan, support_header: &str) -> CFile {
    let mut file = CFile::default();
    file.push(preamble());
    file.push(include(&format!("{}.h", unit.name)));
    file.push(include(support_header));
    for header in [
        "mono/jit/jit.h",
        "mono/metadata/assembly.h",
        "mono/metadata/object.h",
        "mono/metadata/debug-helpers.h",
        "stdlib.h",
    ] {
        file.push(system_include(header));
    }

    file.push(CItem::Global {
        storage: Storage::Extern,
        ty: "MonoDomain*".into(),
        name: naming::domain_var(),
        init: None,
    });
    file.push(CItem::Global {
        storage: Storage::Extern,
        ty: "MonoImage*".into(),
        name: naming::image_var(&plan.assembly_id),
        init: None,
    });
    for name in [naming::initializer_fn(), naming::assembly_lookup_fn(&plan.assembly_id)] {
        file.push(CItem::Prototype(CSignature {
            storage: Storage::Extern,
            ret: "void".into(),
            name,
            params: vec![],
        }));
    }

    for class_id in proxy_classes(unit) {
        file.extend(class::proxy_struct(&class_id));
    }

    for class in &unit.classes {
        debug!(class = %class.qualified_name, thunks = class.thunks.len(), "lowering class");
        file.push(class::class_cache(class));
        file.push(class::class_lookup(plan, class));
        file.push(class::destroy(class));
        for t in &class.thunks {
            file.push(thunk::thunk(plan, class, t));
        }
    }
    file
}

/// Class ids whose proxy layout this unit needs: its own classes, then any
/// class from another unit that appears in a signature.
fn proxy_classes(unit: &UnitPlan) -> Vec<String> {
    let own: Vec<String> = unit.classes.iter().map(|c| c.class_id.clone()).collect();
    let foreign: BTreeSet<String> = unit
        .classes
        .iter()
        .flat_map(|c| c.thunks.iter())
        .flat_map(|t| t.params.iter().map(|p| &p.ty).chain(std::iter::once(&t.returns)))
        .filter_map(|ty| ty.object_class())
        .map(naming::to_c_identity)
        .filter(|id| !own.contains(id))
        .collect();
    own.into_iter().chain(foreign).collect()
}

pub(crate) fn preamble() -> CItem {
    CItem::Comment(vec![
        "Generated by monobind. Do not edit.".into(),
        String::new(),
        "Not thread-safe: the lazy caches use plain flag and null checks, so".into(),
        "every call into generated code must come from a single thread.".into(),
    ])
}

pub(crate) fn include(path: &str) -> CItem {
    CItem::Include {
        path: path.to_string(),
        system: false,
    }
}

pub(crate) fn system_include(path: &str) -> CItem {
    CItem::Include {
        path: path.to_string(),
        system: true,
    }
}

/// Quote `text` as a C string literal.
pub fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ClassPlan, ParamPlan, ThunkPlan};
    use monobind_abi::{ErrorPolicy, MethodKind, TypeRef};

    fn unit() -> UnitPlan {
        UnitPlan {
            name: "widgets".into(),
            file_name: "widgets.c".into(),
            classes: vec![ClassPlan {
                qualified_name: "Ui.Widget".into(),
                namespace: "Ui".into(),
                name: "Widget".into(),
                class_id: "Ui_Widget".into(),
                cache_var: "__Managed_Ui_Widget_class".into(),
                lookup_fn: "__lookup_class_Managed_Ui_Widget".into(),
                destroy_fn: "Ui_Widget_destroy".into(),
                thunks: vec![ThunkPlan {
                    name: "Ui_Widget_Attach".into(),
                    kind: MethodKind::Instance,
                    descriptor: "Ui.Widget:Attach(Ui.Panel)".into(),
                    params: vec![ParamPlan {
                        name: "panel".into(),
                        ty: TypeRef::Object("Ui.Panel".into()),
                    }],
                    returns: TypeRef::Object("Ui.Widget".into()),
                }],
            }],
        }
    }

    fn plan() -> BindingPlan {
        BindingPlan {
            assembly: "Managed".into(),
            assembly_id: "Managed".into(),
            error_policy: ErrorPolicy::Silent,
            units: vec![unit()],
        }
    }

    #[test]
    fn unit_references_shared_state_by_extern() {
        let text = unit_file(&plan(), &unit(), "monobind.h").render();
        assert!(text.contains("#include \"widgets.h\"\n#include \"monobind.h\"\n"));
        assert!(text.contains("extern MonoDomain* __monobind_domain;\nextern MonoImage* __Managed_image;\n"));
        assert!(text.contains("extern void __monobind_initialize_mono(void);\n"));
        assert!(text.contains("extern void __monobind_lookup_assembly_Managed(void);\n"));
        // Definitions live in their own files.
        assert!(!text.contains("mono_jit_init_version"));
        assert!(!text.contains("mono_domain_assembly_open"));
    }

    #[test]
    fn foreign_proxy_layouts_are_declared() {
        assert_eq!(proxy_classes(&unit()), ["Ui_Widget", "Ui_Panel"]);
        let text = unit_file(&plan(), &unit(), "monobind.h").render();
        assert!(text.contains("struct Ui_Panel\n{\n"));
    }

    #[test]
    fn class_items_come_in_resolution_order() {
        let text = unit_file(&plan(), &unit(), "monobind.h").render();
        let cache = text.find("static MonoClass* __Managed_Ui_Widget_class = 0;").unwrap();
        let lookup = text.find("static void __lookup_class_Managed_Ui_Widget(void)").unwrap();
        let destroy = text.find("void Ui_Widget_destroy(Ui_Widget* object)").unwrap();
        let thunk = text.find("Ui_Widget* Ui_Widget_Attach(Ui_Widget* object, Ui_Panel* panel)").unwrap();
        assert!(cache < lookup && lookup < destroy && destroy < thunk);
    }

    #[test]
    fn generate_emits_one_file_per_unit_plus_shared_files() {
        let names: Vec<String> = generate(&plan(), &RuntimeConfig::default(), "monobind.h")
            .into_iter()
            .map(|a| a.file_name)
            .collect();
        assert_eq!(names, ["monobind.h", "monobind_runtime.c", "Managed_assembly.c", "widgets.c"]);
    }

    #[test]
    fn write_artifacts_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let artifacts = vec![Artifact { file_name: "a.c".into(), contents: "int x;\n".into() }];
        write_artifacts(&out, &artifacts).unwrap();
        assert_eq!(std::fs::read_to_string(out.join("a.c")).unwrap(), "int x;\n");
    }

    #[test]
    fn c_string_escapes_quotes() {
        assert_eq!(c_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
