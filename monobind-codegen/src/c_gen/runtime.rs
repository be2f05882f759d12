// Process-wide artifacts: the support header, the runtime state and
// initializer, and the assembly binder.

use monobind_abi::BindStatus;

use crate::c_gen::{c_string, include, preamble, system_include};
use crate::c_ir::{CFile, CFunction, CItem, CSignature, CStmt, Storage};
use crate::config::RuntimeConfig;
use crate::context::BindingPlan;
use crate::naming;

/// Host-provided lookup from assembly file name to path (NULL if absent).
pub const SEARCH_ASSEMBLY_FN: &str = "monobind_search_assembly";

/// Status enum and the host hooks every generated file relies on.
pub fn support_header() -> CFile {
    let mut file = CFile::default();
    file.push(preamble());
    file.push(CItem::Directive("pragma once".into()));
    file.push(system_include("stdbool.h"));
    file.push(system_include("stdint.h"));
    file.push(CItem::Enum {
        name: "monobind_status".into(),
        variants: BindStatus::ALL
            .iter()
            .map(|s| (s.c_name().to_string(), *s as u32))
            .collect(),
    });
    file.push(CItem::Typedef {
        ty: "enum monobind_status".into(),
        name: "monobind_status".into(),
    });
    file.push(CItem::Prototype(CSignature {
        storage: Storage::Public,
        ret: "const char*".into(),
        name: SEARCH_ASSEMBLY_FN.into(),
        params: vec![("const char*".into(), "file_name".into())],
    }));
    file
}

/// `monobind_runtime.c`: the one runtime state definition per process.
pub fn runtime_file(support_header: &str, runtime: &RuntimeConfig) -> CFile {
    let domain = naming::domain_var();
    let initialized = naming::initialized_var();

    let mut file = CFile::default();
    file.push(preamble());
    file.push(include(support_header));
    file.push(system_include("mono/jit/jit.h"));
    file.push(system_include("mono/metadata/mono-config.h"));
    file.push(CItem::Global {
        storage: Storage::Public,
        ty: "MonoDomain*".into(),
        name: domain.clone(),
        init: Some("0".into()),
    });
    file.push(CItem::Global {
        storage: Storage::Public,
        ty: "bool".into(),
        name: initialized.clone(),
        init: Some("false".into()),
    });
    file.push(CItem::Function(CFunction {
        sig: CSignature {
            storage: Storage::Public,
            ret: "void".into(),
            name: naming::initializer_fn(),
            params: vec![],
        },
        body: vec![
            CStmt::if_then(initialized.as_str(), vec![CStmt::Return(None)]),
            CStmt::call("mono_config_parse(0)"),
            CStmt::assign(
                &domain,
                format!(
                    "mono_jit_init_version({}, {})",
                    c_string(&runtime.domain_name),
                    c_string(&runtime.runtime_version)
                ),
            ),
            CStmt::assign(&initialized, "true"),
        ],
    }));
    file
}

/// `<AssemblyId>_assembly.c`: assembly and image cache plus the binder.
/// A missing or unopenable assembly leaves the cache empty so the next call
/// retries.
pub fn assembly_file(plan: &BindingPlan, support_header: &str) -> CFile {
    let assembly = naming::assembly_var(&plan.assembly_id);
    let image = naming::image_var(&plan.assembly_id);
    let path = naming::generated_identifier("path");

    let mut file = CFile::default();
    file.push(preamble());
    file.push(include(support_header));
    file.push(system_include("mono/metadata/assembly.h"));
    file.push(CItem::Global {
        storage: Storage::Extern,
        ty: "MonoDomain*".into(),
        name: naming::domain_var(),
        init: None,
    });
    file.push(CItem::Global {
        storage: Storage::Public,
        ty: "MonoAssembly*".into(),
        name: assembly.clone(),
        init: Some("0".into()),
    });
    file.push(CItem::Global {
        storage: Storage::Public,
        ty: "MonoImage*".into(),
        name: image.clone(),
        init: Some("0".into()),
    });
    file.push(CItem::Function(CFunction {
        sig: CSignature {
            storage: Storage::Public,
            ret: "void".into(),
            name: naming::assembly_lookup_fn(&plan.assembly_id),
            params: vec![],
        },
        body: vec![
            CStmt::if_then(assembly.as_str(), vec![CStmt::Return(None)]),
            CStmt::decl(
                "const char*",
                &path,
                format!("{SEARCH_ASSEMBLY_FN}({})", c_string(&format!("{}.dll", plan.assembly))),
            ),
            CStmt::if_then(format!("{path} == 0"), vec![CStmt::Return(None)]),
            CStmt::assign(
                &assembly,
                format!("mono_domain_assembly_open({}, {path})", naming::domain_var()),
            ),
            CStmt::if_then(format!("{assembly} == 0"), vec![CStmt::Return(None)]),
            CStmt::assign(&image, format!("mono_assembly_get_image({assembly})")),
        ],
    }));
    file
}
