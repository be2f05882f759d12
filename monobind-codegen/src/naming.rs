// Identifier scheme for generated C. Every tool-owned identifier carries the
// `__` prefix; exported thunks use the class identity with `.` → `_`.

use monobind_abi::MethodKind;

/// Prefix for tool-owned identifiers.
pub fn generated_identifier(name: &str) -> String {
    format!("__{name}")
}

/// Normalize a dotted managed name into a C identifier (`A.B.C` → `A_B_C`).
pub fn to_c_identity(dotted: &str) -> String {
    dotted.replace('.', "_")
}

pub fn domain_var() -> String {
    generated_identifier("monobind_domain")
}

pub fn initialized_var() -> String {
    generated_identifier("monobind_initialized")
}

pub fn initializer_fn() -> String {
    generated_identifier("monobind_initialize_mono")
}

pub fn assembly_var(assembly_id: &str) -> String {
    generated_identifier(&format!("{assembly_id}_assembly"))
}

pub fn image_var(assembly_id: &str) -> String {
    generated_identifier(&format!("{assembly_id}_image"))
}

pub fn assembly_lookup_fn(assembly_id: &str) -> String {
    generated_identifier(&format!("monobind_lookup_assembly_{assembly_id}"))
}

pub fn class_cache_var(assembly_id: &str, class_id: &str) -> String {
    generated_identifier(&format!("{assembly_id}_{class_id}_class"))
}

pub fn class_lookup_fn(assembly_id: &str, class_id: &str) -> String {
    generated_identifier(&format!("lookup_class_{assembly_id}_{class_id}"))
}

/// Exported thunk name for a method whose (possibly suffixed) export name is
/// `export_name`.
pub fn thunk_name(class_id: &str, export_name: &str) -> String {
    format!("{class_id}_{export_name}")
}

/// Base export name before overload suffixing.
pub fn export_base_name(kind: MethodKind, method_name: &str) -> String {
    match kind {
        MethodKind::Constructor => "new".to_string(),
        _ => method_name.to_string(),
    }
}

pub fn destroy_fn(class_id: &str) -> String {
    format!("{class_id}_destroy")
}

/// Artifact holding the process-wide runtime state.
pub const RUNTIME_FILE: &str = "monobind_runtime.c";

pub fn assembly_file(assembly_id: &str) -> String {
    format!("{assembly_id}_assembly.c")
}

pub fn unit_file(unit: &str) -> String {
    format!("{unit}.c")
}

const RESERVED_WORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
    "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
    "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
    "switch", "typedef", "union", "unsigned", "void", "volatile", "while", "bool",
    "true", "false", "object", "status",
];

/// Check if a name collides with a C keyword or a thunk-local name.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name) || name.starts_with("__")
}

/// Make a managed parameter name usable as a C parameter.
pub fn escape_param(name: &str) -> String {
    if is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}
