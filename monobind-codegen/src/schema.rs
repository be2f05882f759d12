// JSON schema types for the symbol table the generator reads.

use std::path::Path;

use serde::Deserialize;

use monobind_abi::{qualified_name, MethodKind, TypeRef};

use crate::error::{CodegenError, CodegenResult};

// ---------------------------------------------------------------------------
// Top-level file
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct BindingsFile {
    /// Simple assembly name (`Managed` for `Managed.dll`).
    pub assembly: String,
    #[serde(default)]
    pub units: Vec<UnitInfo>,
}

impl BindingsFile {
    pub fn load(path: &Path) -> CodegenResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        serde_json::from_str(&data).map_err(|source| CodegenError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every class across all units.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.units.iter().flat_map(UnitInfo::classes)
    }
}

/// One compilation unit. Produces one `<name>.c`.
#[derive(Debug, Deserialize, Clone)]
pub struct UnitInfo {
    pub name: String,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

impl UnitInfo {
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Class(c) => Some(c),
            Decl::Enum(_) => None,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    Class(ClassDecl),
    Enum(EnumDecl),
}

// ---------------------------------------------------------------------------
// Class
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
}

impl ClassDecl {
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }
}

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct MethodDecl {
    /// Managed method name. Ignored for constructors (always `.ctor`).
    pub name: String,
    pub kind: MethodKind,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default = "void_type")]
    pub returns: TypeRef,
    /// Name used for the C thunk (base name plus any overload suffix). Set by filter.
    #[serde(skip)]
    pub export_name: String,
}

impl MethodDecl {
    /// Parameters that get marshaled, in declaration order.
    pub fn explicit_params(&self) -> impl Iterator<Item = &ParamDecl> {
        self.params.iter().filter(|p| !p.implicit)
    }

    /// Every type the signature mentions, implicit parameters included.
    pub fn referenced_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.params.iter().map(|p| &p.ty).chain(std::iter::once(&self.returns))
    }
}

fn void_type() -> TypeRef {
    TypeRef::Void
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Compiler-synthesized parameter (e.g. the receiver); never marshaled.
    #[serde(default)]
    pub implicit: bool,
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "yes")]
    pub getter: bool,
    #[serde(default = "yes")]
    pub setter: bool,
}

fn yes() -> bool {
    true
}

impl PropertyDecl {
    /// The managed accessor methods (`get_<Name>`, `set_<Name>`).
    pub fn accessors(&self) -> Vec<MethodDecl> {
        let kind = if self.is_static {
            MethodKind::Static
        } else {
            MethodKind::Instance
        };
        let mut out = Vec::with_capacity(2);
        if self.getter {
            out.push(MethodDecl {
                name: format!("get_{}", self.name),
                kind,
                params: Vec::new(),
                returns: self.ty.clone(),
                export_name: String::new(),
            });
        }
        if self.setter {
            out.push(MethodDecl {
                name: format!("set_{}", self.name),
                kind,
                params: vec![ParamDecl {
                    name: "value".to_string(),
                    ty: self.ty.clone(),
                    implicit: false,
                }],
                returns: TypeRef::Void,
                export_name: String::new(),
            });
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Enum
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub items: Vec<EnumItem>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnumItem {
    pub name: String,
    pub value: i64,
}
