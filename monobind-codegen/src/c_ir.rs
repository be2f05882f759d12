// A small structured representation of the emitted C, plus its printer.
//
// Lowering builds `CFile`s; only `render` decides braces, indentation and
// blank lines. Expressions and types stay plain strings.

use std::fmt::Write;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// External linkage, defined here.
    Public,
    Static,
    Extern,
}

impl Storage {
    fn prefix(self) -> &'static str {
        match self {
            Storage::Public => "",
            Storage::Static => "static ",
            Storage::Extern => "extern ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CItem {
    /// `/* ... */` block, one entry per line.
    Comment(Vec<String>),
    /// Preprocessor line without the leading `#` (`pragma once`).
    Directive(String),
    Include { path: String, system: bool },
    Typedef { ty: String, name: String },
    Struct { name: String, fields: Vec<(String, String)> },
    /// `enum name { A = 0, ... };`
    Enum { name: String, variants: Vec<(String, u32)> },
    /// A global variable definition or declaration.
    Global {
        storage: Storage,
        ty: String,
        name: String,
        init: Option<String>,
    },
    /// Prototype only.
    Prototype(CSignature),
    Function(CFunction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CSignature {
    pub storage: Storage,
    pub ret: String,
    pub name: String,
    /// (type, name) pairs.
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CFunction {
    pub sig: CSignature,
    pub body: Vec<CStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CStmt {
    /// `ty name = init;`. Array sizes go in `name`.
    Decl { ty: String, name: String, init: Option<String> },
    Assign { target: String, value: String },
    /// An expression statement (usually a call).
    Expr(String),
    Return(Option<String>),
    If { cond: String, then: Vec<CStmt>, otherwise: Vec<CStmt> },
    Comment(String),
}

impl CStmt {
    pub fn decl(ty: impl Into<String>, name: impl Into<String>, init: impl Into<String>) -> Self {
        CStmt::Decl { ty: ty.into(), name: name.into(), init: Some(init.into()) }
    }

    pub fn decl_uninit(ty: impl Into<String>, name: impl Into<String>) -> Self {
        CStmt::Decl { ty: ty.into(), name: name.into(), init: None }
    }

    pub fn assign(target: impl Into<String>, value: impl Into<String>) -> Self {
        CStmt::Assign { target: target.into(), value: value.into() }
    }

    pub fn call(expr: impl Into<String>) -> Self {
        CStmt::Expr(expr.into())
    }

    pub fn ret(value: impl Into<String>) -> Self {
        CStmt::Return(Some(value.into()))
    }

    pub fn if_then(cond: impl Into<String>, then: Vec<CStmt>) -> Self {
        CStmt::If { cond: cond.into(), then, otherwise: Vec::new() }
    }
}

/// One generated `.c`/`.h` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CFile {
    pub items: Vec<CItem>,
}

impl CFile {
    pub fn push(&mut self, item: CItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = CItem>) {
        self.items.extend(items);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&CItem> = None;
        for item in &self.items {
            if let Some(p) = prev {
                if !same_group(p, item) {
                    out.push('\n');
                }
            }
            render_item(&mut out, item);
            prev = Some(item);
        }
        out
    }
}

/// Consecutive one-line items of the same sort are printed without a gap.
fn same_group(a: &CItem, b: &CItem) -> bool {
    matches!(
        (a, b),
        (CItem::Include { .. } | CItem::Directive(_), CItem::Include { .. })
            | (CItem::Typedef { .. }, CItem::Typedef { .. })
            | (CItem::Global { .. }, CItem::Global { .. })
            | (CItem::Prototype(_), CItem::Prototype(_))
    )
}

fn render_item(out: &mut String, item: &CItem) {
    match item {
        CItem::Comment(lines) => {
            out.push_str("/*\n");
            for line in lines {
                if line.is_empty() {
                    out.push_str(" *\n");
                } else {
                    let _ = writeln!(out, " * {line}");
                }
            }
            out.push_str(" */\n");
        }
        CItem::Directive(text) => {
            let _ = writeln!(out, "#{text}");
        }
        CItem::Include { path, system } => {
            if *system {
                let _ = writeln!(out, "#include <{path}>");
            } else {
                let _ = writeln!(out, "#include \"{path}\"");
            }
        }
        CItem::Typedef { ty, name } => {
            let _ = writeln!(out, "typedef {ty} {name};");
        }
        CItem::Struct { name, fields } => {
            let _ = writeln!(out, "struct {name}");
            out.push_str("{\n");
            for (ty, field) in fields {
                let _ = writeln!(out, "{INDENT}{};", join_decl(ty, field));
            }
            out.push_str("};\n");
        }
        CItem::Enum { name, variants } => {
            let _ = writeln!(out, "enum {name}");
            out.push_str("{\n");
            for (variant, value) in variants {
                let _ = writeln!(out, "{INDENT}{variant} = {value},");
            }
            out.push_str("};\n");
        }
        CItem::Global { storage, ty, name, init } => {
            out.push_str(storage.prefix());
            out.push_str(&join_decl(ty, name));
            if let Some(init) = init {
                let _ = write!(out, " = {init}");
            }
            out.push_str(";\n");
        }
        CItem::Prototype(sig) => {
            render_signature(out, sig);
            out.push_str(";\n");
        }
        CItem::Function(func) => {
            render_signature(out, &func.sig);
            out.push('\n');
            out.push_str("{\n");
            render_block(out, &func.body, 1);
            out.push_str("}\n");
        }
    }
}

fn render_signature(out: &mut String, sig: &CSignature) {
    out.push_str(sig.storage.prefix());
    out.push_str(&join_decl(&sig.ret, &sig.name));
    out.push('(');
    if sig.params.is_empty() {
        out.push_str("void");
    } else {
        let params: Vec<String> = sig.params.iter().map(|(ty, name)| join_decl(ty, name)).collect();
        out.push_str(&params.join(", "));
    }
    out.push(')');
}

/// `int32_t x`, `char* s` (pointer star stays on the type).
fn join_decl(ty: &str, name: &str) -> String {
    format!("{ty} {name}")
}

fn render_block(out: &mut String, stmts: &[CStmt], depth: usize) {
    for stmt in stmts {
        render_stmt(out, stmt, depth);
    }
}

fn render_stmt(out: &mut String, stmt: &CStmt, depth: usize) {
    let pad = INDENT.repeat(depth);
    match stmt {
        CStmt::Decl { ty, name, init } => match init {
            Some(init) => {
                let _ = writeln!(out, "{pad}{} = {init};", join_decl(ty, name));
            }
            None => {
                let _ = writeln!(out, "{pad}{};", join_decl(ty, name));
            }
        },
        CStmt::Assign { target, value } => {
            let _ = writeln!(out, "{pad}{target} = {value};");
        }
        CStmt::Expr(expr) => {
            let _ = writeln!(out, "{pad}{expr};");
        }
        CStmt::Return(None) => {
            let _ = writeln!(out, "{pad}return;");
        }
        CStmt::Return(Some(value)) => {
            let _ = writeln!(out, "{pad}return {value};");
        }
        CStmt::If { cond, then, otherwise } => {
            let _ = writeln!(out, "{pad}if ({cond}) {{");
            render_block(out, then, depth + 1);
            if otherwise.is_empty() {
                let _ = writeln!(out, "{pad}}}");
            } else {
                let _ = writeln!(out, "{pad}}} else {{");
                render_block(out, otherwise, depth + 1);
                let _ = writeln!(out, "{pad}}}");
            }
        }
        CStmt::Comment(text) => {
            let _ = writeln!(out, "{pad}/* {text} */");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_function_with_nested_if() {
        let mut file = CFile::default();
        file.push(CItem::Function(CFunction {
            sig: CSignature {
                storage: Storage::Static,
                ret: "void".into(),
                name: "__init".into(),
                params: vec![],
            },
            body: vec![
                CStmt::if_then("__ready", vec![CStmt::Return(None)]),
                CStmt::call("start()"),
                CStmt::assign("__ready", "true"),
            ],
        }));
        assert_eq!(
            file.render(),
            "static void __init(void)\n{\n    if (__ready) {\n        return;\n    }\n    start();\n    __ready = true;\n}\n"
        );
    }

    #[test]
    fn groups_one_line_items() {
        let file = CFile {
            items: vec![
                CItem::Include { path: "stdlib.h".into(), system: true },
                CItem::Include { path: "a.h".into(), system: false },
                CItem::Global { storage: Storage::Extern, ty: "MonoDomain*".into(), name: "__d".into(), init: None },
                CItem::Global { storage: Storage::Static, ty: "int".into(), name: "x".into(), init: Some("0".into()) },
            ],
        };
        assert_eq!(
            file.render(),
            "#include <stdlib.h>\n#include \"a.h\"\n\nextern MonoDomain* __d;\nstatic int x = 0;\n"
        );
    }

    #[test]
    fn renders_struct_and_else_branch() {
        let file = CFile {
            items: vec![
                CItem::Struct { name: "P".into(), fields: vec![("uint32_t".into(), "_handle".into())] },
                CItem::Function(CFunction {
                    sig: CSignature {
                        storage: Storage::Public,
                        ret: "int32_t".into(),
                        name: "f".into(),
                        params: vec![("int32_t".into(), "a".into()), ("const char*".into(), "s".into())],
                    },
                    body: vec![CStmt::If {
                        cond: "s".into(),
                        then: vec![CStmt::ret("a")],
                        otherwise: vec![CStmt::ret("0")],
                    }],
                }),
            ],
        };
        let text = file.render();
        assert!(text.starts_with("struct P\n{\n    uint32_t _handle;\n};\n\n"));
        assert!(text.contains("int32_t f(int32_t a, const char* s)\n{\n"));
        assert!(text.contains("    } else {\n        return 0;\n    }\n"));
    }

    #[test]
    fn renders_comment_block() {
        let file = CFile { items: vec![CItem::Comment(vec!["one".into(), String::new(), "two".into()])] };
        assert_eq!(file.render(), "/*\n * one\n *\n * two\n */\n");
    }
}
