// Filtering: blocklist, unresolvable types, property expansion, overloads.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use monobind_abi::{MethodKind, TypeRef, CONSTRUCTOR_NAME};

use crate::config::Blocklist;
use crate::naming;
use crate::schema::*;

/// Apply all filters to the symbol table in place.
///
/// Afterwards every class has no properties left (they are expanded into
/// accessor methods), every method has its `export_name` set, and every
/// referenced class is part of the table.
pub fn apply_filters(file: &mut BindingsFile, blocklist: &Blocklist) {
    let blocked_classes: HashSet<&str> = blocklist.classes.iter().map(|s| s.as_str()).collect();
    let blocked_methods = blocklist.method_tuples();

    // Pre-collect the set of available classes to avoid borrowing `file` inside the loop.
    let available: HashSet<String> = file
        .classes()
        .map(ClassDecl::qualified_name)
        .filter(|q| !blocked_classes.contains(q.as_str()))
        .collect();

    for unit in &mut file.units {
        unit.decls.retain(|d| match d {
            Decl::Class(c) => {
                let keep = available.contains(&c.qualified_name());
                if !keep {
                    debug!(class = %c.qualified_name(), "class blocked");
                }
                keep
            }
            Decl::Enum(_) => true,
        });

        for decl in &mut unit.decls {
            if let Decl::Class(class) = decl {
                expand_properties(class);
                filter_methods(class, &available, &blocked_methods);
                assign_export_names(&mut class.methods);
            }
        }
    }
}

/// Append `get_`/`set_` accessor methods for every property.
fn expand_properties(class: &mut ClassDecl) {
    let accessors: Vec<MethodDecl> = class.properties.iter().flat_map(PropertyDecl::accessors).collect();
    class.methods.extend(accessors);
    class.properties.clear();
}

fn filter_methods(class: &mut ClassDecl, available: &HashSet<String>, blocked: &[(String, String)]) {
    let qualified = class.qualified_name();
    class.methods.retain(|m| {
        if blocked.iter().any(|(c, name)| *c == qualified && blocks_method(name, m)) {
            debug!(class = %qualified, method = %m.name, "method blocked");
            return false;
        }
        if let Some(missing) = first_unknown_class(m, available) {
            warn!(
                class = %qualified,
                method = %m.name,
                missing = %missing,
                "dropping method: references a class outside the symbol table"
            );
            return false;
        }
        true
    });
}

/// A blocklist name matches constructors only through `.ctor`, since a
/// constructor's declared name is not significant.
fn blocks_method(blocked_name: &str, method: &MethodDecl) -> bool {
    match method.kind {
        MethodKind::Constructor => blocked_name == CONSTRUCTOR_NAME,
        _ => blocked_name == method.name,
    }
}

fn first_unknown_class<'a>(method: &'a MethodDecl, available: &HashSet<String>) -> Option<&'a str> {
    method
        .referenced_types()
        .filter_map(TypeRef::object_class)
        .find(|name| !available.contains(*name))
}

/// Name thunks, renaming overloads with `_1`, `_2`, … in declaration order.
fn assign_export_names(methods: &mut [MethodDecl]) {
    for m in methods.iter_mut() {
        m.export_name = naming::export_base_name(m.kind, &m.name);
    }

    let mut name_counts: HashMap<String, usize> = HashMap::new();
    for m in methods.iter() {
        *name_counts.entry(m.export_name.clone()).or_default() += 1;
    }

    let mut name_indices: HashMap<String, usize> = HashMap::new();
    for m in methods.iter_mut() {
        if name_counts.get(&m.export_name).is_some_and(|&count| count > 1) {
            let idx = name_indices.entry(m.export_name.clone()).or_insert(0);
            *idx += 1;
            m.export_name = format!("{}_{}", m.export_name, idx);
        }
    }
}
