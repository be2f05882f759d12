// Configuration types for monobind-codegen, deserialized from monobind.config.toml.

use std::path::Path;

use serde::Deserialize;

use tracing::warn;

use monobind_abi::{ErrorPolicy, CONSTRUCTOR_NAME, DEFAULT_DOMAIN_NAME, DEFAULT_RUNTIME_VERSION};

use crate::error::{CodegenError, CodegenResult};

/// Top-level config file.
#[derive(Debug, Deserialize)]
pub struct MonobindConfig {
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub blocklist: Blocklist,
}

impl MonobindConfig {
    pub fn load(path: &Path) -> CodegenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        Self::parse(&text, path)
    }

    /// Parse config text; `path` is only used for error reporting.
    pub fn parse(text: &str, path: &Path) -> CodegenResult<Self> {
        toml::from_str(text).map_err(|source| CodegenError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CodegenConfig {
    /// Symbol table JSON, relative to the config file.
    pub input: String,
    /// Output directory for the `.c` files, relative to the config file.
    pub out_dir: String,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Support header every generated file includes. Written alongside the
    /// definitions.
    #[serde(default = "default_support_header")]
    pub support_header: String,
}

fn default_support_header() -> String {
    "monobind.h".to_string()
}

/// Values baked into the generated initializer.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_domain_name")]
    pub domain_name: String,
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,
}

fn default_domain_name() -> String {
    DEFAULT_DOMAIN_NAME.to_string()
}

fn default_runtime_version() -> String {
    DEFAULT_RUNTIME_VERSION.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            domain_name: default_domain_name(),
            runtime_version: default_runtime_version(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Blocklist {
    /// Qualified class names (`Ns.Class`).
    #[serde(default)]
    pub classes: Vec<String>,
    /// Method blocklist in "Ns.Class.Method" format; constructors are
    /// "Ns.Class..ctor".
    #[serde(default)]
    pub methods: Vec<String>,
}

impl Blocklist {
    /// Parse method blocklist entries into (qualified class, method) tuples.
    /// The method name is everything after the last `.`, except for the
    /// `..ctor` suffix which names the constructor. Malformed entries are
    /// skipped with a warning.
    pub fn method_tuples(&self) -> Vec<(String, String)> {
        self.methods
            .iter()
            .filter_map(|entry| {
                let parsed = match entry.strip_suffix(&format!(".{CONSTRUCTOR_NAME}")) {
                    Some(class) => Some((class, CONSTRUCTOR_NAME)),
                    None => entry.rsplit_once('.'),
                };
                match parsed {
                    Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                        Some((class.to_string(), method.to_string()))
                    }
                    _ => {
                        warn!(entry = %entry, "ignoring malformed method blocklist entry");
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg = MonobindConfig::parse(
            "[codegen]\ninput = \"bindings.json\"\nout_dir = \"generated\"\n",
            Path::new("monobind.config.toml"),
        )
        .unwrap();
        assert_eq!(cfg.codegen.error_policy, ErrorPolicy::Silent);
        assert_eq!(cfg.codegen.support_header, "monobind.h");
        assert_eq!(cfg.runtime.domain_name, "mono_managed_to_native_binding");
        assert_eq!(cfg.runtime.runtime_version, "v4.0.30319");
        assert!(cfg.blocklist.classes.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let text = r#"
[codegen]
input = "in.json"
out_dir = "out"
error_policy = "status"
support_header = "bridge.h"

[runtime]
domain_name = "app"
runtime_version = "v2.0.50727"

[blocklist]
classes = ["Ns.Internal"]
methods = ["Ns.Outer.Inner.Method", "Ns.Outer..ctor"]
"#;
        let cfg = MonobindConfig::parse(text, Path::new("x.toml")).unwrap();
        assert_eq!(cfg.codegen.error_policy, ErrorPolicy::Status);
        assert_eq!(cfg.runtime.domain_name, "app");
        assert_eq!(
            cfg.blocklist.method_tuples(),
            vec![
                ("Ns.Outer.Inner".to_string(), "Method".to_string()),
                ("Ns.Outer".to_string(), ".ctor".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_method_entries_are_skipped() {
        let blocklist = Blocklist {
            classes: vec![],
            methods: vec!["Bad".into(), ".Method".into(), "Ns.Class.".into(), "Ns.Class.Run".into()],
        };
        assert_eq!(
            blocklist.method_tuples(),
            vec![("Ns.Class".to_string(), "Run".to_string())]
        );
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = MonobindConfig::parse("[codegen", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, CodegenError::Toml { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
