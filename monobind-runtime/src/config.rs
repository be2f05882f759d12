// Bridge configuration. Deserializable so hosts can keep it next to the
// generator's `[runtime]` table.

use serde::Deserialize;

use monobind_abi::{ErrorPolicy, DEFAULT_DOMAIN_NAME, DEFAULT_RUNTIME_VERSION};

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Name of the root domain created at first use.
    #[serde(default = "default_domain_name")]
    pub domain_name: String,
    /// Framework version string passed when starting the runtime.
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

fn default_domain_name() -> String {
    DEFAULT_DOMAIN_NAME.to_string()
}

fn default_runtime_version() -> String {
    DEFAULT_RUNTIME_VERSION.to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            domain_name: default_domain_name(),
            runtime_version: default_runtime_version(),
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}
