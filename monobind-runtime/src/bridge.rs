// Bridge: the resolution chain (runtime → assembly → class → method).

use std::sync::Arc;

use tracing::{debug, info, warn};

use monobind_abi::{AssemblyLocator, ClassHandle, DomainHandle, EmbeddingApi, ImageHandle, MethodHandle};

use crate::binding::{AssemblyBinding, ClassBinding, LoadedAssembly, RuntimeState};
use crate::config::BridgeConfig;
use crate::lock_or_recover;

/// Owns the process-wide runtime state and drives every lazy resolution.
///
/// Construct one per process and share it; assembly and class bindings are
/// owned by whoever declares them (typically statics next to the thunks).
pub struct Bridge {
    api: Arc<dyn EmbeddingApi>,
    locator: Arc<dyn AssemblyLocator>,
    config: BridgeConfig,
    runtime: RuntimeState,
}

impl Bridge {
    pub fn new(
        api: Arc<dyn EmbeddingApi>,
        locator: Arc<dyn AssemblyLocator>,
        config: BridgeConfig,
    ) -> Self {
        Bridge {
            api,
            locator,
            config,
            runtime: RuntimeState::new(),
        }
    }

    pub fn api(&self) -> &Arc<dyn EmbeddingApi> {
        &self.api
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    /// Start the managed runtime if it is not running yet.
    ///
    /// The first caller parses the environment configuration and creates the
    /// domain; everyone else gets the cached handle.
    pub fn ensure_initialized(&self) -> DomainHandle {
        *self.runtime.domain.get_or_init(|| {
            self.api.load_configuration();
            let domain = self
                .api
                .initialize_runtime(&self.config.domain_name, &self.config.runtime_version);
            info!(
                domain_name = %self.config.domain_name,
                version = %self.config.runtime_version,
                "managed runtime initialized"
            );
            domain
        })
    }

    /// Open `assembly` against the domain and fetch its image.
    ///
    /// The caller must have run [`ensure_initialized`](Self::ensure_initialized).
    /// Returns `None` (and stays unloaded) when the file cannot be located or
    /// the runtime refuses to open it.
    pub fn ensure_assembly_loaded(&self, assembly: &AssemblyBinding) -> Option<ImageHandle> {
        let mut loaded = lock_or_recover(&assembly.loaded);
        if let Some(l) = *loaded {
            return Some(l.image);
        }

        let domain = self.runtime.domain().unwrap_or_default();
        let file_name = assembly.file_name();
        let Some(path) = self.locator.find_assembly_path(&file_name) else {
            warn!(assembly = %file_name, "assembly not found on search path");
            return None;
        };
        let handle = self.api.open_assembly(domain, &path).non_null()?;
        let image = self.api.get_image(handle);
        debug!(assembly = %file_name, path = %path.display(), "assembly loaded");

        *loaded = Some(LoadedAssembly { assembly: handle, image });
        Some(image)
    }

    /// Resolve the class handle, bringing up the runtime and the owning
    /// assembly first. A failed lookup leaves the binding unresolved so the
    /// next call tries again.
    pub fn ensure_class_resolved(&self, class: &ClassBinding) -> Option<ClassHandle> {
        let mut handle = lock_or_recover(&class.handle);
        if !handle.is_null() {
            return Some(*handle);
        }

        self.ensure_initialized();
        let Some(image) = self.ensure_assembly_loaded(class.assembly())?.non_null() else {
            debug!(class = %class.qualified_name(), "assembly has no image");
            return None;
        };
        let resolved = self.api.resolve_class(image, class.namespace(), class.name());
        if resolved.is_null() {
            debug!(class = %class.qualified_name(), "class lookup failed");
            return None;
        }
        debug!(class = %class.qualified_name(), "class resolved");
        *handle = resolved;
        Some(resolved)
    }

    /// Look a method up by descriptor inside a resolved class.
    ///
    /// Not cached: every call builds, searches and frees a fresh descriptor.
    pub fn resolve_method(&self, class: ClassHandle, descriptor: &str) -> Option<MethodHandle> {
        let desc = self.api.build_method_descriptor(descriptor, true);
        let method = self.api.search_method(desc, class);
        self.api.release_descriptor(desc);
        method.non_null()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("runtime", &self.runtime)
            .finish()
    }
}
