// Lazily resolved binding records: runtime state, assemblies, classes.
//
// Each record moves from unresolved to resolved at most once and never back.
// Resolution itself lives on `Bridge`; these types only hold the caches.
// Unlike generated C (which assumes a single calling thread), every cache
// here is guarded so concurrent first calls resolve exactly once.

use std::sync::{Arc, Mutex, OnceLock};

use monobind_abi::{qualified_name, AssemblyHandle, ClassHandle, DomainHandle, ImageHandle};

/// Process-wide runtime record. Initialized once, never torn down.
#[derive(Debug, Default)]
pub struct RuntimeState {
    pub(crate) domain: OnceLock<DomainHandle>,
}

impl RuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.domain.get().is_some()
    }

    /// The domain handle, if the runtime has been started.
    pub fn domain(&self) -> Option<DomainHandle> {
        self.domain.get().copied()
    }
}

/// Handles of an opened assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedAssembly {
    pub assembly: AssemblyHandle,
    pub image: ImageHandle,
}

/// One bound assembly, identified by its simple name (`Managed` for
/// `Managed.dll`). Stays unloaded while the file cannot be found or opened,
/// so every use retries.
#[derive(Debug)]
pub struct AssemblyBinding {
    name: String,
    pub(crate) loaded: Mutex<Option<LoadedAssembly>>,
}

impl AssemblyBinding {
    pub fn new(name: impl Into<String>) -> Self {
        AssemblyBinding {
            name: name.into(),
            loaded: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name handed to the assembly locator.
    pub fn file_name(&self) -> String {
        format!("{}.dll", self.name)
    }

    pub fn is_loaded(&self) -> bool {
        crate::lock_or_recover(&self.loaded).is_some()
    }
}

/// One bound managed class. The handle stays null until a lookup succeeds;
/// there is no separate failed state.
#[derive(Debug)]
pub struct ClassBinding {
    assembly: Arc<AssemblyBinding>,
    namespace: String,
    name: String,
    qualified: String,
    pub(crate) handle: Mutex<ClassHandle>,
}

impl ClassBinding {
    pub fn new(
        assembly: Arc<AssemblyBinding>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let qualified = qualified_name(&namespace, &name);
        ClassBinding {
            assembly,
            namespace,
            name,
            qualified,
            handle: Mutex::new(ClassHandle::null()),
        }
    }

    /// The assembly this class is looked up in.
    pub fn assembly(&self) -> &AssemblyBinding {
        &self.assembly
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted qualified name (`Ns.Class`).
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    pub fn is_resolved(&self) -> bool {
        !crate::lock_or_recover(&self.handle).is_null()
    }
}
