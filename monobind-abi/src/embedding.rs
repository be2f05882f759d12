use std::path::{Path, PathBuf};

use crate::handles::*;
use crate::types::{ManagedArg, Primitive, PrimitiveType};

/// Domain name passed to `initialize_runtime` unless configured otherwise.
pub const DEFAULT_DOMAIN_NAME: &str = "mono_managed_to_native_binding";

/// Target framework version passed to `initialize_runtime`.
pub const DEFAULT_RUNTIME_VERSION: &str = "v4.0.30319";

// ---------------------------------------------------------------------------
// Embedding API
// ---------------------------------------------------------------------------

/// The C-level hosting interface of the managed runtime.
///
/// Implementations are thin shims over the runtime's exported functions; the
/// bridge never assumes anything beyond what each method documents. Null
/// handles are returned (never panics) when a lookup finds nothing. All calls
/// block until the runtime returns.
pub trait EmbeddingApi: Send + Sync {
    /// Read the runtime's environment configuration (`mono_config_parse`).
    fn load_configuration(&self);

    /// Start the runtime and create the root domain (`mono_jit_init_version`).
    fn initialize_runtime(&self, domain_name: &str, version: &str) -> DomainHandle;

    /// Open an assembly from disk into `domain` (`mono_domain_assembly_open`).
    fn open_assembly(&self, domain: DomainHandle, path: &Path) -> AssemblyHandle;

    /// Metadata image of an opened assembly (`mono_assembly_get_image`).
    fn get_image(&self, assembly: AssemblyHandle) -> ImageHandle;

    /// Look a class up by namespace and simple name (`mono_class_from_name`).
    fn resolve_class(&self, image: ImageHandle, namespace: &str, name: &str) -> ClassHandle;

    /// Parse a descriptor string (`mono_method_desc_new`).
    fn build_method_descriptor(&self, signature: &str, include_namespace: bool) -> DescriptorHandle;

    /// Find the method matching `descriptor` in `class` (`mono_method_desc_search_in_class`).
    fn search_method(&self, descriptor: DescriptorHandle, class: ClassHandle) -> MethodHandle;

    /// Free a parsed descriptor (`mono_method_desc_free`).
    fn release_descriptor(&self, descriptor: DescriptorHandle);

    /// Allocate an uninitialized instance of `class` (`mono_object_new`).
    fn new_object(&self, domain: DomainHandle, class: ClassHandle) -> ObjectRef;

    /// Root `object` behind a stable handle (`mono_gchandle_new`).
    fn new_boundary_handle(&self, object: ObjectRef, pinned: bool) -> BoundaryHandle;

    /// Current target of a boundary handle (`mono_gchandle_get_target`).
    fn resolve_boundary_handle(&self, handle: BoundaryHandle) -> ObjectRef;

    /// Drop the root held by a boundary handle (`mono_gchandle_free`).
    fn release_boundary_handle(&self, handle: BoundaryHandle);

    /// Invoke `method` (`mono_runtime_invoke`).
    ///
    /// `instance` is `None` for static methods and `args` is `None` when the
    /// method takes no arguments. A managed exception is written into
    /// `exception` and the returned reference is then null. Value-typed
    /// results come back boxed; void methods return null.
    fn invoke(
        &self,
        method: MethodHandle,
        instance: Option<ObjectRef>,
        args: Option<&[ManagedArg]>,
        exception: &mut Option<ObjectRef>,
    ) -> ObjectRef;

    /// Create a managed string from UTF-8 (`mono_string_new`).
    fn new_string(&self, domain: DomainHandle, text: &str) -> ObjectRef;

    /// Copy a managed string out as UTF-8 (`mono_string_to_utf8`).
    fn string_to_utf8(&self, string: ObjectRef) -> Option<String>;

    /// Read a boxed value type (`mono_object_unbox`). `None` if `boxed` does
    /// not hold a `ty`.
    fn unbox(&self, boxed: ObjectRef, ty: PrimitiveType) -> Option<Primitive>;

    /// Runtime class of a live object (`mono_object_get_class`).
    fn object_class(&self, object: ObjectRef) -> ClassHandle;
}

// ---------------------------------------------------------------------------
// Assembly location
// ---------------------------------------------------------------------------

/// Maps an assembly file name (`Managed.dll`) to a path on disk.
pub trait AssemblyLocator: Send + Sync {
    fn find_assembly_path(&self, file_name: &str) -> Option<PathBuf>;
}

/// Looks in a fixed list of directories, in order.
#[derive(Debug, Clone, Default)]
pub struct SearchPathLocator {
    pub dirs: Vec<PathBuf>,
}

impl SearchPathLocator {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        SearchPathLocator { dirs: dirs.into_iter().collect() }
    }
}

impl AssemblyLocator for SearchPathLocator {
    fn find_assembly_path(&self, file_name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}
