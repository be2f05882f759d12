// ObjectProxy: native-side stand-in for a managed object.
//
// Construction roots the object behind a boundary handle; Drop releases the
// handle so the managed side may collect the object again.

use std::sync::Arc;

use tracing::trace;

use monobind_abi::{BoundaryHandle, ClassHandle, EmbeddingApi, ObjectRef};

/// An owning reference to a managed object.
///
/// - `!Clone`: the boundary handle has exactly one owner. Share through `Arc`.
/// - The target stays reachable until the proxy is dropped.
/// - No revalidation on use: [`target`](Self::target) trusts the handle.
pub struct ObjectProxy {
    class: ClassHandle,
    handle: BoundaryHandle,
    api: Arc<dyn EmbeddingApi>,
}

impl ObjectProxy {
    /// Root `object` behind a new (non-pinned) boundary handle.
    pub(crate) fn adopt(api: &Arc<dyn EmbeddingApi>, class: ClassHandle, object: ObjectRef) -> Self {
        let handle = api.new_boundary_handle(object, false);
        trace!(handle = handle.0, class = class.0, "proxy created");
        ObjectProxy {
            class,
            handle,
            api: Arc::clone(api),
        }
    }

    /// Class the proxy was created for.
    #[inline]
    pub fn class(&self) -> ClassHandle {
        self.class
    }

    /// The stable cross-boundary handle.
    #[inline]
    pub fn handle(&self) -> BoundaryHandle {
        self.handle
    }

    /// Recover the live object reference. Valid until the next collection;
    /// fetch it again for every call.
    #[inline]
    pub fn target(&self) -> ObjectRef {
        self.api.resolve_boundary_handle(self.handle)
    }
}

impl Drop for ObjectProxy {
    fn drop(&mut self) {
        trace!(handle = self.handle.0, "proxy released");
        self.api.release_boundary_handle(self.handle);
    }
}

impl std::fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectProxy")
            .field("class", &self.class)
            .field("handle", &self.handle)
            .finish()
    }
}
