// Opaque handles handed out by the embedding API. Rust never dereferences
// them; a zero value is the runtime's null.

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub const fn null() -> Self {
                $name(0)
            }

            #[inline]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// `None` for the null handle.
            #[inline]
            pub fn non_null(self) -> Option<Self> {
                if self.is_null() { None } else { Some(self) }
            }
        }
    };
}

opaque_handle!(
    /// Handle to the managed execution domain (`MonoDomain*`).
    DomainHandle
);

opaque_handle!(
    /// Handle to a loaded managed assembly (`MonoAssembly*`).
    AssemblyHandle
);

opaque_handle!(
    /// Metadata image of an assembly (`MonoImage*`).
    ImageHandle
);

opaque_handle!(
    /// Resolved managed class (`MonoClass*`).
    ClassHandle
);

opaque_handle!(
    /// Resolved managed method (`MonoMethod*`).
    MethodHandle
);

opaque_handle!(
    /// Parsed method descriptor (`MonoMethodDesc*`). Must be released.
    DescriptorHandle
);

opaque_handle!(
    /// Live reference to a managed object (`MonoObject*`). Only valid until
    /// the next collection unless reachable through a [`BoundaryHandle`].
    ObjectRef
);

/// Stable cross-boundary handle to a managed object (a GC handle).
///
/// The runtime keeps the target reachable until the handle is released.
/// Mono hands these out as `uint32_t`, which is what generated proxies store.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BoundaryHandle(pub u32);
