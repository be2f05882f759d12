// monobind-runtime: the executed bridge between native callers and a hosted
// managed runtime. Every runtime call goes through an injected `EmbeddingApi`,
// so the whole resolution chain can run against a real runtime shim or the
// in-memory stub used by the tests.

pub mod binding;
pub mod bridge;
pub mod config;
pub mod error;
pub mod marshal;
pub mod proxy;
pub mod thunk;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use binding::{AssemblyBinding, ClassBinding, LoadedAssembly, RuntimeState};
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use marshal::NativeValue;
pub use proxy::ObjectProxy;
pub use thunk::{MethodSignature, Thunk};

pub use monobind_abi::{
    AssemblyLocator, BindStatus, EmbeddingApi, ErrorPolicy, SearchPathLocator, TypeRef,
};

/// Lock a mutex, taking the data even if a previous holder panicked.
/// Binding caches only ever move forward, so a poisoned value is still valid.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
