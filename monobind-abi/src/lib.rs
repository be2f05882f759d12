// monobind-abi: handle types, shared type vocabulary and the embedding API
// contract. This crate defines everything the generator and the runtime
// bridge must agree on.

pub mod handles;
pub mod types;
pub mod descriptor;
pub mod embedding;
pub mod error;

pub use handles::*;
pub use types::*;
pub use descriptor::{method_descriptor, qualified_name, CONSTRUCTOR_NAME};
pub use embedding::{
    AssemblyLocator, EmbeddingApi, SearchPathLocator, DEFAULT_DOMAIN_NAME, DEFAULT_RUNTIME_VERSION,
};
pub use error::BindStatus;
