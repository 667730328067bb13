//! Component registration and fragment retrieval

mod loader;
mod registry;

pub use loader::{FileFragmentLoader, FragmentLoader, LoaderError, StaticFragmentLoader};
pub use registry::{ComponentRegistry, ComponentRegistryBuilder, RegistryError, DEFAULT_PREFIX};
