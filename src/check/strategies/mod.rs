//! Check strategy implementations

mod excluded;
mod registry;

pub use excluded::ExcludedImagesStrategy;
pub use registry::RegistryStrategy;
