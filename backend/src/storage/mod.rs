//! # Storage Module
//!
//! Persistence for memorial records behind the [`MemorialStorage`] trait.
//! The domain layer only sees the trait; the implementation is chosen at
//! startup from configuration.
//!
//! ## Implementations
//!
//! - **YAML documents** (`yaml`): one file per memorial, laid out by collection path
//! - **In-memory** (`memory`): for tests and throwaway deployments

pub mod memory;
pub mod traits;
pub mod yaml;

pub use memory::InMemoryMemorialStore;
pub use traits::{MemorialQuery, MemorialStorage, QueryField, SortDirection};
pub use yaml::{MemorialRepository, YamlConnection};
