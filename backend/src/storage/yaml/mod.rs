//! YAML-file document store.
//!
//! Collections map to directories under the data directory and each memorial
//! is one `{id}.yaml` document:
//!
//! ```text
//! <data_dir>/pet_profiles/{id}.yaml
//! <data_dir>/users/{uid}/pet_memorial_profiles/{id}.yaml
//! ```

pub mod connection;
pub mod memorial_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::YamlConnection;
pub use memorial_repository::{MemorialDocument, MemorialRepository};
