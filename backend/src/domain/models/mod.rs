pub mod memorial;

pub use memorial::*;
