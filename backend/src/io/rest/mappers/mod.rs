pub mod memorial_mapper;

pub use memorial_mapper::MemorialMapper;
