pub mod dao;
pub mod math_registry;

pub use dao::{EntityDao, MemoryEntityDao};
pub use math_registry::MathRegistry;
