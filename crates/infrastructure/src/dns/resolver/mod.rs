pub mod cache_layer;
pub mod core;

pub use cache_layer::CachedResolver;
pub use core::CoreResolver;
