//! Cache module for token record storage
//!
//! This module provides the two [`CacheRepository`](tk_core::repositories::CacheRepository)
//! backends and the factory that selects between them.

pub mod factory;
pub mod memory_store;
pub mod redis_client;
pub mod redis_store;


pub use factory::RepositoryFactory;
pub use memory_store::MemoryCacheRepository;
pub use redis_client::RedisClient;
pub use redis_store::RedisCacheRepository;

// Re-export commonly used types
pub use tk_shared::config::{RedisConfig, StorageConfig, StorageKind};
