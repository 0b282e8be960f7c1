pub mod cache;

pub use cache::{positive_expiration, CacheRepository};

#[cfg(test)]
pub use cache::MockCacheRepository;
