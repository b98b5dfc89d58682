//! Analysis cache adapters.
//!
//! - `InMemoryAnalysisCache` - Process-local, lazy expiry plus sweeper
//! - `RedisAnalysisCache` - Shared across instances, Redis-managed expiry

mod in_memory;
mod redis;

pub use self::redis::RedisAnalysisCache;
pub use in_memory::InMemoryAnalysisCache;
