//! Caching of walked reference trees

pub mod lru;

pub use self::lru::{fingerprint, CacheKey, TreeCache};
