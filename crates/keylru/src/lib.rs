//! # keylru
//!
//! Fixed-capacity, thread-safe LRU cache for items that carry their own key.
//!
//! ## Architecture
//! - **Index**: AHash map from key to arena slot (O(1))
//! - **Recency list**: Doubly-linked list threaded through the arena (O(1))
//! - **Lock**: One `parking_lot::Mutex` guards index and list together
//!
//! ```
//! use keylru::{Cache, Keyed};
//!
//! #[derive(Clone)]
//! struct Row {
//!     id: String,
//!     body: String,
//! }
//!
//! impl Keyed for Row {
//!     fn key(&self) -> &str {
//!         &self.id
//!     }
//! }
//!
//! let cache = Cache::new(2).unwrap();
//! cache.add(Row { id: "a".into(), body: "first".into() });
//! cache.add(Row { id: "b".into(), body: "second".into() });
//! cache.get("a");
//! cache.add(Row { id: "c".into(), body: "third".into() }); // evicts "b"
//!
//! assert!(cache.get("b").is_none());
//! assert_eq!(cache.peek_head().unwrap().body, "third");
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod keyed;
mod lru;
mod stats;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use keyed::Keyed;
pub use lru::{Admission, Iter, LruCache};
pub use stats::{CacheStats, StatsSnapshot};
