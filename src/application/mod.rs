//! Application layer for the todo board.
//!
//! Record operations, the invalidation signal they fire, and the listing
//! cache that listens to it.

pub mod cache;
pub mod invalidation;
pub mod service;

pub use cache::{CacheStats, ListingCache, ListingKey};
pub use invalidation::{Generation, InvalidationSignal};
pub use service::{ListPage, Operation, PAGE_SIZE, TodoError, TodoService};
