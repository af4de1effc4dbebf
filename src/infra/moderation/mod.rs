// Implementations for the moderation workflow.

#[cfg(test)]
pub mod in_memory;
pub mod sqlite_post_store;

// Re-export for convenience
#[cfg(test)]
pub use in_memory::InMemoryPostStore;
pub use sqlite_post_store::SqlitePostStore;
