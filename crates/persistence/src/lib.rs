//! Persistence layer for the site tracking engine.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - `PersistenceStore` backends (in-memory and PostgreSQL)

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod pg_store;
pub mod repositories;

pub use memory::InMemoryStore;
pub use pg_store::PgStore;
