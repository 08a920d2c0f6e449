//! # Stockroom Database Crate
//!
//! The persistence layer: every product, category, sale, snapshot, preference
//! and saved report lives behind the `InventoryStore` trait.
//!
//! ## Architectural Principles
//!
//! - **Owner scoping:** Every query filters on the owning `user_id`. Another
//!   user's record reads as `DbError::NotFound`.
//! - **Upserts for singletons:** Per-user preferences, per-day snapshots and
//!   named reports are written with `ON CONFLICT` so concurrent first access
//!   cannot produce duplicate rows.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   connection pool (`PgPool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool construction and embedded schema migrations.
//! - `InventoryStore`: the storage contract the web layer programs against.
//! - `DbRepository`: the PostgreSQL implementation.
//! - `MemoryStore`: an in-process implementation (feature `test-helpers`).
//! - `DbError`: The specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod repository;
pub mod store;

pub use connection::{connect, run_migrations};
pub use error::DbError;
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryStore;
pub use repository::DbRepository;
pub use store::InventoryStore;
