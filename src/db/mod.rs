//! Database module: the `users` table and its access layer.
//!
//! Layout:
//! - `models.rs`: the row struct and the lookup sentinel
//! - `schema.rs`: DDL and the seed dataset
//! - `storage.rs`: pool construction and every query the directory issues

pub mod models;
pub mod schema;
pub mod storage;

pub use models::DirectoryEntry;
pub use schema::SEED_ENTRIES;
pub use storage::{DbPool, DirectoryStorage, connect, mysql_url};
