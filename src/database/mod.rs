//! filemarks persistence layer.
//!
//! The [`KeyValueStore`] trait is the seam the bookmark manager writes
//! through. [`SqliteStore`] keeps documents in a migrated SQLite file and
//! [`MemoryStore`] keeps them in process.
//!
//! ```no_run
//! use filemarks::database::{KeyValueStore, SqliteStore};
//!
//! let store = SqliteStore::open("filemarks.db").expect("failed to open store");
//! let doc = store.get("filemarks.bookmarks").expect("read failed");
//! ```

pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::Database;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
