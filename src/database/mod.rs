//! Markshelf database layer.
//!
//! SQLite connection management and schema migrations for the bookmark tree.
//!
//! # Usage
//!
//! ```no_run
//! use markshelf::database::Database;
//!
//! let db = Database::open("bookmarks.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
