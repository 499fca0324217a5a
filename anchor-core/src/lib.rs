//! Core library for Anchor.
//!
//! This crate provides the domain models and database operations for the
//! Anchor verse API, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use anchor_core::db::Database;
//! use anchor_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let candidates = db.get_themed_verses(Theme::Peace)?;
//! # Ok::<(), anchor_core::db::DbError>(())
//! ```

pub mod db;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
