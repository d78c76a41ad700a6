//! Database module: entity models and SQL repositories.
//!
//! This module is split into two submodules:
//! - `model`: typed domain entities and view models returned by repositories.
//! - `repo`: SQL-only functions that map rows into entities.
//!
//! External modules should import from `versebot::db` — we re-export the
//! repository API and commonly used models for convenience.

pub mod model;
pub mod repo;

// Re-export the repository API at `crate::db::*`.
pub use repo::*;

// Surface view models used by callers (handlers, scheduler).
pub use model::{Book, ChapterVerse, SubscriberDelivery, Verse};
