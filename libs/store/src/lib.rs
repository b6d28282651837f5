//! Document store for the leaderboard service
//!
//! This crate owns the single durable document that holds every user and
//! activity record. It keeps in-memory indexes over the document, appends
//! each mutation to a journal, and periodically folds the journal into an
//! atomically written snapshot.

pub mod database;
pub mod document;
pub mod error;
pub mod journal;

pub use database::{Database, DatabaseConfig, RecoveryMode, Store};
pub use document::{Activity, Document, RankingCache, User};
pub use error::{StoreError, StoreResult};
