//! Domain model for task tracking.
//!
//! # Responsibility
//! - Define the task record and its closed status set.
//! - Define the page container returned by list queries.
//!
//! # Invariants
//! - Every persisted task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod page;
pub mod task;
