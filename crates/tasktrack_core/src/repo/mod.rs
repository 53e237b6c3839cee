//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task data access contract.
//! - Isolate SQLite query details from the command layer.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Reads report absence as `Ok(None)`; writes report it as `NotFound`.

pub mod task_repo;
