//! Command/query objects: one validated entry point per task use case.
//!
//! # Responsibility
//! - Validate input, delegate to one repository call, translate absence.
//! - Keep CLI/outer layers decoupled from repository and SQL details.

pub mod task_commands;
