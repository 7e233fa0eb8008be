//! Background Tasks Module
//!
//! Work that runs detached from request handling.
//!
//! # Tasks
//! - Trim: Evicts the oldest runtime entries after a cache write

mod trim;

pub use trim::spawn_trim_task;
