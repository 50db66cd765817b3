//! Storage is organized through [persistence::ProgressPersistence].
//! The basic idea is:
//!   - There is a directory with one JSON file per key.
//!   - Exercises, the day their logs belong to, and the streak live under separate keys.
//!   - Files are replaced atomically, so a crash leaves either the old or the new value.

pub mod key_value;
pub mod persistence;
