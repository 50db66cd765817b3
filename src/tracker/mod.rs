//! The daily progress state machine.
//!  - [entities] describes exercises, their per-hour logs and the streak record.
//!  - [store::ProgressStore] applies user actions and derives today's aggregates.
//!  - [streak] decides how completion changes the streak.
//!  - [input] turns typed text into the numbers the store accepts.

pub mod entities;
pub mod input;
pub mod store;
pub mod streak;
