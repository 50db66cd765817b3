//! Hourly workout logger. Repetitions are logged for a fixed set of daytime hour slots,
//! measured against per-exercise hourly goals, and fully completed days build up a streak.
//! The tracker itself is a plain state machine; storage, the clock and the terminal are
//! collaborators that feed it.
//!

pub mod cli;
pub mod export;
pub mod fs;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod utils;
