//! Streak evaluation. The record only remembers the latest credited day, so the rules infer
//! history from it:
//!  - Reaching full completion on a day not yet credited extends the streak when yesterday was
//!    credited and restarts it at 1 otherwise.
//!  - Dropping below full completion on a day already credited takes the credit back and assumes
//!    the remaining run ended yesterday.
//!
//! The inference can't tell a run that was already broken from one that is still going, so
//! oscillating around 100% within a day undoes and redoes the same credit.

use chrono::NaiveDate;
use tracing::info;

use crate::utils::{percentage::Percentage, time::yesterday};

use super::entities::StreakRecord;

/// Applies one evaluation step and returns the next record. Returns `None` when nothing changes.
pub fn evaluate_streak(
    record: &StreakRecord,
    completion: Percentage,
    today: NaiveDate,
) -> Option<StreakRecord> {
    let yesterday = yesterday(today);

    if completion.is_full() {
        if record.last_date == Some(today) {
            return None;
        }
        let count = if record.last_date == Some(yesterday) {
            record.count.saturating_add(1)
        } else {
            1
        };
        info!("Day {today} completed, streak is now {count}");
        return Some(StreakRecord {
            count,
            last_date: Some(today),
        });
    }

    if record.last_date == Some(today) {
        let count = record.count.saturating_sub(1);
        info!("Completion for {today} lost, streak reverted to {count}");
        return Some(StreakRecord {
            count,
            last_date: (count > 0).then_some(yesterday),
        });
    }

    None
}

/// The streak as shown to the user. A run whose latest credit is older than yesterday is broken
/// and displays as zero, though the stored count is kept until the next completion.
pub fn display_streak(record: &StreakRecord, today: NaiveDate) -> u32 {
    match record.last_date {
        Some(date) if date == today || date == yesterday(today) => record.count,
        _ => 0,
    }
}
