use std::fmt::Write;

use ansi_term::{Colour, Style};
use chrono::{DateTime, Local};

use crate::tracker::{entities::WorkoutHour, store::ProgressStore};

const PROGRESS_BAR_WIDTH: usize = 30;
const HOUR_COLUMN_WIDTH: usize = 7;

/// Renders today's progress: completion, streak, per-exercise totals and the hour grid.
pub fn render_status(store: &ProgressStore, now: DateTime<Local>) -> String {
    let today = now.date_naive();
    let completion = store.daily_completion_percentage();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        Style::new().bold().paint("Hourly workout tracker (10am-7pm)"),
        now.format("%Y-%m-%d %H:%M")
    );

    let filled = (*completion / 100. * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let _ = write!(
        out,
        "Daily completion {completion} (full-day total) [{}{}]",
        Colour::Blue.paint("#".repeat(filled)),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    );
    let streak = store.display_streak(today);
    if streak > 0 {
        let _ = write!(
            out,
            "  {}",
            Colour::Yellow.bold().paint(format!("{streak} day streak"))
        );
    }
    let _ = writeln!(
        out,
        "\n{} of {} reps today",
        store.total_reps_today(),
        store.total_goal_today()
    );

    let totals = store
        .exercises()
        .iter()
        .map(|ex| format!("{} {}", ex.name, ex.total_reps()))
        .collect::<Vec<_>>();
    let _ = writeln!(out, "{}\n", totals.join(" | "));

    if store.exercises().is_empty() {
        let _ = writeln!(out, "No exercises yet. Add one with `add <name>`");
        return out;
    }

    let widths = store
        .exercises()
        .iter()
        .map(|ex| ex.id.len().max(5))
        .collect::<Vec<_>>();

    let _ = write!(out, "{:<HOUR_COLUMN_WIDTH$}", "hour");
    for (exercise, &width) in store.exercises().iter().zip(&widths) {
        let _ = write!(out, " {:>width$}", exercise.id);
    }
    out.push('\n');

    let current = WorkoutHour::current(&now);
    for hour in WorkoutHour::all() {
        let label = format!("{:<HOUR_COLUMN_WIDTH$}", hour.label());
        if Some(hour) == current {
            let _ = write!(out, "{}", Colour::Cyan.bold().paint(label));
        } else {
            out.push_str(&label);
        }
        for (exercise, &width) in store.exercises().iter().zip(&widths) {
            let cell = format!("{:>width$}", format!("{}/{}", exercise.reps_at(hour), exercise.goal));
            if exercise.is_hour_complete(hour) {
                let _ = write!(out, " {}", Colour::Green.paint(cell));
            } else {
                let _ = write!(out, " {cell}");
            }
        }
        out.push('\n');
    }
    out
}

pub fn print_status(store: &ProgressStore, now: DateTime<Local>) {
    println!("{}", render_status(store, now));
}
