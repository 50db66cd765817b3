//! Read-only exports of today's progress.

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    tracker::{entities::WorkoutHour, store::ProgressStore},
    utils::time::date_key,
};

const CSV_HEADER: [&str; 6] = [
    "date",
    "hour",
    "exercise_id",
    "exercise_name",
    "reps_done",
    "hourly_goal",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// File name used when an export is saved to a directory.
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("workout-data-{}.{}", date_key(date), format.extension())
}

pub fn export(store: &ProgressStore, format: ExportFormat, date: NaiveDate) -> Result<String> {
    match format {
        ExportFormat::Json => export_json(store),
        ExportFormat::Csv => Ok(export_csv(store, date)),
    }
}

/// The exercise list in the same shape it is persisted in.
pub fn export_json(store: &ProgressStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(store.exercises())?)
}

/// One row per slot and exercise, slots ascending and exercises in list order.
pub fn export_csv(store: &ProgressStore, date: NaiveDate) -> String {
    let date = date_key(date);
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');

    for hour in WorkoutHour::all() {
        for exercise in store.exercises() {
            let row = [
                date.clone(),
                hour.to_string(),
                csv_field(&exercise.id),
                csv_field(&exercise.name),
                exercise.reps_at(hour).to_string(),
                exercise.goal.to_string(),
            ];
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
