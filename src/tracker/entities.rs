use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use anyhow::anyhow;
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

pub const FIRST_WORKOUT_HOUR: u8 = 10;
pub const LAST_WORKOUT_HOUR: u8 = 19;
pub const WORKOUT_HOUR_COUNT: u64 = (LAST_WORKOUT_HOUR - FIRST_WORKOUT_HOUR + 1) as u64;

/// One of the ten daytime slots, 10:00 to 19:00, in which repetitions are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WorkoutHour(u8);

impl WorkoutHour {
    pub fn new_opt(hour: u8) -> Option<WorkoutHour> {
        (FIRST_WORKOUT_HOUR..=LAST_WORKOUT_HOUR)
            .contains(&hour)
            .then_some(WorkoutHour(hour))
    }

    /// All slots in ascending order.
    pub fn all() -> impl Iterator<Item = WorkoutHour> {
        (FIRST_WORKOUT_HOUR..=LAST_WORKOUT_HOUR).map(WorkoutHour)
    }

    /// The slot a wall-clock time falls into, if it's inside the workout window.
    pub fn current(time: &impl Timelike) -> Option<WorkoutHour> {
        u8::try_from(time.hour()).ok().and_then(Self::new_opt)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// 12-hour label, e.g. `10 AM` or `7 PM`.
    pub fn label(&self) -> String {
        let period = if self.0 >= 12 { "PM" } else { "AM" };
        let hour = if self.0 > 12 { self.0 - 12 } else { self.0 };
        format!("{hour} {period}")
    }
}

impl TryFrom<u8> for WorkoutHour {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WorkoutHour::new_opt(value).ok_or_else(|| {
            format!("{value} is outside of workout hours {FIRST_WORKOUT_HOUR}..={LAST_WORKOUT_HOUR}")
        })
    }
}

impl From<WorkoutHour> for u8 {
    fn from(value: WorkoutHour) -> Self {
        value.0
    }
}

impl FromStr for WorkoutHour {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hour = s.trim().parse::<u8>()?;
        WorkoutHour::try_from(hour).map_err(|e| anyhow!(e))
    }
}

impl Display for WorkoutHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repetitions logged per slot. Only touched slots are present; a missing slot reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyLog(BTreeMap<WorkoutHour, u32>);

impl HourlyLog {
    pub fn get(&self, hour: WorkoutHour) -> u32 {
        self.0.get(&hour).copied().unwrap_or(0)
    }

    pub fn set(&mut self, hour: WorkoutHour, reps: u32) {
        self.0.insert(hour, reps);
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|&reps| u64::from(reps)).sum()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub goal: u32,
    #[serde(default)]
    pub hourly_logs: HourlyLog,
}

impl Exercise {
    pub fn new(id: impl Into<String>, name: impl Into<String>, goal: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            goal: goal.max(1),
            hourly_logs: HourlyLog::default(),
        }
    }

    pub fn reps_at(&self, hour: WorkoutHour) -> u32 {
        self.hourly_logs.get(hour)
    }

    pub fn is_hour_complete(&self, hour: WorkoutHour) -> bool {
        self.reps_at(hour) >= self.goal
    }

    pub fn total_reps(&self) -> u64 {
        self.hourly_logs.total()
    }

    /// Target for the whole day, regardless of how many slots have been logged.
    pub fn daily_goal(&self) -> u64 {
        u64::from(self.goal) * WORKOUT_HOUR_COUNT
    }
}

/// The persisted unit of daily progress: exercises with their logs and the day those logs
/// belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub exercises: Vec<Exercise>,
    pub tracked_date: NaiveDate,
}

/// Consecutive fully-completed days. `last_date` is the latest credited day, `None` if none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub count: u32,
    #[serde(with = "last_date_ser", default)]
    pub last_date: Option<NaiveDate>,
}

/// Stored as a `YYYY-MM-DD` string, where an empty string means the streak was never credited.
mod last_date_ser {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::{date_key, parse_date_key};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date_key(*date)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if s.is_empty() {
            return Ok(None);
        }
        parse_date_key(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid streak date {s}")))
    }
}

/// Exercises used when nothing has been saved yet.
pub fn default_exercises() -> Vec<Exercise> {
    vec![
        Exercise::new("jumps", "Jumps", 10),
        Exercise::new("squats", "Squats", 10),
        Exercise::new("lift-weights", "Lift Weights", 10),
        Exercise::new("pushups", "Pushups", 20),
        Exercise::new("crunches", "Crunches", 20),
    ]
}
