use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::utils::percentage::{Percentage, capped_percentage};

use super::{
    entities::{Exercise, ProgressSnapshot, StreakRecord, WorkoutHour, default_exercises},
    streak::{display_streak, evaluate_streak},
};

/// A single user mutation. Applied through [ProgressStore::apply] so that rollover and streak
/// evaluation always follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetReps {
        exercise_id: String,
        hour: WorkoutHour,
        reps: i64,
    },
    AdjustReps {
        exercise_id: String,
        hour: WorkoutHour,
        delta: i64,
    },
    SetToGoal {
        exercise_id: String,
        hour: WorkoutHour,
    },
    SetAllToGoalForHour {
        hour: WorkoutHour,
    },
    AddExercise {
        name: String,
        goal: i64,
    },
    DeleteExercise {
        id: String,
    },
    UpdateGoal {
        id: String,
        goal: i64,
    },
    RenameExercise {
        id: String,
        name: String,
    },
    ResetToday,
}

/// Owns today's logged repetitions and the streak. Aggregates are computed on every read.
///
/// The store never reads a clock: every operation that depends on the date receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStore {
    exercises: Vec<Exercise>,
    tracked_date: NaiveDate,
    streak: StreakRecord,
}

impl ProgressStore {
    pub fn new(exercises: Vec<Exercise>, tracked_date: NaiveDate, streak: StreakRecord) -> Self {
        Self {
            exercises,
            tracked_date,
            streak,
        }
    }

    /// Builds the store at startup. Missing data falls back to the default exercises, and logs
    /// saved on another day are dropped while their exercises and goals are kept.
    pub fn restore(
        snapshot: Option<ProgressSnapshot>,
        streak: Option<StreakRecord>,
        today: NaiveDate,
    ) -> Self {
        let snapshot = snapshot.unwrap_or_else(|| {
            info!("No saved progress found, starting with default exercises");
            ProgressSnapshot {
                exercises: default_exercises(),
                tracked_date: today,
            }
        });
        let mut store = Self::new(
            snapshot.exercises,
            snapshot.tracked_date,
            streak.unwrap_or_default(),
        );
        store.settle(today);
        store
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|ex| ex.id == id)
    }

    fn exercise_mut(&mut self, id: &str) -> Option<&mut Exercise> {
        self.exercises.iter_mut().find(|ex| ex.id == id)
    }

    pub fn tracked_date(&self) -> NaiveDate {
        self.tracked_date
    }

    pub fn streak(&self) -> &StreakRecord {
        &self.streak
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            exercises: self.exercises.clone(),
            tracked_date: self.tracked_date,
        }
    }

    /// Applies `action`, then settles the day and the streak against `today`.
    pub fn apply(&mut self, action: Action, today: NaiveDate) {
        debug!("Applying {action:?}");
        match action {
            Action::SetReps {
                exercise_id,
                hour,
                reps,
            } => self.set_reps(&exercise_id, hour, reps),
            Action::AdjustReps {
                exercise_id,
                hour,
                delta,
            } => self.adjust_reps(&exercise_id, hour, delta),
            Action::SetToGoal { exercise_id, hour } => self.set_to_goal(&exercise_id, hour),
            Action::SetAllToGoalForHour { hour } => self.set_all_to_goal_for_hour(hour),
            Action::AddExercise { name, goal } => {
                self.add_exercise(&name, goal);
            }
            Action::DeleteExercise { id } => {
                self.delete_exercise(&id);
            }
            Action::UpdateGoal { id, goal } => self.update_goal(&id, goal),
            Action::RenameExercise { id, name } => self.rename_exercise(&id, &name),
            Action::ResetToday => self.reset_today(today),
        }
        self.settle(today);
    }

    /// Unknown exercises are ignored. Negative reps are stored as zero.
    pub fn set_reps(&mut self, exercise_id: &str, hour: WorkoutHour, reps: i64) {
        let reps = clamp_reps(reps);
        if let Some(exercise) = self.exercise_mut(exercise_id) {
            exercise.hourly_logs.set(hour, reps);
        }
    }

    /// Moves the logged reps by `delta` from their current value, stopping at zero.
    pub fn adjust_reps(&mut self, exercise_id: &str, hour: WorkoutHour, delta: i64) {
        if let Some(current) = self.exercise(exercise_id).map(|ex| ex.reps_at(hour)) {
            self.set_reps(exercise_id, hour, i64::from(current).saturating_add(delta));
        }
    }

    pub fn set_to_goal(&mut self, exercise_id: &str, hour: WorkoutHour) {
        if let Some(goal) = self.exercise(exercise_id).map(|ex| ex.goal) {
            self.set_reps(exercise_id, hour, goal.into());
        }
    }

    pub fn set_all_to_goal_for_hour(&mut self, hour: WorkoutHour) {
        for exercise in &mut self.exercises {
            exercise.hourly_logs.set(hour, exercise.goal);
        }
    }

    /// Appends a new exercise with an empty log. Blank names are rejected.
    pub fn add_exercise(&mut self, name: &str, goal: i64) -> Option<&Exercise> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.unique_id(name);
        info!("Adding exercise {id}");
        self.exercises.push(Exercise::new(id, name, clamp_goal(goal)));
        self.exercises.last()
    }

    /// Removes an exercise together with its logs. Returns whether anything was removed.
    pub fn delete_exercise(&mut self, id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|ex| ex.id != id);
        before != self.exercises.len()
    }

    /// Changes the goal without touching logged reps.
    pub fn update_goal(&mut self, id: &str, goal: i64) {
        if let Some(exercise) = self.exercise_mut(id) {
            exercise.goal = clamp_goal(goal);
        }
    }

    pub fn rename_exercise(&mut self, id: &str, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if let Some(exercise) = self.exercise_mut(id) {
            exercise.name = name.to_owned();
        }
    }

    pub fn reset_today(&mut self, today: NaiveDate) {
        info!("Resetting progress for {today}");
        self.clear_logs();
        self.tracked_date = today;
    }

    /// Clears the logs when the tracked day is no longer `today`. Returns whether it did.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.tracked_date == today {
            return false;
        }
        info!(
            "Day changed from {} to {today}, clearing logs",
            self.tracked_date
        );
        self.clear_logs();
        self.tracked_date = today;
        true
    }

    /// Runs the rollover check and streak evaluation until neither changes anything.
    /// Returns whether the state changed.
    pub fn settle(&mut self, today: NaiveDate) -> bool {
        let mut changed = false;
        loop {
            let rolled = self.roll_over(today);
            let completion = self.daily_completion_percentage();
            let credited = match evaluate_streak(&self.streak, completion, today) {
                Some(next) => {
                    self.streak = next;
                    true
                }
                None => false,
            };
            if !rolled && !credited {
                return changed;
            }
            changed = true;
        }
    }

    fn clear_logs(&mut self) {
        for exercise in &mut self.exercises {
            exercise.hourly_logs.clear();
        }
    }

    fn unique_id(&self, name: &str) -> String {
        let slug = slugify(name);
        loop {
            let token = Uuid::new_v4().simple().to_string();
            let id = format!("{slug}-{}", &token[..8]);
            if self.exercise(&id).is_none() {
                return id;
            }
        }
    }

    pub fn total_reps_today(&self) -> u64 {
        self.exercises.iter().map(Exercise::total_reps).sum()
    }

    pub fn total_goal_today(&self) -> u64 {
        self.exercises.iter().map(Exercise::daily_goal).sum()
    }

    pub fn daily_completion_percentage(&self) -> Percentage {
        capped_percentage(self.total_reps_today(), self.total_goal_today())
    }

    /// Zero for unknown exercises.
    pub fn total_reps_for(&self, exercise_id: &str) -> u64 {
        self.exercise(exercise_id)
            .map(Exercise::total_reps)
            .unwrap_or(0)
    }

    pub fn display_streak(&self, today: NaiveDate) -> u32 {
        display_streak(&self.streak, today)
    }
}

fn clamp_reps(reps: i64) -> u32 {
    reps.clamp(0, u32::MAX.into()) as u32
}

fn clamp_goal(goal: i64) -> u32 {
    goal.clamp(1, u32::MAX.into()) as u32
}

/// Lowercase name with every run of other characters collapsed into a single `-`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("exercise");
    }
    slug
}
