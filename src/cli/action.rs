use clap::Subcommand;
use tracing::warn;

use crate::tracker::{
    entities::WorkoutHour,
    input::{parse_new_goal, parse_reps, parse_updated_goal},
    store::Action,
};

/// Commands that change today's progress. Shared by the one-shot CLI and the session prompt.
#[derive(Subcommand, Debug, Clone)]
pub enum ActionCommand {
    #[command(
        about = "Set the repetitions of an exercise for an hour (10-19), replacing what was logged. Empty reps mean 0"
    )]
    Log {
        exercise: String,
        hour: WorkoutHour,
        #[arg(allow_hyphen_values = true)]
        reps: String,
    },
    #[command(
        about = "Add to or take from the repetitions logged for an hour, e.g. +5 or -1. Never goes below 0"
    )]
    Adjust {
        exercise: String,
        hour: WorkoutHour,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    #[command(about = "Log an exercise's goal for an hour")]
    Done { exercise: String, hour: WorkoutHour },
    #[command(about = "Log every exercise's goal for an hour")]
    Fill { hour: WorkoutHour },
    #[command(about = "Add a new exercise")]
    Add {
        #[arg(short, long, default_value = "10", allow_hyphen_values = true, help = "Repetitions per hour")]
        goal: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    #[command(about = "Delete an exercise with all of its logged data")]
    Remove {
        id: String,
        #[arg(long, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Change the hourly goal of an exercise")]
    Goal {
        id: String,
        #[arg(allow_hyphen_values = true)]
        goal: String,
    },
    #[command(about = "Rename an exercise")]
    Rename {
        id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    #[command(about = "Clear all progress logged today")]
    Reset {
        #[arg(long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

impl ActionCommand {
    /// Question to ask before running a destructive command that wasn't confirmed with `--yes`.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            ActionCommand::Remove { yes: false, .. } => {
                Some("Are you sure you want to delete this exercise? All data for it will be lost.")
            }
            ActionCommand::Reset { yes: false } => {
                Some("Are you sure you want to reset all progress for today? This cannot be undone.")
            }
            _ => None,
        }
    }

    /// Normalizes the typed values. `None` means the input can't change anything.
    pub fn into_action(self) -> Option<Action> {
        let action = match self {
            ActionCommand::Log {
                exercise,
                hour,
                reps,
            } => {
                let Some(reps) = parse_reps(&reps) else {
                    warn!("Ignoring unreadable reps {reps:?}");
                    return None;
                };
                Action::SetReps {
                    exercise_id: exercise,
                    hour,
                    reps,
                }
            }
            ActionCommand::Adjust {
                exercise,
                hour,
                delta,
            } => Action::AdjustReps {
                exercise_id: exercise,
                hour,
                delta,
            },
            ActionCommand::Done { exercise, hour } => Action::SetToGoal {
                exercise_id: exercise,
                hour,
            },
            ActionCommand::Fill { hour } => Action::SetAllToGoalForHour { hour },
            ActionCommand::Add { goal, name } => Action::AddExercise {
                name: name.join(" "),
                goal: parse_new_goal(&goal),
            },
            ActionCommand::Remove { id, .. } => Action::DeleteExercise { id },
            ActionCommand::Goal { id, goal } => {
                let Some(goal) = parse_updated_goal(&goal) else {
                    warn!("Ignoring unreadable goal {goal:?}, keeping the previous one");
                    return None;
                };
                Action::UpdateGoal { id, goal }
            }
            ActionCommand::Rename { id, name } => Action::RenameExercise {
                id,
                name: name.join(" "),
            },
            ActionCommand::Reset { .. } => Action::ResetToday,
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::tracker::{entities::WorkoutHour, store::Action};

    use super::ActionCommand;

    #[derive(Parser, Debug)]
    #[command(no_binary_name = true)]
    struct TestArgs {
        #[command(subcommand)]
        command: ActionCommand,
    }

    fn parse(line: &str) -> Result<ActionCommand, clap::Error> {
        TestArgs::try_parse_from(line.split_whitespace()).map(|v| v.command)
    }

    #[test]
    fn test_log_parses_reps() {
        let action = parse("log squats 12 -5").unwrap().into_action();
        assert_eq!(
            action,
            Some(Action::SetReps {
                exercise_id: "squats".into(),
                hour: WorkoutHour::new_opt(12).unwrap(),
                reps: -5,
            })
        );
        assert_eq!(parse("log squats 12 lots").unwrap().into_action(), None);
    }

    #[test]
    fn test_adjust_parses_signed_delta() {
        let hour = WorkoutHour::new_opt(12).unwrap();
        assert_eq!(
            parse("adjust squats 12 +5").unwrap().into_action(),
            Some(Action::AdjustReps {
                exercise_id: "squats".into(),
                hour,
                delta: 5,
            })
        );
        assert_eq!(
            parse("adjust squats 12 -1").unwrap().into_action(),
            Some(Action::AdjustReps {
                exercise_id: "squats".into(),
                hour,
                delta: -1,
            })
        );
        assert!(parse("adjust squats 12 lots").is_err());
    }

    #[test]
    fn test_hour_outside_window_rejected() {
        assert!(parse("fill 9").is_err());
        assert!(parse("done squats 20").is_err());
    }

    #[test]
    fn test_add_joins_name_and_defaults_goal() {
        let action = parse("add --goal x Box Jumps").unwrap().into_action();
        assert_eq!(
            action,
            Some(Action::AddExercise {
                name: "Box Jumps".into(),
                goal: 10,
            })
        );
    }

    #[test]
    fn test_unreadable_goal_keeps_previous() {
        assert_eq!(parse("goal squats many").unwrap().into_action(), None);
    }

    #[test]
    fn test_destructive_commands_need_confirmation() {
        assert!(parse("remove squats").unwrap().confirmation_prompt().is_some());
        assert!(parse("remove squats --yes").unwrap().confirmation_prompt().is_none());
        assert!(parse("reset").unwrap().confirmation_prompt().is_some());
        assert!(parse("fill 10").unwrap().confirmation_prompt().is_none());
    }
}
