//! Interactive session. The user types commands line by line while a periodic tick keeps the day
//! and the streak up to date, so a session left open over midnight starts the new day on its
//! own. Every event is processed and saved before the next one is awaited.

pub mod shutdown;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::{
    cli::{action::ActionCommand, output::print_status},
    storage::{key_value::KeyValueStore, persistence::ProgressPersistence},
    tracker::store::ProgressStore,
    utils::clock::Clock,
};

pub const DEFAULT_TICK_FREQUENCY: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "session", disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    #[command(about = "Show today's progress")]
    Status,
    #[command(flatten)]
    Action(ActionCommand),
    #[command(about = "Save and leave the session", alias = "exit")]
    Quit,
}

enum LineOutcome {
    Continue,
    Quit,
}

pub struct Session<S, R> {
    store: ProgressStore,
    persistence: ProgressPersistence<S>,
    input: Lines<R>,
    clock: Box<dyn Clock>,
    shutdown: CancellationToken,
    tick_frequency: Duration,
}

impl<S: KeyValueStore, R: AsyncBufRead + Unpin> Session<S, R> {
    pub fn new(
        store: ProgressStore,
        persistence: ProgressPersistence<S>,
        input: R,
        clock: Box<dyn Clock>,
        shutdown: CancellationToken,
        tick_frequency: Duration,
    ) -> Self {
        Self {
            store,
            persistence,
            input: input.lines(),
            clock,
            shutdown,
            tick_frequency,
        }
    }

    /// Executes the session event loop until input ends, `quit` is typed, or shutdown is
    /// requested. Returns the final state.
    pub async fn run(mut self) -> Result<ProgressStore> {
        print_status(&self.store, self.clock.time());
        let mut next_tick = self.clock.instant() + self.tick_frequency;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                line = self.input.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    if let LineOutcome::Quit = self.handle_line(&line).await {
                        break;
                    }
                }
                _ = self.clock.sleep_until(next_tick) => {
                    next_tick += self.tick_frequency;
                    self.tick().await;
                }
            }
        }

        self.persist().await;
        info!("Session closed");
        Ok(self.store)
    }

    async fn tick(&mut self) {
        let today = self.clock.time().date_naive();
        if self.store.settle(today) {
            info!("Progress changed on tick for {today}");
            self.persist()
                .instrument(info_span!("Saving after tick"))
                .await;
            print_status(&self.store, self.clock.time());
        }
    }

    async fn handle_line(&mut self, line: &str) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Continue;
        }
        debug!("Received line {line:?}");

        let command = match SessionLine::try_parse_from(line.split_whitespace()) {
            Ok(v) => v.command,
            Err(e) => {
                let _ = e.print();
                return LineOutcome::Continue;
            }
        };

        match command {
            SessionCommand::Quit => return LineOutcome::Quit,
            SessionCommand::Status => {}
            SessionCommand::Action(action) => {
                if let Some(prompt) = action.confirmation_prompt() {
                    println!("{prompt} Repeat the command with --yes to confirm.");
                    return LineOutcome::Continue;
                }
                if let Some(action) = action.into_action() {
                    let now = self.clock.time();
                    self.store.apply(action, now.date_naive());
                    self.persist().await;
                }
            }
        }
        print_status(&self.store, self.clock.time());
        LineOutcome::Continue
    }

    async fn persist(&self) {
        self.persistence.save(&self.store.snapshot()).await;
        self.persistence.save_streak(self.store.streak()).await;
    }
}

#[cfg(test)]
mod session_tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
    use tempfile::tempdir;
    use tokio::{
        io::{AsyncWriteExt, BufReader},
        time::Instant,
    };
    use tokio_util::sync::CancellationToken;

    use crate::{
        storage::{key_value::FileKeyValueStore, persistence::ProgressPersistence},
        tracker::{
            entities::{Exercise, StreakRecord, WorkoutHour},
            store::ProgressStore,
        },
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    use super::Session;

    const D1: NaiveDate = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    const D2: NaiveDate = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();

    fn noon(date: NaiveDate) -> DateTime<Local> {
        Local
            .from_local_datetime(&date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
            .single()
            .unwrap()
    }

    /// Clock whose wall time is moved by hand while instants follow tokio's paused time.
    #[derive(Clone)]
    struct TestClock {
        time: Arc<Mutex<DateTime<Local>>>,
    }

    impl TestClock {
        fn new(time: DateTime<Local>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        fn set(&self, time: DateTime<Local>) {
            *self.time.lock().unwrap() = time;
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Local> {
            *self.time.lock().unwrap()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn test_store() -> ProgressStore {
        ProgressStore::new(
            vec![Exercise::new("a", "Alpha", 10)],
            D1,
            StreakRecord::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_are_applied_and_saved() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = TestClock::new(noon(D1));
        let input: &[u8] = b"log a 10 7\nadjust a 10 -3\nadjust a 10 +1\nadd --goal 5 Box Jumps\nremove a\nbogus\nquit\nlog a 11 3\n";

        let session = Session::new(
            test_store(),
            ProgressPersistence::new(FileKeyValueStore::new(dir.path().to_owned())?),
            BufReader::new(input),
            Box::new(clock),
            CancellationToken::new(),
            Duration::from_secs(1),
        );
        let store = session.run().await?;

        let hour = |h| WorkoutHour::new_opt(h).unwrap();
        // Unconfirmed removal and anything after quit are not applied.
        assert_eq!(store.exercise("a").unwrap().reps_at(hour(10)), 5);
        assert_eq!(store.exercise("a").unwrap().reps_at(hour(11)), 0);
        assert_eq!(store.exercises().len(), 2);
        assert_eq!(store.exercises()[1].name, "Box Jumps");
        assert_eq!(store.exercises()[1].goal, 5);

        let persistence = ProgressPersistence::new(FileKeyValueStore::new(dir.path().to_owned())?);
        assert_eq!(persistence.load().await, Some(store.snapshot()));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_rolls_over_at_midnight() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = TestClock::new(noon(D1));
        let shutdown = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(1024);

        let session = Session::new(
            test_store(),
            ProgressPersistence::new(FileKeyValueStore::new(dir.path().to_owned())?),
            BufReader::new(reader),
            Box::new(clock.clone()),
            shutdown.clone(),
            Duration::from_secs(1),
        );
        let handle = tokio::spawn(session.run());

        writer.write_all(b"fill 10\n").await?;
        tokio::time::sleep(Duration::from_millis(2500)).await;

        clock.set(noon(D2));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        shutdown.cancel();

        let store = handle.await??;
        assert_eq!(store.tracked_date(), D2);
        assert_eq!(store.total_reps_today(), 0);
        assert_eq!(store.exercise("a").map(|ex| ex.goal), Some(10));

        let persistence = ProgressPersistence::new(FileKeyValueStore::new(dir.path().to_owned())?);
        let saved = persistence.load().await.unwrap();
        assert_eq!(saved.tracked_date, D2);
        Ok(())
    }
}
