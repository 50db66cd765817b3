pub mod action;
pub mod output;

use std::{path::PathBuf, time::Duration};

use action::ActionCommand;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use output::print_status;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    export::{ExportFormat, export, export_file_name},
    session::{DEFAULT_TICK_FREQUENCY, Session, shutdown::detect_shutdown},
    storage::{
        key_value::{FileKeyValueStore, KeyValueStore},
        persistence::ProgressPersistence,
    },
    tracker::store::ProgressStore,
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{LogSource, enable_logging},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Hourfit", version, long_about = None)]
#[command(about = "Hourly workout logger with daily goals and streaks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(long, help = "Trace logging. Also printed to the console outside of a session")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default saves into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show today's progress. This is the default command")]
    Status,
    #[command(flatten)]
    Action(ActionCommand),
    #[command(about = "Export today's progress")]
    Export {
        format: ExportFormat,
        #[arg(
            long,
            short,
            help = "Directory to save workout-data-<date> into. Prints to stdout by default"
        )]
        output: Option<PathBuf>,
    },
    #[command(
        about = "Start an interactive session. Accepts the same commands line by line and starts a new day at midnight"
    )]
    Session {
        #[arg(long, help = "Milliseconds between day checks", default_value_t = DEFAULT_TICK_FREQUENCY.as_millis() as u64)]
        tick_ms: u64,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let source = match args.commands {
        Some(Commands::Session { .. }) => LogSource::Session,
        _ => LogSource::Cli,
    };
    enable_logging(source, &app_dir.join("logs"), args.log)?;

    let clock = DefaultClock;
    let persistence = ProgressPersistence::new(FileKeyValueStore::new(app_dir.join("progress"))?);
    let mut store = load_store(&persistence, clock.time().date_naive()).await;

    match args.commands.unwrap_or(Commands::Status) {
        Commands::Status => {
            print_status(&store, clock.time());
            Ok(())
        }
        Commands::Action(command) => {
            if let Some(prompt) = command.confirmation_prompt() {
                if !confirm(prompt).await? {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            if let Some(action) = command.into_action() {
                store.apply(action, clock.time().date_naive());
                persistence.save(&store.snapshot()).await;
                persistence.save_streak(store.streak()).await;
            }
            print_status(&store, clock.time());
            Ok(())
        }
        Commands::Export { format, output } => {
            let date = store.tracked_date();
            let contents = export(&store, format, date)?;
            match output {
                Some(dir) => {
                    let path = ensure_dir(dir)?.join(export_file_name(format, date));
                    tokio::fs::write(&path, contents)
                        .await
                        .with_context(|| format!("Failed to write {path:?}"))?;
                    info!("Exported progress into {path:?}");
                    println!("Saved {}", path.display());
                }
                None => print!("{contents}"),
            }
            Ok(())
        }
        Commands::Session { tick_ms } => {
            let shutdown_token = CancellationToken::new();
            let session = Session::new(
                store,
                persistence,
                BufReader::new(io::stdin()),
                Box::new(clock),
                shutdown_token.clone(),
                Duration::from_millis(tick_ms.max(1)),
            );
            let (_, result) = tokio::join!(detect_shutdown(shutdown_token.clone()), async {
                let result = session.run().await;
                shutdown_token.cancel();
                result
            });
            result?;
            Ok(())
        }
    }
}

/// Startup: loads whatever was saved and brings it up to date with `today`.
async fn load_store<S: KeyValueStore>(
    persistence: &ProgressPersistence<S>,
    today: chrono::NaiveDate,
) -> ProgressStore {
    let snapshot = persistence.load().await;
    let streak = persistence.load_streak().await;
    ProgressStore::restore(snapshot, streak, today)
}

async fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    stdout.write_all(format!("{prompt} [y/N] ").as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(io::stdin()).read_line(&mut answer).await?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
