//! Passage CLI

use std::{process, sync::Arc};

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use passage::prelude::{
    Checkpoint, CheckpointType, CheckpointUuid, CrossingUuid, Direction, PassKind, PassKindTag,
    PassUuid, TerritoryUuid, TimeType, UserUuid,
};
use passage_app::{
    config::{DatabaseConfig, LoggingConfig, SweepConfig},
    context::AppContext,
    database::{self, Db},
    domain::{
        crossings::{CrossingsServiceError, data::NewCrossing},
        errors::{ErrorClass, RepositoryError},
        passes::{
            PassesServiceError,
            data::{NewPass, PassUpdate},
        },
        sweep::{SweepError, SweepScheduler},
    },
    logging::{self, LoggingError},
    shutdown,
    store::PgStore,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "passage", about = "Territory pass management", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Settle elapsed passes once
    Sweep(SweepArgs),

    /// Settle elapsed passes periodically until interrupted
    Scheduler(SweepConfig),

    /// Allow a user to issue passes for a territory
    Grant(GrantArgs),

    /// Manage checkpoints
    Checkpoint(CheckpointCommand),

    /// Manage passes
    Pass(PassCommand),

    /// Record and inspect crossings
    Crossing(CrossingCommand),
}

#[derive(Debug, Args)]
struct SweepArgs {
    /// Sweep as of this past instant instead of now
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Args)]
struct GrantArgs {
    #[arg(long)]
    user: Uuid,

    #[arg(long)]
    territory: Uuid,
}

#[derive(Debug, Args)]
struct CheckpointCommand {
    #[command(subcommand)]
    command: CheckpointSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckpointSubcommand {
    /// Register a checkpoint
    Add(AddCheckpointArgs),
}

#[derive(Debug, Args)]
struct AddCheckpointArgs {
    #[arg(long)]
    territory: Uuid,

    #[arg(long)]
    name: String,

    /// universal, vehicle or pedestrian
    #[arg(long = "type")]
    checkpoint_type: CheckpointType,

    /// Optional checkpoint UUID; generated when omitted
    #[arg(long)]
    uuid: Option<Uuid>,
}

#[derive(Debug, Args)]
struct PassCommand {
    #[command(subcommand)]
    command: PassSubcommand,
}

#[derive(Debug, Subcommand)]
enum PassSubcommand {
    /// Issue a pass
    Create(CreatePassArgs),

    /// Change the window or note of an active pass
    Update(UpdatePassArgs),

    /// Show a pass
    Show(PassArg),

    /// List passes of a user or territory
    List(ListPassesArgs),

    /// Cancel an active pass
    Cancel(PassArg),

    /// Return a cancelled pass to service
    Reactivate(PassArg),

    /// Clear the warning of a pass
    Unwarn(PassArg),
}

#[derive(Debug, Args)]
struct PassArg {
    pass: Uuid,
}

#[derive(Debug, Args)]
struct CreatePassArgs {
    #[arg(long)]
    user: Uuid,

    #[arg(long)]
    territory: Uuid,

    /// vehicle or pedestrian
    #[arg(long)]
    kind: PassKindTag,

    /// Licence plate or visitor name
    #[arg(long)]
    identifier: Option<String>,

    /// one_time or permanent
    #[arg(long, default_value = "one_time")]
    time_type: TimeType,

    #[arg(long)]
    starts_at: Timestamp,

    #[arg(long)]
    ends_at: Timestamp,

    #[arg(long)]
    note: Option<String>,

    /// Optional pass UUID; generated when omitted
    #[arg(long)]
    uuid: Option<Uuid>,
}

#[derive(Debug, Args)]
struct UpdatePassArgs {
    pass: Uuid,

    #[arg(long)]
    starts_at: Timestamp,

    #[arg(long)]
    ends_at: Timestamp,

    #[arg(long)]
    note: Option<String>,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ListPassesArgs {
    #[arg(long)]
    user: Option<Uuid>,

    #[arg(long)]
    territory: Option<Uuid>,
}

#[derive(Debug, Args)]
struct CrossingCommand {
    #[command(subcommand)]
    command: CrossingSubcommand,
}

#[derive(Debug, Subcommand)]
enum CrossingSubcommand {
    /// Record a crossing
    Add(AddCrossingArgs),

    /// List crossings of a pass, oldest first
    List(PassArg),
}

#[derive(Debug, Args)]
struct AddCrossingArgs {
    #[arg(long)]
    pass: Uuid,

    #[arg(long)]
    checkpoint: Uuid,

    /// in or out
    #[arg(long)]
    direction: Direction,

    /// When the crossing happened; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Passes(#[from] PassesServiceError),

    #[error(transparent)]
    Crossings(#[from] CrossingsServiceError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("cannot sweep as of {at}, which is after {now}")]
    SweepInFuture { at: Timestamp, now: Timestamp },

    #[error("failed to encode output")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Passes(error) => error.class(),
            Self::Crossings(error) => error.class(),
            Self::Repository(RepositoryError::AlreadyExists) => ErrorClass::Conflict,
            Self::Repository(RepositoryError::InvalidReference | RepositoryError::InvalidData) => {
                ErrorClass::Invalid
            }
            Self::SweepInFuture { .. } => ErrorClass::Invalid,
            Self::Logging(_) | Self::Output(_) => ErrorClass::Fatal,
            Self::Database(_) | Self::Migrate(_) | Self::Sweep(_) | Self::Repository(_) => {
                ErrorClass::Infrastructure
            }
        }
    }
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = logging::init(&cli.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = run(cli).await {
        error!(class = ?error.class(), "{error}");
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let pool = database::connect(&cli.database.database_url)
        .await
        .map_err(CliError::Database)?;

    if let Commands::Migrate = cli.command {
        database::migrate(&pool).await.map_err(CliError::Migrate)?;
        println!("migrations applied");

        return Ok(());
    }

    let store = Arc::new(PgStore::new(Db::new(pool)));
    let app = AppContext::from_store(store.clone());

    match cli.command {
        Commands::Migrate => Ok(()),
        Commands::Sweep(args) => {
            let at = sweep_instant(args.at, Timestamp::now())?;

            print_json(&app.sweeper.sweep(at).await?)
        }
        Commands::Scheduler(config) => {
            SweepScheduler::new(app.sweeper, config.period())
                .run(async {
                    if let Err(error) = shutdown::signal().await {
                        error!(%error, "shutdown signal listener failed");
                    }
                })
                .await;

            Ok(())
        }
        Commands::Grant(args) => {
            store
                .grant_territory(
                    UserUuid::from_uuid(args.user),
                    TerritoryUuid::from_uuid(args.territory),
                )
                .await?;

            println!("granted");

            Ok(())
        }
        Commands::Checkpoint(CheckpointCommand {
            command: CheckpointSubcommand::Add(args),
        }) => {
            let checkpoint = Checkpoint {
                uuid: args
                    .uuid
                    .map_or_else(CheckpointUuid::new, CheckpointUuid::from_uuid),
                territory_uuid: TerritoryUuid::from_uuid(args.territory),
                name: args.name,
                checkpoint_type: args.checkpoint_type,
            };

            store.add_checkpoint(&checkpoint).await?;

            print_json(&checkpoint)
        }
        Commands::Pass(PassCommand { command }) => run_pass(&app, command).await,
        Commands::Crossing(CrossingCommand { command }) => run_crossing(&app, command).await,
    }
}

async fn run_pass(app: &AppContext, command: PassSubcommand) -> Result<(), CliError> {
    let now = Timestamp::now();

    match command {
        PassSubcommand::Create(args) => {
            let pass = app
                .passes
                .create_pass(
                    NewPass {
                        uuid: args.uuid.map_or_else(PassUuid::new, PassUuid::from_uuid),
                        user_uuid: UserUuid::from_uuid(args.user),
                        territory_uuid: TerritoryUuid::from_uuid(args.territory),
                        kind: PassKind::from_parts(args.kind, args.identifier),
                        time_type: args.time_type,
                        starts_at: args.starts_at,
                        ends_at: args.ends_at,
                        note: args.note,
                    },
                    now,
                )
                .await?;

            print_json(&pass)
        }
        PassSubcommand::Update(args) => {
            let pass = app
                .passes
                .update_pass(
                    PassUuid::from_uuid(args.pass),
                    PassUpdate {
                        starts_at: args.starts_at,
                        ends_at: args.ends_at,
                        note: args.note,
                    },
                    now,
                )
                .await?;

            print_json(&pass)
        }
        PassSubcommand::Show(PassArg { pass }) => {
            print_json(&app.passes.get_pass(PassUuid::from_uuid(pass)).await?)
        }
        PassSubcommand::List(ListPassesArgs { user, territory }) => {
            let passes = match (user, territory) {
                (Some(user), _) => app.passes.list_user_passes(UserUuid::from_uuid(user)).await?,
                (None, Some(territory)) => {
                    app.passes
                        .list_territory_passes(TerritoryUuid::from_uuid(territory))
                        .await?
                }
                (None, None) => Vec::new(),
            };

            print_json(&passes)
        }
        PassSubcommand::Cancel(PassArg { pass }) => {
            print_json(&app.passes.cancel_pass(PassUuid::from_uuid(pass), now).await?)
        }
        PassSubcommand::Reactivate(PassArg { pass }) => {
            print_json(&app.passes.reactivate_pass(PassUuid::from_uuid(pass), now).await?)
        }
        PassSubcommand::Unwarn(PassArg { pass }) => {
            print_json(&app.passes.unwarn_pass(PassUuid::from_uuid(pass), now).await?)
        }
    }
}

async fn run_crossing(app: &AppContext, command: CrossingSubcommand) -> Result<(), CliError> {
    match command {
        CrossingSubcommand::Add(args) => {
            let crossing = app
                .crossings
                .add_crossing(NewCrossing {
                    uuid: CrossingUuid::new(),
                    pass_uuid: PassUuid::from_uuid(args.pass),
                    checkpoint_uuid: CheckpointUuid::from_uuid(args.checkpoint),
                    direction: args.direction,
                    performed_at: args.at.unwrap_or_else(Timestamp::now),
                })
                .await?;

            print_json(&crossing)
        }
        CrossingSubcommand::List(PassArg { pass }) => {
            print_json(&app.crossings.list_crossings(PassUuid::from_uuid(pass)).await?)
        }
    }
}

/// Instant to sweep as of; never later than `now`.
fn sweep_instant(at: Option<Timestamp>, now: Timestamp) -> Result<Timestamp, CliError> {
    match at {
        Some(at) if at > now => Err(CliError::SweepInFuture { at, now }),
        Some(at) => Ok(at),
        None => Ok(now),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn sweep_defaults_to_now() -> TestResult {
        let now = Timestamp::now();

        assert_eq!(sweep_instant(None, now)?, now);

        Ok(())
    }

    #[test]
    fn sweep_may_look_back() -> TestResult {
        let now = Timestamp::now();
        let earlier = now.checked_sub(SignedDuration::from_hours(2))?;

        assert_eq!(sweep_instant(Some(earlier), now)?, earlier);
        assert_eq!(sweep_instant(Some(now), now)?, now);

        Ok(())
    }

    #[test]
    fn sweep_in_the_future_is_refused() -> TestResult {
        let now = Timestamp::now();
        let later = now.checked_add(SignedDuration::from_mins(1))?;

        let result = sweep_instant(Some(later), now);

        assert!(
            matches!(result, Err(CliError::SweepInFuture { at, .. }) if at == later),
            "expected SweepInFuture, got {result:?}"
        );
        assert_eq!(
            result.map_err(|error| error.class()).err(),
            Some(ErrorClass::Invalid)
        );

        Ok(())
    }

    #[test]
    fn cli_accepts_sweep_instant() -> TestResult {
        let cli = Cli::try_parse_from([
            "passage",
            "--database-url",
            "postgres://localhost/passage",
            "sweep",
            "--at",
            "2026-02-02T02:40:00Z",
        ])?;

        assert!(
            matches!(cli.command, Commands::Sweep(SweepArgs { at: Some(_) })),
            "expected sweep command, got {:?}",
            cli.command
        );

        Ok(())
    }
}
