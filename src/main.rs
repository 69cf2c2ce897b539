mod handlers;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use handlers::Session;
use std::path::PathBuf;
use taskchain::engine::clock::{Clock, FixedClock, SystemClock};
use taskchain::engine::db::Db;
use taskchain::logging::{self, LogLevel};

#[derive(Parser)]
#[command(name = "taskchain", version, about = "Deadlines that follow the chain")]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = "TASKCHAIN_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Create the database
    Init,
    /// Load chains from a JSON snapshot
    Import { file: PathBuf },
    /// Current tasks of a worker, nearest deadline first
    Tasks {
        #[arg(long, short = 'w')]
        worker: String,
        #[arg(long)]
        json: bool,
    },
    /// Archived tasks of a worker
    Archive {
        #[arg(long, short = 'w')]
        worker: String,
        #[arg(long)]
        json: bool,
    },
    /// Explain one task
    Task {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Current chains of an owner, earliest start first
    Chains {
        #[arg(long, short = 'o')]
        owner: String,
        #[arg(long)]
        json: bool,
    },
    /// Archived chains of an owner
    ChainArchive {
        #[arg(long, short = 'o')]
        owner: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one chain with all its tasks
    Chain {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level)?;

    let session = Session {
        db: cli.db.unwrap_or_else(Db::default_path),
        clock: FixedClock(cli.today.unwrap_or_else(|| SystemClock.today())),
    };

    match cli.command {
        Commands::Init | Commands::Import { .. } => dispatch_write_ops(&session, cli.command),
        Commands::Tasks { .. }
        | Commands::Archive { .. }
        | Commands::Task { .. }
        | Commands::Chains { .. }
        | Commands::ChainArchive { .. }
        | Commands::Chain { .. } => dispatch_read_ops(&session, cli.command),
    }
}

fn dispatch_write_ops(session: &Session, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(session),
        Commands::Import { file } => handlers::import::handle(session, &file),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(session: &Session, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Tasks { worker, json } => handlers::tasks::handle(session, &worker, false, json),
        Commands::Archive { worker, json } => handlers::tasks::handle(session, &worker, true, json),
        Commands::Task { id, json } => handlers::task::handle(session, id, json),
        Commands::Chains { owner, json } => handlers::chains::handle(session, &owner, false, json),
        Commands::ChainArchive { owner, json } => {
            handlers::chains::handle(session, &owner, true, json)
        }
        Commands::Chain { id, json } => handlers::chain::handle(session, id, json),
        _ => unreachable!("Invalid read command dispatch"),
    }
}
