//! Interactive terminal front end for the rowscan engine.
//!
//! Opens (and if needed seeds) a customer store, then runs a line-oriented
//! table view over it.

mod command;
mod shell;

use clap::Parser;
use rowscan::{
    Database, InternalError, RowscanConfig, SessionDriver, Viewport,
    core::config::{ConfigError, SeedConfig},
    startup,
};
use rustyline::error::ReadlineError;
use shell::Shell;
use std::{fs, path::PathBuf, process::ExitCode};
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

///
/// Args
///

#[derive(Debug, Parser)]
#[command(name = "rowscan", version = rowscan::VERSION)]
#[command(about = "Browse, sort and search a seeded customer table")]
struct Args {
    /// JSON configuration file; missing fields use defaults
    #[arg(long, env = "ROWSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Records collected per fetch
    #[arg(long, env = "ROWSCAN_PAGE_SIZE")]
    page_size: Option<u32>,

    /// Store size to seed up to
    #[arg(long, env = "ROWSCAN_TOTAL")]
    total: Option<u64>,

    /// Records written per seeding transaction
    #[arg(long, env = "ROWSCAN_BATCH_SIZE")]
    batch_size: Option<u32>,

    /// Generator seed for synthetic records
    #[arg(long, env = "ROWSCAN_SEED")]
    seed: Option<u64>,

    /// Height of the table body in pixels
    #[arg(long, default_value_t = 550)]
    height: u64,

    /// Log engine activity at debug level
    #[arg(long)]
    debug: bool,
}

///
/// CliError
///

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("runtime: {0}")]
    Runtime(std::io::Error),

    #[error("terminal: {0}")]
    Readline(#[from] ReadlineError),

    #[error("{}", .0.display_with_class())]
    Engine(#[from] InternalError),
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = load_config(args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let (store, started) = runtime.block_on(async {
        let db = Database::new(config.store.clone());
        let store = db.get_or_open().await?;
        let started = startup(&store, &config.seed).await?;

        Ok::<_, InternalError>((store, started))
    })?;
    tracing::info!(count = started.count, "store ready");

    let driver = SessionDriver::new(store, config.session.clone());
    let viewport = Viewport::from_config(&config.viewport, &config.session);

    Shell::new(
        runtime,
        driver,
        started.status,
        started.seeding,
        viewport,
        args.height,
    )
    .run()
}

fn load_config(args: &Args) -> Result<RowscanConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text)?
        }
        None => RowscanConfig::default(),
    };

    if let Some(page_size) = args.page_size {
        config.session.page_size = page_size;
    }
    apply_seed_overrides(&mut config.seed, args);
    config.validate()?;

    Ok(config)
}

fn apply_seed_overrides(seed: &mut SeedConfig, args: &Args) {
    if let Some(total) = args.total {
        seed.total_target = total;
    }
    if let Some(batch_size) = args.batch_size {
        seed.batch_size = batch_size;
    }
    if let Some(value) = args.seed {
        seed.seed = value;
    }
}

// RUST_LOG wins; otherwise `--debug` lowers the engine's level.
fn init_tracing(debug: bool) {
    let fallback = if debug {
        "rowscan_core=debug,rowscan_cli=debug"
    } else {
        "rowscan_core=warn,rowscan_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
