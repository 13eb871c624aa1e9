#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use std::{env, process};

use bootstrap::{AppConfig, ConfigError, init_logging};
use thiserror::Error;
use tripool_application::{PoolingError, PoolingOptimizer};
use tripool_infrastructure::{GoodLpSolver, Workbook, WorkbookError};

const USAGE: &str = "Usage: tripool <input.json> [output.json]";

#[derive(Debug, Error)]
enum CliError {
    #[error("{}", USAGE)]
    Usage,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
    #[error(transparent)]
    Pooling(#[from] PoolingError),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Workbook(WorkbookError::Validation(_))
            | CliError::Pooling(PoolingError::Validation(_)) => 2,
            CliError::Pooling(err) if err.is_timeout() => 3,
            _ => 1,
        }
    }
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn run() -> Result<(), CliError> {
    let mut args = env::args().skip(1);
    let Some(input_path) = args.next() else {
        return Err(CliError::Usage);
    };
    let output_path = args.next();
    if args.next().is_some() {
        return Err(CliError::Usage);
    }

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let problem = Workbook::read(&input_path)?.read_pooling_problem(&config.sheets)?;
    let pooling = PoolingOptimizer::new(&GoodLpSolver)
        .with_options(config.solve)
        .optimize(&problem)?;

    let output = Workbook::from_pooling(&pooling);
    match output_path {
        Some(path) => {
            output.write(&path)?;
            tracing::info!(
                output = %path,
                pair_count = pooling.len(),
                objective = pooling.objective(),
                "Pooling written"
            );
        }
        None => println!("{}", output.to_json_pretty()?),
    }
    Ok(())
}
