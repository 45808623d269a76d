mod command;
pub use command::*;

use anyhow::{Context, Result};
use clap::Parser;
use foodhub::{Config, Db, IndexCatalog};

/// Command-line front end over a connected [`Db`].
pub struct FoodhubCli {
    db: Db,
    catalog: IndexCatalog,
}

/// How a command finished, mapped to the process exit status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl FoodhubCli {
    /// Create a new FoodhubCli provisioning the food-delivery catalog
    pub fn new(db: Db) -> Self {
        Self::with_catalog(db, IndexCatalog::food_delivery())
    }

    /// Create a new FoodhubCli with a custom index catalog
    pub fn with_catalog(db: Db, catalog: IndexCatalog) -> Self {
        Self { db, catalog }
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    pub async fn run(&self, command: Command) -> Result<Status> {
        match command {
            Command::Ping(cmd) => cmd.run(&self.db).await,
            Command::Indexes(cmd) => cmd.run(&self.db, &self.catalog).await,
        }
    }
}

impl From<Status> for std::process::ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => std::process::ExitCode::SUCCESS,
            Status::Failure => std::process::ExitCode::FAILURE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "foodhub")]
#[command(about = "foodhub - database bootstrap for the food-delivery service")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    /// Connection URI. Read from `MONGO_URI` when not given.
    #[arg(long, global = true)]
    pub uri: Option<String>,

    /// Database name, overriding the one in the URI
    #[arg(long, env = "MONGO_DB_NAME", global = true)]
    pub database: Option<String>,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Parse an iterator of arguments
    pub fn parse_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::parse_from(args)
    }
}

impl ConnectionArgs {
    /// Flags win over the environment.
    pub fn config(&self) -> Result<Config> {
        let mut config = match &self.uri {
            Some(uri) => Config::new(uri),
            None => Config::from_env()
                .with_context(|| format!("pass `--uri` or set `{}`", Config::URI_VAR))?,
        };

        if let Some(database) = &self.database {
            config = config.database(database);
        }
        Ok(config)
    }
}
