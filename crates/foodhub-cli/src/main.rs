use foodhub::Db;
use foodhub_cli::{Cli, FoodhubCli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let config = cli.connection.config()?;
    let db = Db::connect(&config).await?;
    tracing::debug!(database = %db.target(), "database handle created");

    let status = FoodhubCli::new(db.clone()).run(cli.command).await?;

    db.close().await?;
    Ok(status.into())
}
