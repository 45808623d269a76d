use crate::Status;
use anyhow::Result;
use clap::Parser;
use console::style;
use foodhub::Db;

#[derive(Parser, Debug)]
pub struct PingCommand {}

impl PingCommand {
    pub(crate) async fn run(self, db: &Db) -> Result<Status> {
        println!();

        if db.ping().await {
            println!(
                "  {} {}",
                style("✓").green().bold(),
                style(format!("{} is reachable", db.target())).dim()
            );
            println!();
            Ok(Status::Success)
        } else {
            println!(
                "  {} {}",
                style("✖").red().bold(),
                style(format!("{} is unreachable", db.target())).red()
            );
            println!();
            Ok(Status::Failure)
        }
    }
}
