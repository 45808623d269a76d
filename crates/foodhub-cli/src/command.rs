mod indexes;
mod ping;

pub use indexes::*;
pub use ping::*;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the database is reachable
    Ping(PingCommand),

    /// Inspect and provision secondary indexes
    Indexes(IndexesCommand),
}
