use crate::Status;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use foodhub::{Collection, Db, IndexCatalog, Outcome, ProvisionReport};

#[derive(Parser, Debug)]
pub struct IndexesCommand {
    #[command(subcommand)]
    subcommand: IndexesSubcommand,
}

#[derive(Subcommand, Debug)]
enum IndexesSubcommand {
    /// Create every catalog index that does not exist yet
    Ensure(EnsureCommand),

    /// Show the indexes currently defined in the database
    List(ListCommand),
}

#[derive(Parser, Debug)]
pub struct EnsureCommand {
    /// Exit with a failure status when any index could not be provisioned
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
pub struct ListCommand {
    /// Only list indexes of this collection
    collection: Option<String>,
}

impl IndexesCommand {
    pub(crate) async fn run(self, db: &Db, catalog: &IndexCatalog) -> Result<Status> {
        match self.subcommand {
            IndexesSubcommand::Ensure(cmd) => cmd.run(db, catalog).await,
            IndexesSubcommand::List(cmd) => cmd.run(db).await,
        }
    }
}

impl EnsureCommand {
    pub(crate) async fn run(self, db: &Db, catalog: &IndexCatalog) -> Result<Status> {
        println!();
        println!("  {}", style("Ensure Indexes").cyan().bold().underlined());
        println!();
        println!("  {}", style(format!("Connected to {}", db.target())).dim());
        println!();

        let report = db.ensure_indexes(catalog).await;
        print_report(&report);

        if self.strict && !report.is_clean() {
            Ok(Status::Failure)
        } else {
            Ok(Status::Success)
        }
    }
}

fn print_report(report: &ProvisionReport) {
    for entry in report {
        let name = format!("{}.{}", entry.collection, entry.index);

        match &entry.outcome {
            Outcome::Created => {
                println!("  {} {} {}", style("✓").green().bold(), name, style("created").green());
            }
            Outcome::SkippedExisting => {
                println!("  {} {}", style("·").dim(), style(format!("{name} already exists")).dim());
            }
            Outcome::SkippedError(reason) => {
                println!("  {} {} {}", style("✖").red().bold(), name, style(reason.label()).red());
                println!("      {}", style(reason.detail()).dim());
            }
        }
    }

    println!();
    let summary = style(report.to_string());
    if report.is_clean() {
        println!("  {}", summary.green());
    } else {
        println!("  {}", summary.yellow());
    }
    println!();
}

impl ListCommand {
    pub(crate) async fn run(self, db: &Db) -> Result<Status> {
        let collections: Vec<String> = match self.collection {
            Some(collection) => vec![collection],
            None => Collection::ALL.iter().map(|c| c.name().to_string()).collect(),
        };

        println!();
        for collection in collections {
            println!("  {}", style(&collection).cyan().bold());

            let indexes = db.list_indexes(&collection).await?;
            if indexes.is_empty() {
                println!("    {}", style("(no indexes)").dim());
            }

            for index in indexes {
                let keys = index
                    .fields
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let unique = if index.unique { " unique" } else { "" };

                println!("    {} {}{}", index.name, style(format!("[{keys}]")).dim(), unique);
            }
            println!();
        }

        Ok(Status::Success)
    }
}
