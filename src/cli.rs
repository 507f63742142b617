use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use slotKeeper::config::{AppConfig, GoogleAuthConfig, KeeperConfig};
use slotKeeper::error::Result;
use slotKeeper::runtime;

#[derive(Parser)]
#[command(about = "Keeps placeholder events on a calendar so some free time always stays visible")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Purge past keep events and top up the next two weeks.
    Keep,
    /// Delete every keep event, past and future.
    RemoveAll,
    /// Print free slots across the source calendars.
    Slots {
        #[arg(long)]
        from: NaiveDate,
        /// Last day to include; defaults to `--from`.
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

pub async fn cli(app_config: AppConfig) -> Result<()> {
    let cli = Cli::parse();
    // Validate everything before the first request goes out.
    let config = KeeperConfig::from_lookup(|key| app_config.lookup(key))?;
    let auth = GoogleAuthConfig::from_lookup(|key| app_config.lookup(key));
    let store = runtime::google_store(&auth)?;

    match cli.command.unwrap_or(Commands::Keep) {
        Commands::Keep => {
            let report = runtime::run_keep(&store, &config).await?;
            if report.updated() {
                info!("past keep events were removed");
            }
        }
        Commands::RemoveAll => {
            runtime::run_remove_all(&store, &config).await?;
        }
        Commands::Slots { from, to } => {
            for slot in runtime::run_slots(&store, &config, from, to.unwrap_or(from)).await? {
                println!("{}", slot);
            }
        }
    }
    Ok(())
}
