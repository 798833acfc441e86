use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use tally::cli::{
    handle_currency_command, handle_data_command, handle_entity_command, handle_report_command,
    handle_transaction_command,
};
use tally::config::paths::{TallyPaths, DATA_DIR_ENV};
use tally::config::settings::Settings;
use tally::currency::CurrencyCache;
use tally::logging::init_tracing;
use tally::storage::initialize_storage;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Personal-finance period reports from the terminal",
    long_about = "Tally keeps currencies, categories, accounts, payees, locations, \
                  projects and transactions in plain JSON files and reports on \
                  them month by month. Backups, restores and CSV import/export run \
                  as background tasks and can be mirrored to cloud sync folders."
)]
struct Cli {
    /// Base directory for all Tally data
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Currency management commands
    #[command(subcommand)]
    Currency(tally::cli::CurrencyCommands),

    /// Category, account, payee, location and project commands
    #[command(subcommand)]
    Entity(tally::cli::EntityCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(tally::cli::TransactionCommands),

    /// Report commands
    #[command(subcommand)]
    Report(tally::cli::ReportCommands),

    /// Backup, restore, CSV and totals tasks
    #[command(subcommand)]
    Data(tally::cli::DataCommands),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) if !dir.as_os_str().is_empty() => TallyPaths::with_base_dir(dir),
        _ => TallyPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_filter);
    debug!(base_dir = %paths.base_dir().display(), "Resolved data directory");

    let Some(command) = cli.command else {
        println!("Tally - period reports for personal finances");
        println!();
        println!("Run 'tally --help' for usage information.");
        println!("Run 'tally init' to set up a data directory.");
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Init => {
            println!("Initializing Tally at: {}", paths.base_dir().display());
            let storage = initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            for currency in storage.currencies.get_all()? {
                let marker = if currency.is_default { " (default)" } else { "" };
                println!("Currency: {} {}{}", currency.name, currency.symbol, marker);
            }
            println!();
            println!("Run 'tally entity add category <TITLE>' to add categories.");
        }
        Commands::Config => {
            println!("Tally Configuration");
            println!("===================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  Default report length: {} months", settings.default_period_length);
            match settings.default_currency {
                Some(id) => println!("  Default currency:      {}", id),
                None => println!("  Default currency:      (first default currency)"),
            }
            println!("  Date format:           {}", settings.date_format);
            println!("  Log filter:            {}", settings.log_filter);
            println!("  Dropbox upload:        {}", on_off(settings.upload.dropbox.enabled));
            println!("  Google Drive upload:   {}", on_off(settings.upload.google_drive.enabled));
        }
        Commands::Data(cmd) => {
            if !handle_data_command(&paths, &settings, cmd)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        command => {
            let storage = initialize_storage(&paths)?;
            let cache = CurrencyCache::new();
            cache.initialize(&storage)?;

            match command {
                Commands::Currency(cmd) => handle_currency_command(&storage, &cache, cmd)?,
                Commands::Entity(cmd) => handle_entity_command(&storage, cmd)?,
                Commands::Transaction(cmd) => {
                    handle_transaction_command(&storage, &cache, &settings, cmd)?
                }
                Commands::Report(cmd) => handle_report_command(&storage, &cache, &settings, cmd)?,
                Commands::Init | Commands::Config | Commands::Data(_) => {}
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
