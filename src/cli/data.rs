//! Data CLI commands
//!
//! Backups, restores, CSV import/export and totals run as background tasks;
//! the console listener prints their progress and outcome.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::paths::TallyPaths;
use crate::config::settings::Settings;
use crate::display::format_totals;
use crate::error::{TallyError, TallyResult};
use crate::models::EntityKind;
use crate::storage::Storage;
use crate::tasks::{
    run_task, BackupTask, CsvExportTask, CsvImportTask, RestoreTask, TaskListener, TaskOutcome,
    TaskValue, Total, TotalsFilter, TotalsRequest, TotalsTask,
};

/// Data subcommands
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Write a full backup and upload it to the enabled cloud targets
    Backup,

    /// Replace all data with the contents of a backup file
    Restore {
        /// Backup file path
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Export all transactions to CSV
    ExportCsv {
        /// Output file (defaults to a timestamped file in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import transactions from CSV
    ImportCsv {
        /// CSV file path
        file: PathBuf,
    },

    /// Show per-currency totals
    Totals {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only transactions of the entry titled --entity of this kind
        #[arg(short, long, requires = "entity")]
        kind: Option<EntityKind>,

        /// Title of the entry to total
        #[arg(short, long, requires = "kind")]
        entity: Option<String>,

        /// Total the balances of active accounts instead
        #[arg(long, conflicts_with_all = ["from", "to", "kind", "entity"])]
        accounts: bool,
    },
}

/// Prints task progress and outcome to the terminal
pub struct ConsoleListener {
    show_result_message: bool,
}

impl ConsoleListener {
    pub fn new(show_result_message: bool) -> Self {
        Self {
            show_result_message,
        }
    }

    fn report_unsuccessful<T>(&self, outcome: &TaskOutcome<T>) {
        match outcome {
            TaskOutcome::NeedsReauth { target, redirect } => {
                eprintln!("{} needs to be authorized again.", target);
                eprintln!("Authorize at: {}", redirect);
            }
            TaskOutcome::Failure(failure) => eprintln!("Error: {}", failure.report()),
            TaskOutcome::Success(_) => {}
        }
    }
}

impl TaskListener<TaskValue> for ConsoleListener {
    fn on_progress(&mut self, message: &str) {
        println!("{}...", message);
    }

    fn on_completed(&mut self, outcome: &TaskOutcome<TaskValue>) {
        match outcome {
            TaskOutcome::Success(value) => {
                if self.show_result_message {
                    println!("Done: {}", value.success_message());
                }
                if let TaskValue::Location(path) = value {
                    println!("Location: {}", path.display());
                }
            }
            other => self.report_unsuccessful(other),
        }
    }
}

impl TaskListener<Vec<Total>> for ConsoleListener {
    fn on_completed(&mut self, outcome: &TaskOutcome<Vec<Total>>) {
        match outcome {
            TaskOutcome::Success(totals) => println!("{}", format_totals(totals)),
            other => self.report_unsuccessful(other),
        }
    }
}

/// Handle a data command
///
/// Returns whether the task succeeded; failures have already been printed.
pub fn handle_data_command(
    paths: &TallyPaths,
    settings: &Settings,
    cmd: DataCommands,
) -> TallyResult<bool> {
    let mut listener = ConsoleListener::new(settings.show_result_message);

    let succeeded = match cmd {
        DataCommands::Backup => {
            let task = BackupTask::new(paths.clone(), settings.upload.clone());
            run_task(task, &mut listener).is_success()
        }

        DataCommands::Restore { file, force } => {
            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  tally data restore {} --force", file.display());
                return Ok(true);
            }
            run_task(RestoreTask::new(paths.clone(), file), &mut listener).is_success()
        }

        DataCommands::ExportCsv { output } => {
            let mut task = CsvExportTask::new(paths.clone(), settings.upload.clone());
            if let Some(output) = output {
                task = task.with_output(output);
            }
            run_task(task, &mut listener).is_success()
        }

        DataCommands::ImportCsv { file } => {
            let task = CsvImportTask::new(paths.clone(), file, settings.date_format.clone());
            run_task(task, &mut listener).is_success()
        }

        DataCommands::Totals {
            from,
            to,
            kind,
            entity,
            accounts,
        } => {
            let request = if accounts {
                TotalsRequest::AccountBalances
            } else {
                TotalsRequest::Transactions(totals_filter(paths, from, to, kind, entity)?)
            };
            run_task(TotalsTask::new(paths.clone(), request), &mut listener).is_success()
        }
    };

    Ok(succeeded)
}

fn totals_filter(
    paths: &TallyPaths,
    from: Option<String>,
    to: Option<String>,
    kind: Option<EntityKind>,
    entity: Option<String>,
) -> TallyResult<TotalsFilter> {
    let parse = |text: Option<String>| -> TallyResult<Option<NaiveDate>> {
        text.map(|t| {
            NaiveDate::parse_from_str(&t, "%Y-%m-%d").map_err(|_| {
                TallyError::Validation(format!("Invalid date format: {}. Use YYYY-MM-DD", t))
            })
        })
        .transpose()
    };
    let mut filter = TotalsFilter::default().between(parse(from)?, parse(to)?);

    if let (Some(kind), Some(title)) = (kind, entity) {
        let storage = Storage::open(paths.clone())?;
        storage.entities.load()?;
        let entry = storage
            .entities
            .get_by_title(kind, &title)?
            .ok_or_else(|| TallyError::entity_not_found(kind.display_name(), title))?;
        filter = filter.for_entity(kind, entry.id);
    }

    Ok(filter)
}
