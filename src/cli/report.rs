//! CLI commands for reports
//!
//! Builds a period report navigator over the stored transactions, moves it to
//! the requested entry and prints or saves the result.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::currency::{CurrencyCache, CurrencyFormat};
use crate::display::{format_period_report, format_period_table, write_report, ReportFormat};
use crate::error::{TallyError, TallyResult};
use crate::models::{EntityKind, Month};
use crate::reports::{
    period_length_label, FilterSource, PeriodReportNavigator, TransactionAggregator,
    MAX_PERIOD_LENGTH, PERIOD_LENGTHS,
};
use crate::storage::Storage;

use super::currency::{default_currency, find_currency};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Month-by-month totals for one category, account, payee, location or project
    #[command(alias = "period")]
    ByPeriod {
        /// What to report on (category, account, payee, location, project)
        #[arg(default_value = "category")]
        kind: EntityKind,

        /// Number of months (defaults to the configured length)
        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PERIOD_LENGTH))
        )]
        length: Option<u32>,

        /// First month (YYYY-MM); defaults to the last `length` months
        #[arg(short, long)]
        start: Option<String>,

        /// Currency code or ID
        #[arg(short, long)]
        currency: Option<String>,

        /// Entry to show, by position (0-based) or title
        #[arg(short, long)]
        filter: Option<String>,

        /// Step forward this many entries from the selected one
        #[arg(long, default_value = "0")]
        next: usize,

        /// Show the first sub-category chart of the selected category
        #[arg(long)]
        child: bool,

        /// Print a table instead of a bar chart
        #[arg(long)]
        table: bool,

        /// Write the report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File format for --output
        #[arg(long, value_enum, default_value = "csv")]
        format: ReportFormat,
    },

    /// Show the standard report lengths
    Lengths,
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    cache: &CurrencyCache,
    settings: &Settings,
    cmd: ReportCommands,
) -> TallyResult<()> {
    match cmd {
        ReportCommands::ByPeriod {
            kind,
            length,
            start,
            currency,
            filter,
            next,
            child,
            table,
            output,
            format,
        } => {
            let currency = match currency {
                Some(key) => find_currency(storage, cache, &key)?,
                None => default_currency(storage, cache, settings)?,
            };
            let length = length.unwrap_or(settings.default_period_length);
            let aggregator = TransactionAggregator::new(storage);
            let source = FilterSource::for_kind(kind);

            let mut navigator = match start {
                Some(text) => {
                    let start = Month::parse(&text).map_err(|e| {
                        TallyError::Validation(format!(
                            "Invalid start month: {}. Use YYYY-MM (e.g., 2025-01)",
                            e
                        ))
                    })?;
                    PeriodReportNavigator::with_start(&aggregator, storage, source, start, length, currency)?
                }
                None => PeriodReportNavigator::new(
                    &aggregator,
                    storage,
                    source,
                    length,
                    currency,
                    Local::now().date_naive(),
                )?,
            };

            if let Some(filter) = filter {
                select(&mut navigator, &filter)?;
            }
            for _ in 0..next {
                if !navigator.next_filter()? {
                    break;
                }
            }

            if child {
                match navigator.children_charts()?.into_iter().next() {
                    Some(child) => navigator = child,
                    None => {
                        println!("No sub-categories to report on");
                        return Ok(());
                    }
                }
            }

            let currency_format = CurrencyFormat::new(navigator.currency());
            if let Some(path) = output {
                let file = File::create(&path).map_err(|e| {
                    TallyError::Export(format!("Failed to create file {}: {}", path.display(), e))
                })?;
                write_report(&navigator, &currency_format, format, BufWriter::new(file))?;
                println!("Report exported to: {}", path.display());
            } else if table && navigator.has_filter() {
                println!("{}", format_period_table(&navigator.result(), &currency_format));
            } else {
                println!("{}", format_period_report(&navigator, &currency_format));
            }
        }

        ReportCommands::Lengths => {
            for length in PERIOD_LENGTHS {
                println!("{:>3}  {}", length, period_length_label(length));
            }
        }
    }

    Ok(())
}

/// Select the entry named by position or title
fn select(navigator: &mut PeriodReportNavigator<'_>, filter: &str) -> TallyResult<()> {
    let index = match filter.parse::<usize>() {
        Ok(index) => index,
        Err(_) => navigator
            .filter()
            .position_of_title(filter)
            .ok_or_else(|| TallyError::entity_not_found(navigator.source().kind().display_name(), filter))?,
    };

    if navigator.select_filter(index)? {
        Ok(())
    } else {
        Err(TallyError::Validation(format!(
            "No entry at position {}; there are {}",
            index,
            navigator.filter().len()
        )))
    }
}
