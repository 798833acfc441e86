//! Report formatting for terminal output and files
//!
//! Renders the current state of a period report navigator as a bar chart, a
//! table, or a CSV/JSON/YAML document.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::currency::CurrencyFormat;
use crate::error::{TallyError, TallyResult};
use crate::models::Month;
use crate::reports::{PeriodReportNavigator, ReportResult};
use crate::tasks::Total;

const BAR_WIDTH: usize = 30;

/// Output formats for a saved report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
    Yaml,
}

/// Create a simple bar chart representation
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

/// One row of the period table
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PeriodRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

fn period_rows(result: &ReportResult, format: &CurrencyFormat) -> Vec<PeriodRow> {
    result
        .points
        .iter()
        .map(|p| PeriodRow {
            period: p.label.clone(),
            amount: format.format(p.value),
        })
        .collect()
}

fn report_title(navigator: &PeriodReportNavigator<'_>) -> String {
    match navigator.filter().current_title() {
        Some(title) => format!("{}: {}", navigator.filter_name(), title),
        None => navigator.filter_name().to_string(),
    }
}

fn window_line(navigator: &PeriodReportNavigator<'_>) -> String {
    let window = navigator.window();
    let currency = if navigator.currency().name.is_empty() {
        navigator.currency_symbol().to_string()
    } else {
        navigator.currency().name.clone()
    };
    format!(
        "{} ({} - {}), {}",
        navigator.period_length_label(),
        window.start.label(),
        window.end().label(),
        currency
    )
}

/// Bar chart of the selected entity's values, one line per month
pub fn format_period_report(navigator: &PeriodReportNavigator<'_>, format: &CurrencyFormat) -> String {
    if !navigator.has_filter() {
        return navigator.no_filter_message().to_string();
    }

    let mut output = String::new();
    output.push_str(&report_title(navigator));
    output.push('\n');
    output.push_str(&window_line(navigator));
    output.push_str("\n\n");

    if !navigator.has_data_to_plot() {
        output.push_str("No data to plot for this period.\n");
        return output;
    }

    let data = navigator.data();
    let scale = data.abs_max.minor().unsigned_abs() as f64;
    let amounts: Vec<String> = navigator.points().iter().map(|p| format.format(p.value)).collect();
    let label_width = navigator.points().iter().map(|p| p.label.len()).max().unwrap_or(0);
    let amount_width = amounts.iter().map(|a| a.chars().count()).max().unwrap_or(0);

    for (point, amount) in navigator.points().iter().zip(&amounts) {
        let magnitude = point.value.minor().unsigned_abs() as f64;
        output.push_str(&format!(
            "{:<label_width$}  {}  {:>amount_width$}\n",
            point.label,
            format_bar(magnitude, scale, BAR_WIDTH),
            amount,
        ));
    }

    output.push_str(&separator(label_width + BAR_WIDTH + amount_width + 4));
    output.push('\n');
    output.push_str(&format!(
        "Min: {}  Max: {}  Mean: {}  Sum: {}\n",
        format.format(data.min),
        format.format(data.max),
        format.format_value(data.mean),
        format.format_with_symbol(data.sum),
    ));
    if data.mean_non_zero != data.mean {
        output.push_str(&format!(
            "Mean of months with activity: {}\n",
            format.format_value(data.mean_non_zero)
        ));
    }

    output
}

/// Table of the selected entity's values
pub fn format_period_table(result: &ReportResult, format: &CurrencyFormat) -> String {
    let mut table = Table::new(period_rows(result, format));
    table.with(Style::sharp());
    table.to_string()
}

/// A report as written to a file
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport {
    pub report: String,
    pub filter: Option<String>,
    pub start: Month,
    pub length: u32,
    pub period: String,
    pub currency: String,
    pub points: Vec<ExportPoint>,
    pub min: String,
    pub max: String,
    pub sum: String,
    pub mean: String,
    pub mean_non_zero: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportPoint {
    pub month: Month,
    pub label: String,
    pub amount: String,
}

impl ReportExport {
    pub fn from_navigator(navigator: &PeriodReportNavigator<'_>, format: &CurrencyFormat) -> Self {
        let data = navigator.data();
        let decimals = format.decimals();
        Self {
            report: navigator.filter_name().to_string(),
            filter: navigator.filter().current_title().map(String::from),
            start: navigator.start_period(),
            length: navigator.period_length(),
            period: navigator.period_length_label(),
            currency: navigator.currency().name.clone(),
            points: navigator
                .points()
                .iter()
                .map(|p| ExportPoint {
                    month: p.source.month,
                    label: p.label.clone(),
                    amount: p.value.to_decimal_string(decimals),
                })
                .collect(),
            min: data.min.to_decimal_string(decimals),
            max: data.max.to_decimal_string(decimals),
            sum: data.sum.to_decimal_string(decimals),
            mean: format!("{:.*}", decimals as usize, data.mean),
            mean_non_zero: format!("{:.*}", decimals as usize, data.mean_non_zero),
        }
    }
}

/// Write the navigator's current result in `report_format`
pub fn write_report<W: Write>(
    navigator: &PeriodReportNavigator<'_>,
    format: &CurrencyFormat,
    report_format: ReportFormat,
    writer: W,
) -> TallyResult<()> {
    match report_format {
        ReportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in period_rows(&navigator.result(), format) {
                csv_writer
                    .serialize(&row)
                    .map_err(|e| TallyError::Export(e.to_string()))?;
            }
            csv_writer
                .flush()
                .map_err(|e| TallyError::Export(e.to_string()))?;
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(writer, &ReportExport::from_navigator(navigator, format))
                .map_err(|e| TallyError::Export(e.to_string()))?;
        }
        ReportFormat::Yaml => {
            serde_yaml::to_writer(writer, &ReportExport::from_navigator(navigator, format))
                .map_err(|e| TallyError::Export(e.to_string()))?;
        }
    }
    Ok(())
}

/// One line per currency total
pub fn format_totals(totals: &[Total]) -> String {
    if totals.is_empty() {
        return "No transactions found.".to_string();
    }

    let name_width = totals.iter().map(|t| t.currency.name.len()).max().unwrap_or(0).max(8);
    let mut output = String::new();
    for total in totals {
        let format = CurrencyFormat::new(&total.currency);
        output.push_str(&format!(
            "{:<name_width$}  {:>16}\n",
            total.currency.name,
            format.format_with_symbol(total.amount),
        ));
    }
    output
}
