//! Currency CLI commands
//!
//! Implements CLI commands for listing, adding and trying out currencies.

use clap::Subcommand;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::settings::Settings;
use crate::currency::{CurrencyCache, CurrencyFormat};
use crate::error::{TallyError, TallyResult};
use crate::models::currency::MAX_DECIMALS;
use crate::models::{Currency, CurrencyId, Money};
use crate::storage::Storage;

/// Currency subcommands
#[derive(Subcommand, Debug)]
pub enum CurrencyCommands {
    /// List all currencies
    List,

    /// Add a new currency
    Add {
        /// Currency code (e.g., "EUR")
        name: String,

        /// Symbol shown next to amounts
        symbol: String,

        /// Descriptive title (defaults to the code)
        #[arg(short, long)]
        title: Option<String>,

        /// Number of fraction digits
        #[arg(
            short,
            long,
            default_value = "2",
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DECIMALS))
        )]
        decimals: u32,

        /// Decimal separator character
        #[arg(long)]
        decimal_separator: Option<char>,

        /// Grouping separator character
        #[arg(long)]
        group_separator: Option<char>,

        /// Number pattern (e.g., "#,##,##0.00" or "¤ #,##0.00")
        #[arg(long)]
        number_format: Option<String>,

        /// Make this the default currency
        #[arg(long)]
        default: bool,
    },

    /// Format an amount in a currency
    Format {
        /// Currency code or ID
        currency: String,

        /// Amount (e.g., "-1234.5")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

#[derive(Tabled)]
struct CurrencyRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Code")]
    name: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Example")]
    example: String,
    #[tabled(rename = "Default")]
    default: String,
}

/// Handle a currency command
pub fn handle_currency_command(
    storage: &Storage,
    cache: &CurrencyCache,
    cmd: CurrencyCommands,
) -> TallyResult<()> {
    match cmd {
        CurrencyCommands::List => {
            let currencies = storage.currencies.get_all()?;
            if currencies.is_empty() {
                println!("No currencies found.");
                println!("Create one with: tally currency add <CODE> <SYMBOL>");
                return Ok(());
            }

            let rows: Vec<CurrencyRow> = currencies
                .iter()
                .map(|c| CurrencyRow {
                    id: c.id.get(),
                    name: c.name.clone(),
                    title: c.title.clone(),
                    symbol: c.symbol.clone(),
                    example: CurrencyFormat::new(c).format_with_symbol(sample_amount(c)),
                    default: if c.is_default { "*".into() } else { String::new() },
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
        }

        CurrencyCommands::Add {
            name,
            symbol,
            title,
            decimals,
            decimal_separator,
            group_separator,
            number_format,
            default,
        } => {
            if storage.currencies.get_by_name(&name)?.is_some() {
                return Err(TallyError::Validation(format!(
                    "Currency {} already exists",
                    name
                )));
            }

            let mut currency = Currency::new(storage.currencies.next_id()?, name, symbol);
            if let Some(title) = title {
                currency.title = title;
            }
            currency.decimals = decimals;
            currency.decimal_separator = decimal_separator.map(quote_separator);
            currency.group_separator = group_separator.map(quote_separator);
            currency.number_format = number_format;
            currency.is_default = default || storage.currencies.count()? == 0;
            currency.validate().map_err(TallyError::Validation)?;

            if currency.is_default {
                for mut other in storage.currencies.get_all()? {
                    if other.is_default {
                        other.is_default = false;
                        storage.currencies.upsert(other)?;
                    }
                }
            }

            let example = CurrencyFormat::new(&currency).format_with_symbol(sample_amount(&currency));
            let id = currency.id;
            storage.currencies.upsert(currency)?;
            storage.currencies.save()?;
            // Make the new record visible to later lookups through the cache
            cache.initialize(storage)?;

            println!("Created currency {} ({})", id, example);
        }

        CurrencyCommands::Format { currency, amount } => {
            let currency = find_currency(storage, cache, &currency)?;
            let amount = Money::parse(&amount, currency.decimals)
                .map_err(|e| TallyError::Validation(e.to_string()))?;
            println!("{}", CurrencyFormat::new(&currency).format_with_symbol(amount));
        }
    }

    Ok(())
}

/// 1234567.89 in `currency`, truncated to its decimals
fn sample_amount(currency: &Currency) -> Money {
    let minor = Money::scale(currency.decimals)
        .and_then(|scale| scale.checked_mul(123_456_789))
        .map_or(0, |minor| minor / 100);
    Money::from_minor(minor)
}

/// Stored separators keep the quoted form, e.g. `' '`
fn quote_separator(separator: char) -> String {
    format!("'{}'", separator)
}

/// Find a currency by code or id
pub fn find_currency(storage: &Storage, cache: &CurrencyCache, key: &str) -> TallyResult<Currency> {
    if let Ok(id) = key.parse::<CurrencyId>() {
        let currency = cache.get_currency(storage, id)?;
        if !currency.is_empty() {
            return Ok(currency);
        }
    }

    storage
        .currencies
        .get_by_name(key)?
        .ok_or_else(|| TallyError::currency_not_found(key))
}

/// The currency reports use when none is named
///
/// The configured default comes first, then the currency flagged as default,
/// then the one with the lowest id.
pub fn default_currency(
    storage: &Storage,
    cache: &CurrencyCache,
    settings: &Settings,
) -> TallyResult<Currency> {
    if let Some(id) = settings.default_currency {
        let currency = cache.get_currency(storage, id)?;
        if !currency.is_empty() {
            return Ok(currency);
        }
    }

    let currencies = storage.currencies.get_all()?;
    currencies
        .iter()
        .find(|c| c.is_default)
        .or_else(|| currencies.first())
        .cloned()
        .ok_or_else(|| {
            TallyError::Config("No currencies defined. Run 'tally init' first".into())
        })
}
