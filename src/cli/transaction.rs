//! Transaction CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::currency::{CurrencyCache, CurrencyFormat};
use crate::error::{TallyError, TallyResult};
use crate::models::{CurrencyId, EntityId, EntityKind, Money, Transaction};
use crate::storage::Storage;

use super::currency::{default_currency, find_currency};

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Account title
        account: String,

        /// Amount (negative for outflow, e.g. "-12.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Currency code (defaults to the account's currency)
        #[arg(long)]
        currency: Option<String>,

        /// Category title
        #[arg(short, long)]
        category: Option<String>,

        /// Payee title
        #[arg(short, long)]
        payee: Option<String>,

        /// Location title
        #[arg(short, long)]
        location: Option<String>,

        /// Project title
        #[arg(long)]
        project: Option<String>,

        /// Transaction date (defaults to today, in the configured date format)
        #[arg(short, long)]
        date: Option<String>,

        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Only transactions of this account
        #[arg(short, long)]
        account: Option<String>,

        /// Number of transactions to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    cache: &CurrencyCache,
    settings: &Settings,
    cmd: TransactionCommands,
) -> TallyResult<()> {
    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            currency,
            category,
            payee,
            location,
            project,
            date,
            note,
        } => {
            let account = lookup(storage, EntityKind::Account, &account)?;
            let currency = match (currency, account.1) {
                (Some(code), _) => find_currency(storage, cache, &code)?,
                (None, Some(id)) => cache.get_currency(storage, id)?,
                (None, None) => default_currency(storage, cache, settings)?,
            };
            let amount = Money::parse(&amount, currency.decimals)
                .map_err(|e| TallyError::Validation(e.to_string()))?;
            let date = match date {
                Some(text) => parse_date(&text, &settings.date_format)?,
                None => Local::now().date_naive(),
            };

            let mut txn = Transaction::new(account.0, date, currency.id, amount);
            for (kind, title) in [
                (EntityKind::Category, category),
                (EntityKind::Payee, payee),
                (EntityKind::Location, location),
                (EntityKind::Project, project),
            ] {
                if let Some(title) = title {
                    txn.set_column_value(kind, lookup(storage, kind, &title)?.0);
                }
            }
            txn.note = note.unwrap_or_default();

            storage.transactions.upsert(txn)?;
            storage.transactions.save()?;
            println!(
                "Added {} on {}",
                CurrencyFormat::new(&currency).format_with_symbol(amount),
                date.format(&settings.date_format)
            );
        }

        TransactionCommands::List { account, limit } => {
            let transactions = match account {
                Some(title) => storage
                    .transactions
                    .get_by_account(lookup(storage, EntityKind::Account, &title)?.0)?,
                None => storage.transactions.get_all()?,
            };

            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }

            for txn in transactions.iter().take(limit) {
                println!("{}", format_transaction_line(storage, cache, settings, txn)?);
            }
            if transactions.len() > limit {
                println!("... {} more", transactions.len() - limit);
            }
        }
    }

    Ok(())
}

/// Id and currency of the entity titled `title`
fn lookup(
    storage: &Storage,
    kind: EntityKind,
    title: &str,
) -> TallyResult<(EntityId, Option<CurrencyId>)> {
    storage
        .entities
        .get_by_title(kind, title)?
        .map(|e| (e.id, e.currency))
        .ok_or_else(|| TallyError::entity_not_found(kind.display_name(), title))
}

fn parse_date(text: &str, date_format: &str) -> TallyResult<NaiveDate> {
    NaiveDate::parse_from_str(text, date_format)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|_| TallyError::Validation(format!("Invalid date: {}", text)))
}

fn format_transaction_line(
    storage: &Storage,
    cache: &CurrencyCache,
    settings: &Settings,
    txn: &Transaction,
) -> TallyResult<String> {
    let title = |id: Option<EntityId>| -> TallyResult<String> {
        Ok(match id {
            Some(id) => storage.entities.get(id)?.map(|e| e.title).unwrap_or_default(),
            None => String::new(),
        })
    };
    let currency = cache.get_currency(storage, txn.currency)?;

    Ok(format!(
        "{}  {:<16} {:<16} {:<16} {:>16}  {}",
        txn.date.format(&settings.date_format),
        title(Some(txn.account))?,
        title(txn.category)?,
        title(txn.payee)?,
        CurrencyFormat::new(&currency).format_with_symbol(txn.amount),
        txn.note
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{Currency, Entity};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let mut yen = Currency::new(CurrencyId::new(2), "JPY", "¥");
        yen.decimals = 0;
        storage
            .currencies
            .upsert(Currency::new(CurrencyId::new(1), "EUR", "€"))
            .unwrap();
        storage.currencies.upsert(yen).unwrap();
        storage
            .entities
            .upsert(
                Entity::new(EntityId::new(1), EntityKind::Account, "Wallet")
                    .with_currency(CurrencyId::new(2)),
            )
            .unwrap();
        storage
            .entities
            .upsert(Entity::new(EntityId::new(2), EntityKind::Category, "Food"))
            .unwrap();
        (temp_dir, storage)
    }

    fn add_command(category: Option<&str>) -> TransactionCommands {
        TransactionCommands::Add {
            account: "wallet".into(),
            amount: "-1200".into(),
            currency: None,
            category: category.map(String::from),
            payee: None,
            location: None,
            project: None,
            date: Some("2024-03-05".into()),
            note: None,
        }
    }

    #[test]
    fn test_add_uses_account_currency() {
        let (_temp_dir, storage) = create_test_storage();
        handle_transaction_command(
            &storage,
            &CurrencyCache::new(),
            &Settings::default(),
            add_command(Some("Food")),
        )
        .unwrap();

        let txn = &storage.transactions.get_all().unwrap()[0];
        assert_eq!(txn.currency, CurrencyId::new(2));
        assert_eq!(txn.amount, Money::from_minor(-1200));
        assert_eq!(txn.category, Some(EntityId::new(2)));
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_unknown_category() {
        let (_temp_dir, storage) = create_test_storage();
        let err = handle_transaction_command(
            &storage,
            &CurrencyCache::new(),
            &Settings::default(),
            add_command(Some("Travel")),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Category not found: Travel");
        assert_eq!(storage.transactions.count().unwrap(), 0);
    }

    #[test]
    fn test_parse_date_fallback() {
        assert_eq!(
            parse_date("05/03/2024", "%d/%m/%Y").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_date("2024-03-05", "%d/%m/%Y").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("March", "%Y-%m-%d").is_err());
    }
}
