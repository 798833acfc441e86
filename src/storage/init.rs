//! Storage initialization
//!
//! Handles first-run setup and default data creation

use tracing::info;

use crate::config::paths::TallyPaths;
use crate::error::TallyError;
use crate::models::{Currency, CurrencyId};

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Creates the data directories and a default currency when no currency file
/// exists yet.
pub fn initialize_storage(paths: &TallyPaths) -> Result<Storage, TallyError> {
    let fresh = needs_initialization(paths);
    let storage = Storage::open(paths.clone())?;
    storage.load_all()?;

    if fresh {
        create_default_currency(&storage)?;
        storage.save_all()?;
        info!(dir = %paths.data_dir().display(), "Initialized data directory");
    }

    Ok(storage)
}

fn create_default_currency(storage: &Storage) -> Result<(), TallyError> {
    if storage.currencies.count()? > 0 {
        return Ok(());
    }

    let mut default = Currency::new(CurrencyId::new(1), "USD", "$");
    default.title = "US Dollar".into();
    default.is_default = true;
    storage.currencies.upsert(default)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &TallyPaths) -> bool {
    !paths.currencies_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_default_currency_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(needs_initialization(&paths));

        let storage = initialize_storage(&paths).unwrap();
        assert_eq!(storage.currencies.count().unwrap(), 1);
        assert!(!needs_initialization(&paths));

        let again = initialize_storage(&paths).unwrap();
        assert_eq!(again.currencies.count().unwrap(), 1);
    }
}
