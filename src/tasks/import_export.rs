//! Backup, restore and CSV tasks
//!
//! Each task opens its own [`Storage`] on the worker thread from the paths it
//! was given, so nothing is shared with the thread that started it.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::paths::TallyPaths;
use crate::config::settings::UploadSettings;
use crate::error::{ImportExportCode, TallyError, TallyResult};
use crate::export::{export_full_json, export_transactions_csv, import_from_json, import_transactions_csv};
use crate::storage::Storage;

use super::outcome::TaskValue;
use super::runner::{BackgroundTask, Progress};
use super::upload::{run_uploads, uploaders};

fn open_storage(paths: &TallyPaths) -> TallyResult<Storage> {
    let storage = Storage::open(paths.clone())?;
    storage.load_all()?;
    Ok(storage)
}

fn timestamped_name(prefix: &str, extension: &str) -> String {
    format!("{}-{}.{}", prefix, Utc::now().format("%Y%m%d-%H%M%S"), extension)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Wrap `err` under `code`, leaving authorization requests as they are
fn wrap(code: ImportExportCode, args: Vec<String>, err: TallyError) -> TallyError {
    if err.is_reauthorization() {
        err
    } else {
        TallyError::import_export(code, args, err)
    }
}

/// Writes a full JSON backup into the backup directory, then uploads it
#[derive(Debug, Clone)]
pub struct BackupTask {
    paths: TallyPaths,
    upload: UploadSettings,
}

impl BackupTask {
    pub fn new(paths: TallyPaths, upload: UploadSettings) -> Self {
        Self { paths, upload }
    }

    fn backup(&self, progress: &Progress) -> TallyResult<PathBuf> {
        progress.publish("Creating backup");
        let storage = open_storage(&self.paths)?;

        let path = self
            .paths
            .backup_dir()
            .join(timestamped_name("tally", "json"));
        let mut writer = BufWriter::new(File::create(&path)?);
        export_full_json(&storage, &mut writer, true)?;
        writer.flush()?;

        run_uploads(&uploaders(&self.upload), &path, progress)?;
        Ok(path)
    }
}

impl BackgroundTask for BackupTask {
    type Output = TaskValue;

    fn name(&self) -> &'static str {
        "backup"
    }

    fn run(self, progress: &Progress) -> TallyResult<TaskValue> {
        self.backup(progress)
            .map(TaskValue::Location)
            .map_err(|e| wrap(ImportExportCode::BackupFailed, Vec::new(), e))
    }
}

/// Replaces the database with the contents of a backup file
#[derive(Debug, Clone)]
pub struct RestoreTask {
    paths: TallyPaths,
    file: PathBuf,
}

impl RestoreTask {
    pub fn new(paths: TallyPaths, file: PathBuf) -> Self {
        Self { paths, file }
    }
}

impl BackgroundTask for RestoreTask {
    type Output = TaskValue;

    fn name(&self) -> &'static str {
        "restore"
    }

    fn run(self, progress: &Progress) -> TallyResult<TaskValue> {
        let name = display_name(&self.file);
        progress.publish(format!("Reading {}", name));

        let export = fs::read_to_string(&self.file)
            .map_err(TallyError::from)
            .and_then(|contents| import_from_json(&contents))
            .map_err(|e| TallyError::import_export(ImportExportCode::InvalidBackupFile, vec![name.clone()], e))?;

        progress.publish("Restoring data");
        let transactions = export.transactions.len();
        Storage::open(self.paths.clone())
            .and_then(|storage| export.restore_into(&storage))
            .map_err(|e| TallyError::import_export(ImportExportCode::RestoreFailed, vec![name.clone()], e))?;

        Ok(TaskValue::Message(format!(
            "Restored {} transactions from {}",
            transactions, name
        )))
    }
}

/// Writes every transaction to a CSV file, then uploads it
#[derive(Debug, Clone)]
pub struct CsvExportTask {
    paths: TallyPaths,
    upload: UploadSettings,
    output: Option<PathBuf>,
}

impl CsvExportTask {
    /// Export into the export directory under a timestamped name
    pub fn new(paths: TallyPaths, upload: UploadSettings) -> Self {
        Self {
            paths,
            upload,
            output: None,
        }
    }

    /// Export to `output` instead
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    fn export(&self, path: &Path, progress: &Progress) -> TallyResult<()> {
        progress.publish("Exporting transactions");
        let storage = open_storage(&self.paths)?;

        let written = export_transactions_csv(&storage, BufWriter::new(File::create(path)?))?;
        progress.publish(format!("Exported {} transactions", written));

        run_uploads(&uploaders(&self.upload), path, progress)?;
        Ok(())
    }
}

impl BackgroundTask for CsvExportTask {
    type Output = TaskValue;

    fn name(&self) -> &'static str {
        "csv-export"
    }

    fn run(self, progress: &Progress) -> TallyResult<TaskValue> {
        let path = self.output.clone().unwrap_or_else(|| {
            self.paths
                .export_dir()
                .join(timestamped_name("tally-transactions", "csv"))
        });

        self.export(&path, progress)
            .map(|()| TaskValue::Location(path.clone()))
            .map_err(|e| wrap(ImportExportCode::CsvExportFailed, vec![display_name(&path)], e))
    }
}

/// Imports transactions from a CSV file
#[derive(Debug, Clone)]
pub struct CsvImportTask {
    paths: TallyPaths,
    file: PathBuf,
    date_format: String,
}

impl CsvImportTask {
    pub fn new(paths: TallyPaths, file: PathBuf, date_format: impl Into<String>) -> Self {
        Self {
            paths,
            file,
            date_format: date_format.into(),
        }
    }

    fn import(&self, progress: &Progress) -> TallyResult<String> {
        progress.publish(format!("Reading {}", display_name(&self.file)));
        let storage = open_storage(&self.paths)?;

        let reader = BufReader::new(File::open(&self.file)?);
        let summary = import_transactions_csv(&storage, reader, &self.date_format)?;
        storage.save_all()?;

        Ok(format!(
            "Imported {} transactions ({} new entries)",
            summary.imported, summary.created_entities
        ))
    }
}

impl BackgroundTask for CsvImportTask {
    type Output = TaskValue;

    fn name(&self) -> &'static str {
        "csv-import"
    }

    fn run(self, progress: &Progress) -> TallyResult<TaskValue> {
        self.import(progress)
            .map(TaskValue::Message)
            .map_err(|e| wrap(ImportExportCode::CsvImportFailed, vec![display_name(&self.file)], e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CloudTargetSettings;
    use crate::models::{Currency, CurrencyId};
    use crate::tasks::outcome::TaskOutcome;
    use crate::tasks::runner::{run_task, TaskListener};
    use tempfile::TempDir;

    struct Quiet;

    impl<T> TaskListener<T> for Quiet {
        fn on_completed(&mut self, _outcome: &TaskOutcome<T>) {}
    }

    fn setup() -> (TempDir, TallyPaths) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths.clone()).unwrap();
        storage
            .currencies
            .upsert(Currency::new(CurrencyId::new(1), "EUR", "€"))
            .unwrap();
        storage.save_all().unwrap();
        (temp_dir, paths)
    }

    const SAMPLE: &str = "\
Date,Account,Category,Payee,Location,Project,Currency,Amount,Note
2024-01-05,Checking,Food,Market,,,EUR,-12.50,
2024-02-01,Checking,Salary,,,,EUR,2000,
";

    fn import_sample(temp_dir: &TempDir, paths: &TallyPaths) {
        let file = temp_dir.path().join("bank.csv");
        fs::write(&file, SAMPLE).unwrap();
        let outcome = run_task(CsvImportTask::new(paths.clone(), file, "%Y-%m-%d"), &mut Quiet);
        assert_eq!(
            outcome,
            TaskOutcome::Success(TaskValue::Message(
                "Imported 2 transactions (4 new entries)".into()
            ))
        );
    }

    #[test]
    fn test_import_then_backup_then_restore() {
        let (temp_dir, paths) = setup();
        import_sample(&temp_dir, &paths);

        let outcome = run_task(BackupTask::new(paths.clone(), UploadSettings::default()), &mut Quiet);
        let backup = match outcome {
            TaskOutcome::Success(TaskValue::Location(path)) => path,
            other => panic!("backup failed: {other:?}"),
        };
        assert!(backup.starts_with(paths.backup_dir()));

        let other_dir = TempDir::new().unwrap();
        let other = TallyPaths::with_base_dir(other_dir.path().to_path_buf());
        let outcome = run_task(RestoreTask::new(other.clone(), backup), &mut Quiet);
        assert!(outcome.is_success());

        let restored = open_storage(&other).unwrap();
        assert_eq!(restored.transactions.count().unwrap(), 2);
    }

    #[test]
    fn test_restore_rejects_invalid_file() {
        let (temp_dir, paths) = setup();
        let file = temp_dir.path().join("notes.json");
        fs::write(&file, "[1, 2, 3]").unwrap();

        let outcome = run_task(RestoreTask::new(paths, file), &mut Quiet);
        let TaskOutcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.code, Some(ImportExportCode::InvalidBackupFile));
        assert_eq!(failure.message, "Not a valid backup file: notes.json");
        assert_eq!(failure.causes.len(), 1);
    }

    #[test]
    fn test_restore_rejects_bad_decimals_and_keeps_data() {
        let (temp_dir, paths) = setup();
        import_sample(&temp_dir, &paths);

        let storage = open_storage(&paths).unwrap();
        let mut export = crate::export::FullExport::from_storage(&storage).unwrap();
        export.currencies[0].decimals = 25;
        let file = temp_dir.path().join("tampered.json");
        fs::write(&file, serde_json::to_string(&export).unwrap()).unwrap();

        let outcome = run_task(RestoreTask::new(paths.clone(), file), &mut Quiet);
        let TaskOutcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.code, Some(ImportExportCode::InvalidBackupFile));
        assert!(failure.causes[0].contains("cannot have 25 decimal places"));

        let kept = open_storage(&paths).unwrap();
        assert_eq!(kept.currencies.get(CurrencyId::new(1)).unwrap().unwrap().decimals, 2);
        assert_eq!(kept.transactions.count().unwrap(), 2);
    }

    #[test]
    fn test_csv_export_to_chosen_file() {
        let (temp_dir, paths) = setup();
        import_sample(&temp_dir, &paths);

        let output = temp_dir.path().join("out.csv");
        let task = CsvExportTask::new(paths, UploadSettings::default()).with_output(output.clone());
        let outcome = run_task(task, &mut Quiet);

        assert_eq!(outcome, TaskOutcome::Success(TaskValue::Location(output.clone())));
        let text = fs::read_to_string(output).unwrap();
        assert!(text.contains("2024-02-01,Checking,Salary,,,,EUR,2000.00,"));
    }

    #[test]
    fn test_csv_import_failure_names_the_file() {
        let (temp_dir, paths) = setup();
        let file = temp_dir.path().join("bad.csv");
        fs::write(
            &file,
            "Date,Account,Category,Payee,Location,Project,Currency,Amount,Note\nyesterday,Checking,,,,,EUR,1,\n",
        )
        .unwrap();

        let outcome = run_task(CsvImportTask::new(paths, file, "%Y-%m-%d"), &mut Quiet);
        let TaskOutcome::Failure(failure) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(failure.code, Some(ImportExportCode::CsvImportFailed));
        assert!(failure.report().starts_with("Unable to import transactions from bad.csv : "));
        assert!(failure.report().contains("line 2"));
    }

    #[test]
    fn test_backup_upload_without_token_needs_reauth() {
        let (_temp_dir, paths) = setup();
        let mut upload = UploadSettings::default();
        upload.dropbox = CloudTargetSettings {
            enabled: true,
            folder: None,
            token: None,
            authorize_url: Some("https://example.com/authorize".into()),
        };

        let outcome = run_task(BackupTask::new(paths.clone(), upload), &mut Quiet);
        assert_eq!(
            outcome,
            TaskOutcome::NeedsReauth {
                target: "Dropbox".into(),
                redirect: "https://example.com/authorize".into(),
            }
        );
        // The backup itself was written before the upload step
        assert_eq!(fs::read_dir(paths.backup_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_upload_to_sync_folder() {
        let (_temp_dir, paths) = setup();
        let sync = TempDir::new().unwrap();
        let mut upload = UploadSettings::default();
        upload.google_drive = CloudTargetSettings {
            enabled: true,
            folder: Some(sync.path().display().to_string()),
            token: Some("t0k".into()),
            authorize_url: None,
        };

        let outcome = run_task(BackupTask::new(paths, upload), &mut Quiet);
        assert!(outcome.is_success());
        assert_eq!(fs::read_dir(sync.path()).unwrap().count(), 1);
    }
}
