//! Background data tasks
//!
//! Long-running work (backups, restores, CSV import and export, totals) runs
//! off the calling thread and ends in a [`TaskOutcome`]: a value, a request to
//! authorize a cloud target again, or a failure with its causes.

pub mod import_export;
pub mod outcome;
pub mod runner;
pub mod totals;
pub mod upload;

pub use import_export::{BackupTask, CsvExportTask, CsvImportTask, RestoreTask};
pub use outcome::{TaskFailure, TaskOutcome, TaskValue};
pub use runner::{run_task, spawn, BackgroundTask, Progress, TaskHandle, TaskListener};
pub use totals::{calculate_totals, Total, TotalsFilter, TotalsRequest, TotalsTask};
pub use upload::{run_uploads, uploaders, CloudUploader, FolderUploader};
