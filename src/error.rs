//! Custom error types for Tally
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::fmt;

use thiserror::Error;

/// Application-specific failure codes for import/export work.
///
/// Each code carries a message template; `{0}`, `{1}`, ... are replaced by the
/// formatting arguments stored next to the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportExportCode {
    BackupFailed,
    RestoreFailed,
    InvalidBackupFile,
    CsvExportFailed,
    CsvImportFailed,
    UploadFailed,
}

impl ImportExportCode {
    /// The message template for this code
    pub fn template(&self) -> &'static str {
        match self {
            Self::BackupFailed => "Unable to create backup file",
            Self::RestoreFailed => "Unable to restore from backup {0}",
            Self::InvalidBackupFile => "Not a valid backup file: {0}",
            Self::CsvExportFailed => "Unable to export transactions to {0}",
            Self::CsvImportFailed => "Unable to import transactions from {0}",
            Self::UploadFailed => "Unable to upload {0} to {1}",
        }
    }

    /// Render the template with the given arguments
    pub fn render(&self, args: &[String]) -> String {
        args.iter()
            .enumerate()
            .fold(self.template().to_string(), |text, (i, arg)| {
                text.replace(&format!("{{{}}}", i), arg)
            })
    }
}

impl fmt::Display for ImportExportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BackupFailed => "backup_failed",
            Self::RestoreFailed => "restore_failed",
            Self::InvalidBackupFile => "invalid_backup_file",
            Self::CsvExportFailed => "csv_export_failed",
            Self::CsvImportFailed => "csv_import_failed",
            Self::UploadFailed => "upload_failed",
        };
        f.write_str(name)
    }
}

/// The main error type for Tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// A cloud upload step failed
    #[error("Upload to {target} failed: {message}")]
    Upload { target: String, message: String },

    /// A cloud credential needs the user to authorize again
    #[error("{target} needs to be authorized again")]
    Reauthorize { target: String, redirect: String },

    /// Import/export failure with an application error code
    #[error("{}", .code.render(.args))]
    ImportExport {
        code: ImportExportCode,
        args: Vec<String>,
        #[source]
        source: Option<Box<TallyError>>,
    },
}

impl TallyError {
    /// Create a "not found" error for currencies
    pub fn currency_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Currency",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for filterable entities
    pub fn entity_not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    /// Wrap an error under an import/export code
    pub fn import_export(code: ImportExportCode, args: Vec<String>, cause: TallyError) -> Self {
        Self::ImportExport {
            code,
            args,
            source: Some(Box::new(cause)),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error asks for the user to authorize again, at any depth
    pub fn is_reauthorization(&self) -> bool {
        match self {
            Self::Reauthorize { .. } => true,
            Self::ImportExport {
                source: Some(cause),
                ..
            } => cause.is_reauthorization(),
            _ => false,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Tally operations
pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = TallyError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = TallyError::currency_not_found("42");
        assert_eq!(err.to_string(), "Currency not found: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_template_rendering() {
        let err = TallyError::ImportExport {
            code: ImportExportCode::UploadFailed,
            args: vec!["backup.json".into(), "Dropbox".into()],
            source: None,
        };
        assert_eq!(err.to_string(), "Unable to upload backup.json to Dropbox");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_import_export_keeps_cause() {
        let err = TallyError::import_export(
            ImportExportCode::CsvImportFailed,
            vec!["bank.csv".into()],
            TallyError::Import("row 3: bad date".into()),
        );
        assert_eq!(err.to_string(), "Unable to import transactions from bank.csv");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("Import error: row 3: bad date".to_string())
        );
    }

    #[test]
    fn test_reauthorization_is_found_through_wrapping() {
        let err = TallyError::import_export(
            ImportExportCode::BackupFailed,
            Vec::new(),
            TallyError::Reauthorize {
                target: "Dropbox".into(),
                redirect: "https://example.com/auth".into(),
            },
        );
        assert!(err.is_reauthorization());
        assert!(!TallyError::Validation("x".into()).is_reauthorization());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let tally_err: TallyError = io_err.into();
        assert!(matches!(tally_err, TallyError::Io(_)));
    }
}
