//! Results of background tasks
//!
//! A finished task ends in exactly one [`TaskOutcome`]. Credentials that need
//! the user to authorize again get their own variant so the caller can send
//! the user to the authorization page instead of showing an error.

use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;

use crate::error::{ImportExportCode, TallyError, TallyResult};

/// How a background task ended
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Success(T),
    /// A cloud target wants the user to authorize again at `redirect`
    NeedsReauth {
        target: String,
        redirect: String,
    },
    Failure(TaskFailure),
}

impl<T> TaskOutcome<T> {
    /// Classify the result of a task body
    pub fn from_result(result: TallyResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => match find_reauthorization(&err) {
                Some((target, redirect)) => Self::NeedsReauth {
                    target: target.to_string(),
                    redirect: redirect.to_string(),
                },
                None => Self::Failure(TaskFailure::from_error(&err)),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TaskOutcome<U> {
        match self {
            Self::Success(value) => TaskOutcome::Success(f(value)),
            Self::NeedsReauth { target, redirect } => TaskOutcome::NeedsReauth { target, redirect },
            Self::Failure(failure) => TaskOutcome::Failure(failure),
        }
    }
}

fn find_reauthorization(err: &TallyError) -> Option<(&str, &str)> {
    match err {
        TallyError::Reauthorize { target, redirect } => Some((target.as_str(), redirect.as_str())),
        TallyError::ImportExport {
            source: Some(cause),
            ..
        } => find_reauthorization(cause),
        _ => None,
    }
}

/// A failed task: the error code if it had one, the message, and the chain
/// of underlying causes, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub code: Option<ImportExportCode>,
    pub message: String,
    pub causes: Vec<String>,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn from_error(err: &TallyError) -> Self {
        let code = match err {
            TallyError::ImportExport { code, .. } => Some(*code),
            _ => None,
        };

        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            code,
            message: err.to_string(),
            causes,
        }
    }

    /// Text shown to the user: the message, then the first cause after
    /// " : ", then the remaining causes one per line after a blank line
    pub fn report(&self) -> String {
        let mut text = self.message.clone();
        if let Some((first, rest)) = self.causes.split_first() {
            text.push_str(" : ");
            text.push_str(first);
            if !rest.is_empty() {
                text.push_str("\n\n");
                text.push_str(&rest.join("\n"));
            }
        }
        text
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

/// What a successful import/export task produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValue {
    /// A file that was written
    Location(PathBuf),
    /// A description of what was done
    Message(String),
}

impl TaskValue {
    /// Short text for the success notice
    pub fn success_message(&self) -> String {
        match self {
            Self::Location(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Message(message) => message.clone(),
        }
    }
}
