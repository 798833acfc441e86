//! Cloud upload steps
//!
//! After a backup or CSV export, the written file can be sent to the cloud
//! targets the user enabled. A target is represented by a local sync folder
//! that its desktop client mirrors, plus the access token it was authorized
//! with.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::settings::{CloudTargetSettings, UploadSettings};
use crate::error::{ImportExportCode, TallyError, TallyResult};

use super::runner::Progress;

/// Authorization pages used when a target has none configured
const DROPBOX_AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";
const GOOGLE_DRIVE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// One upload destination
pub trait CloudUploader: Send {
    /// Name shown in progress messages and errors
    fn target(&self) -> &str;

    /// Send `file` to the target, returning where it ended up
    fn upload(&self, file: &Path) -> TallyResult<PathBuf>;
}

/// Uploads by copying into the folder a sync client watches
#[derive(Debug, Clone)]
pub struct FolderUploader {
    target: String,
    default_authorize_url: &'static str,
    settings: CloudTargetSettings,
}

impl FolderUploader {
    pub fn new(
        target: impl Into<String>,
        default_authorize_url: &'static str,
        settings: CloudTargetSettings,
    ) -> Self {
        Self {
            target: target.into(),
            default_authorize_url,
            settings,
        }
    }

    pub fn dropbox(settings: CloudTargetSettings) -> Self {
        Self::new("Dropbox", DROPBOX_AUTHORIZE_URL, settings)
    }

    pub fn google_drive(settings: CloudTargetSettings) -> Self {
        Self::new("Google Drive", GOOGLE_DRIVE_AUTHORIZE_URL, settings)
    }
}

impl CloudUploader for FolderUploader {
    fn target(&self) -> &str {
        &self.target
    }

    fn upload(&self, file: &Path) -> TallyResult<PathBuf> {
        let has_token = self
            .settings
            .token
            .as_deref()
            .map_or(false, |token| !token.trim().is_empty());
        if !has_token {
            return Err(TallyError::Reauthorize {
                target: self.target.clone(),
                redirect: self
                    .settings
                    .authorize_url
                    .clone()
                    .unwrap_or_else(|| self.default_authorize_url.to_string()),
            });
        }

        let folder = match self.settings.folder.as_deref() {
            Some(folder) if Path::new(folder).is_dir() => PathBuf::from(folder),
            Some(folder) => {
                return Err(TallyError::Upload {
                    target: self.target.clone(),
                    message: format!("sync folder {} does not exist", folder),
                })
            }
            None => {
                return Err(TallyError::Upload {
                    target: self.target.clone(),
                    message: "no sync folder configured".into(),
                })
            }
        };

        let file_name = file.file_name().ok_or_else(|| TallyError::Upload {
            target: self.target.clone(),
            message: format!("{} is not a file", file.display()),
        })?;
        let destination = folder.join(file_name);
        fs::copy(file, &destination).map_err(|e| TallyError::Upload {
            target: self.target.clone(),
            message: e.to_string(),
        })?;

        Ok(destination)
    }
}

/// Uploaders for every target the user enabled
pub fn uploaders(settings: &UploadSettings) -> Vec<Box<dyn CloudUploader>> {
    let mut enabled: Vec<Box<dyn CloudUploader>> = Vec::new();
    if settings.dropbox.enabled {
        enabled.push(Box::new(FolderUploader::dropbox(settings.dropbox.clone())));
    }
    if settings.google_drive.enabled {
        enabled.push(Box::new(FolderUploader::google_drive(
            settings.google_drive.clone(),
        )));
    }
    enabled
}

/// Upload `file` to each target in turn, stopping at the first failure
///
/// A target asking for authorization is passed through unwrapped.
pub fn run_uploads(
    uploaders: &[Box<dyn CloudUploader>],
    file: &Path,
    progress: &Progress,
) -> TallyResult<Vec<PathBuf>> {
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut uploaded = Vec::with_capacity(uploaders.len());
    for uploader in uploaders {
        progress.publish(format!("Uploading to {}", uploader.target()));
        info!(target_name = uploader.target(), file = %file.display(), "Uploading file");

        match uploader.upload(file) {
            Ok(destination) => uploaded.push(destination),
            Err(err) if err.is_reauthorization() => return Err(err),
            Err(err) => {
                return Err(TallyError::import_export(
                    ImportExportCode::UploadFailed,
                    vec![file_name, uploader.target().to_string()],
                    err,
                ))
            }
        }
    }
    Ok(uploaded)
}
