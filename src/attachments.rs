/*!
 * Photo attachments
 *
 * Photos are copied into `<root>/images/` under a name derived from the owning
 * record and the copy time. Records only ever hold the relative path
 * (`images/<name>`), so the attachments root can move with the database.
 */

use crate::errors::ServiceError;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Directory, relative to the attachments root, that holds every copied photo.
pub const IMAGES_DIR: &str = "images";

// Bound on the `_<n>` suffixes tried when two copies land in the same millisecond.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Copies photos into the attachments directory.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Copies `source` into `images/` and returns the relative path to store.
    ///
    /// `prefix` names the owner, e.g. `hazard_12` or `trans_out`.
    #[instrument(skip(self), fields(source = %source.display()))]
    pub async fn store(&self, source: &Path, prefix: &str) -> Result<String, ServiceError> {
        let meta = fs::metadata(source).await.map_err(|e| {
            ServiceError::AttachmentError(format!(
                "cannot read photo {}: {}",
                source.display(),
                e
            ))
        })?;
        if !meta.is_file() {
            return Err(ServiceError::AttachmentError(format!(
                "photo {} is not a regular file",
                source.display()
            )));
        }

        let dir = self.root.join(IMAGES_DIR);
        fs::create_dir_all(&dir).await.map_err(|e| {
            ServiceError::AttachmentError(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let now = Utc::now();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = photo_file_name(prefix, now, ext.as_deref(), attempt);
            let target = dir.join(&name);
            if fs::metadata(&target).await.is_ok() {
                continue;
            }
            fs::copy(source, &target).await.map_err(|e| {
                ServiceError::AttachmentError(format!(
                    "cannot copy {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                ))
            })?;
            let relative = format!("{}/{}", IMAGES_DIR, name);
            debug!(path = %relative, "Photo stored");
            return Ok(relative);
        }

        Err(ServiceError::AttachmentError(format!(
            "no free file name for prefix {}",
            prefix
        )))
    }

    /// Removes a previously stored photo. Failures are logged, not returned.
    pub async fn discard(&self, relative: &str) {
        let path = self.resolve(relative);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Could not remove orphaned photo");
        }
    }
}

/// `<prefix>_<millis>[_<n>][.<ext>]`
pub fn photo_file_name(
    prefix: &str,
    at: DateTime<Utc>,
    extension: Option<&str>,
    attempt: u32,
) -> String {
    let mut name = format!("{}_{}", prefix, at.timestamp_millis());
    if attempt > 0 {
        name.push('_');
        name.push_str(&attempt.to_string());
    }
    if let Some(ext) = extension.filter(|e| !e.is_empty()) {
        name.push('.');
        name.push_str(ext);
    }
    name
}
