use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Largest accepted attachment (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Extensions that are never accepted, compared case-insensitively.
pub const DISALLOWED_EXTENSIONS: &[&str] = &["json", "py", "js", "sh", "bat", "cmd"];

/// A file received in a multipart form, held in memory until validated.
#[derive(Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lowercased extension without the dot; dotfiles like `.bashrc` have none.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name.to_lowercase())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
    }
}

#[derive(Debug)]
pub enum UploadError {
    /// Attachment exceeds [`MAX_UPLOAD_BYTES`].
    TooLarge { size: usize },
    /// Attachment extension is in [`DISALLOWED_EXTENSIONS`].
    DisallowedType { extension: String },
    /// Writing to or removing from the media root failed.
    Io(std::io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::TooLarge { size } => write!(
                f,
                "File size must not exceed 5 MB. Current size: {:.2} MB",
                *size as f64 / 1024.0 / 1024.0
            ),
            UploadError::DisallowedType { .. } => write!(
                f,
                "Disallowed file type. Files with extensions .json, .py, .js, .sh, .bat, .cmd are not accepted"
            ),
            UploadError::Io(e) => write!(f, "Failed to store upload: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::Io(err)
    }
}

impl From<UploadError> for crate::errors::AppError {
    fn from(err: UploadError) -> Self {
        crate::errors::AppError::InternalError(err.to_string())
    }
}

/// Check size and extension of an attachment.
pub fn validate_upload(file: &UploadedFile) -> Result<(), UploadError> {
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: file.size() });
    }

    if let Some(extension) = file.extension() {
        if DISALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::DisallowedType { extension });
        }
    }

    Ok(())
}

/// Reduce a client-supplied file name to a safe basename.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.chars().take(100).collect()
    }
}

/// Local file store rooted at the configured media directory.
///
/// Stored files are addressed by a path relative to the root, which is what
/// database rows keep.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored file.
    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write `file` under `subdir`, returning its relative path.
    ///
    /// Names are prefixed with a random id so concurrent uploads with the
    /// same client file name never overwrite each other.
    pub async fn save(&self, subdir: &str, file: &UploadedFile) -> Result<String, UploadError> {
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(&file.file_name)
        );
        tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;

        let relative = format!("{}/{}", subdir.trim_end_matches('/'), stored_name);
        tracing::debug!("Stored upload {} ({} bytes)", relative, file.size());
        Ok(relative)
    }

    /// Delete a stored file; a file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<(), UploadError> {
        match tokio::fs::remove_file(self.path_of(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Io(e)),
        }
    }
}
