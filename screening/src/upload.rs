use crate::session::UploadedImage;
use log::{info, warn};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use uuid::Uuid;

/// File extensions the upload page accepts (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A file handed over by the front-end.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reads a local file as if it had been uploaded under its own name.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("the upload has no file name")]
    MissingFileName,

    #[error("{0:?} is not a supported image type (jpg, jpeg, png)")]
    UnsupportedExtension(String),

    #[error("{0} is empty")]
    Empty(String),

    #[error("{file_name} is not a readable image: {source}")]
    Undecodable {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to store upload at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes uploads to `<root>/<session id>/<file name>` so sessions never
/// overwrite each other's files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn session_dir(&self, session: Uuid) -> PathBuf {
        self.root.join(session.to_string())
    }

    /// Validates and persists one upload.
    ///
    /// Only the final component of the file name is used. The bytes must
    /// decode as an image; nothing is written otherwise.
    pub fn store(&self, session: Uuid, upload: &ImageUpload) -> Result<UploadedImage, UploadError> {
        let file_name = Path::new(upload.file_name.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or(UploadError::MissingFileName)?
            .to_string();

        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedExtension(file_name));
        }

        if upload.bytes.is_empty() {
            return Err(UploadError::Empty(file_name));
        }

        if let Err(source) = image::load_from_memory(&upload.bytes) {
            warn!("rejected upload {file_name}: {source}");
            return Err(UploadError::Undecodable { file_name, source });
        }

        let dir = self.session_dir(session);
        fs::create_dir_all(&dir).map_err(|source| UploadError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(&file_name);
        fs::write(&path, &upload.bytes).map_err(|source| UploadError::Io {
            path: path.clone(),
            source,
        })?;

        info!("stored upload {} ({} bytes)", path.display(), upload.bytes.len());
        Ok(UploadedImage { path, file_name })
    }

    /// Removes everything stored for `session`.
    pub fn discard(&self, session: Uuid) -> io::Result<()> {
        let dir = self.session_dir(session);
        match fs::remove_dir_all(&dir) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
