//! Cover image storage and URL resolution

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Utc};
use tokio::{fs, io::AsyncWriteExt};

use crate::{
    config::MediaConfig,
    error::{AppError, AppResult},
};

const COVERS_DIR: &str = "covers";
const MAX_NAME_LEN: usize = 100;

/// Raster formats accepted as covers, by detected MIME type
const COVER_FORMATS: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Local media root plus the URL configuration it is published under
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
    base_url: Option<String>,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        let mut url_prefix = config.url_prefix.clone();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: PathBuf::from(&config.root),
            url_prefix,
            base_url: config
                .base_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// URL of a file stored under the media root
    pub fn url(&self, relative_path: &str) -> String {
        let native = format!("{}{}", self.url_prefix, relative_path.trim_start_matches('/'));
        match self.base_url {
            Some(ref base) => format!("{}{}", base, native),
            None => native,
        }
    }

    /// URL of a book cover, `None` when no file is attached
    pub fn cover_url(&self, cover: Option<&str>) -> Option<String> {
        cover.filter(|path| !path.is_empty()).map(|path| self.url(path))
    }

    /// Write an uploaded cover and return its path relative to the media root.
    ///
    /// The stored name keeps the client's stem but always ends in `extension`.
    pub async fn save_cover(&self, file_name: &str, extension: &str, data: &[u8]) -> AppResult<String> {
        self.save_cover_on(Utc::now().date_naive(), file_name, extension, data)
            .await
    }

    async fn save_cover_on(
        &self,
        day: NaiveDate,
        file_name: &str,
        extension: &str,
        data: &[u8],
    ) -> AppResult<String> {
        let dir = format!(
            "{}/{:04}/{:02}/{:02}",
            COVERS_DIR,
            day.year(),
            day.month(),
            day.day()
        );
        fs::create_dir_all(self.root.join(&dir))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;

        let name = cover_file_name(file_name, extension);
        let mut relative = format!("{}/{}", dir, name);
        let mut file = match self.create_new(&relative).await? {
            Some(file) => file,
            None => {
                relative = format!("{}/{}", dir, with_suffix(&name, &short_suffix()));
                self.create_new(&relative).await?.ok_or_else(|| {
                    AppError::Internal(format!("Media file {} already exists", relative))
                })?
            }
        };

        file.write_all(data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write media file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write media file: {}", e)))?;

        tracing::debug!(path = %relative, bytes = data.len(), "Stored cover image");
        Ok(relative)
    }

    /// Open a file that must not exist yet; `None` when it does
    async fn create_new(&self, relative: &str) -> AppResult<Option<fs::File>> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(relative))
            .await
        {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(AppError::Internal(format!("Failed to create media file: {}", e))),
        }
    }

    /// Remove a stored file; a missing file is not an error
    pub async fn remove(&self, relative_path: &str) -> AppResult<()> {
        match fs::remove_file(self.root.join(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to remove media file: {}", e))),
        }
    }
}

/// Keep the final path component, restricted to a portable character set
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

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
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "cover".to_string();
    }
    cleaned.chars().take(MAX_NAME_LEN).collect()
}

/// Extension of a supported raster image, recognised from its leading bytes
pub fn cover_extension(data: &[u8]) -> Option<&'static str> {
    infer::get(data)
        .filter(|kind| COVER_FORMATS.contains(&kind.mime_type()))
        .map(|kind| kind.extension())
}

/// Sanitized stem of the uploaded name with the detected extension
fn cover_file_name(file_name: &str, extension: &str) -> String {
    let name = sanitize_file_name(file_name);
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name.as_str(),
    };
    format!("{}.{}", stem, extension)
}

fn short_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..7].to_string()
}

/// `name.ext` -> `name_suffix.ext`
fn with_suffix(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", name, suffix),
    }
}
