//! Validated image references
//!
//! The identification core only needs existence plus a best-effort type
//! sniff from the file extension. No content validation happens here.

use base64::Engine;
use std::path::{Path, PathBuf};
use url::Url;

use crate::{Error, Result};

/// Extensions accepted for identification (lowercase)
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "png", "bmp"];

/// Image encodings the providers accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
}

impl ImageFormat {
    /// Map a file extension (any case) to a format
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// An image that passed the pre-network checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    uri: String,
    path: PathBuf,
    extension: String,
    format: ImageFormat,
}

impl ImageSource {
    /// Validate an image URI
    ///
    /// Accepts a plain path or a `file://` URI; the URI is percent-decoded
    /// and may name `localhost` as its host. Checks, in order: non-empty,
    /// supported extension, file exists.
    ///
    /// # Errors
    /// `Error::InvalidInput` with a user-facing message for each failed check.
    pub async fn open(uri: &str) -> Result<Self> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("No image URI provided.".to_string()));
        }

        let path = local_path(trimmed);

        let extension = path
            .as_deref()
            .unwrap_or_else(|| Path::new(trimmed))
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let format = ImageFormat::from_extension(&extension).ok_or_else(|| {
            Error::InvalidInput(format!("Unsupported image type: {}", extension))
        })?;

        let not_found = || Error::InvalidInput("Image file not found.".to_string());
        let path = path.ok_or_else(not_found)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) | Err(_) => return Err(not_found()),
        }

        Ok(Self {
            uri: trimmed.to_string(),
            path,
            extension,
            format,
        })
    }

    /// URI as supplied by the caller
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase file extension, e.g. "jpg"
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Upload file name, e.g. "photo.png"
    pub fn upload_name(&self) -> String {
        format!("photo.{}", self.extension)
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    pub async fn read_base64(&self) -> Result<String> {
        let bytes = self.read_bytes().await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// `data:` URL embedding the image, for chat-style vision models
    pub async fn data_url(&self) -> Result<String> {
        let encoded = self.read_base64().await?;
        Ok(format!("data:{};base64,{}", self.mime_type(), encoded))
    }
}

/// Filesystem path for a plain path or a `file:` URI
///
/// `None` when the URI cannot name a local file (e.g. a remote host).
fn local_path(uri: &str) -> Option<PathBuf> {
    let is_file_uri = uri
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"));
    if !is_file_uri {
        return Some(PathBuf::from(uri));
    }

    Url::parse(uri).ok()?.to_file_path().ok()
}
