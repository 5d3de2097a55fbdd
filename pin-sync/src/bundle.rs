//! Asset bundles: `metadata.json` plus the payload file it names.
//!
//! ```text
//! <assets_root>/
//! └── matty-1/
//!     ├── metadata.json   {"name": "Matty #1", "image": "matty-1.jpg", ...}
//!     └── matty-1.jpg
//! ```

use std::path::{Component, Path};

use pin_content::Submission;
use pin_types::{AssetId, AssetMetadata};

use crate::error::BundleReadError;

/// Metadata file name inside every bundle directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Media type used when the image extension is not recognised.
pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// One publishable asset, fully read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBundle {
    /// Bundle directory name.
    pub id: AssetId,
    /// Parsed `metadata.json`.
    pub metadata: AssetMetadata,
    /// Payload file name (the metadata `image` field).
    pub file_name: String,
    /// Payload media type, from the file extension.
    pub media_type: String,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

impl AssetBundle {
    /// Read the bundle `id` from `assets_root`.
    pub async fn load(assets_root: &Path, id: &AssetId) -> Result<Self, BundleReadError> {
        let dir = assets_root.join(id.as_str());
        let metadata_path = dir.join(METADATA_FILE);

        let raw = tokio::fs::read(&metadata_path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BundleReadError::MissingMetadata {
                    asset: id.clone(),
                    path: metadata_path.clone(),
                }
            } else {
                BundleReadError::Read {
                    asset: id.clone(),
                    path: metadata_path.clone(),
                    source,
                }
            }
        })?;

        let metadata: AssetMetadata =
            serde_json::from_slice(&raw).map_err(|source| BundleReadError::Parse {
                asset: id.clone(),
                path: metadata_path.clone(),
                source,
            })?;

        let image = metadata
            .image()
            .ok_or_else(|| BundleReadError::MissingImageField { asset: id.clone() })?
            .to_string();
        if !is_plain_file_name(&image) {
            return Err(BundleReadError::InvalidImagePath {
                asset: id.clone(),
                image,
            });
        }

        let payload_path = dir.join(&image);
        let payload = tokio::fs::read(&payload_path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BundleReadError::MissingPayload {
                    asset: id.clone(),
                    path: payload_path.clone(),
                }
            } else {
                BundleReadError::Read {
                    asset: id.clone(),
                    path: payload_path.clone(),
                    source,
                }
            }
        })?;

        Ok(Self {
            id: id.clone(),
            media_type: media_type_for(&image).to_string(),
            file_name: image,
            metadata,
            payload,
        })
    }

    /// Build the store submission for this bundle.
    pub fn to_submission(&self) -> Submission {
        Submission {
            name: self.id.to_string(),
            metadata: self.metadata.clone(),
            file_name: self.file_name.clone(),
            media_type: self.media_type.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// True if `name` is a single normal path component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('\\')
}

/// Media type for an image file name, by extension.
pub fn media_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => DEFAULT_MEDIA_TYPE,
    }
}
