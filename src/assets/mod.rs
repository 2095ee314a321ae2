//! Where uploaded poll images end up.
//!
//! Handlers only see [`ResolveUpload`]: an upload goes in, an opaque asset
//! reference (a local path or a remote URL) or nothing comes out. Which
//! strategy runs is picked once from [`AssetConfig`] at start-up.

mod local;
mod remote;

use axum::body::Bytes;

use crate::config::AssetConfig;

pub use local::{LocalAssets, UPLOADS_ROUTE};
pub use remote::RemoteAssets;

#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    /// Browsers submit an empty part for a file input left blank.
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty() && self.file_name.as_deref().is_none_or(str::is_empty)
    }

    /// Lowercased extension of the original file name, including the dot.
    pub(crate) fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

pub trait ResolveUpload {
    fn resolve_upload(
        &self,
        upload: Upload,
    ) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;
}

/// Accepts every upload and keeps none of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl ResolveUpload for NoAssets {
    async fn resolve_upload(&self, _upload: Upload) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub enum Assets {
    Disabled(NoAssets),
    Local(LocalAssets),
    Remote(RemoteAssets),
}

impl Assets {
    pub async fn from_config(config: &AssetConfig) -> anyhow::Result<Self> {
        Ok(match config {
            AssetConfig::Disabled => Self::Disabled(NoAssets),
            AssetConfig::Local { upload_dir } => {
                Self::Local(LocalAssets::create(upload_dir).await?)
            }
            AssetConfig::Remote { upload_url, public_url, token } => {
                Self::Remote(RemoteAssets::new(upload_url, public_url, token.clone()))
            }
        })
    }

    pub async fn resolve_all(
        &self,
        uploads: Vec<Upload>,
    ) -> anyhow::Result<Vec<Option<String>>> {
        let mut refs = Vec::with_capacity(uploads.len());
        for upload in uploads {
            refs.push(self.resolve_upload(upload).await?);
        }
        Ok(refs)
    }

    pub async fn resolve_optional(
        &self,
        upload: Option<Upload>,
    ) -> anyhow::Result<Option<String>> {
        match upload {
            Some(upload) => self.resolve_upload(upload).await,
            None => Ok(None),
        }
    }
}

impl ResolveUpload for Assets {
    async fn resolve_upload(&self, upload: Upload) -> anyhow::Result<Option<String>> {
        if upload.is_blank() {
            return Ok(None);
        }

        match self {
            Self::Disabled(assets) => assets.resolve_upload(upload).await,
            Self::Local(assets) => assets.resolve_upload(upload).await,
            Self::Remote(assets) => assets.resolve_upload(upload).await,
        }
    }
}
