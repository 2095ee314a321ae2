use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use super::{ResolveUpload, Upload};

pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct LocalAssets {
    dir: PathBuf,
}

impl LocalAssets {
    pub async fn create(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating upload directory {}", dir.display()))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResolveUpload for LocalAssets {
    async fn resolve_upload(&self, upload: Upload) -> anyhow::Result<Option<String>> {
        let name = format!("{}{}", Uuid::now_v7().simple(), upload.extension());
        let path = self.dir.join(&name);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("writing upload to {}", path.display()))?;

        info!(file = %path.display(), bytes = upload.bytes.len(), "stored upload");
        Ok(Some(format!("{UPLOADS_ROUTE}/{name}")))
    }
}
