use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use tracing::info;
use uuid::Uuid;

use super::{ResolveUpload, Upload};

/// Object storage reachable over plain HTTP `PUT`, e.g. a pre-authorized
/// bucket endpoint. Objects are read back from `public_url`.
#[derive(Debug, Clone)]
pub struct RemoteAssets {
    client: reqwest::Client,
    upload_url: String,
    public_url: String,
    token: Option<String>,
}

impl RemoteAssets {
    pub fn new(upload_url: &str, public_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: upload_url.trim_end_matches('/').to_owned(),
            public_url: public_url.trim_end_matches('/').to_owned(),
            token,
        }
    }

    fn object_key(upload: &Upload) -> String {
        format!("{}{}", Uuid::now_v7().simple(), upload.extension())
    }
}

impl ResolveUpload for RemoteAssets {
    async fn resolve_upload(&self, upload: Upload) -> anyhow::Result<Option<String>> {
        let key = Self::object_key(&upload);
        let target = format!("{}/{key}", self.upload_url);

        let mut request = self.client.put(&target).body(upload.bytes);
        if let Some(content_type) = &upload.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("uploading asset to {target}"))?;

        info!(%target, "uploaded asset");
        Ok(Some(format!("{}/{key}", self.public_url)))
    }
}
