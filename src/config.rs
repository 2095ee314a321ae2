use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Context};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetConfig {
    Disabled,
    Local {
        upload_dir: PathBuf,
    },
    Remote {
        upload_url: String,
        public_url: String,
        token: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub assets: AssetConfig,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let backend: String = try_load(&lookup, "ASSET_BACKEND", "disabled")?;

        let assets = match backend.to_ascii_lowercase().as_str() {
            "disabled" | "none" => AssetConfig::Disabled,
            "local" => AssetConfig::Local {
                upload_dir: try_load(&lookup, "UPLOAD_DIR", "uploads")?,
            },
            "remote" => {
                let upload_url = lookup("REMOTE_ASSET_URL").ok_or_else(|| {
                    anyhow!("REMOTE_ASSET_URL must be set for the remote asset backend")
                })?;
                let upload_url = upload_url.trim_end_matches('/').to_owned();
                let public_url = lookup("REMOTE_PUBLIC_URL")
                    .map(|url| url.trim_end_matches('/').to_owned())
                    .unwrap_or_else(|| upload_url.clone());

                AssetConfig::Remote {
                    upload_url,
                    public_url,
                    token: lookup("REMOTE_ASSET_TOKEN").filter(|token| !token.is_empty()),
                }
            }
            other => bail!("unknown ASSET_BACKEND {other:?}, expected disabled, local or remote"),
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", "3000")?,
            static_dir: try_load(&lookup, "STATIC_DIR", "public")?,
            assets,
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", "10485760")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });

    value
        .parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value {value:?}"))
}
