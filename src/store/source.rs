use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Result, SiteError};

/// Where the deployed JSON resources (`data/*.json`) are read from when the
/// storage holds nothing yet.
#[allow(async_fn_in_trait)]
pub trait ResourceSource {
    async fn fetch_text(&self, path: &str) -> Result<String>;
}

/// The deployed site, either checked out on disk or served over HTTP.
#[derive(Clone, Debug)]
pub enum SiteSource {
    Dir(PathBuf),
    Http { client: reqwest::Client, base_url: String },
}

impl SiteSource {
    /// `http://` and `https://` roots are fetched over the network, anything
    /// else is treated as a directory.
    pub fn from_root(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            Self::Http {
                client: reqwest::Client::new(),
                base_url: root.trim_end_matches('/').to_string(),
            }
        } else {
            Self::Dir(PathBuf::from(root))
        }
    }
}

impl ResourceSource for SiteSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let path = path.trim_start_matches('/');
        match self {
            Self::Dir(root) => {
                let full = root.join(path);
                tokio::fs::read_to_string(&full).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        SiteError::NotFound(full.to_string_lossy().to_string())
                    } else {
                        SiteError::Io(e)
                    }
                })
            }
            Self::Http { client, base_url } => {
                let url = format!("{base_url}/{path}");
                let response = client.get(&url).send().await?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(SiteError::NotFound(url));
                }
                let response = response.error_for_status()?;
                Ok(response.text().await?)
            }
        }
    }
}

/// Fixed set of resources held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: impl Into<String>) -> Self {
        self.files.insert(path.to_string(), body.into());
        self
    }
}

impl ResourceSource for MemorySource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        self.files
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| SiteError::NotFound(path.to_string()))
    }
}
