use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SiteError};
use crate::util::expand_tilde;

pub const DEFAULT_SERVER_ENDPOINT: &str = "https://servers-frontend.fivem.net/api/servers/single/kboee6";
pub const DEFAULT_DISCORD_GUILD: &str = "1406252624348708966";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Directory or `http(s)://` base URL holding `data/*.json`.
    #[serde(default = "default_site_root")]
    pub site_root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,
    /// Hex SHA-256 of the admin password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password_sha256: Option<String>,
    #[serde(default = "default_server_endpoint")]
    pub server_endpoint: String,
    /// Prefix the URL-encoded endpoint is appended to, e.g. `https://corsproxy.io/?`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_proxy: Option<String>,
    #[serde(default = "default_discord_guild")]
    pub discord_guild_id: String,
    #[serde(default = "default_server_poll_secs")]
    pub server_poll_secs: u64,
    #[serde(default = "default_discord_poll_secs")]
    pub discord_poll_secs: u64,
    #[serde(default = "default_max_players")]
    pub default_max_players: u32,
}

fn default_version() -> u32 {
    1
}

fn default_site_root() -> String {
    ".".into()
}

fn default_server_endpoint() -> String {
    DEFAULT_SERVER_ENDPOINT.into()
}

fn default_discord_guild() -> String {
    DEFAULT_DISCORD_GUILD.into()
}

fn default_server_poll_secs() -> u64 {
    30
}

fn default_discord_poll_secs() -> u64 {
    60
}

fn default_max_players() -> u32 {
    64
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            site_root: default_site_root(),
            storage_dir: None,
            admin_password_sha256: None,
            server_endpoint: default_server_endpoint(),
            cors_proxy: None,
            discord_guild_id: default_discord_guild(),
            server_poll_secs: default_server_poll_secs(),
            discord_poll_secs: default_discord_poll_secs(),
            default_max_players: default_max_players(),
        }
    }
}

/// `~/.ulrp`
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ulrp"))
}

pub fn config_path() -> Option<PathBuf> {
    app_dir().map(|d| d.join("config.json"))
}

impl SiteConfig {
    /// Reads a config file. Missing or malformed files yield `None`.
    pub fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring malformed config {}: {e}", path.display());
                None
            }
        }
    }

    /// `~/.ulrp/config.json` (or defaults), then environment overrides.
    pub fn load() -> Self {
        let mut config = config_path()
            .and_then(|p| Self::read(&p))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("ULRP_SITE_ROOT") {
            self.site_root = v;
        }
        if let Some(v) = var("ULRP_STORAGE_DIR") {
            self.storage_dir = Some(v);
        }
        if let Some(v) = var("ULRP_ADMIN_PASSWORD_SHA256") {
            self.admin_password_sha256 = Some(v);
        }
        if let Some(v) = var("ULRP_SERVER_ENDPOINT") {
            self.server_endpoint = v;
        }
        if let Some(v) = var("ULRP_DISCORD_GUILD") {
            self.discord_guild_id = v;
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Site root with `~` expanded. URLs pass through untouched.
    pub fn site_root(&self) -> String {
        if self.site_root.starts_with("http://") || self.site_root.starts_with("https://") {
            self.site_root.clone()
        } else {
            expand_tilde(&self.site_root)
        }
    }

    /// Configured storage directory, else `~/.ulrp/storage`.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(PathBuf::from(expand_tilde(dir))),
            None => app_dir()
                .map(|d| d.join("storage"))
                .ok_or_else(|| SiteError::Custom("Cannot find home directory".into())),
        }
    }
}
