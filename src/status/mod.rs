//! Live server and community status shown on the public pages.

pub mod discord;
pub mod poller;
pub mod server;

use std::time::Duration;

use serde::Serialize;

use crate::config::SiteConfig;
pub use discord::DiscordView;
pub use poller::Poller;
pub use server::ServerStatus;

/// One combined reading of both sources.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub server: ServerStatus,
    /// `None` when the widget could not be fetched.
    pub discord: Option<DiscordView>,
}

pub struct StatusBoard {
    client: reqwest::Client,
    server_url: String,
    guild_id: String,
    default_max: u32,
    server_every: Duration,
    discord_every: Duration,
    pub server: Poller<ServerStatus>,
    pub discord: Poller<DiscordView>,
}

impl StatusBoard {
    pub fn new(config: &SiteConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &SiteConfig) -> Self {
        Self {
            client,
            server_url: server::status_url(&config.server_endpoint, config.cors_proxy.as_deref()),
            guild_id: config.discord_guild_id.clone(),
            default_max: config.default_max_players,
            server_every: Duration::from_secs(config.server_poll_secs.max(1)),
            discord_every: Duration::from_secs(config.discord_poll_secs.max(1)),
            server: Poller::new("server status"),
            discord: Poller::new("discord widget"),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn fetch_discord(client: &reqwest::Client, guild_id: &str) -> Option<DiscordView> {
        match discord::fetch_widget(client, guild_id).await {
            Ok(view) => Some(view),
            Err(e) => {
                tracing::warn!("Failed to fetch Discord widget: {e}");
                None
            }
        }
    }

    /// Queries both sources concurrently and publishes the results.
    pub async fn refresh_once(&self) -> StatusSnapshot {
        let (server, discord) = futures_util::future::join(
            server::fetch_status(&self.client, &self.server_url, self.default_max),
            Self::fetch_discord(&self.client, &self.guild_id),
        )
        .await;

        self.server.publish(server.clone());
        if let Some(view) = &discord {
            self.discord.publish(view.clone());
        }
        StatusSnapshot { server, discord }
    }

    pub async fn start(&self) -> crate::error::Result<()> {
        let client = self.client.clone();
        let url = self.server_url.clone();
        let default_max = self.default_max;
        self.server
            .start(self.server_every, move || {
                let client = client.clone();
                let url = url.clone();
                async move { Some(server::fetch_status(&client, &url, default_max).await) }
            })
            .await?;

        let client = self.client.clone();
        let guild_id = self.guild_id.clone();
        if let Err(e) = self
            .discord
            .start(self.discord_every, move || {
                let client = client.clone();
                let guild_id = guild_id.clone();
                async move { Self::fetch_discord(&client, &guild_id).await }
            })
            .await
        {
            self.server.stop().await;
            return Err(e);
        }
        Ok(())
    }

    pub async fn stop(&self) {
        self.server.stop().await;
        self.discord.stop().await;
    }

    pub fn kill_sync(&self) {
        self.server.kill_sync();
        self.discord.kill_sync();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            server: self
                .server
                .latest()
                .unwrap_or_else(|| ServerStatus::offline(self.default_max)),
            discord: self.discord.latest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_before_first_poll_is_offline() {
        let board = StatusBoard::new(&SiteConfig::default());
        let snapshot = board.snapshot();
        assert_eq!(snapshot.server, ServerStatus::offline(64));
        assert!(snapshot.discord.is_none());
    }

    #[test]
    fn proxy_is_applied_to_server_url() {
        let config = SiteConfig {
            server_endpoint: "https://a.b/c".into(),
            cors_proxy: Some("https://p/?".into()),
            ..SiteConfig::default()
        };
        let board = StatusBoard::new(&config);
        assert_eq!(board.server_url(), "https://p/?https%3A%2F%2Fa.b%2Fc");
    }
}
