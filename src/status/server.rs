use serde::Serialize;

use crate::util::escape_html;

/// Game-server population as shown in the hero and server cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub players: u32,
    pub max_players: u32,
    pub online: bool,
}

const ONLINE_COLOR: &str = "#22c55e";
const OFFLINE_COLOR: &str = "#ef4444";

impl ServerStatus {
    pub fn offline(max_players: u32) -> Self {
        Self {
            players: 0,
            max_players,
            online: false,
        }
    }

    /// Fill of the player bar, capped at 100.
    pub fn fill_percent(&self) -> f64 {
        if self.max_players == 0 {
            return 0.0;
        }
        (self.players as f64 / self.max_players as f64 * 100.0).min(100.0)
    }

    pub fn badge(&self) -> &'static str {
        if self.online {
            "LIVE"
        } else {
            "OFFLINE"
        }
    }

    pub fn text(&self) -> &'static str {
        if self.online {
            "Server Online"
        } else {
            "Server Offline"
        }
    }

    pub fn color(&self) -> &'static str {
        if self.online {
            ONLINE_COLOR
        } else {
            OFFLINE_COLOR
        }
    }

    pub fn to_html(&self) -> String {
        let indicator = if self.online { "" } else { " offline" };
        format!(
            r#"<div class="server-status"><span class="status-indicator{indicator}" style="background-color: {color}; box-shadow: 0 0 12px {color}"></span><span class="status-badge">{}</span><span class="status-text" style="color: {color}">{}</span><span class="player-count">{}</span>/<span class="max-players">{}</span><div class="player-bar"><div class="player-bar-fill" style="width: {:.1}%"></div></div></div>"#,
            self.badge(),
            escape_html(self.text()),
            self.players,
            self.max_players,
            self.fill_percent(),
            color = self.color(),
        )
    }
}

/// Endpoint URL, optionally wrapped by a proxy prefix.
pub fn status_url(endpoint: &str, proxy: Option<&str>) -> String {
    match proxy {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}{}", urlencoding::encode(endpoint)),
        _ => endpoint.to_string(),
    }
}

fn as_u32(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(|n| n.min(u32::MAX as u64) as u32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads `Data.clients` and `Data.sv_maxclients`. No `Data` means offline.
pub fn parse_status(body: &serde_json::Value, default_max: u32) -> ServerStatus {
    let Some(data) = body.get("Data").filter(|d| d.is_object()) else {
        return ServerStatus::offline(default_max);
    };
    ServerStatus {
        players: data.get("clients").and_then(as_u32).unwrap_or(0),
        max_players: data.get("sv_maxclients").and_then(as_u32).unwrap_or(default_max),
        online: true,
    }
}

/// Never fails: any network, HTTP or decoding problem reads as offline.
pub async fn fetch_status(client: &reqwest::Client, url: &str, default_max: u32) -> ServerStatus {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to fetch server status: {e}");
            return ServerStatus::offline(default_max);
        }
    };
    if !response.status().is_success() {
        tracing::warn!("Server status endpoint returned {}", response.status());
        return ServerStatus::offline(default_max);
    }
    match response.json::<serde_json::Value>().await {
        Ok(body) => parse_status(&body, default_max),
        Err(e) => {
            tracing::warn!("Server status response is not JSON: {e}");
            ServerStatus::offline(default_max)
        }
    }
}
