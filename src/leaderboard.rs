//! Top players by hours played: a three-card podium and the remaining rows.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::store::source::ResourceSource;
use crate::util::escape_html;

pub const RESOURCE_PATH: &str = "data/leaderboard.json";

const ONLINE: &str = "Online";
const PODIUM_SIZE: usize = 3;
const RANK_COLORS: [&str; PODIUM_SIZE] = ["gold", "silver", "bronze"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub rank: u32,
    pub name: String,
    #[serde(rename = "discord_id", alias = "discordId")]
    pub discord_id: String,
    #[serde(rename = "discord_tag", alias = "discordTag")]
    pub discord_tag: String,
    pub avatar: String,
    pub hours: u32,
    #[serde(rename = "lastSeen", alias = "last_seen")]
    pub last_seen: String,
}

impl Player {
    pub fn is_online(&self) -> bool {
        self.last_seen == ONLINE
    }

    pub fn last_seen_text(&self) -> &str {
        if self.is_online() {
            "Online acum"
        } else {
            &self.last_seen
        }
    }
}

#[derive(Deserialize)]
struct LeaderboardDocument {
    players: Vec<Player>,
}

// (name, discord id, tag, avatar index, hours, last seen)
const BUILT_IN: [(&str, &str, &str, u8, u32, &str); 10] = [
    ("VENDETTA", "123456789", "vendetta_rp", 0, 512, "Online"),
    ("xNapoli", "234567890", "xnapoli", 1, 487, "Online"),
    ("DarkWolf", "345678901", "darkwolf_ro", 2, 423, "Văzut acum 1h"),
    ("CristiRO", "456789012", "cristiro", 3, 389, "Online"),
    ("ShadowKing", "567890123", "shadowking", 4, 356, "Văzut acum 2h"),
    ("NightRider", "678901234", "nightrider_rp", 0, 312, "Văzut acum 3h"),
    ("DragonFire", "789012345", "dragonfire", 1, 278, "Online"),
    ("StormBreaker", "890123456", "stormbreaker", 2, 234, "Văzut acum 5h"),
    ("IcePhoenix", "901234567", "icephoenix_ro", 3, 198, "Văzut acum 1 zi"),
    ("BlazeMaster", "012345678", "blazemaster", 4, 156, "Online"),
];

pub fn built_in() -> Vec<Player> {
    BUILT_IN
        .iter()
        .enumerate()
        .map(|(i, (name, id, tag, avatar, hours, seen))| Player {
            rank: i as u32 + 1,
            name: name.to_string(),
            discord_id: id.to_string(),
            discord_tag: tag.to_string(),
            avatar: format!("https://cdn.discordapp.com/embed/avatars/{avatar}.png"),
            hours: *hours,
            last_seen: seen.to_string(),
        })
        .collect()
}

pub fn parse(body: &str) -> Result<Vec<Player>> {
    let doc: LeaderboardDocument = serde_json::from_str(body)?;
    Ok(doc.players)
}

/// `data/leaderboard.json` when present and well-formed, else the built-in list.
pub async fn load<S: ResourceSource>(source: &S) -> Vec<Player> {
    match source.fetch_text(RESOURCE_PATH).await.and_then(|body| parse(&body)) {
        Ok(players) => players,
        Err(SiteError::NotFound(_)) => built_in(),
        Err(e) => {
            tracing::warn!("Falling back to built-in leaderboard: {e}");
            built_in()
        }
    }
}

pub fn podium_card(index: usize, player: &Player) -> String {
    let crown = if player.rank == 1 {
        r#"<span class="crown-icon">👑</span>"#
    } else {
        ""
    };
    let color = RANK_COLORS.get(index).copied().unwrap_or("");
    let indicator = if player.is_online() { "" } else { " offline" };
    let seen_class = if player.is_online() { " online" } else { "" };
    let name = escape_html(&player.name);
    format!(
        r#"<div class="top-player-card rank-{rank}">{crown}<div class="rank-badge {color}">#{rank}</div><div class="player-avatar-container"><img src="{}" alt="{name}" class="player-avatar"><div class="online-indicator{indicator}"></div></div><div class="player-name">{name}</div><div class="player-discord-tag">@{}</div><div class="hours-display"><span class="hours-number">{}</span><span class="hours-label">ore</span></div><div class="last-seen{seen_class}">{}</div></div>"#,
        escape_html(&player.avatar),
        escape_html(&player.discord_tag),
        player.hours,
        escape_html(player.last_seen_text()),
        rank = player.rank,
    )
}

pub fn row(player: &Player) -> String {
    let name = escape_html(&player.name);
    format!(
        r#"<div class="leaderboard-row"><div class="row-left"><span class="row-rank">#{}</span><img src="{}" alt="{name}" class="row-avatar"><div class="row-info"><span class="row-name">{name}</span><span class="row-discord">@{}</span></div></div><div class="hours-badge"><span class="hours-value">{}</span><span class="hours-text">ore</span></div></div>"#,
        player.rank,
        escape_html(&player.avatar),
        escape_html(&player.discord_tag),
        player.hours
    )
}

/// `(podium, rest)` for the two leaderboard containers.
pub fn render(players: &[Player]) -> (String, String) {
    let split = players.len().min(PODIUM_SIZE);
    let (top, rest) = players.split_at(split);
    let podium = top
        .iter()
        .enumerate()
        .map(|(i, p)| podium_card(i, p))
        .collect();
    let rows = rest.iter().map(row).collect();
    (podium, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::source::MemorySource;

    #[test]
    fn built_in_list_is_ranked() {
        let players = built_in();
        assert_eq!(players.len(), 10);
        assert_eq!(players[0].name, "VENDETTA");
        assert_eq!(players[9].rank, 10);
        assert_eq!(players[5].avatar, "https://cdn.discordapp.com/embed/avatars/0.png");
    }

    #[test]
    fn podium_holds_first_three() {
        let (podium, rows) = render(&built_in());
        assert_eq!(podium.matches("top-player-card").count(), 3);
        assert_eq!(podium.matches("crown-icon").count(), 1);
        assert!(podium.contains(r#"<div class="rank-badge bronze">#3</div>"#));
        assert!(podium.contains("Online acum"));
        assert!(podium.contains("Văzut acum 1h"));
        assert_eq!(rows.matches("leaderboard-row").count(), 7);
        assert!(rows.contains("<span class=\"row-rank\">#4</span>"));
    }

    #[test]
    fn short_lists_have_no_rows() {
        let players = &built_in()[..2];
        let (podium, rows) = render(players);
        assert_eq!(podium.matches("top-player-card").count(), 2);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn resource_overrides_built_in() {
        let source = MemorySource::new().with(
            RESOURCE_PATH,
            r#"{"players":[{"rank":1,"name":"Solo","discord_id":"1","discord_tag":"solo","avatar":"a.png","hours":3,"lastSeen":"Online"}]}"#,
        );
        let players = load(&source).await;
        assert_eq!(players.len(), 1);
        assert!(players[0].is_online());
    }

    #[tokio::test]
    async fn missing_or_broken_resource_uses_built_in() {
        assert_eq!(load(&MemorySource::new()).await.len(), 10);
        let broken = MemorySource::new().with(RESOURCE_PATH, "[]");
        assert_eq!(load(&broken).await.len(), 10);
    }
}
