use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::util::escape_html;

const MAX_AVATARS: usize = 6;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WidgetResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub presence_count: Option<u64>,
    #[serde(default)]
    pub members: Option<Vec<WidgetMember>>,
    #[serde(default)]
    pub instant_invite: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WidgetMember {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub url: String,
    pub alt: String,
}

/// Community card contents. Fields the widget omitted stay `None` so the
/// page keeps its static fallback text for them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordView {
    pub name: Option<String>,
    pub online_text: Option<String>,
    pub avatars: Vec<Avatar>,
    pub remaining_text: Option<String>,
    pub invite_url: Option<String>,
}

pub fn widget_url(guild_id: &str) -> String {
    format!("https://discord.com/api/guilds/{guild_id}/widget.json")
}

/// `999` → `999`, `1234` → `1.2K`.
pub fn format_count(count: u64) -> String {
    if count >= 1000 {
        format!("{:.1}K", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

impl DiscordView {
    pub fn from_widget(widget: &WidgetResponse) -> Self {
        let mut view = Self {
            name: widget.name.clone(),
            online_text: widget.presence_count.map(format_count),
            invite_url: widget.instant_invite.clone(),
            ..Self::default()
        };

        if let Some(members) = &widget.members {
            view.avatars = members
                .iter()
                .take(MAX_AVATARS)
                .filter_map(|m| {
                    m.avatar_url.as_ref().map(|url| Avatar {
                        url: url.clone(),
                        alt: m.username.clone(),
                    })
                })
                .collect();

            let online = match widget.presence_count {
                Some(n) if n > 0 => n,
                _ => members.len() as u64,
            };
            if online > MAX_AVATARS as u64 {
                view.remaining_text = Some(format!("+{} online", online - MAX_AVATARS as u64));
            }
        }
        view
    }

    /// Overlapping avatar strip, first avatar on top.
    pub fn avatars_html(&self) -> String {
        let mut html: String = self
            .avatars
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let margin = if i > 0 { "-10px" } else { "0" };
                format!(
                    r#"<img src="{}" alt="{}" style="margin-left: {margin}; position: relative; z-index: {}">"#,
                    escape_html(&a.url),
                    escape_html(&a.alt),
                    10 - i as i32
                )
            })
            .collect();
        if let Some(remaining) = &self.remaining_text {
            html.push_str(&format!(
                r#"<span class="remaining-count">{}</span>"#,
                escape_html(remaining)
            ));
        }
        html
    }
}

pub async fn fetch_widget(client: &reqwest::Client, guild_id: &str) -> Result<DiscordView> {
    let widget: WidgetResponse = client
        .get(widget_url(guild_id))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(DiscordView::from_widget(&widget))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(presence: Option<u64>, members: usize) -> WidgetResponse {
        WidgetResponse {
            name: Some("Urban Legends RP".into()),
            presence_count: presence,
            members: Some(
                (0..members)
                    .map(|i| WidgetMember {
                        username: format!("user{i}"),
                        avatar_url: Some(format!("https://cdn.discordapp.com/widget-avatars/{i}.png")),
                    })
                    .collect(),
            ),
            instant_invite: Some("https://discord.gg/abc".into()),
        }
    }

    #[test]
    fn counts_are_abbreviated_from_one_thousand() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.0K");
        assert_eq!(format_count(2400), "2.4K");
    }

    #[test]
    fn shows_six_avatars_and_remaining_count() {
        let view = DiscordView::from_widget(&widget(Some(230), 100));
        assert_eq!(view.avatars.len(), 6);
        assert_eq!(view.online_text.as_deref(), Some("230"));
        assert_eq!(view.remaining_text.as_deref(), Some("+224 online"));
        assert_eq!(view.invite_url.as_deref(), Some("https://discord.gg/abc"));

        let html = view.avatars_html();
        assert!(html.contains("z-index: 10"));
        assert!(html.contains("z-index: 5"));
        assert!(html.ends_with(r#"<span class="remaining-count">+224 online</span>"#));
    }

    #[test]
    fn falls_back_to_member_count() {
        let view = DiscordView::from_widget(&widget(None, 8));
        assert_eq!(view.online_text, None);
        assert_eq!(view.remaining_text.as_deref(), Some("+2 online"));

        let few = DiscordView::from_widget(&widget(Some(3), 3));
        assert_eq!(few.remaining_text, None);
    }

    #[test]
    fn parses_widget_json() {
        let widget: WidgetResponse = serde_json::from_str(
            r#"{"id":"1","name":"ULRP","presence_count":1520,"members":[{"id":"0","username":"a","avatar_url":"u"}]}"#,
        )
        .unwrap();
        let view = DiscordView::from_widget(&widget);
        assert_eq!(view.online_text.as_deref(), Some("1.5K"));
        assert_eq!(view.invite_url, None);
    }
}
