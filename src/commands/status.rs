use serde::Serialize;
use tauri::ipc::Channel;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::commands::AdminState;
use crate::error::Result;
use crate::leaderboard;
use crate::status::{DiscordView, ServerStatus, StatusSnapshot};
use crate::store::SiteSource;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum StatusEvent {
    Server(ServerStatus),
    Discord(DiscordView),
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub podium: String,
    pub rows: String,
}

fn forward<T>(
    mut rx: watch::Receiver<Option<T>>,
    channel: Channel<StatusEvent>,
    wrap: fn(T) -> StatusEvent,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let latest = rx.borrow_and_update().clone();
            if let Some(value) = latest {
                if channel.send(wrap(value)).is_err() {
                    break;
                }
            }
        }
    })
}

#[tauri::command]
pub async fn start_status_polling(
    on_event: Channel<StatusEvent>,
    state: tauri::State<'_, AdminState>,
) -> Result<()> {
    // Subscribe before the first tick so its result is forwarded too.
    let server_rx = state.status.server.subscribe();
    let discord_rx = state.status.discord.subscribe();
    state.status.start().await?;

    let server = forward(server_rx, on_event.clone(), StatusEvent::Server);
    let discord = forward(discord_rx, on_event, StatusEvent::Discord);
    state.forwarders.lock().await.extend([server, discord]);
    Ok(())
}

#[tauri::command]
pub async fn stop_status_polling(state: tauri::State<'_, AdminState>) -> Result<()> {
    state.status.stop().await;
    for handle in state.forwarders.lock().await.drain(..) {
        handle.abort();
    }
    Ok(())
}

#[tauri::command]
pub async fn refresh_status(state: tauri::State<'_, AdminState>) -> Result<StatusSnapshot> {
    Ok(state.status.refresh_once().await)
}

#[tauri::command]
pub async fn get_leaderboard(state: tauri::State<'_, AdminState>) -> Result<LeaderboardView> {
    let source = SiteSource::from_root(&state.config.site_root());
    let players = leaderboard::load(&source).await;
    let (podium, rows) = leaderboard::render(&players);
    Ok(LeaderboardView { podium, rows })
}
