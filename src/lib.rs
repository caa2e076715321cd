pub mod auth;
pub mod config;
pub mod deletion;
pub mod error;
pub mod export;
pub mod form;
pub mod leaderboard;
pub mod model;
pub mod panel;
pub mod render;
pub mod site;
pub mod status;
pub mod store;
pub mod util;

#[cfg(feature = "desktop")]
mod commands;

pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use site::{CollectionKind, FormKind, Site};

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "ulrp=info,ulrp_lib=info,warn";

/// Installs the fmt subscriber. `RUST_LOG` wins; otherwise `verbose` picks
/// the level (0 = default filter).
pub fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new(DEFAULT_LOG_FILTER),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(feature = "desktop")]
pub fn run() {
    use tauri::Manager;

    init_tracing(0);
    let config = SiteConfig::load();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let site = tauri::async_runtime::block_on(Site::open(&config))?;
            let state = commands::AdminState::new(config.clone(), site)?;
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::admin::login,
            commands::admin::logout,
            commands::admin::check_auth,
            commands::admin::render_list,
            commands::admin::get_update,
            commands::admin::save_update,
            commands::admin::preview_update,
            commands::admin::emoji_presets,
            commands::admin::get_rule_change,
            commands::admin::save_rule_change,
            commands::admin::get_category,
            commands::admin::save_category,
            commands::admin::get_rule,
            commands::admin::save_rule,
            commands::admin::request_delete,
            commands::admin::cancel_delete,
            commands::admin::confirm_delete,
            commands::admin::request_rule_delete,
            commands::admin::cancel_rule_delete,
            commands::admin::confirm_rule_delete,
            commands::admin::export_collection,
            commands::admin::export_bundle,
            commands::status::start_status_polling,
            commands::status::stop_status_polling,
            commands::status::refresh_status,
            commands::status::get_leaderboard,
        ])
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                // Stop the pollers when the window is closed
                if let Some(state) = window.try_state::<commands::AdminState>() {
                    state.inner().kill_sync();
                }
            }
        })
        .run(tauri::generate_context!())
        .expect("failed to run ULRP admin");
}
