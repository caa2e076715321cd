use std::path::PathBuf;

use serde::Serialize;
use tauri_plugin_dialog::DialogExt;

use crate::commands::AdminState;
use crate::error::{Result, SiteError};
use crate::form::{CategoryForm, RuleChangeForm, RuleForm, UpdateForm, PRESET_EMOJIS};
use crate::render::updates::public_card_html;
use crate::site::{CollectionKind, DeleteOutcome, SavedView};
use crate::util::expand_tilde;

#[derive(Clone, Debug, Serialize)]
pub struct EmojiPreset {
    pub icon: &'static str,
    pub label: &'static str,
}

// ── Session ─────────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn login(password: String, state: tauri::State<'_, AdminState>) -> Result<bool> {
    state.session.login(&password)
}

#[tauri::command]
pub async fn logout(state: tauri::State<'_, AdminState>) -> Result<()> {
    state.session.logout()
}

#[tauri::command]
pub async fn check_auth(state: tauri::State<'_, AdminState>) -> Result<bool> {
    Ok(state.session.is_authenticated())
}

// ── Lists ───────────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn render_list(collection: CollectionKind, state: tauri::State<'_, AdminState>) -> Result<String> {
    state.session.require()?;
    let site = state.site.lock().await;
    Ok(site.render_admin(collection))
}

// ── Forms ───────────────────────────────────────────────────────────────────

/// Populated form for `id`, or a blank one.
#[tauri::command]
pub async fn get_update(id: Option<String>, state: tauri::State<'_, AdminState>) -> Result<UpdateForm> {
    state.session.require()?;
    let site = state.site.lock().await;
    site.update_form(id.as_deref())
}

#[tauri::command]
pub async fn save_update(form: UpdateForm, state: tauri::State<'_, AdminState>) -> Result<SavedView> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.save_update(&form)
}

/// Card HTML for the live preview next to the update form.
#[tauri::command]
pub async fn preview_update(form: UpdateForm, state: tauri::State<'_, AdminState>) -> Result<String> {
    state.session.require()?;
    Ok(public_card_html(&form.preview()))
}

#[tauri::command]
pub fn emoji_presets() -> Vec<EmojiPreset> {
    PRESET_EMOJIS
        .iter()
        .map(|&(icon, label)| EmojiPreset { icon, label })
        .collect()
}

#[tauri::command]
pub async fn get_rule_change(id: Option<String>, state: tauri::State<'_, AdminState>) -> Result<RuleChangeForm> {
    state.session.require()?;
    let site = state.site.lock().await;
    site.rule_change_form(id.as_deref())
}

#[tauri::command]
pub async fn save_rule_change(form: RuleChangeForm, state: tauri::State<'_, AdminState>) -> Result<SavedView> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.save_rule_change(&form)
}

#[tauri::command]
pub async fn get_category(id: Option<String>, state: tauri::State<'_, AdminState>) -> Result<CategoryForm> {
    state.session.require()?;
    let site = state.site.lock().await;
    site.category_form(id.as_deref())
}

#[tauri::command]
pub async fn save_category(form: CategoryForm, state: tauri::State<'_, AdminState>) -> Result<SavedView> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.save_category(&form)
}

#[tauri::command]
pub async fn get_rule(
    category_id: String,
    rule_id: Option<String>,
    state: tauri::State<'_, AdminState>,
) -> Result<RuleForm> {
    state.session.require()?;
    let site = state.site.lock().await;
    site.rule_form(&category_id, rule_id.as_deref())
}

#[tauri::command]
pub async fn save_rule(form: RuleForm, state: tauri::State<'_, AdminState>) -> Result<SavedView> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.save_rule(&form)
}

// ── Deletion ────────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn request_delete(
    collection: CollectionKind,
    id: String,
    state: tauri::State<'_, AdminState>,
) -> Result<()> {
    state.session.require()?;
    state.site.lock().await.request_delete(collection, id);
    Ok(())
}

#[tauri::command]
pub async fn cancel_delete(collection: CollectionKind, state: tauri::State<'_, AdminState>) -> Result<()> {
    state.session.require()?;
    state.site.lock().await.cancel_delete(collection);
    Ok(())
}

#[tauri::command]
pub async fn confirm_delete(
    collection: CollectionKind,
    state: tauri::State<'_, AdminState>,
) -> Result<DeleteOutcome> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.confirm_delete(collection)
}

#[tauri::command]
pub async fn request_rule_delete(
    category_id: String,
    rule_id: String,
    state: tauri::State<'_, AdminState>,
) -> Result<()> {
    state.session.require()?;
    state
        .site
        .lock()
        .await
        .rules
        .request_rule_delete(&category_id, &rule_id);
    Ok(())
}

#[tauri::command]
pub async fn cancel_rule_delete(state: tauri::State<'_, AdminState>) -> Result<()> {
    state.session.require()?;
    state.site.lock().await.rules.cancel_rule_delete();
    Ok(())
}

#[tauri::command]
pub async fn confirm_rule_delete(state: tauri::State<'_, AdminState>) -> Result<DeleteOutcome> {
    state.session.require()?;
    let mut site = state.site.lock().await;
    site.confirm_rule_delete()
}

// ── Export ──────────────────────────────────────────────────────────────────

enum Pick {
    Folder,
    ZipFile,
}

/// Native picker off the async runtime. `None` when the user cancels.
async fn pick_path(app: tauri::AppHandle, pick: Pick) -> Result<Option<PathBuf>> {
    let picked = tauri::async_runtime::spawn_blocking(move || {
        let dialog = app.dialog().file();
        match pick {
            Pick::Folder => dialog.set_title("Alege dosarul pentru export").blocking_pick_folder(),
            Pick::ZipFile => dialog
                .set_title("Salvează arhiva site-ului")
                .add_filter("Arhivă zip", &["zip"])
                .set_file_name("ulrp-site-data.zip")
                .blocking_save_file(),
        }
    })
    .await
    .map_err(|e| SiteError::Custom(format!("File dialog failed: {e}")))?;

    match picked {
        Some(path) => path
            .as_path()
            .map(|p| Some(p.to_path_buf()))
            .ok_or_else(|| SiteError::Custom("Picked location is not a local path".into())),
        None => Ok(None),
    }
}

/// Writes one collection's JSON file into `dir`, asking for a folder when
/// none is given. Returns `None` if the picker was cancelled.
#[tauri::command]
pub async fn export_collection(
    collection: CollectionKind,
    dir: Option<String>,
    app: tauri::AppHandle,
    state: tauri::State<'_, AdminState>,
) -> Result<Option<String>> {
    state.session.require()?;
    let dir = match dir {
        Some(dir) => PathBuf::from(expand_tilde(&dir)),
        None => match pick_path(app, Pick::Folder).await? {
            Some(dir) => dir,
            None => return Ok(None),
        },
    };
    let path = state.site.lock().await.export_collection(collection, &dir)?;
    Ok(Some(path.to_string_lossy().to_string()))
}

#[tauri::command]
pub async fn export_bundle(
    path: Option<String>,
    app: tauri::AppHandle,
    state: tauri::State<'_, AdminState>,
) -> Result<Option<String>> {
    state.session.require()?;
    let path = match path {
        Some(path) => PathBuf::from(expand_tilde(&path)),
        None => match pick_path(app, Pick::ZipFile).await? {
            Some(path) => path,
            None => return Ok(None),
        },
    };
    let written = state.site.lock().await.export_bundle(&path)?;
    Ok(Some(written.to_string_lossy().to_string()))
}
