//! Edit forms bound to single records.
//!
//! A form is plain data (the admin UI sends it back as JSON on submit). It is
//! populated from a record or from defaults, grows and shrinks its repeating
//! rows, and on submit assembles a record and routes it into a store.

pub mod rule;
pub mod rule_change;
pub mod update;

use serde::Serialize;

use crate::error::Result;
use crate::store::{Collection, ContentStore, Upsert};
use crate::util::{now_millis, random_suffix};

pub use rule::{CategoryForm, RuleForm, SubRuleRow};
pub use rule_change::RuleChangeForm;
pub use update::{ItemRow, SectionRow, UpdateForm};

/// Preset section icons offered by the emoji picker.
pub const PRESET_EMOJIS: [(&str, &str); 16] = [
    ("🚗", "Vehicule"),
    ("🔧", "Funcționalități/Fix-uri"),
    ("🏢", "Locații/Harta"),
    ("🎮", "Gameplay"),
    ("⚡", "Performance"),
    ("🎭", "Roleplay"),
    ("👥", "Staff/Comunitate"),
    ("🛠️", "Update tehnic"),
    ("💰", "Economie"),
    ("👔", "Jobs"),
    ("🏠", "Proprietăți"),
    ("🔫", "Arme"),
    ("📱", "UI/Interfață"),
    ("🎉", "Evenimente"),
    ("🐛", "Bug fixes"),
    ("✨", "Nou/Feature"),
];

pub const DEFAULT_SECTION_ICON: &str = "🚗";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Outcome of a submit, ready for the toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub inserted: bool,
    pub message: String,
}

/// A form that can be submitted into a store.
pub trait FormBinder {
    type Target: Collection;

    fn mode(&self) -> FormMode;

    fn submit(&self, store: &mut ContentStore<Self::Target>) -> Result<Submission>;
}

/// Unique id for a dynamic row, used by its delete affordance.
pub(crate) fn row_id(prefix: &str) -> String {
    format!("{prefix}-{}-{}", now_millis(), random_suffix(5))
}

/// Upserts, persists, and picks the toast message.
pub(crate) fn upsert_and_save<C: Collection>(
    store: &mut ContentStore<C>,
    record: C::Record,
    added: &str,
    updated: &str,
) -> Result<Submission> {
    use crate::model::Record;

    let id = record.id().to_string();
    let outcome = store.upsert(record);
    store.save()?;
    tracing::info!(collection = C::NAME, id = %id, ?outcome, "Record saved");
    Ok(Submission {
        id,
        inserted: outcome == Upsert::Inserted,
        message: match outcome {
            Upsert::Inserted => added.to_string(),
            Upsert::Updated => updated.to_string(),
        },
    })
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
