use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::form::{row_id, upsert_and_save, FormBinder, FormMode, Submission, DEFAULT_SECTION_ICON};
use crate::model::{UpdateRecord, UpdateSection};
use crate::render::updates::{SectionView, UpdateCardView};
use crate::store::{ContentStore, Updates};
use crate::util::generate_id;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateForm {
    /// Empty while creating.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<SectionRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRow {
    #[serde(default)]
    pub row_id: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ItemRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    #[serde(default)]
    pub row_id: String,
    #[serde(default)]
    pub value: String,
}

impl ItemRow {
    fn new(value: &str) -> Self {
        Self {
            row_id: row_id("item"),
            value: value.to_string(),
        }
    }
}

impl UpdateForm {
    /// Blank form with one section holding one empty item.
    pub fn create() -> Self {
        let mut form = Self::default();
        form.add_section(None);
        form
    }

    /// Form populated from an existing update, one row per section and item.
    pub fn edit(update: &UpdateRecord) -> Self {
        let mut form = Self {
            id: update.id.clone(),
            version: update.version.clone(),
            date_text: update.date_text.clone(),
            title: update.title.clone(),
            description: update.description.clone(),
            sections: Vec::new(),
        };
        for section in &update.sections {
            form.add_section(Some(section));
        }
        form
    }

    pub fn heading(&self) -> &'static str {
        match self.mode() {
            FormMode::Create => "Adaugă Update",
            FormMode::Edit => "Editează Update",
        }
    }

    /// Appends a section row and returns its row id. Without data the row
    /// starts with the default icon and one empty item.
    pub fn add_section(&mut self, data: Option<&UpdateSection>) -> String {
        let id = row_id("section");
        let (icon, title, items) = match data {
            Some(s) => {
                let icon = if s.icon.is_empty() { DEFAULT_SECTION_ICON } else { s.icon.as_str() };
                (icon.to_string(), s.title.clone(), s.items.iter().map(|i| ItemRow::new(i)).collect())
            }
            None => (DEFAULT_SECTION_ICON.to_string(), String::new(), Vec::new()),
        };
        let mut row = SectionRow {
            row_id: id.clone(),
            icon,
            title,
            items,
        };
        if row.items.is_empty() {
            row.items.push(ItemRow::new(""));
        }
        self.sections.push(row);
        id
    }

    pub fn remove_section(&mut self, section_row_id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.row_id != section_row_id);
        self.sections.len() != before
    }

    /// Appends an item row to a section; `None` if the section is gone.
    pub fn add_item(&mut self, section_row_id: &str, value: &str) -> Option<String> {
        let section = self.sections.iter_mut().find(|s| s.row_id == section_row_id)?;
        let item = ItemRow::new(value);
        let id = item.row_id.clone();
        section.items.push(item);
        Some(id)
    }

    pub fn remove_item(&mut self, item_row_id: &str) -> bool {
        for section in &mut self.sections {
            let before = section.items.len();
            section.items.retain(|i| i.row_id != item_row_id);
            if section.items.len() != before {
                return true;
            }
        }
        false
    }

    pub fn select_icon(&mut self, section_row_id: &str, icon: &str) -> bool {
        match self.sections.iter_mut().find(|s| s.row_id == section_row_id) {
            Some(section) => {
                section.icon = icon.to_string();
                true
            }
            None => false,
        }
    }

    /// Live preview with placeholders for empty fields.
    pub fn preview(&self) -> UpdateCardView {
        fn or<'a>(value: &'a str, placeholder: &'a str) -> String {
            let shown = if value.is_empty() { placeholder } else { value };
            shown.to_string()
        }

        UpdateCardView {
            version: or(&self.version, "v0.0.0"),
            date_text: or(&self.date_text, "Acum"),
            title: or(&self.title, "Titlu Update"),
            description: or(&self.description, "Descrierea update-ului va apărea aici..."),
            sections: self
                .sections
                .iter()
                .map(|s| SectionView {
                    icon: or(&s.icon, "📌"),
                    title: or(&s.title, "Secțiune"),
                    items: s
                        .items
                        .iter()
                        .filter(|i| !i.value.trim().is_empty())
                        .map(|i| i.value.clone())
                        .collect(),
                })
                .filter(|s| !s.items.is_empty())
                .collect(),
        }
    }

    /// Assembles the record. Items are trimmed and blanks dropped; a section
    /// survives only with a title and at least one item.
    pub fn to_record(&self) -> UpdateRecord {
        let id = if self.id.is_empty() {
            generate_id("update")
        } else {
            self.id.clone()
        };

        let sections = self
            .sections
            .iter()
            .filter_map(|s| {
                let items: Vec<String> = s
                    .items
                    .iter()
                    .map(|i| i.value.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                if s.title.is_empty() || items.is_empty() {
                    return None;
                }
                Some(UpdateSection {
                    icon: s.icon.clone(),
                    title: s.title.clone(),
                    items,
                })
            })
            .collect();

        UpdateRecord {
            id,
            version: self.version.clone(),
            date_text: self.date_text.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            sections,
        }
    }
}

impl FormBinder for UpdateForm {
    type Target = Updates;

    fn mode(&self) -> FormMode {
        if self.id.is_empty() {
            FormMode::Create
        } else {
            FormMode::Edit
        }
    }

    fn submit(&self, store: &mut ContentStore<Updates>) -> Result<Submission> {
        upsert_and_save(
            store,
            self.to_record(),
            "Update adăugat cu succes!",
            "Update actualizat cu succes!",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn create_starts_with_one_default_section() {
        let form = UpdateForm::create();
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.heading(), "Adaugă Update");
        assert_eq!(form.sections.len(), 1);
        assert_eq!(form.sections[0].icon, "🚗");
        assert_eq!(form.sections[0].items.len(), 1);
        assert_eq!(form.sections[0].items[0].value, "");
    }

    #[test]
    fn edit_mirrors_record_rows() {
        let update = UpdateRecord {
            id: "update-9".into(),
            version: "v3".into(),
            date_text: "Ieri".into(),
            title: "T".into(),
            description: "D".into(),
            sections: vec![UpdateSection {
                icon: "💰".into(),
                title: "Economie".into(),
                items: vec!["Taxe".into(), "Salarii".into()],
            }],
        };
        let form = UpdateForm::edit(&update);
        assert_eq!(form.mode(), FormMode::Edit);
        assert_eq!(form.sections[0].items.len(), 2);
        assert_eq!(form.to_record(), update);
    }

    #[test]
    fn assembling_drops_blank_items_and_incomplete_sections() {
        let mut form = UpdateForm::create();
        form.version = "v1.0.1".into();
        let first = form.sections[0].row_id.clone();
        form.sections[0].title = "Vehicule".into();
        form.sections[0].items[0].value = "  Sultan  ".into();
        form.add_item(&first, "   ").unwrap();

        // Titled but empty
        let second = form.add_section(None);
        form.sections[1].title = "Arme".into();
        // Items but no title
        let third = form.add_section(None);
        form.add_item(&third, "Pistol").unwrap();

        let record = form.to_record();
        assert!(record.id.starts_with("update-"));
        assert_eq!(record.sections.len(), 1);
        assert_eq!(record.sections[0].items, vec!["Sultan"]);
        assert!(form.remove_section(&second));
    }

    #[test]
    fn rows_can_be_removed_individually() {
        let mut form = UpdateForm::create();
        let section = form.sections[0].row_id.clone();
        let item = form.add_item(&section, "x").unwrap();
        assert!(form.remove_item(&item));
        assert!(!form.remove_item(&item));
        assert!(form.add_item("missing", "x").is_none());
        assert!(form.select_icon(&section, "🔫"));
        assert_eq!(form.sections[0].icon, "🔫");
        assert!(form.remove_section(&section));
        assert!(form.sections.is_empty());
    }

    #[test]
    fn preview_uses_placeholders() {
        let mut form = UpdateForm::create();
        let preview = form.preview();
        assert_eq!(preview.version, "v0.0.0");
        assert_eq!(preview.date_text, "Acum");
        assert_eq!(preview.title, "Titlu Update");
        assert!(preview.sections.is_empty());

        form.sections[0].items[0].value = "Ceva".into();
        form.sections[0].icon.clear();
        let preview = form.preview();
        assert_eq!(preview.sections[0].title, "Secțiune");
        assert_eq!(preview.sections[0].icon, "📌");
    }

    #[test]
    fn submit_inserts_then_updates() {
        let mut store = ContentStore::<Updates>::new(Arc::new(MemoryStorage::new()));
        let mut form = UpdateForm::create();
        form.title = "Primul".into();

        let created = form.submit(&mut store).unwrap();
        assert!(created.inserted);
        assert_eq!(created.message, "Update adăugat cu succes!");
        assert_eq!(store.len(), 1);

        let mut form = UpdateForm::edit(store.find(&created.id).unwrap());
        form.title = "Primul (editat)".into();
        let updated = form.submit(&mut store).unwrap();
        assert!(!updated.inserted);
        assert_eq!(updated.message, "Update actualizat cu succes!");
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].title, "Primul (editat)");
    }
}
