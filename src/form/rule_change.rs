use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::form::{non_blank, upsert_and_save, FormBinder, FormMode, Submission};
use crate::model::{RuleChangeCategory, RuleChangeRecord};
use crate::store::{ContentStore, RuleChanges};
use crate::util::generate_id;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChangeForm {
    #[serde(default)]
    pub id: String,
    /// ISO date; today when left blank.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub title: String,
    pub category: RuleChangeCategory,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rule_reference: String,
    #[serde(default)]
    pub important: bool,
}

impl Default for RuleChangeForm {
    fn default() -> Self {
        Self {
            id: String::new(),
            date: String::new(),
            date_text: String::new(),
            title: String::new(),
            category: RuleChangeCategory::Modificare,
            content: String::new(),
            rule_reference: String::new(),
            important: false,
        }
    }
}

impl RuleChangeForm {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(change: &RuleChangeRecord) -> Self {
        Self {
            id: change.id.clone(),
            date: change.date.clone(),
            date_text: change.date_text.clone(),
            title: change.title.clone(),
            category: change.category,
            content: change.content.clone(),
            rule_reference: change.rule_reference.clone().unwrap_or_default(),
            important: change.important,
        }
    }

    pub fn to_record(&self) -> RuleChangeRecord {
        let id = if self.id.is_empty() {
            generate_id("rule-update")
        } else {
            self.id.clone()
        };
        let date = non_blank(&self.date)
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        RuleChangeRecord {
            id,
            date,
            date_text: self.date_text.clone(),
            title: self.title.clone(),
            category: self.category,
            content: self.content.clone(),
            rule_reference: non_blank(&self.rule_reference),
            important: self.important,
        }
    }
}

impl FormBinder for RuleChangeForm {
    type Target = RuleChanges;

    fn mode(&self) -> FormMode {
        if self.id.is_empty() {
            FormMode::Create
        } else {
            FormMode::Edit
        }
    }

    fn submit(&self, store: &mut ContentStore<RuleChanges>) -> Result<Submission> {
        upsert_and_save(
            store,
            self.to_record(),
            "Modificare adăugată cu succes!",
            "Modificare actualizată cu succes!",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn blank_reference_becomes_absent_and_date_defaults() {
        let mut form = RuleChangeForm::create();
        form.title = "Clarificare RDM".into();
        form.category = RuleChangeCategory::Clarificare;
        form.rule_reference = "   ".into();

        let record = form.to_record();
        assert!(record.id.starts_with("rule-update-"));
        assert_eq!(record.rule_reference, None);
        assert_eq!(record.date.len(), 10);
    }

    #[test]
    fn deserializes_from_admin_payload() {
        let form: RuleChangeForm = serde_json::from_str(
            r#"{"title":"x","category":"stergere","ruleReference":"3.2","important":true}"#,
        )
        .unwrap();
        assert_eq!(form.category, RuleChangeCategory::Stergere);
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.to_record().rule_reference.as_deref(), Some("3.2"));
    }

    #[test]
    fn new_changes_go_first() {
        let mut store = ContentStore::<RuleChanges>::new(Arc::new(MemoryStorage::new()));
        let mut first = RuleChangeForm::create();
        first.id = "a".into();
        first.submit(&mut store).unwrap();
        let mut second = RuleChangeForm::create();
        second.id = "b".into();
        let submission = second.submit(&mut store).unwrap();

        assert!(submission.inserted);
        assert_eq!(store.records()[0].id, "b");

        let mut edit = RuleChangeForm::edit(store.find("a").unwrap());
        edit.important = true;
        assert!(!edit.submit(&mut store).unwrap().inserted);
        assert!(store.records()[1].important);
    }
}
