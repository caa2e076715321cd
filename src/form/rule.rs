use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::form::{non_blank, row_id, FormBinder, FormMode, Submission};
use crate::model::{RuleCategory, RuleEntry, SubRule};
use crate::store::{ContentStore, ServerRules, Upsert};
use crate::util::generate_id;

/// Date text written to `lastUpdated` whenever the rules are edited.
pub fn today_text() -> String {
    chrono::Local::now().format("%d.%m.%Y").to_string()
}

// ── Rule entries ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleForm {
    pub category_id: String,
    /// Dotted number. Blank on create means "next number in the category".
    #[serde(default)]
    pub id: String,
    /// Set when editing; lets the dotted number itself be changed.
    #[serde(default)]
    pub original_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub sub_rules: Vec<SubRuleRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRuleRow {
    #[serde(default)]
    pub row_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

impl RuleForm {
    pub fn create(category_id: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            ..Self::default()
        }
    }

    pub fn edit(category_id: &str, rule: &RuleEntry) -> Self {
        Self {
            category_id: category_id.to_string(),
            id: rule.id.clone(),
            original_id: rule.id.clone(),
            title: rule.title.clone(),
            description: rule.description.clone(),
            important: rule.important,
            sub_rules: rule
                .sub_rules
                .iter()
                .map(|s| SubRuleRow {
                    row_id: row_id("subrule"),
                    id: s.id.clone(),
                    text: s.text.clone(),
                })
                .collect(),
        }
    }

    pub fn add_sub_rule(&mut self, id: &str, text: &str) -> String {
        let row = SubRuleRow {
            row_id: row_id("subrule"),
            id: id.to_string(),
            text: text.to_string(),
        };
        let row_id = row.row_id.clone();
        self.sub_rules.push(row);
        row_id
    }

    pub fn remove_sub_rule(&mut self, sub_row_id: &str) -> bool {
        let before = self.sub_rules.len();
        self.sub_rules.retain(|s| s.row_id != sub_row_id);
        self.sub_rules.len() != before
    }

    /// Assembles the entry. Sub-rules with blank text are dropped.
    pub fn to_record(&self, fallback_id: impl FnOnce() -> String) -> RuleEntry {
        RuleEntry {
            id: non_blank(&self.id).unwrap_or_else(fallback_id),
            title: self.title.clone(),
            description: self.description.clone(),
            important: self.important,
            sub_rules: self
                .sub_rules
                .iter()
                .filter_map(|s| {
                    non_blank(&s.text).map(|text| SubRule {
                        id: s.id.trim().to_string(),
                        text,
                    })
                })
                .collect(),
        }
    }
}

/// `<category position>.<highest number + 1>`, e.g. after `2.1` and `2.3` the
/// next rule of the second category is `2.4`. Never returns a taken number.
fn next_rule_number(store: &ContentStore<ServerRules>, category_id: &str) -> String {
    let position = store
        .records()
        .iter()
        .position(|c| c.id == category_id)
        .map(|i| i + 1)
        .unwrap_or(0);
    let highest = store
        .find(category_id)
        .into_iter()
        .flat_map(|c| c.rules.iter())
        .filter_map(|r| r.id.rsplit('.').next()?.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    let mut next = highest + 1;
    while store.find_rule(category_id, &format!("{position}.{next}")).is_some() {
        next += 1;
    }
    format!("{position}.{next}")
}

impl FormBinder for RuleForm {
    type Target = ServerRules;

    fn mode(&self) -> FormMode {
        if self.original_id.is_empty() {
            FormMode::Create
        } else {
            FormMode::Edit
        }
    }

    fn submit(&self, store: &mut ContentStore<ServerRules>) -> Result<Submission> {
        if store.find(&self.category_id).is_none() {
            return Err(SiteError::NotFound(format!("category {}", self.category_id)));
        }
        let next = next_rule_number(store, &self.category_id);
        let rule = self.to_record(|| next);
        let id = rule.id.clone();

        if id != self.original_id && store.find_rule(&self.category_id, &id).is_some() {
            return Err(SiteError::Conflict(format!("rule {id} in {}", self.category_id)));
        }

        // Renumbered while editing: the old entry makes way for the new one.
        if !self.original_id.is_empty() && self.original_id != id {
            store.remove_rule(&self.category_id, &self.original_id);
        }

        let outcome = store
            .upsert_rule(&self.category_id, rule)
            .ok_or_else(|| SiteError::NotFound(format!("category {}", self.category_id)))?;
        store.touch(today_text());
        store.save()?;
        tracing::info!(category = %self.category_id, rule = %id, ?outcome, "Rule saved");

        let inserted = outcome == Upsert::Inserted && self.mode() == FormMode::Create;
        Ok(Submission {
            id,
            inserted,
            message: if inserted {
                "Regulă adăugată cu succes!".to_string()
            } else {
                "Regulă actualizată cu succes!".to_string()
            },
        })
    }
}

// ── Categories ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub name: String,
}

impl CategoryForm {
    pub fn edit(category: &RuleCategory) -> Self {
        Self {
            id: category.id.clone(),
            icon: category.icon.clone(),
            name: category.name.clone(),
        }
    }
}

impl FormBinder for CategoryForm {
    type Target = ServerRules;

    fn mode(&self) -> FormMode {
        if self.id.is_empty() {
            FormMode::Create
        } else {
            FormMode::Edit
        }
    }

    /// Editing keeps the category's rules; new categories go last.
    fn submit(&self, store: &mut ContentStore<ServerRules>) -> Result<Submission> {
        let id = if self.id.is_empty() {
            generate_id("category")
        } else {
            self.id.clone()
        };
        let rules = store.find(&id).map(|c| c.rules.clone()).unwrap_or_default();
        let outcome = store.upsert_last(RuleCategory {
            id: id.clone(),
            icon: self.icon.clone(),
            name: self.name.clone(),
            rules,
        });
        store.touch(today_text());
        store.save()?;
        tracing::info!(category = %id, ?outcome, "Category saved");

        Ok(Submission {
            id,
            inserted: outcome == Upsert::Inserted,
            message: match outcome {
                Upsert::Inserted => "Categorie adăugată cu succes!".to_string(),
                Upsert::Updated => "Categorie actualizată cu succes!".to_string(),
            },
        })
    }
}
