//! Content records as they appear in the deployed `data/*.json` files.

use serde::{Deserialize, Serialize};

/// An addressable content entity. Ids are unique within a collection.
pub trait Record {
    fn id(&self) -> &str;
}

// ── Updates ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub id: String,
    pub version: String,
    pub date_text: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub sections: Vec<UpdateSection>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateSection {
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl Record for UpdateRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

// ── Rule changes ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleChangeCategory {
    Modificare,
    Clarificare,
    Noua,
    Stergere,
}

impl RuleChangeCategory {
    pub const ALL: [RuleChangeCategory; 4] = [
        Self::Modificare,
        Self::Clarificare,
        Self::Noua,
        Self::Stergere,
    ];

    /// Badge label shown on the public page.
    pub fn label(self) -> &'static str {
        match self {
            Self::Modificare => "Modificare",
            Self::Clarificare => "Clarificare",
            Self::Noua => "Regulă Nouă",
            Self::Stergere => "Ștergere",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modificare => "modificare",
            Self::Clarificare => "clarificare",
            Self::Noua => "noua",
            Self::Stergere => "stergere",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleChangeRecord {
    pub id: String,
    pub date: String,
    pub date_text: String,
    pub title: String,
    pub category: RuleChangeCategory,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_reference: Option<String>,
    #[serde(default)]
    pub important: bool,
}

impl Record for RuleChangeRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

// ── Server rules ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleCategory {
    pub id: String,
    pub icon: String,
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    /// Dotted numbering, e.g. `2.3`.
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub sub_rules: Vec<SubRule>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubRule {
    pub id: String,
    pub text: String,
}

impl Record for RuleCategory {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for RuleEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Metadata stored next to the rule categories.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesMeta {
    #[serde(default)]
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_uses_camel_case_keys() {
        let json = r#"{"id":"u1","version":"v1.2.0","dateText":"12 Ianuarie 2025",
            "title":"Patch","description":"d","sections":[{"icon":"🚗","title":"Vehicule","items":["BMW M5"]}]}"#;
        let update: UpdateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(update.date_text, "12 Ianuarie 2025");
        assert_eq!(update.sections[0].items, vec!["BMW M5"]);

        let back = serde_json::to_value(&update).unwrap();
        assert!(back.get("dateText").is_some());
    }

    #[test]
    fn rule_change_defaults_optional_fields() {
        let json = r#"{"id":"r1","date":"2025-01-12","dateText":"12 Ian","title":"t",
            "category":"noua","content":"c"}"#;
        let change: RuleChangeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(change.category, RuleChangeCategory::Noua);
        assert_eq!(change.rule_reference, None);
        assert!(!change.important);

        let back = serde_json::to_value(&change).unwrap();
        assert!(back.get("ruleReference").is_none());
    }

    #[test]
    fn unknown_rule_change_category_is_rejected() {
        let json = r#"{"id":"r1","date":"","dateText":"","title":"","category":"other","content":""}"#;
        assert!(serde_json::from_str::<RuleChangeRecord>(json).is_err());
    }

    #[test]
    fn category_labels_and_parse() {
        assert_eq!(RuleChangeCategory::Noua.label(), "Regulă Nouă");
        assert_eq!(RuleChangeCategory::parse("stergere"), Some(RuleChangeCategory::Stergere));
        assert_eq!(RuleChangeCategory::parse("nope"), None);
    }

    #[test]
    fn rule_entry_reads_sub_rules() {
        let json = r#"{"id":"1.1","title":"RDM","description":"d","important":true,
            "subRules":[{"id":"1.1.a","text":"x"}]}"#;
        let rule: RuleEntry = serde_json::from_str(json).unwrap();
        assert!(rule.important);
        assert_eq!(rule.sub_rules[0].id, "1.1.a");
    }
}
