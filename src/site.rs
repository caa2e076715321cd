//! The three admin panels wired to one storage backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::export;
use crate::form::{CategoryForm, RuleChangeForm, RuleForm, Submission, UpdateForm};
use crate::panel::{CollectionPanel, RulesPanel};
use crate::render::{self, rules::RulesPage, ViewSink};
use crate::store::{
    ContentStore, FileStorage, ResourceSource, RuleChanges, ServerRules, SiteSource, StorageBackend, Updates,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Updates,
    RuleChanges,
    Rules,
}

/// Which edit form a JSON payload holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormKind {
    Update,
    RuleChange,
    Category,
    Rule,
}

/// A submit result together with the re-rendered list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub submission: Submission,
    pub html: String,
}

/// Result of confirming a deletion. `html` always holds the current list.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub removed: bool,
    pub html: String,
}

pub struct Site {
    pub updates: CollectionPanel<Updates>,
    pub rule_changes: CollectionPanel<RuleChanges>,
    pub rules: RulesPanel,
}

impl Site {
    pub async fn load<S: ResourceSource>(backend: Arc<dyn StorageBackend>, source: &S) -> Self {
        let updates = ContentStore::<Updates>::load(backend.clone(), source).await;
        let rule_changes = ContentStore::<RuleChanges>::load(backend.clone(), source).await;
        let rules = ContentStore::<ServerRules>::load(backend, source).await;
        Self {
            updates: CollectionPanel::new(updates, render::updates::admin_list()),
            rule_changes: CollectionPanel::new(rule_changes, render::rule_changes::admin_list()),
            rules: RulesPanel::new(CollectionPanel::new(rules, render::rules::admin_categories())),
        }
    }

    /// File storage under the configured directory, resources from the site root.
    pub async fn open(config: &SiteConfig) -> Result<Self> {
        let storage_dir = config.storage_dir()?;
        let backend: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(&storage_dir));
        let source = SiteSource::from_root(&config.site_root());
        tracing::info!(
            storage = %storage_dir.display(),
            root = %config.site_root(),
            "Opening site content"
        );
        Ok(Self::load(backend, &source).await)
    }

    /// Admin list for one collection.
    pub fn render_admin(&self, kind: CollectionKind) -> String {
        let mut html = String::new();
        match kind {
            CollectionKind::Updates => self.updates.render(&mut html),
            CollectionKind::RuleChanges => self.rule_changes.render(&mut html),
            CollectionKind::Rules => self.rules.categories().render(&mut html),
        };
        html
    }

    pub fn update_form(&self, id: Option<&str>) -> Result<UpdateForm> {
        match id {
            Some(id) => self
                .updates
                .store()
                .find(id)
                .map(UpdateForm::edit)
                .ok_or_else(|| SiteError::NotFound(id.to_string())),
            None => Ok(UpdateForm::create()),
        }
    }

    pub fn rule_change_form(&self, id: Option<&str>) -> Result<RuleChangeForm> {
        match id {
            Some(id) => self
                .rule_changes
                .store()
                .find(id)
                .map(RuleChangeForm::edit)
                .ok_or_else(|| SiteError::NotFound(id.to_string())),
            None => Ok(RuleChangeForm::create()),
        }
    }

    pub fn category_form(&self, id: Option<&str>) -> Result<CategoryForm> {
        match id {
            Some(id) => self
                .rules
                .categories()
                .store()
                .find(id)
                .map(CategoryForm::edit)
                .ok_or_else(|| SiteError::NotFound(id.to_string())),
            None => Ok(CategoryForm::default()),
        }
    }

    /// Rule form inside `category_id`; blank when `rule_id` is `None`.
    pub fn rule_form(&self, category_id: &str, rule_id: Option<&str>) -> Result<RuleForm> {
        let store = self.rules.categories().store();
        if store.find(category_id).is_none() {
            return Err(SiteError::NotFound(category_id.to_string()));
        }
        match rule_id {
            Some(rule_id) => store
                .find_rule(category_id, rule_id)
                .map(|rule| RuleForm::edit(category_id, rule))
                .ok_or_else(|| SiteError::NotFound(format!("{category_id}/{rule_id}"))),
            None => Ok(RuleForm::create(category_id)),
        }
    }

    pub fn save_update(&mut self, form: &UpdateForm) -> Result<SavedView> {
        let mut html = String::new();
        let submission = self.updates.submit(form, &mut html)?;
        Ok(SavedView { submission, html })
    }

    pub fn save_rule_change(&mut self, form: &RuleChangeForm) -> Result<SavedView> {
        let mut html = String::new();
        let submission = self.rule_changes.submit(form, &mut html)?;
        Ok(SavedView { submission, html })
    }

    pub fn save_category(&mut self, form: &CategoryForm) -> Result<SavedView> {
        let mut html = String::new();
        let submission = self.rules.categories_mut().submit(form, &mut html)?;
        Ok(SavedView { submission, html })
    }

    pub fn save_rule(&mut self, form: &RuleForm) -> Result<SavedView> {
        let mut html = String::new();
        let submission = self.rules.categories_mut().submit(form, &mut html)?;
        Ok(SavedView { submission, html })
    }

    /// Submits a form given as JSON, as the admin window sends it.
    pub fn save_json(&mut self, kind: FormKind, json: &str) -> Result<SavedView> {
        match kind {
            FormKind::Update => self.save_update(&serde_json::from_str(json)?),
            FormKind::RuleChange => self.save_rule_change(&serde_json::from_str(json)?),
            FormKind::Category => self.save_category(&serde_json::from_str(json)?),
            FormKind::Rule => self.save_rule(&serde_json::from_str(json)?),
        }
    }

    pub fn request_delete(&mut self, kind: CollectionKind, id: String) {
        match kind {
            CollectionKind::Updates => self.updates.request_delete(id),
            CollectionKind::RuleChanges => self.rule_changes.request_delete(id),
            CollectionKind::Rules => self.rules.categories_mut().request_delete(id),
        }
    }

    pub fn cancel_delete(&mut self, kind: CollectionKind) {
        match kind {
            CollectionKind::Updates => self.updates.cancel_delete(),
            CollectionKind::RuleChanges => self.rule_changes.cancel_delete(),
            CollectionKind::Rules => self.rules.categories_mut().cancel_delete(),
        }
    }

    pub fn confirm_delete(&mut self, kind: CollectionKind) -> Result<DeleteOutcome> {
        let mut html = String::new();
        let removed = match kind {
            CollectionKind::Updates => self.updates.confirm_delete(&mut html)?,
            CollectionKind::RuleChanges => self.rule_changes.confirm_delete(&mut html)?,
            CollectionKind::Rules => self.rules.confirm_category_delete(&mut html)?,
        };
        Ok(DeleteOutcome {
            removed: removed.is_some(),
            html,
        })
    }

    pub fn confirm_rule_delete(&mut self) -> Result<DeleteOutcome> {
        let mut html = String::new();
        let removed = self.rules.confirm_rule_delete(&mut html)?;
        Ok(DeleteOutcome { removed, html })
    }

    /// Public updates page list.
    pub fn render_public_updates(&self, sink: &mut dyn ViewSink) {
        render::updates::public_list().render(self.updates.store().records(), sink);
    }

    /// Public rule-change log, without admin actions.
    pub fn render_public_rule_changes(&self, sink: &mut dyn ViewSink) {
        render::rule_changes::list().render(self.rule_changes.store().records(), sink);
    }

    pub fn rules_page(&self) -> RulesPage {
        let store = self.rules.categories().store();
        RulesPage::build(store.last_updated(), store.records())
    }

    pub fn export_collection(&self, kind: CollectionKind, dir: &Path) -> Result<PathBuf> {
        match kind {
            CollectionKind::Updates => export::export_collection(self.updates.store(), dir),
            CollectionKind::RuleChanges => export::export_collection(self.rule_changes.store(), dir),
            CollectionKind::Rules => export::export_collection(self.rules.categories().store(), dir),
        }
    }

    pub fn export_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(vec![
            export::export_collection(self.updates.store(), dir)?,
            export::export_collection(self.rule_changes.store(), dir)?,
            export::export_collection(self.rules.categories().store(), dir)?,
        ])
    }

    pub fn export_bundle(&self, path: &Path) -> Result<PathBuf> {
        export::export_bundle(
            path,
            self.updates.store(),
            self.rule_changes.store(),
            self.rules.categories().store(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LoadOrigin, MemorySource, MemoryStorage};

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                "data/updates.json",
                r#"{"updates":[{"id":"update-1","version":"v1.2","dateText":"3 Mai 2025","title":"Poliție","description":"Noi mașini"}]}"#,
            )
            .with("data/rules-updates.json", r#"{"rulesUpdates":[]}"#)
            .with(
                "data/rules.json",
                r#"{"lastUpdated":"1 Mai 2025","categories":[{"id":"general","icon":"📜","name":"Generale","rules":[{"id":"1.1","title":"Respect","description":"Fără insulte"}]}]}"#,
            )
    }

    #[tokio::test]
    async fn loads_every_collection() {
        let site = Site::load(Arc::new(MemoryStorage::new()), &source()).await;
        assert_eq!(site.updates.store().len(), 1);
        assert_eq!(site.updates.store().origin(), LoadOrigin::Resource);
        assert!(site.rule_changes.store().is_empty());

        let page = site.rules_page();
        assert_eq!(page.last_updated, "1 Mai 2025");
        assert_eq!(page.total_rules, 1);

        let mut html = String::new();
        site.render_public_updates(&mut html);
        assert!(html.contains("Poliție"));
    }

    #[tokio::test]
    async fn confirming_a_stale_delete_keeps_the_list() {
        let mut site = Site::load(Arc::new(MemoryStorage::new()), &source()).await;

        site.request_delete(CollectionKind::Updates, "update-gone".into());
        let outcome = site.confirm_delete(CollectionKind::Updates).unwrap();
        assert!(!outcome.removed);
        assert!(outcome.html.contains("Poliție"));

        site.rules.request_rule_delete("general", "7.7");
        let outcome = site.confirm_rule_delete().unwrap();
        assert!(!outcome.removed);
        assert!(outcome.html.contains("Respect"));

        site.request_delete(CollectionKind::Updates, "update-1".into());
        site.cancel_delete(CollectionKind::Updates);
        let outcome = site.confirm_delete(CollectionKind::Updates).unwrap();
        assert!(!outcome.removed);
        assert!(outcome.html.contains("Poliție"));
    }

    #[tokio::test]
    async fn deleting_a_category_stamps_the_rules_date() {
        let mut site = Site::load(Arc::new(MemoryStorage::new()), &source()).await;
        site.request_delete(CollectionKind::Rules, "general".into());
        let outcome = site.confirm_delete(CollectionKind::Rules).unwrap();
        assert!(outcome.removed);
        assert_ne!(site.rules_page().last_updated, "1 Mai 2025");
        assert_eq!(site.rules_page().total_rules, 0);
    }

    #[tokio::test]
    async fn forms_round_trip_through_json() {
        let mut site = Site::load(Arc::new(MemoryStorage::new()), &source()).await;

        let mut form = site.update_form(Some("update-1")).unwrap();
        form.title = "Poliție nouă".into();
        let json = serde_json::to_string(&form).unwrap();
        let saved = site.save_json(FormKind::Update, &json).unwrap();
        assert!(!saved.submission.inserted);
        assert!(saved.html.contains("Poliție nouă"));

        let saved = site
            .save_json(
                FormKind::Rule,
                r#"{"categoryId":"general","title":"Fără metagaming"}"#,
            )
            .unwrap();
        assert_eq!(saved.submission.id, "1.2");
        assert_eq!(site.rule_form("general", Some("1.2")).unwrap().title, "Fără metagaming");

        let saved = site
            .save_json(FormKind::Category, r#"{"icon":"🚓","name":"Poliție"}"#)
            .unwrap();
        assert!(saved.submission.inserted);
        assert_eq!(site.category_form(Some(saved.submission.id.as_str())).unwrap().name, "Poliție");

        assert!(matches!(site.update_form(Some("nope")), Err(SiteError::NotFound(_))));
        assert!(matches!(site.rule_form("nope", None), Err(SiteError::NotFound(_))));
        assert!(site.save_json(FormKind::RuleChange, "{").is_err());
    }

    #[tokio::test]
    async fn exports_three_files() {
        let tmp = tempfile::tempdir().unwrap();
        let site = Site::load(Arc::new(MemoryStorage::new()), &source()).await;
        let files = site.export_all(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["updates.json", "rules-updates.json", "rules.json"]);
    }
}
