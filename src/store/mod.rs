//! In-memory content collections mirrored to a storage backend.
//!
//! A [`ContentStore`] owns one ordered collection. It loads from storage when
//! the key is present, otherwise from the deployed JSON resource (seeding the
//! storage with it). Every mutation is in memory until [`ContentStore::save`].

pub mod backend;
pub mod source;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Record, RuleCategory, RuleChangeRecord, RuleEntry, RulesMeta, UpdateRecord};

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use source::{MemorySource, ResourceSource, SiteSource};

/// One kind of collection: where it is stored, where its fallback lives, and
/// the document shapes used for each.
pub trait Collection: Send + Sync + 'static {
    type Record: Record + Clone + Serialize + DeserializeOwned + Send + Sync;
    type Meta: Clone + Default + Send + Sync;

    /// Short name used in logs and on the command line.
    const NAME: &'static str;
    const STORAGE_KEY: &'static str;
    const RESOURCE_PATH: &'static str;
    const EXPORT_FILE_NAME: &'static str;

    fn decode_stored(raw: &str) -> serde_json::Result<(Vec<Self::Record>, Self::Meta)>;
    fn encode_stored(records: &[Self::Record], meta: &Self::Meta) -> serde_json::Result<String>;
    fn decode_resource(raw: &str) -> serde_json::Result<(Vec<Self::Record>, Self::Meta)>;
    /// Document written by exports, identical in shape to the deployed resource.
    fn export_document(records: &[Self::Record], meta: &Self::Meta) -> serde_json::Value;
}

/// Game updates, newest first.
pub struct Updates;

/// Rule-change log entries, newest first.
pub struct RuleChanges;

/// Server rules grouped by category.
pub struct ServerRules;

#[derive(Deserialize)]
struct UpdatesDocument {
    #[serde(default)]
    updates: Option<Vec<UpdateRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleChangesDocument {
    #[serde(default)]
    rules_updates: Option<Vec<RuleChangeRecord>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesDocument {
    #[serde(default)]
    last_updated: String,
    #[serde(default)]
    categories: Vec<RuleCategory>,
}

impl Collection for Updates {
    type Record = UpdateRecord;
    type Meta = ();

    const NAME: &'static str = "updates";
    const STORAGE_KEY: &'static str = "ulrp_updates";
    const RESOURCE_PATH: &'static str = "data/updates.json";
    const EXPORT_FILE_NAME: &'static str = "updates.json";

    fn decode_stored(raw: &str) -> serde_json::Result<(Vec<UpdateRecord>, ())> {
        Ok((serde_json::from_str(raw)?, ()))
    }

    fn encode_stored(records: &[UpdateRecord], _meta: &()) -> serde_json::Result<String> {
        serde_json::to_string(records)
    }

    fn decode_resource(raw: &str) -> serde_json::Result<(Vec<UpdateRecord>, ())> {
        let doc: UpdatesDocument = serde_json::from_str(raw)?;
        Ok((doc.updates.unwrap_or_default(), ()))
    }

    fn export_document(records: &[UpdateRecord], _meta: &()) -> serde_json::Value {
        serde_json::json!({ "updates": records })
    }
}

impl Collection for RuleChanges {
    type Record = RuleChangeRecord;
    type Meta = ();

    const NAME: &'static str = "rule-changes";
    const STORAGE_KEY: &'static str = "ulrp_rules_updates";
    const RESOURCE_PATH: &'static str = "data/rules-updates.json";
    const EXPORT_FILE_NAME: &'static str = "rules-updates.json";

    fn decode_stored(raw: &str) -> serde_json::Result<(Vec<RuleChangeRecord>, ())> {
        Ok((serde_json::from_str(raw)?, ()))
    }

    fn encode_stored(records: &[RuleChangeRecord], _meta: &()) -> serde_json::Result<String> {
        serde_json::to_string(records)
    }

    fn decode_resource(raw: &str) -> serde_json::Result<(Vec<RuleChangeRecord>, ())> {
        let doc: RuleChangesDocument = serde_json::from_str(raw)?;
        Ok((doc.rules_updates.unwrap_or_default(), ()))
    }

    fn export_document(records: &[RuleChangeRecord], _meta: &()) -> serde_json::Value {
        serde_json::json!({ "rulesUpdates": records })
    }
}

impl Collection for ServerRules {
    type Record = RuleCategory;
    type Meta = RulesMeta;

    const NAME: &'static str = "rules";
    const STORAGE_KEY: &'static str = "ulrp_server_rules";
    const RESOURCE_PATH: &'static str = "data/rules.json";
    const EXPORT_FILE_NAME: &'static str = "rules.json";

    fn decode_stored(raw: &str) -> serde_json::Result<(Vec<RuleCategory>, RulesMeta)> {
        let doc: RulesDocument = serde_json::from_str(raw)?;
        Ok((doc.categories, RulesMeta { last_updated: doc.last_updated }))
    }

    fn encode_stored(records: &[RuleCategory], meta: &RulesMeta) -> serde_json::Result<String> {
        serde_json::to_string(&serde_json::json!({
            "lastUpdated": meta.last_updated,
            "categories": records,
        }))
    }

    // The deployed file and the stored value share one shape.
    fn decode_resource(raw: &str) -> serde_json::Result<(Vec<RuleCategory>, RulesMeta)> {
        Self::decode_stored(raw)
    }

    fn export_document(records: &[RuleCategory], meta: &RulesMeta) -> serde_json::Value {
        serde_json::json!({
            "lastUpdated": meta.last_updated,
            "categories": records,
        })
    }
}

/// Where the current contents of a store came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Nothing loaded yet (or created empty).
    Fresh,
    Storage,
    /// Fetched from the JSON resource and seeded into storage.
    Resource,
    /// Storage was malformed or the resource could not be fetched.
    Degraded,
}

/// Result of an insert-or-replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

pub struct ContentStore<C: Collection> {
    backend: Arc<dyn StorageBackend>,
    records: Vec<C::Record>,
    meta: C::Meta,
    origin: LoadOrigin,
    _kind: PhantomData<C>,
}

impl<C: Collection> ContentStore<C> {
    /// An empty store bound to `backend`. Nothing is read until [`Self::load`].
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            records: Vec::new(),
            meta: C::Meta::default(),
            origin: LoadOrigin::Fresh,
            _kind: PhantomData,
        }
    }

    pub fn with_records(backend: Arc<dyn StorageBackend>, records: Vec<C::Record>, meta: C::Meta) -> Self {
        Self {
            records,
            meta,
            ..Self::new(backend)
        }
    }

    /// Loads from storage if the key is present, else from the JSON resource.
    ///
    /// Never fails: malformed storage and unreachable resources both leave
    /// the store empty.
    pub async fn load<S: ResourceSource>(backend: Arc<dyn StorageBackend>, source: &S) -> Self {
        let mut store = Self::new(backend);
        store.reload(source).await;
        store
    }

    /// Replaces the in-memory contents with a fresh load.
    pub async fn reload<S: ResourceSource>(&mut self, source: &S) {
        self.records.clear();
        self.meta = C::Meta::default();

        match self.backend.get_item(C::STORAGE_KEY) {
            // An empty value counts as nothing stored.
            Ok(Some(raw)) if !raw.trim().is_empty() => {
                match C::decode_stored(&raw) {
                    Ok((records, meta)) => {
                        tracing::info!(collection = C::NAME, count = records.len(), "Loaded from storage");
                        self.records = records;
                        self.meta = meta;
                        self.origin = LoadOrigin::Storage;
                    }
                    Err(e) => {
                        tracing::warn!(collection = C::NAME, "Stored JSON is malformed: {e}");
                        self.origin = LoadOrigin::Degraded;
                    }
                }
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(collection = C::NAME, "Storage read failed: {e}");
                self.origin = LoadOrigin::Degraded;
                return;
            }
        }

        let fetched: Result<(Vec<C::Record>, C::Meta)> = match source.fetch_text(C::RESOURCE_PATH).await {
            Ok(raw) => C::decode_resource(&raw).map_err(Into::into),
            Err(e) => Err(e),
        };

        match fetched {
            Ok((records, meta)) => {
                tracing::info!(
                    collection = C::NAME,
                    count = records.len(),
                    "Loaded from {}",
                    C::RESOURCE_PATH
                );
                self.records = records;
                self.meta = meta;
                self.origin = LoadOrigin::Resource;
                if let Err(e) = self.save() {
                    tracing::warn!(collection = C::NAME, "Failed to seed storage: {e}");
                }
            }
            Err(e) => {
                tracing::warn!(collection = C::NAME, "Failed to load {}: {e}", C::RESOURCE_PATH);
                self.origin = LoadOrigin::Degraded;
            }
        }
    }

    /// Writes the collection to its storage key.
    pub fn save(&self) -> Result<()> {
        let raw = C::encode_stored(&self.records, &self.meta)?;
        self.backend.set_item(C::STORAGE_KEY, &raw)?;
        tracing::debug!(collection = C::NAME, count = self.records.len(), "Saved");
        Ok(())
    }

    /// Replaces the record with the same id in place, or prepends it.
    pub fn upsert(&mut self, record: C::Record) -> Upsert {
        if let Some(existing) = self.records.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
            Upsert::Updated
        } else {
            self.records.insert(0, record);
            Upsert::Inserted
        }
    }

    /// Like [`Self::upsert`] but new records go last. Used where the list
    /// order is a reading order (rule categories).
    pub fn upsert_last(&mut self, record: C::Record) -> Upsert {
        if let Some(existing) = self.records.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
            Upsert::Updated
        } else {
            self.records.push(record);
            Upsert::Inserted
        }
    }

    /// Drops the record with `id`. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    pub fn find(&self, id: &str) -> Option<&C::Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn records(&self) -> &[C::Record] {
        &self.records
    }

    pub fn meta(&self) -> &C::Meta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    /// The collection as the deployable document, pretty-printed.
    pub fn export_json(&self) -> Result<String> {
        let doc = C::export_document(&self.records, &self.meta);
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

impl ContentStore<ServerRules> {
    pub fn last_updated(&self) -> &str {
        &self.meta.last_updated
    }

    /// Sets the "last updated" text shown on the rules page.
    pub fn touch(&mut self, date_text: impl Into<String>) {
        self.meta.last_updated = date_text.into();
    }

    pub fn total_rules(&self) -> usize {
        self.records.iter().map(|c| c.rules.len()).sum()
    }

    pub fn find_rule(&self, category_id: &str, rule_id: &str) -> Option<&RuleEntry> {
        self.find(category_id)?.rules.iter().find(|r| r.id == rule_id)
    }

    /// Insert-or-replace a rule inside a category. New rules are appended so
    /// the dotted numbering stays in reading order.
    pub fn upsert_rule(&mut self, category_id: &str, rule: RuleEntry) -> Option<Upsert> {
        let category = self.records.iter_mut().find(|c| c.id == category_id)?;
        if let Some(existing) = category.rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
            Some(Upsert::Updated)
        } else {
            category.rules.push(rule);
            Some(Upsert::Inserted)
        }
    }

    pub fn remove_rule(&mut self, category_id: &str, rule_id: &str) -> bool {
        match self.records.iter_mut().find(|c| c.id == category_id) {
            Some(category) => {
                let before = category.rules.len();
                category.rules.retain(|r| r.id != rule_id);
                category.rules.len() != before
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UpdateSection;

    fn update(id: &str, title: &str) -> UpdateRecord {
        UpdateRecord {
            id: id.into(),
            version: "v1.0.0".into(),
            date_text: "Azi".into(),
            title: title.into(),
            description: String::new(),
            sections: vec![UpdateSection {
                icon: "🚗".into(),
                title: "Vehicule".into(),
                items: vec!["Sultan RS".into()],
            }],
        }
    }

    fn memory() -> Arc<dyn StorageBackend> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn upsert_new_id_prepends() {
        let mut store = ContentStore::<Updates>::with_records(memory(), vec![update("a", "A")], ());
        assert_eq!(store.upsert(update("b", "B")), Upsert::Inserted);
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].id, "b");
    }

    #[test]
    fn upsert_existing_id_replaces_in_place() {
        let mut store = ContentStore::<Updates>::with_records(
            memory(),
            vec![update("a", "A"), update("b", "B"), update("c", "C")],
            (),
        );
        assert_eq!(store.upsert(update("b", "B2")), Upsert::Updated);
        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[1].title, "B2");
        assert_eq!(store.records()[0].id, "a");
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut store = ContentStore::<Updates>::with_records(memory(), vec![update("a", "A")], ());
        assert!(!store.remove("zzz"));
        assert_eq!(store.len(), 1);
        assert!(store.remove("a"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn seeds_storage_from_resource_on_first_load() {
        let backend = memory();
        let source = MemorySource::new().with(
            "data/updates.json",
            r#"{"updates":[{"id":"u1","version":"v1","dateText":"d","title":"t","description":"x","sections":[]}]}"#,
        );

        let store = ContentStore::<Updates>::load(backend.clone(), &source).await;
        assert_eq!(store.origin(), LoadOrigin::Resource);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].id, "u1");

        let stored = backend.get_item("ulrp_updates").unwrap().unwrap();
        let parsed: Vec<UpdateRecord> = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "u1");
    }

    #[tokio::test]
    async fn storage_wins_over_resource() {
        let backend = memory();
        backend.set_item("ulrp_updates", "[]").unwrap();
        let source = MemorySource::new().with(
            "data/updates.json",
            r#"{"updates":[{"id":"u1","version":"","dateText":"","title":"","description":""}]}"#,
        );

        let store = ContentStore::<Updates>::load(backend, &source).await;
        assert_eq!(store.origin(), LoadOrigin::Storage);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn malformed_storage_degrades_to_empty() {
        let backend = memory();
        backend.set_item("ulrp_updates", "{not json").unwrap();

        let store = ContentStore::<Updates>::load(backend.clone(), &MemorySource::new()).await;
        assert_eq!(store.origin(), LoadOrigin::Degraded);
        assert!(store.is_empty());
        // The broken value is left for inspection until the next save
        assert_eq!(backend.get_item("ulrp_updates").unwrap().as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn blank_stored_value_falls_through_to_resource() {
        let backend = memory();
        backend.set_item("ulrp_updates", "  ").unwrap();
        let source = MemorySource::new().with(
            "data/updates.json",
            r#"{"updates":[{"id":"u1","version":"","dateText":"","title":"","description":""}]}"#,
        );

        let store = ContentStore::<Updates>::load(backend.clone(), &source).await;
        assert_eq!(store.origin(), LoadOrigin::Resource);
        assert_eq!(store.len(), 1);
        assert!(backend.get_item("ulrp_updates").unwrap().unwrap().contains("u1"));
    }

    #[tokio::test]
    async fn missing_resource_degrades_without_seeding() {
        let backend = memory();
        let store = ContentStore::<RuleChanges>::load(backend.clone(), &MemorySource::new()).await;
        assert_eq!(store.origin(), LoadOrigin::Degraded);
        assert!(store.is_empty());
        assert_eq!(backend.get_item("ulrp_rules_updates").unwrap(), None);
    }

    #[tokio::test]
    async fn resource_without_array_key_loads_empty_and_seeds() {
        let backend = memory();
        let source = MemorySource::new().with("data/rules-updates.json", "{}");
        let store = ContentStore::<RuleChanges>::load(backend.clone(), &source).await;
        assert_eq!(store.origin(), LoadOrigin::Resource);
        assert!(store.is_empty());
        assert_eq!(backend.get_item("ulrp_rules_updates").unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn save_then_load_reproduces_collection() {
        let backend = memory();
        let mut store = ContentStore::<Updates>::new(backend.clone());
        store.upsert(update("a", "A"));
        store.upsert(update("b", "B"));
        store.save().unwrap();

        let reloaded = ContentStore::<Updates>::load(backend, &MemorySource::new()).await;
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn rules_keep_last_updated_through_storage() {
        let backend = memory();
        let source = MemorySource::new().with(
            "data/rules.json",
            r#"{"lastUpdated":"1 Ianuarie 2025","categories":[{"id":"general","icon":"📜","name":"Reguli Generale",
                "rules":[{"id":"1.1","title":"Respect","description":"d","important":true,"subRules":[]}]}]}"#,
        );
        let mut rules = ContentStore::<ServerRules>::load(backend.clone(), &source).await;
        assert_eq!(rules.last_updated(), "1 Ianuarie 2025");
        assert_eq!(rules.total_rules(), 1);

        rules.touch("2 Ianuarie 2025");
        rules.save().unwrap();
        let reloaded = ContentStore::<ServerRules>::load(backend, &MemorySource::new()).await;
        assert_eq!(reloaded.origin(), LoadOrigin::Storage);
        assert_eq!(reloaded.last_updated(), "2 Ianuarie 2025");
    }

    #[test]
    fn nested_rule_crud() {
        let category = RuleCategory {
            id: "general".into(),
            icon: "📜".into(),
            name: "General".into(),
            rules: vec![],
        };
        let mut rules = ContentStore::<ServerRules>::with_records(memory(), vec![category], RulesMeta::default());
        let rule = |id: &str, title: &str| RuleEntry {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            important: false,
            sub_rules: vec![],
        };

        assert_eq!(rules.upsert_rule("general", rule("1.1", "A")), Some(Upsert::Inserted));
        assert_eq!(rules.upsert_rule("general", rule("1.2", "B")), Some(Upsert::Inserted));
        assert_eq!(rules.upsert_rule("general", rule("1.1", "A2")), Some(Upsert::Updated));
        assert_eq!(rules.upsert_rule("missing", rule("9.9", "X")), None);

        let ids: Vec<_> = rules.records()[0].rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "1.2"]);
        assert_eq!(rules.find_rule("general", "1.1").unwrap().title, "A2");

        assert!(rules.remove_rule("general", "1.2"));
        assert!(!rules.remove_rule("general", "1.2"));
        assert_eq!(rules.total_rules(), 1);
    }

    #[test]
    fn export_uses_deployed_envelope() {
        let store = ContentStore::<Updates>::with_records(memory(), vec![update("a", "A")], ());
        let json = store.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["updates"][0]["id"], "a");
        assert!(json.contains("\n  \"updates\""));
    }
}
