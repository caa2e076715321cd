//! Keeps a store, its persisted copy and its rendered list in step.
//!
//! Every mutation goes store → storage → full re-render.

use crate::deletion::DeletionFlow;
use crate::error::Result;
use crate::form::rule::today_text;
use crate::form::{FormBinder, Submission};
use crate::render::{ListRenderer, ListView, ViewSink};
use crate::store::{Collection, ContentStore, ServerRules};

pub struct CollectionPanel<C: Collection> {
    store: ContentStore<C>,
    renderer: ListRenderer<C::Record>,
    deletion: DeletionFlow,
}

impl<C: Collection> CollectionPanel<C> {
    pub fn new(store: ContentStore<C>, renderer: ListRenderer<C::Record>) -> Self {
        Self {
            store,
            renderer,
            deletion: DeletionFlow::new(),
        }
    }

    pub fn store(&self) -> &ContentStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ContentStore<C> {
        &mut self.store
    }

    pub fn deletion(&self) -> &DeletionFlow {
        &self.deletion
    }

    pub fn render(&self, sink: &mut dyn ViewSink) -> ListView {
        self.renderer.render(self.store.records(), sink)
    }

    /// Routes a submitted form into the store and re-renders.
    pub fn submit<F>(&mut self, form: &F, sink: &mut dyn ViewSink) -> Result<Submission>
    where
        F: FormBinder<Target = C>,
    {
        let submission = form.submit(&mut self.store)?;
        self.render(sink);
        Ok(submission)
    }

    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.deletion.request(id.into());
    }

    pub fn cancel_delete(&mut self) {
        self.deletion.cancel();
    }

    pub fn dismiss_delete(&mut self) {
        self.deletion.dismiss();
    }

    /// Applies the pending deletion and re-renders. A stale or missing
    /// target leaves the store untouched but still yields the current list.
    pub fn confirm_delete(&mut self, sink: &mut dyn ViewSink) -> Result<Option<String>> {
        let removed = self.deletion.confirm_in(&mut self.store)?;
        self.render(sink);
        Ok(removed)
    }
}

/// Rules panel: categories as the list, plus deletion of single rules
/// inside a category.
pub struct RulesPanel {
    categories: CollectionPanel<ServerRules>,
    rule_deletion: DeletionFlow<(String, String)>,
}

impl RulesPanel {
    pub fn new(categories: CollectionPanel<ServerRules>) -> Self {
        Self {
            categories,
            rule_deletion: DeletionFlow::new(),
        }
    }

    pub fn categories(&self) -> &CollectionPanel<ServerRules> {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CollectionPanel<ServerRules> {
        &mut self.categories
    }

    pub fn rule_deletion(&self) -> &DeletionFlow<(String, String)> {
        &self.rule_deletion
    }

    pub fn request_rule_delete(&mut self, category_id: &str, rule_id: &str) {
        self.rule_deletion
            .request((category_id.to_string(), rule_id.to_string()));
    }

    pub fn cancel_rule_delete(&mut self) {
        self.rule_deletion.cancel();
    }

    /// Deletes a whole category. Removing one stamps `lastUpdated`.
    pub fn confirm_category_delete(&mut self, sink: &mut dyn ViewSink) -> Result<Option<String>> {
        let removed = self.categories.deletion.confirm_in(&mut self.categories.store)?;
        if removed.is_some() {
            let store = self.categories.store_mut();
            store.touch(today_text());
            store.save()?;
        }
        self.categories.render(sink);
        Ok(removed)
    }

    pub fn confirm_rule_delete(&mut self, sink: &mut dyn ViewSink) -> Result<bool> {
        let removed = match self.rule_deletion.confirm() {
            Some((category_id, rule_id)) => {
                let store = self.categories.store_mut();
                let removed = store.remove_rule(&category_id, &rule_id);
                if removed {
                    store.touch(today_text());
                    store.save()?;
                    tracing::info!(category = %category_id, rule = %rule_id, "Rule deleted");
                }
                removed
            }
            None => false,
        };
        self.categories.render(sink);
        Ok(removed)
    }
}
