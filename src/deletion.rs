//! Confirmation-gated deletion.
//!
//! Idle → Pending (delete intent) → Idle (confirm, cancel or backdrop). At most
//! one target is pending; a second intent replaces the first.

use crate::error::Result;
use crate::store::{Collection, ContentStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeletionState<T> {
    Idle,
    Pending(T),
}

#[derive(Clone, Debug)]
pub struct DeletionFlow<T = String> {
    state: DeletionState<T>,
}

impl<T> Default for DeletionFlow<T> {
    fn default() -> Self {
        Self {
            state: DeletionState::Idle,
        }
    }
}

impl<T: std::fmt::Debug> DeletionFlow<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeletionState<T> {
        &self.state
    }

    pub fn pending(&self) -> Option<&T> {
        match &self.state {
            DeletionState::Pending(target) => Some(target),
            DeletionState::Idle => None,
        }
    }

    /// Whether the confirmation modal is showing.
    pub fn is_confirming(&self) -> bool {
        self.pending().is_some()
    }

    /// Marks `target` for deletion and opens the confirmation.
    pub fn request(&mut self, target: T) {
        if let DeletionState::Pending(previous) = &self.state {
            tracing::debug!(?previous, "Replacing pending deletion");
        }
        self.state = DeletionState::Pending(target);
    }

    /// Closes the confirmation without touching anything.
    pub fn cancel(&mut self) {
        self.state = DeletionState::Idle;
    }

    /// Backdrop click. Same as cancel.
    pub fn dismiss(&mut self) {
        self.cancel();
    }

    /// Closes the confirmation and hands back the target to delete, if any.
    pub fn confirm(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DeletionState::Idle) {
            DeletionState::Pending(target) => Some(target),
            DeletionState::Idle => None,
        }
    }
}

impl DeletionFlow<String> {
    /// Confirms and removes the pending record from `store`, saving when
    /// something was removed. Returns the removed id.
    pub fn confirm_in<C: Collection>(&mut self, store: &mut ContentStore<C>) -> Result<Option<String>> {
        let Some(id) = self.confirm() else {
            return Ok(None);
        };
        if !store.remove(&id) {
            tracing::debug!(collection = C::NAME, id = %id, "Nothing to delete");
            return Ok(None);
        }
        store.save()?;
        tracing::info!(collection = C::NAME, id = %id, "Record deleted");
        Ok(Some(id))
    }
}
