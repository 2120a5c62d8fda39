//! The tracker store: single owner of the state.
//!
//! Consumers read through [`Store::state`] and mutate only through
//! [`Store::dispatch`]. A store built with [`Store::hydrate`] mirrors every
//! change to disk through the background writer.

use chrono::{DateTime, Utc};

use crate::state::{apply_at, Action, TrackerState};
use crate::storage::{Recovery, Storage};
use crate::writer::PersistenceWriter;

pub struct Store {
    state: TrackerState,
    writer: Option<PersistenceWriter>,
    recovery: Option<Recovery>,
}

impl Store {
    /// A store that never persists.
    pub fn in_memory(state: TrackerState) -> Self {
        Self {
            state,
            writer: None,
            recovery: None,
        }
    }

    /// Restore state from `storage` (or seed data) and start persisting.
    ///
    /// The store is only handed out once hydration is complete, so no
    /// caller ever observes the seed data that a restore replaces.
    pub fn hydrate(storage: Storage) -> Self {
        Self::hydrate_at(storage, Utc::now())
    }

    pub fn hydrate_at(storage: Storage, now: DateTime<Utc>) -> Self {
        let restored = storage.restore(now);
        let writable = restored.is_writable();
        let mut store = Self::in_memory(TrackerState::default());
        store.state = apply_at(
            std::mem::take(&mut store.state),
            Action::SetInitialState(restored.state),
            now,
        );
        store.recovery = restored.recovery;

        if !writable {
            tracing::warn!(path = %storage.path().display(), "state file left untouched; changes will not be saved");
            return store;
        }

        let writer = PersistenceWriter::spawn(storage);
        writer.submit(store.state.clone());
        store.writer = Some(writer);
        store
    }

    /// Set when the state file could not be loaded during hydration.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> &TrackerState {
        self.dispatch_at(action, Utc::now())
    }

    /// Dispatch with an explicit notion of "now".
    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) -> &TrackerState {
        let name = action.name();
        let next = apply_at(self.state.clone(), action, now);
        if next == self.state {
            tracing::debug!(action = name, "action left state unchanged");
            return &self.state;
        }

        self.state = next;
        tracing::debug!(action = name, tasks = self.state.tasks.len(), "state updated");
        if let Some(writer) = &self.writer {
            writer.submit(self.state.clone());
        }
        &self.state
    }

    /// Wait for all queued writes to reach storage.
    pub fn flush(&self) {
        if let Some(writer) = &self.writer {
            writer.flush();
        }
    }

    pub fn writer(&self) -> Option<&PersistenceWriter> {
        self.writer.as_ref()
    }
}
