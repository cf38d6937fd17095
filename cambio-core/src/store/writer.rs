//! Ordered writes of one checkout's session.
//!
//! Every mutation of the state machine gets a revision number. Writes may
//! reach the store out of order once countdown ticks are saved off the
//! machine lock, so the writer drops any revision older than the last one
//! written, and everything after the record was cleared.

use std::sync::{Arc, Mutex};

use super::{SessionStore, SessionStoreError};
use crate::entities::session::CheckoutSession;

#[derive(Default)]
struct WriteState {
    written: u64,
    cleared: bool,
}

#[derive(Clone)]
pub struct SessionWriter {
    store: Arc<dyn SessionStore>,
    state: Arc<Mutex<WriteState>>,
}

impl SessionWriter {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(WriteState::default())),
        }
    }

    /// Write `session` as `revision`. Returns whether the record was
    /// written; stale revisions and writes after [`Self::clear`] are
    /// skipped.
    pub fn save(
        &self,
        revision: u64,
        session: &CheckoutSession,
    ) -> Result<bool, SessionStoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.cleared || revision < state.written {
            return Ok(false);
        }
        self.store.save(session)?;
        state.written = revision;
        Ok(true)
    }

    /// Forget the record for good. Later saves are skipped.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.cleared = true;
        self.store.clear()
    }
}

/// A session snapshot taken under the machine lock, written after it is
/// released.
pub struct PendingSave {
    writer: SessionWriter,
    revision: u64,
    session: CheckoutSession,
}

impl PendingSave {
    pub(crate) fn new(writer: SessionWriter, revision: u64, session: CheckoutSession) -> Self {
        Self {
            writer,
            revision,
            session,
        }
    }

    /// Blocking; run it off the async workers.
    pub fn write(self) -> Result<bool, SessionStoreError> {
        self.writer.save(self.revision, &self.session)
    }
}
