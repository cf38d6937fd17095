use std::sync::{Arc, Mutex};

use super::{SessionStore, SessionStoreError};
use crate::entities::session::CheckoutSession;

/// Session store kept in process memory.
///
/// The record is held in serialized form so that it goes through the same
/// encoding as the file store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    record: Arc<Mutex<Option<String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.record
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, session: &CheckoutSession) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(session)?;
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Option<CheckoutSession>, SessionStoreError> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        match record.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
