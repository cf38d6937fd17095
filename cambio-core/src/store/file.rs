use std::path::{Path, PathBuf};

use super::{SESSION_KEY, SessionStore, SessionStoreError};
use crate::entities::session::CheckoutSession;

/// Stores the session as a JSON file named after [`SESSION_KEY`].
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Keep the record inside `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &CheckoutSession) -> Result<(), SessionStoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<CheckoutSession>, SessionStoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::session::{Step, TradeRequest};
    use cambio_sdk::objects::{Currency, TradeDirection};
    use time::macros::datetime;

    fn session() -> CheckoutSession {
        let mut session = CheckoutSession::new(
            TradeRequest {
                direction: TradeDirection::Sell,
                currency: Currency::Eur,
                amount: "120".to_string(),
                displayed_total: None,
            },
            900,
            datetime!(2026-03-01 12:00 UTC),
        );
        session.step = Step::Terms;
        session.form.iban = "AO06000000000000000000000".to_string();
        session
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("state"));
        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        assert!(store.path().ends_with("checkout-session.json"));
        assert_eq!(store.load().unwrap(), Some(session()));

        let mut later = session();
        later.seconds_remaining = 10;
        store.save(&later).unwrap();
        assert_eq!(store.load().unwrap(), Some(later));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(matches!(store.load(), Err(SessionStoreError::Codec(_))));
    }
}
