//! Durable local persistence of the in-progress checkout.
//!
//! At most one session is stored, under [`SESSION_KEY`]. Writers overwrite
//! unconditionally; the 24-hour freshness window is enforced by readers
//! (see [`recovery`]).

mod file;
mod memory;
pub mod recovery;
mod writer;

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
pub use recovery::{Recovery, load_fresh};
pub use writer::{PendingSave, SessionWriter};

use crate::entities::session::CheckoutSession;

/// Name of the single persisted checkout record.
pub const SESSION_KEY: &str = "checkout-session";

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Key-value persistence of one [`CheckoutSession`].
pub trait SessionStore: Send + Sync {
    /// Store `session`, replacing any previous record.
    fn save(&self, session: &CheckoutSession) -> Result<(), SessionStoreError>;

    /// The stored session, if any. No freshness check is applied.
    fn load(&self) -> Result<Option<CheckoutSession>, SessionStoreError>;

    /// Remove the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionStoreError>;
}
