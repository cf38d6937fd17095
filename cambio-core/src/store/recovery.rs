//! Reload recovery of a persisted checkout.
//!
//! On startup the engine looks for a stored session. Stale or unreadable
//! records are purged. A fresh record is offered to the user (resume or
//! discard) unless it was left at the payment step, in which case the
//! checkout reopens on its own.

use tracing::{info, warn};

use super::{SessionStore, SessionStoreError};
use crate::clock::Clock;
use crate::entities::session::{CheckoutSession, Step};

/// What the host should do with a persisted session at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing stored, or the stored session was discarded.
    Nothing,
    /// Ask the user whether to resume or discard.
    Offer(CheckoutSession),
    /// Payment was pending: reopen checkout without asking.
    AutoResume(CheckoutSession),
}

impl Recovery {
    /// Inspect `store` and decide how to surface what it holds.
    pub fn inspect(
        store: &dyn SessionStore,
        clock: &dyn Clock,
        ttl: time::Duration,
    ) -> Result<Self, SessionStoreError> {
        let Some(session) = load_fresh(store, clock.now(), ttl)? else {
            return Ok(Recovery::Nothing);
        };
        if session.step == Step::Payment {
            info!(
                seconds_remaining = session.seconds_remaining,
                "Reopening checkout left at the payment step"
            );
            Ok(Recovery::AutoResume(session))
        } else {
            info!(step = %session.step, "Offering recovery of a previous checkout");
            Ok(Recovery::Offer(session))
        }
    }

    /// The user declined the offer: forget the stored session.
    pub fn dismiss(store: &dyn SessionStore) -> Result<(), SessionStoreError> {
        info!("Recovery dismissed, clearing stored checkout");
        store.clear()
    }

    pub fn session(&self) -> Option<&CheckoutSession> {
        match self {
            Recovery::Nothing => None,
            Recovery::Offer(session) | Recovery::AutoResume(session) => Some(session),
        }
    }
}

/// Load the stored session if it is younger than `ttl` at `now`.
///
/// Older sessions and records that no longer decode are removed from the
/// store and reported as absent.
pub fn load_fresh(
    store: &dyn SessionStore,
    now: time::OffsetDateTime,
    ttl: time::Duration,
) -> Result<Option<CheckoutSession>, SessionStoreError> {
    match store.load() {
        Ok(Some(session)) if session.is_fresh(now, ttl) => Ok(Some(session)),
        Ok(Some(session)) => {
            info!(created_at = %session.created_at, "Discarding stale checkout session");
            store.clear()?;
            Ok(None)
        }
        Ok(None) => Ok(None),
        Err(SessionStoreError::Codec(e)) => {
            warn!(error = %e, "Discarding unreadable checkout session");
            store.clear()?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entities::session::TradeRequest;
    use crate::store::InMemorySessionStore;
    use cambio_sdk::objects::{Currency, TradeDirection};
    use time::macros::datetime;

    const TTL: time::Duration = time::Duration::hours(24);

    fn session_at(step: Step) -> CheckoutSession {
        let mut session = CheckoutSession::new(
            TradeRequest {
                direction: TradeDirection::Buy,
                currency: Currency::Usd,
                amount: "500".to_string(),
                displayed_total: None,
            },
            900,
            datetime!(2026-03-01 12:00 UTC),
        );
        session.step = step;
        session
    }

    #[test]
    fn test_round_trip_within_window() {
        let store = InMemorySessionStore::new();
        store.save(&session_at(Step::Terms)).unwrap();
        let loaded = load_fresh(&store, datetime!(2026-03-02 11:00 UTC), TTL).unwrap();
        assert_eq!(loaded, Some(session_at(Step::Terms)));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_stale_session_is_purged() {
        let store = InMemorySessionStore::new();
        store.save(&session_at(Step::Terms)).unwrap();
        let loaded = load_fresh(&store, datetime!(2026-03-02 12:00:01 UTC), TTL).unwrap();
        assert_eq!(loaded, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_offer_versus_auto_resume() {
        let clock = ManualClock::new(datetime!(2026-03-01 12:30 UTC));
        let store = InMemorySessionStore::new();
        assert_eq!(Recovery::inspect(&store, &clock, TTL).unwrap(), Recovery::Nothing);

        store.save(&session_at(Step::Data)).unwrap();
        assert!(matches!(
            Recovery::inspect(&store, &clock, TTL).unwrap(),
            Recovery::Offer(_)
        ));

        store.save(&session_at(Step::Payment)).unwrap();
        let recovery = Recovery::inspect(&store, &clock, TTL).unwrap();
        assert!(matches!(recovery, Recovery::AutoResume(_)));
        assert_eq!(recovery.session().map(|s| s.step), Some(Step::Payment));

        Recovery::dismiss(&store).unwrap();
        assert!(store.is_empty());
    }
}
