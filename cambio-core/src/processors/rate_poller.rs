//! RatePoller processor.
//!
//! Fetches quotes from the [`RateProvider`] and publishes them on the
//! [`RateBoard`]. A failed fetch keeps the previous snapshot in place; the
//! board alerts raised against it clear on the next good refresh.

use kanau::processor::Processor;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::RatesConfig;
use crate::entities::rate::RateSnapshot;
use crate::ports::{ExternalError, RateProvider};
use crate::rates::RateBoard;

/// Request a single refresh of the rate board.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshRates;

pub struct RatePoller {
    provider: Arc<dyn RateProvider>,
    board: RateBoard,
    clock: Arc<dyn Clock>,
    config: RatesConfig,
}

impl RatePoller {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        board: RateBoard,
        clock: Arc<dyn Clock>,
        config: RatesConfig,
    ) -> Self {
        Self {
            provider,
            board,
            clock,
            config,
        }
    }

    /// Refresh immediately, then on every interval until shutdown.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_secs = self.config.refresh_interval.as_secs(),
            "RatePoller started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("RatePoller received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.process(RefreshRates).await {
                        warn!(error = %e, "Rate refresh failed, keeping previous snapshot");
                    }
                }
            }
        }

        info!("RatePoller shutdown complete");
    }
}

impl Processor<RefreshRates> for RatePoller {
    type Output = Arc<RateSnapshot>;
    type Error = ExternalError;

    #[tracing::instrument(skip_all, err, name = "RatePoller:Refresh")]
    async fn process(&self, _: RefreshRates) -> Result<Arc<RateSnapshot>, ExternalError> {
        let quotes = self.provider.get_rates().await?;
        debug!(quotes = quotes.len(), "Fetched rate quotes");
        self.board
            .publish(RateSnapshot::new(quotes, self.clock.now()));
        let alerts = self.board.alerts();
        if !alerts.is_empty() {
            warn!(?alerts, "Published snapshot lacks valid quotes");
        }
        Ok(self.board.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entities::rate::fixtures::usd_quote;
    use async_trait::async_trait;
    use cambio_sdk::objects::{Currency, RateQuote};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::time::Duration;
    use time::macros::datetime;

    /// Replays scripted responses, repeating the last one.
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<Vec<RateQuote>, ExternalError>>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<Result<Vec<RateQuote>, ExternalError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl RateProvider for ScriptedProvider {
        async fn get_rates(&self) -> Result<Vec<RateQuote>, ExternalError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop().unwrap()
            } else {
                responses.last().cloned().unwrap()
            }
        }
    }

    fn poller(provider: ScriptedProvider, board: RateBoard) -> RatePoller {
        RatePoller::new(
            Arc::new(provider),
            board,
            Arc::new(ManualClock::new(datetime!(2026-03-01 12:00 UTC))),
            RatesConfig {
                refresh_interval: Duration::from_secs(60),
            },
        )
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let board = RateBoard::default();
        let poller = poller(
            ScriptedProvider::new(vec![
                Ok(vec![usd_quote(dec!(930), dec!(950))]),
                Err(ExternalError::new("rate service unavailable")),
            ]),
            board.clone(),
        );

        let snapshot = poller.process(RefreshRates).await.unwrap();
        assert_eq!(snapshot.fetched_at(), datetime!(2026-03-01 12:00 UTC));
        assert!(board.alert_for(Currency::Usd).is_none());

        assert!(poller.process(RefreshRates).await.is_err());
        assert!(board.alert_for(Currency::Usd).is_none());
        assert_eq!(board.current().quotes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_until_shutdown() {
        let board = RateBoard::default();
        let poller = poller(
            ScriptedProvider::new(vec![
                Ok(vec![usd_quote(dec!(960), dec!(950))]),
                Ok(vec![usd_quote(dec!(930), dec!(950))]),
            ]),
            board.clone(),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(poller.run(rx));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(board.alert_for(Currency::Usd).is_some());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(board.alert_for(Currency::Usd).is_none());

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
