//! Refresh scheduling and the published-snapshot slot.
//!
//! The scheduler is the single writer of the slot; any number of consumers
//! read the latest snapshot without ever blocking the fetch loop. The whole
//! `Arc` is replaced on publish, so a reader mid-update always sees either
//! the old snapshot or the new one, never a torn mix.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::ForecastSnapshot;
use crate::error::PollError;
use crate::feed::{parser, FeedFetcher, FetchOutcome};

/// How the process interacts with the feed, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fetch once, publish once, stop; the outcome surfaces to the caller.
    OneShot,
    /// Poll on a fixed interval until cancelled; failures never end the loop.
    Continuous,
}

/// The single shared mutable resource between scheduler and consumers.
#[derive(Clone, Default)]
pub struct SnapshotSlot {
    inner: Arc<RwLock<Option<Arc<ForecastSnapshot>>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the published snapshot.
    async fn publish(&self, snapshot: ForecastSnapshot) -> Arc<ForecastSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.inner.write().await = Some(snapshot.clone());
        snapshot
    }

    /// The most recently published snapshot, if any poll has succeeded yet.
    pub async fn latest(&self) -> Option<Arc<ForecastSnapshot>> {
        self.inner.read().await.clone()
    }
}

/// Result of one successful poll attempt.
#[derive(Debug)]
pub enum PollOutcome {
    Published(Arc<ForecastSnapshot>),
    Unchanged,
}

pub struct RefreshScheduler {
    fetcher: FeedFetcher,
    station: String,
    slot: SnapshotSlot,
    poll_interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        fetcher: FeedFetcher,
        station: String,
        slot: SnapshotSlot,
        poll_interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            station,
            slot,
            poll_interval,
        }
    }

    /// One fetch/parse/publish attempt. An unchanged feed skips the parse
    /// entirely.
    pub async fn poll_once(&mut self) -> Result<PollOutcome, PollError> {
        match self.fetcher.fetch().await? {
            FetchOutcome::Unchanged => Ok(PollOutcome::Unchanged),
            FetchOutcome::New(document) => {
                let snapshot = parser::parse(
                    &document.kml,
                    &self.station,
                    Utc::now(),
                    document.fingerprint,
                )?;
                info!(
                    station = %self.station,
                    observations = snapshot.len(),
                    fetched_at = %snapshot.fetched_at(),
                    fingerprint = %snapshot.fingerprint(),
                    "publishing new forecast snapshot"
                );
                let published = self.slot.publish(snapshot).await;
                Ok(PollOutcome::Published(published))
            }
        }
    }

    /// Continuous mode: poll on the fixed interval until the token fires.
    ///
    /// Cancellation is only honoured at tick boundaries, never mid-fetch, so
    /// a snapshot is always published whole or not at all. Fetch and parse
    /// failures are logged and the loop simply waits for the next tick.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("refresh loop stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            match self.poll_once().await {
                Ok(PollOutcome::Published(snapshot)) => {
                    debug!(observations = snapshot.len(), "snapshot replaced");
                }
                Ok(PollOutcome::Unchanged) => {
                    debug!("feed unchanged, nothing to do this tick");
                }
                Err(error) => {
                    warn!(%error, "poll failed; retrying on next tick");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml:kml xmlns:dwd="https://opendata.dwd.de/weather/lib/pointforecast_dwd_extension_V1_0.xsd" xmlns:kml="http://www.opengis.net/kml/2.2">
  <kml:Document>
    <kml:ExtendedData>
      <dwd:ProductDefinition>
        <dwd:ForecastTimeSteps>
          <dwd:TimeStep>2024-06-01T10:00:00.000Z</dwd:TimeStep>
          <dwd:TimeStep>2024-06-01T11:00:00.000Z</dwd:TimeStep>
        </dwd:ForecastTimeSteps>
      </dwd:ProductDefinition>
    </kml:ExtendedData>
    <kml:Placemark>
      <kml:name>P755</kml:name>
      <kml:ExtendedData>
        <dwd:Forecast dwd:elementName="Rad1h"><dwd:value>100.0 200.0</dwd:value></dwd:Forecast>
        <dwd:Forecast dwd:elementName="TTT"><dwd:value>288.15 289.15</dwd:value></dwd:Forecast>
        <dwd:Forecast dwd:elementName="PPPP"><dwd:value>101300 101200</dwd:value></dwd:Forecast>
        <dwd:Forecast dwd:elementName="FF"><dwd:value>2.0 3.0</dwd:value></dwd:Forecast>
      </kml:ExtendedData>
    </kml:Placemark>
  </kml:Document>
</kml:kml>"#;

    fn scheduler(url: String, slot: SnapshotSlot, interval_ms: u64) -> RefreshScheduler {
        RefreshScheduler::new(
            FeedFetcher::new(url).unwrap(),
            "P755".to_string(),
            slot,
            Duration::from_millis(interval_ms),
        )
    }

    #[tokio::test]
    async fn one_shot_publishes_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(KML, "application/xml"))
            .expect(1)
            .mount(&server)
            .await;

        let slot = SnapshotSlot::new();
        let mut scheduler = scheduler(server.uri(), slot.clone(), 1000);

        let outcome = scheduler.poll_once().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Published(_)));
        assert_eq!(slot.latest().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn one_shot_surfaces_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let slot = SnapshotSlot::new();
        let mut scheduler = scheduler(server.uri(), slot.clone(), 1000);

        assert!(matches!(
            scheduler.poll_once().await,
            Err(PollError::Fetch(_))
        ));
        assert!(slot.latest().await.is_none());
    }

    #[tokio::test]
    async fn unchanged_content_skips_parse_and_publish() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(KML, "application/xml"))
            .mount(&server)
            .await;

        let slot = SnapshotSlot::new();
        let mut scheduler = scheduler(server.uri(), slot.clone(), 1000);

        let first = scheduler.poll_once().await.unwrap();
        let PollOutcome::Published(snapshot) = first else {
            panic!("first poll must publish");
        };

        let second = scheduler.poll_once().await.unwrap();
        assert!(matches!(second, PollOutcome::Unchanged));

        // Slot still holds the snapshot from the first poll.
        let latest = slot.latest().await.unwrap();
        assert_eq!(latest.fingerprint(), snapshot.fingerprint());
    }

    // Real clock: a paused clock auto-advances past the deadline while the
    // loop is blocked on real wiremock I/O, making the test flaky.
    #[tokio::test]
    async fn continuous_loop_survives_repeated_failures_then_publishes() {
        let server = MockServer::start().await;
        // Three failing polls, then the feed comes back.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(KML, "application/xml"))
            .mount(&server)
            .await;

        let slot = SnapshotSlot::new();
        let scheduler = scheduler(server.uri(), slot.clone(), 20);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(scheduler.run(cancel.clone()));

        // Give the loop time for the failing ticks plus the recovery tick.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if slot.latest().await.is_some() {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "loop never recovered after failures"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(slot.latest().await.unwrap().len(), 2);
    }

    // Real clock here: a paused clock auto-advances past the timeout while
    // the loop is blocked on real wiremock I/O, making the test flaky.
    #[tokio::test]
    async fn cancellation_stops_the_loop_at_the_tick_boundary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(KML, "application/xml"))
            .mount(&server)
            .await;

        let slot = SnapshotSlot::new();
        let scheduler = scheduler(server.uri(), slot.clone(), 10);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(scheduler.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        // The loop must wind down promptly once the token fires.
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop did not stop after cancellation")
            .unwrap();
    }
}
