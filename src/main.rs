use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pvcast::config::Config;
use pvcast::domain::{Fingerprint, SystemDescription};
use pvcast::feed::FeedFetcher;
use pvcast::model::PowerModel;
use pvcast::scheduler::{PollOutcome, RefreshScheduler, RunMode, SnapshotSlot};
use pvcast::sink::console::ConsoleSink;
use pvcast::sink::csv::CsvSink;
use pvcast::sink::SinkDispatcher;
use pvcast::telemetry::init_tracing;
use pvcast::{sim, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load()?;
    let system = cfg.system_description()?;
    let model = pvcast::model::resolve(&system)?;

    let dispatcher = build_sinks(&cfg).await?;
    if dispatcher.is_empty() {
        warn!("no output sinks configured; simulated records will be discarded");
    }

    let fetcher = FeedFetcher::new(cfg.station.url.clone())?;
    let slot = SnapshotSlot::new();
    let scheduler = RefreshScheduler::new(
        fetcher,
        cfg.station.id.clone(),
        slot.clone(),
        cfg.poll_interval(),
    );

    info!(
        station = %cfg.station.id,
        mode = ?cfg.run_mode(),
        "starting pvcast"
    );

    match cfg.run_mode() {
        RunMode::OneShot => run_one_shot(scheduler, system, model, dispatcher).await,
        RunMode::Continuous => {
            run_continuous(scheduler, slot, cfg.poll_interval(), system, model, dispatcher).await
        }
    }
}

async fn build_sinks(cfg: &Config) -> Result<SinkDispatcher> {
    let mut dispatcher = SinkDispatcher::new();

    if cfg.output.print {
        dispatcher.register(Box::new(ConsoleSink));
    }
    if let Some(path) = &cfg.output.csv_file {
        dispatcher.register(Box::new(CsvSink::new(path)));
    }

    #[cfg(feature = "db")]
    if let Some(db) = &cfg.output.db {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&db.url())
            .await?;
        let sink = pvcast::sink::db::DbSink::new(pool, &db.table)?;
        sink.ensure_table().await?;
        dispatcher.register(Box::new(sink));
    }

    #[cfg(not(feature = "db"))]
    if cfg.output.db.is_some() {
        warn!("database output configured but this build lacks the \"db\" feature");
    }

    Ok(dispatcher)
}

async fn run_one_shot(
    mut scheduler: RefreshScheduler,
    system: SystemDescription,
    model: Box<dyn PowerModel>,
    mut dispatcher: SinkDispatcher,
) -> Result<()> {
    match scheduler.poll_once().await? {
        PollOutcome::Published(snapshot) => {
            let records = sim::simulate(&snapshot, &system, model.as_ref());
            dispatcher.dispatch(&records).await;
        }
        PollOutcome::Unchanged => {
            info!("feed unchanged; nothing to simulate");
        }
    }
    Ok(())
}

async fn run_continuous(
    scheduler: RefreshScheduler,
    slot: SnapshotSlot,
    poll_interval: Duration,
    system: SystemDescription,
    model: Box<dyn PowerModel>,
    dispatcher: SinkDispatcher,
) -> Result<()> {
    let cancel = CancellationToken::new();

    let poller = tokio::spawn(scheduler.run(cancel.clone()));
    let consumer = tokio::spawn(consume_loop(
        slot,
        poll_interval,
        system,
        model,
        dispatcher,
        cancel.clone(),
    ));

    telemetry::shutdown_signal().await;
    cancel.cancel();

    poller.await?;
    consumer.await?;
    info!("shutdown complete");
    Ok(())
}

/// Watches the snapshot slot and runs the simulation whenever the published
/// fingerprint changes.
async fn consume_loop(
    slot: SnapshotSlot,
    poll_interval: Duration,
    system: SystemDescription,
    model: Box<dyn PowerModel>,
    mut dispatcher: SinkDispatcher,
    cancel: CancellationToken,
) {
    // Checking the slot is cheap, so look more often than the feed is polled
    // to keep publish-to-output latency low.
    let check = poll_interval.min(Duration::from_secs(10)).max(Duration::from_millis(100));
    let mut ticker = tokio::time::interval(check);
    let mut last_seen: Option<Fingerprint> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(snapshot) = slot.latest().await else {
            continue;
        };
        if last_seen.as_ref() == Some(snapshot.fingerprint()) {
            continue;
        }

        let records = sim::simulate(&snapshot, &system, model.as_ref());
        let written = dispatcher.dispatch(&records).await;
        debug!(records = records.len(), sinks = written, "records dispatched");
        last_seen = Some(snapshot.fingerprint().clone());
    }
}
