//! Refresh scheduling: a one-second countdown drives cycle starts, with a
//! manual-trigger path from the control surface.
//!
//! At most one cycle is ever in flight. A manual trigger while a cycle
//! runs is dropped, not queued. The countdown is reset from the watch
//! settings when a cycle starts and keeps decrementing (clamped at zero)
//! while the cycle runs; a cycle that outlives the interval is followed
//! immediately by the next one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::tasks::{execute_cycle, CycleContext, CycleOutcome};
use crate::watch::WatchStore;

/// Scheduler state shared with the control surface.
pub struct SchedulerState {
    in_progress: AtomicBool,
    countdown_remaining: AtomicU64,
}

/// Cloneable control-surface view of the scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    trigger_tx: mpsc::UnboundedSender<()>,
    state: Arc<SchedulerState>,
}

impl SchedulerHandle {
    /// Request an immediate refresh. Returns whether the scheduler was
    /// idle when the request was made; a trigger landing on a running
    /// cycle is dropped by the scheduler either way.
    pub fn trigger_now(&self) -> bool {
        let idle = !self.state.in_progress.load(Ordering::SeqCst);
        let _ = self.trigger_tx.send(());
        idle
    }

    pub fn is_running(&self) -> bool {
        self.state.in_progress.load(Ordering::SeqCst)
    }

    pub fn countdown_remaining(&self) -> u64 {
        self.state.countdown_remaining.load(Ordering::SeqCst)
    }
}

/// Background scheduler service that owns the refresh loop
pub struct SchedulerService {
    watch_store: Arc<WatchStore>,
    ctx: Arc<CycleContext>,
    state: Arc<SchedulerState>,
    trigger_rx: mpsc::UnboundedReceiver<()>,
}

impl SchedulerService {
    pub fn new(watch_store: Arc<WatchStore>, ctx: Arc<CycleContext>) -> (Self, SchedulerHandle) {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let state = Arc::new(SchedulerState {
            in_progress: AtomicBool::new(false),
            countdown_remaining: AtomicU64::new(watch_store.refresh_interval_secs()),
        });

        let handle = SchedulerHandle {
            trigger_tx,
            state: Arc::clone(&state),
        };

        (
            Self {
                watch_store,
                ctx,
                state,
                trigger_rx,
            },
            handle,
        )
    }

    /// Run the scheduler loop until the shutdown signal flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduler started: refresh every {}s",
            self.watch_store.refresh_interval_secs()
        );

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<CycleOutcome>();

        let mut tick = tokio::time::interval(Duration::from_secs(1));
        // The first tick fires immediately
        tick.tick().await;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_ok() && *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                _ = tick.tick() => {
                    let remaining = self
                        .state
                        .countdown_remaining
                        .load(Ordering::SeqCst)
                        .saturating_sub(1);
                    self.state.countdown_remaining.store(remaining, Ordering::SeqCst);

                    if remaining == 0 && !self.state.in_progress.load(Ordering::SeqCst) {
                        self.start_cycle(&done_tx);
                    }
                }

                Some(()) = self.trigger_rx.recv() => {
                    if self.state.in_progress.load(Ordering::SeqCst) {
                        debug!("Manual refresh ignored: a cycle is already in progress");
                    } else {
                        info!("Manual refresh triggered");
                        self.start_cycle(&done_tx);
                    }
                }

                Some(outcome) = done_rx.recv() => {
                    self.state.in_progress.store(false, Ordering::SeqCst);
                    info!(
                        keywords = outcome.keywords,
                        delivered = outcome.delivered,
                        "Refresh cycle completed"
                    );

                    if self.state.countdown_remaining.load(Ordering::SeqCst) == 0 {
                        debug!("Cycle outlived the refresh interval, starting the next one");
                        self.start_cycle(&done_tx);
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// Snapshot the watch settings, reset the countdown, and run a cycle
    /// as a background task that reports completion through `done_tx`.
    fn start_cycle(&self, done_tx: &mpsc::UnboundedSender<CycleOutcome>) {
        let snapshot = self.watch_store.snapshot();
        self.state.in_progress.store(true, Ordering::SeqCst);
        self.state
            .countdown_remaining
            .store(snapshot.refresh_interval_secs, Ordering::SeqCst);

        info!(keywords = ?snapshot.keywords, "Starting refresh cycle");

        let ctx = Arc::clone(&self.ctx);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let outcome = execute_cycle(snapshot, ctx).await;
            let _ = done_tx.send(outcome);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiProvider, Summarizer};
    use crate::config::WatchDefaults;
    use crate::dedup::DeliveryLog;
    use crate::notify::Notifier;
    use crate::source::{Article, ArticleSource};
    use crate::Result;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Semaphore;
    use url::Url;

    /// Source that counts fetches and can be gated on a semaphore so a
    /// cycle stays in flight until the test releases it.
    struct GatedSource {
        fetch_calls: AtomicUsize,
        gate: Option<Semaphore>,
    }

    impl GatedSource {
        fn free() -> Self {
            Self {
                fetch_calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated() -> Self {
            Self {
                fetch_calls: AtomicUsize::new(0),
                gate: Some(Semaphore::new(0)),
            }
        }

        fn release(&self, n: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(n);
            }
        }

        fn fetches(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ArticleSource for GatedSource {
        async fn fetch_candidates(&self) -> Result<Vec<Article>> {
            if let Some(gate) = &self.gate {
                let permit = gate.acquire().await.expect("gate closed");
                permit.forget();
            }
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn extract_full_text(&self, _link: &Url) -> Result<String> {
            Ok(String::new())
        }
    }

    struct NullProvider;

    #[async_trait::async_trait]
    impl AiProvider for NullProvider {
        async fn summarize(&self, _content: &str, _prompt: &str) -> Result<String> {
            Ok("summary".to_string())
        }
    }

    struct NullNotifier;

    #[async_trait::async_trait]
    impl Notifier for NullNotifier {
        async fn send(&self, _channel_id: &str, _message: &str) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        source: Arc<GatedSource>,
        watch_store: Arc<WatchStore>,
        handle: SchedulerHandle,
        shutdown_tx: watch::Sender<bool>,
    }

    fn start(source: GatedSource, keywords: &[&str], interval_secs: u64) -> Fixture {
        let source = Arc::new(source);
        let watch_store = Arc::new(WatchStore::new(WatchDefaults {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            prompt: "Summarize this.".to_string(),
            refresh_interval_secs: interval_secs,
        }));
        let ctx = Arc::new(CycleContext {
            channel_id: "chan-1".to_string(),
            source: Arc::clone(&source) as Arc<dyn ArticleSource>,
            summarizer: Arc::new(Summarizer::with_provider(Arc::new(NullProvider))),
            delivery_log: Arc::new(DeliveryLog::new()),
            notifier: Arc::new(NullNotifier),
        });

        let (service, handle) = SchedulerService::new(Arc::clone(&watch_store), ctx);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(service.run(shutdown_rx));

        Fixture {
            source,
            watch_store,
            handle,
            shutdown_tx,
        }
    }

    /// Let spawned tasks make progress without advancing the clock.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ticks(n: u64) {
        for _ in 0..n {
            tokio::time::advance(Duration::from_secs(1)).await;
            settle().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_begins_after_exactly_interval_ticks() {
        let fixture = start(GatedSource::free(), &["stocks"], 5);
        settle().await;

        advance_ticks(4).await;
        assert_eq!(fixture.source.fetches(), 0);
        assert_eq!(fixture.handle.countdown_remaining(), 1);

        advance_ticks(1).await;
        assert_eq!(fixture.source.fetches(), 1);

        // The countdown restarted from the interval at cycle start.
        assert_eq!(fixture.handle.countdown_remaining(), 5);
        assert!(!fixture.handle.is_running());

        let _ = fixture.shutdown_tx.send(true);
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_during_running_cycle_is_dropped() {
        let fixture = start(GatedSource::gated(), &["stocks"], 300);
        settle().await;

        assert!(fixture.handle.trigger_now());
        settle().await;
        assert!(fixture.handle.is_running());

        // Second trigger lands on a running cycle: reported and dropped.
        assert!(!fixture.handle.trigger_now());
        settle().await;

        fixture.source.release(8);
        settle().await;

        assert!(!fixture.handle.is_running());
        assert_eq!(fixture.source.fetches(), 1);

        let _ = fixture.shutdown_tx.send(true);
    }

    #[tokio::test(start_paused = true)]
    async fn running_cycle_keeps_its_keyword_snapshot() {
        let fixture = start(GatedSource::gated(), &["a", "b"], 300);
        settle().await;

        assert!(fixture.handle.trigger_now());
        settle().await;
        assert!(fixture.handle.is_running());

        // Edit lands mid-cycle; the in-flight cycle still runs both
        // pipelines from its snapshot.
        fixture.watch_store.set_keywords(vec!["c".into()]).unwrap();

        fixture.source.release(2);
        settle().await;
        assert!(!fixture.handle.is_running());
        assert_eq!(fixture.source.fetches(), 2);

        // The next cycle picks up the new single-keyword set.
        assert!(fixture.handle.trigger_now());
        settle().await;
        fixture.source.release(1);
        settle().await;
        assert_eq!(fixture.source.fetches(), 3);

        let _ = fixture.shutdown_tx.send(true);
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_cycle_refires_immediately_on_completion() {
        let fixture = start(GatedSource::gated(), &["stocks"], 2);
        settle().await;

        // Countdown expires and the (gated) cycle starts.
        advance_ticks(2).await;
        assert!(fixture.handle.is_running());

        // The cycle outlives its interval; the countdown clamps at zero.
        advance_ticks(3).await;
        assert_eq!(fixture.handle.countdown_remaining(), 0);
        assert_eq!(fixture.source.fetches(), 0);

        // Completion of the overrun cycle fires the next one at once.
        fixture.source.release(1);
        settle().await;
        assert_eq!(fixture.source.fetches(), 1);
        assert!(fixture.handle.is_running());

        fixture.source.release(1);
        settle().await;
        assert_eq!(fixture.source.fetches(), 2);
        assert!(!fixture.handle.is_running());

        let _ = fixture.shutdown_tx.send(true);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_edit_applies_at_next_cycle_start() {
        let fixture = start(GatedSource::free(), &["stocks"], 5);
        settle().await;

        fixture.watch_store.set_refresh_interval(2).unwrap();

        // The countdown already in flight still runs at the old cadence.
        advance_ticks(5).await;
        assert_eq!(fixture.source.fetches(), 1);

        // From the next reset on, the new interval holds.
        assert_eq!(fixture.handle.countdown_remaining(), 2);
        advance_ticks(2).await;
        assert_eq!(fixture.source.fetches(), 2);

        let _ = fixture.shutdown_tx.send(true);
    }
}
