//! The refresh engine - fetch, estimate, schedule, repeat.

use std::future::Future;
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use levelup_progress::{DateFormatter, DEFAULT_THRESHOLD};
use levelup_storage::{ItemSource, StorageError};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::summary::EstimateSummary;
use crate::{Clock, EstimationContext, RecomputeScheduler, SchedulerState, SystemClock};

/// Debug output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Emit the debug dump after non-scheduled refreshes
    pub enabled: bool,
    /// Include the per-item table under each class header
    pub detailed: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            detailed: true,
        }
    }
}

/// Configuration for the refresh engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of dependent items that must reach the milestone
    pub threshold: f64,
    /// Debug output
    pub debug: DebugConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            debug: DebugConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the milestone threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable the debug dump.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug.enabled = enabled;
        self
    }

    /// Include or drop the per-item debug table.
    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.debug.detailed = detailed;
        self
    }
}

/// Why a refresh ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// First refresh of a run
    Startup,
    /// The recompute timer fired
    Scheduled,
    /// Someone called [`RefreshHandle::trigger`]
    UserRequested,
}

/// Errors that end a refresh.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The item source failed
    #[error("fetch failed: {0}")]
    Storage(#[from] StorageError),
}

/// On-demand refresh trigger for UI collaborators.
///
/// A running engine stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl RefreshHandle {
    /// Ask the engine to refresh. Returns false once the engine is gone.
    pub fn trigger(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// What one refresh produced, handed to the observer.
pub struct RefreshOutcome<'a> {
    /// Why the refresh ran
    pub reason: RefreshReason,
    /// The new context
    pub context: &'a EstimationContext,
    /// Output surfaces
    pub summary: &'a EstimateSummary,
    /// Formatter anchored at the load time
    pub formatter: DateFormatter,
    /// Debug dump, when enabled for this refresh
    pub debug_dump: Option<String>,
}

type Observer = Box<dyn Fn(&RefreshOutcome<'_>) + Send + Sync>;

/// Runs the fetch, annotate, schedule cycle.
///
/// ```text
/// cancel timer → fetch → annotate → summarize → arm timer
/// ```
pub struct RefreshEngine<S: ItemSource> {
    source: S,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    offset: FixedOffset,
    scheduler: RecomputeScheduler,
    context: Option<EstimationContext>,
    observer: Option<Observer>,
    // only the scheduler callback sends here
    timer_tx: mpsc::UnboundedSender<()>,
    timer_rx: mpsc::UnboundedReceiver<()>,
    // dropped when a run starts, so the channel closes with the last handle
    trigger_tx: Option<mpsc::UnboundedSender<()>>,
    trigger_rx: mpsc::UnboundedReceiver<()>,
    refreshes: usize,
}

impl<S: ItemSource> RefreshEngine<S> {
    /// Create a new engine reading from `source`.
    pub fn new(source: S) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        Self {
            source,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            offset: Utc.fix(),
            scheduler: RecomputeScheduler::new(),
            context: None,
            observer: None,
            timer_tx,
            timer_rx,
            trigger_tx: Some(trigger_tx),
            trigger_rx,
            refreshes: 0,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock used for load times.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the offset wall-clock times are rendered in.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Call `observer` after every successful refresh.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RefreshOutcome<'_>) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// A trigger for on-demand refreshes.
    ///
    /// Take handles before calling [`Self::run_until`]: the run ends once
    /// all of them are dropped.
    pub fn handle(&mut self) -> RefreshHandle {
        let trigger_rx = &mut self.trigger_rx;
        let tx = self.trigger_tx.get_or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            *trigger_rx = rx;
            tx
        });
        RefreshHandle { tx: tx.clone() }
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The latest context, if any refresh succeeded.
    pub fn context(&self) -> Option<&EstimationContext> {
        self.context.as_ref()
    }

    /// Recompute timer state.
    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Successful refreshes so far.
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Run one refresh.
    ///
    /// A user-requested refresh turns the debug dump on for good; a
    /// scheduled one never emits it.
    pub async fn refresh(&mut self, reason: RefreshReason) -> Result<EstimateSummary, EngineError> {
        self.scheduler.cancel();
        // a fire queued before the cancel is covered by this refresh
        while self.timer_rx.try_recv().is_ok() {}

        let raw = self.source.fetch_snapshot().await?;
        let now = self.clock.now();
        let context = EstimationContext::build(raw, now, self.config.threshold);

        if reason == RefreshReason::UserRequested && !self.config.debug.enabled {
            debug!("Debug dump enabled by user refresh");
            self.config.debug.enabled = true;
        }

        let summary = context.summary();
        let formatter = DateFormatter::new(now, self.offset);
        let debug_dump = (self.config.debug.enabled && reason != RefreshReason::Scheduled)
            .then(|| context.debug_dump(&formatter, self.config.debug.detailed));

        if let Some(next) = summary.next_refresh_at {
            let tx = self.timer_tx.clone();
            if let Some(diagnostic) = self.scheduler.arm(next, now, move || {
                let _ = tx.send(());
            }) {
                warn!("{}", diagnostic);
            }
        }

        self.refreshes += 1;
        info!(
            "Refresh #{} ({:?}) from {}: {} items, milestone {:?}, next refresh {:?}",
            self.refreshes,
            reason,
            self.source.describe(),
            context.items().len(),
            summary.milestone.date,
            summary.next_refresh_at
        );

        if let Some(observer) = &self.observer {
            observer(&RefreshOutcome {
                reason,
                context: &context,
                summary: &summary,
                formatter,
                debug_dump,
            });
        }

        self.context = Some(context);
        Ok(summary)
    }

    /// Refresh, then keep refreshing on timer fires and user requests until
    /// `shutdown` completes or every [`RefreshHandle`] is dropped.
    ///
    /// Only the startup refresh is fatal; later fetch failures are logged and
    /// the previous context is kept.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), EngineError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.trigger_tx = None;
        self.refresh(RefreshReason::Startup).await?;

        loop {
            let reason = tokio::select! {
                _ = &mut shutdown => break,
                Some(()) = self.timer_rx.recv() => RefreshReason::Scheduled,
                trigger = self.trigger_rx.recv() => match trigger {
                    Some(()) => RefreshReason::UserRequested,
                    None => {
                        debug!("All refresh handles dropped");
                        break;
                    }
                },
            };

            if let Err(e) = self.refresh(reason).await {
                warn!("Refresh failed, keeping previous estimate: {}", e);
            }
        }

        self.scheduler.cancel();
        info!("Refresh engine stopped after {} refreshes", self.refreshes);
        Ok(())
    }

    /// Run until the process is asked to stop with Ctrl-C.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
