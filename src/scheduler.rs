use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregationConfig};
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::item::DisplayItem;
use crate::present::{Board, Presenter};
use crate::registry::Registry;
use crate::translate::Translator;

/// What a call to [`Pipeline::run_cycle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The board was replaced with this many rows.
    Published(usize),
    /// Another cycle was still running.
    Skipped,
}

/// Fetch → aggregate → translate → present, against one board.
pub struct Pipeline {
    registry: Registry,
    fetcher: Fetcher,
    aggregation: AggregationConfig,
    translator: Option<Translator>,
    presenter: Presenter,
    board: Board,
    refreshing: Arc<RwLock<bool>>,
}

impl Pipeline {
    pub fn new(
        registry: Registry,
        fetcher: Fetcher,
        aggregation: AggregationConfig,
        translator: Option<Translator>,
        presenter: Presenter,
        board: Board,
    ) -> Self {
        Self {
            registry,
            fetcher,
            aggregation,
            translator,
            presenter,
            board,
            refreshing: Arc::new(RwLock::new(false)),
        }
    }

    pub fn from_config(config: &Config, board: Board) -> anyhow::Result<Self> {
        let registry = config.registry();
        let fetcher = Fetcher::new(&config.gateway)?;
        let translator = if config.translation.enabled {
            Some(Translator::new(&config.translation)?)
        } else {
            None
        };
        let presenter =
            Presenter::with_offset_minutes(registry.clone(), config.display_utc_offset_minutes)?;

        Ok(Self::new(
            registry,
            fetcher,
            config.aggregation.clone(),
            translator,
            presenter,
            board,
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub async fn is_refreshing(&self) -> bool {
        *self.refreshing.read().await
    }

    /// Run one cycle unless one is already in flight, in which case the
    /// request is dropped.
    pub async fn run_cycle(&self) -> CycleOutcome {
        // Check if already refreshing
        {
            let mut refreshing = self.refreshing.write().await;
            if *refreshing {
                info!("Refresh already in progress, skipping");
                return CycleOutcome::Skipped;
            }
            *refreshing = true;
        }

        let rows = self.do_cycle().await;

        // Clear refreshing flag
        {
            let mut refreshing = self.refreshing.write().await;
            *refreshing = false;
        }

        CycleOutcome::Published(rows)
    }

    async fn do_cycle(&self) -> usize {
        let outcome = self.fetcher.fetch_all(&self.registry).await;
        let failed = outcome.reports.iter().filter(|r| r.failed()).count();
        info!(
            "Fetched {} items from {} sources ({} failed)",
            outcome.items.len(),
            outcome.reports.len(),
            failed
        );

        let list = aggregate(outcome.items, &self.registry, &self.aggregation);

        let display: Vec<DisplayItem> = match &self.translator {
            Some(translator) => translator.translate_all(list).await,
            None => list.into_iter().map(DisplayItem::untranslated).collect(),
        };

        self.presenter
            .publish(&self.board, &display, outcome.reports)
            .await;

        display.len()
    }
}

/// Run a cycle now, then every `interval_secs`, forever.
pub async fn start_background_refresh(pipeline: Arc<Pipeline>, interval_secs: u64) {
    let interval = Duration::from_secs(interval_secs);

    // Do initial fetch
    info!("Starting initial refresh cycle");
    log_outcome(pipeline.run_cycle().await);

    // Then schedule periodic refreshes
    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled refresh cycle");
        log_outcome(pipeline.run_cycle().await);
    }
}

pub fn log_outcome(outcome: CycleOutcome) {
    match outcome {
        CycleOutcome::Published(rows) => info!("Refresh cycle complete, {} rows on the board", rows),
        CycleOutcome::Skipped => warn!("Refresh cycle skipped, previous cycle still running"),
    }
}
