use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::fetcher::SourceReport;
use crate::item::DisplayItem;
use crate::registry::Registry;

const WEEKDAYS: [&str; 7] = [
    "Domenica",
    "Lunedì",
    "Martedì",
    "Mercoledì",
    "Giovedì",
    "Venerdì",
    "Sabato",
];

/// One line of the board, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRow {
    pub title: String,
    pub link: String,
    pub source: String,
    pub date: String,
    pub color: String,
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub rows: Vec<RenderRow>,
    pub sources: Vec<SourceReport>,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn failed_sources(&self) -> Vec<SourceReport> {
        self.sources.iter().filter(|s| s.failed()).cloned().collect()
    }
}

/// The rendering surface. Holds the last published snapshot; readers see
/// either the previous snapshot or the next one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct Board {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, snapshot: Snapshot) {
        *self.current.write().await = Some(Arc::new(snapshot));
    }

    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }
}

/// `"Lunedì alle 09:05"` in `tz`; empty when the time is unknown.
pub fn format_published<Tz: TimeZone>(published_at: Option<DateTime<Utc>>, tz: &Tz) -> String {
    let Some(published_at) = published_at else {
        return String::new();
    };

    let local = published_at.with_timezone(tz);
    let day = WEEKDAYS[local.weekday().num_days_from_sunday() as usize];
    format!("{} alle {:02}:{:02}", day, local.hour(), local.minute())
}

/// Where board dates are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Fixed(FixedOffset),
    /// The host's zone, resolved per item so DST applies to each date.
    Local,
}

impl DisplayZone {
    /// `minutes` east of UTC, or the host's zone when unset.
    pub fn from_offset_minutes(minutes: Option<i32>) -> anyhow::Result<Self> {
        match minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(DisplayZone::Fixed)
                .ok_or_else(|| anyhow::anyhow!("invalid display offset: {} minutes", minutes)),
            None => Ok(DisplayZone::Local),
        }
    }

    pub fn format(&self, published_at: Option<DateTime<Utc>>) -> String {
        match self {
            DisplayZone::Fixed(offset) => format_published(published_at, offset),
            DisplayZone::Local => format_published(published_at, &Local),
        }
    }
}

pub struct Presenter {
    registry: Registry,
    zone: DisplayZone,
}

impl Presenter {
    pub fn new(registry: Registry, zone: DisplayZone) -> Self {
        Self { registry, zone }
    }

    pub fn with_offset_minutes(registry: Registry, offset_minutes: Option<i32>) -> anyhow::Result<Self> {
        Ok(Self::new(registry, DisplayZone::from_offset_minutes(offset_minutes)?))
    }

    pub fn rows(&self, items: &[DisplayItem]) -> Vec<RenderRow> {
        items
            .iter()
            .map(|display| RenderRow {
                title: display.title.clone(),
                link: display.item.link.clone(),
                source: display.item.source.clone(),
                date: self.zone.format(display.item.published_at),
                color: self.registry.color_for(&display.item.source).to_string(),
            })
            .collect()
    }

    /// Replace the board's contents with this cycle's output.
    pub async fn publish(&self, board: &Board, items: &[DisplayItem], sources: Vec<SourceReport>) {
        let rows = self.rows(items);
        info!("Publishing {} rows", rows.len());
        board
            .replace(Snapshot {
                rows,
                sources,
                generated_at: Utc::now(),
            })
            .await;
    }
}
