//! Per-item presentation state: tabular or graphical, plus the graphical
//! resources each item owns while it is drawn as a chart.

use std::collections::HashMap;

use tracing::debug;

use super::charts::BarChart;
use super::RankedEntries;
use crate::core::config::DEFAULT_VISIBLE_ENTRIES;
use crate::core::format::format_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tabular,
    Graphical,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Tabular => Self::Graphical,
            Self::Graphical => Self::Tabular,
        }
    }

    pub fn is_graphical(self) -> bool {
        self == Self::Graphical
    }
}

/// The "how many entries to show" control, parsed leniently.
///
/// A missing, non-numeric or sub-1 value falls back to the default and flags
/// the control for correction so it displays what is actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleCount {
    pub value: usize,
    pub corrected: bool,
}

impl VisibleCount {
    pub fn parse(raw: Option<&str>) -> Self {
        Self::parse_or(raw, DEFAULT_VISIBLE_ENTRIES)
    }

    pub fn parse_or(raw: Option<&str>, default: usize) -> Self {
        let parsed = raw.map(str::trim).and_then(|text| {
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|value| value.floor() as i64)
            })
        });

        match parsed {
            Some(value) if value >= 1 => Self {
                value: usize::try_from(value).unwrap_or(usize::MAX),
                corrected: false,
            },
            _ => Self {
                value: default,
                corrected: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Tabular(Vec<TableRow>),
    Graphical(BarChart),
}

/// The one renderer for ranked entries. Tabular keeps service order; the
/// chart gets the slice reversed, and since bars stack upwards from the
/// baseline the heaviest entry is drawn on top.
pub fn present<R: RankedEntries + ?Sized>(
    entries: &R,
    mode: ViewMode,
    count: usize,
) -> Presentation {
    match mode {
        ViewMode::Tabular => Presentation::Tabular(
            entries
                .ranked()
                .take(count)
                .map(|(label, weight)| TableRow {
                    label: label.to_string(),
                    percent: format_percent(weight),
                })
                .collect(),
        ),
        ViewMode::Graphical => Presentation::Graphical(chart_for(entries, count)),
    }
}

fn chart_for<R: RankedEntries + ?Sized>(entries: &R, count: usize) -> BarChart {
    let slice: Vec<_> = entries.ranked().take(count).collect();
    BarChart::from_ranked(slice.into_iter().rev())
}

/// Owner of graphical rendering resources.
pub trait ChartBackend {
    type Handle;

    fn allocate(&mut self, chart: BarChart) -> Self::Handle;
    fn release(&mut self, handle: Self::Handle);
    fn chart(&self, handle: &Self::Handle) -> Option<&BarChart>;
}

/// View state for a set of items keyed by id.
///
/// Items start tabular. Whenever an item's presentation changes, the chart it
/// held (if any) goes back to the backend before anything new is built.
pub struct ViewController<B: ChartBackend> {
    backend: B,
    modes: HashMap<u32, ViewMode>,
    handles: HashMap<u32, B::Handle>,
}

impl<B: ChartBackend + Default> Default for ViewController<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: ChartBackend> ViewController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            modes: HashMap::new(),
            handles: HashMap::new(),
        }
    }

    pub fn mode(&self, key: u32) -> ViewMode {
        self.modes.get(&key).copied().unwrap_or_default()
    }

    pub fn toggle<R: RankedEntries + ?Sized>(
        &mut self,
        key: u32,
        item: &R,
        count: usize,
    ) -> ViewMode {
        let next = self.mode(key).toggle();
        self.release(key);
        if next.is_graphical() {
            self.allocate(key, item, count);
        }
        self.modes.insert(key, next);
        debug!(key, ?next, "toggled view");
        next
    }

    /// Rebuild an item's chart after the visible count changed. Tabular
    /// items hold nothing and are left alone.
    pub fn refresh<R: RankedEntries + ?Sized>(&mut self, key: u32, item: &R, count: usize) {
        if self.mode(key).is_graphical() {
            self.release(key);
            self.allocate(key, item, count);
        }
    }

    /// What to draw for `key` right now. Tabular rows are built fresh from
    /// `item`; graphical items draw the chart they own.
    pub fn presentation<R: RankedEntries + ?Sized>(
        &self,
        key: u32,
        item: &R,
        count: usize,
    ) -> Presentation {
        match self.mode(key) {
            ViewMode::Tabular => present(item, ViewMode::Tabular, count),
            ViewMode::Graphical => self
                .handles
                .get(&key)
                .and_then(|handle| self.backend.chart(handle))
                .cloned()
                .map(Presentation::Graphical)
                .unwrap_or_else(|| present(item, ViewMode::Graphical, count)),
        }
    }

    /// Drop every item back to tabular and release all charts.
    pub fn reset(&mut self) {
        for (_, handle) in self.handles.drain() {
            self.backend.release(handle);
        }
        self.modes.clear();
    }

    pub fn handle(&self, key: u32) -> Option<&B::Handle> {
        self.handles.get(&key)
    }

    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn release(&mut self, key: u32) {
        if let Some(handle) = self.handles.remove(&key) {
            self.backend.release(handle);
        }
    }

    fn allocate<R: RankedEntries + ?Sized>(&mut self, key: u32, item: &R, count: usize) {
        let handle = self.backend.allocate(chart_for(item, count));
        self.handles.insert(key, handle);
    }
}

impl<B: ChartBackend> Drop for ViewController<B> {
    fn drop(&mut self) {
        self.reset();
    }
}
