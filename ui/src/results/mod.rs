mod cards;
pub use cards::{RankedCard, RankedCardModel};

mod charts;
pub use charts::{
    BarChart, BarChartView, ChartId, HeatmapView, HistogramView, LineChartView, SvgCharts,
    SweepChartView, TraceChartView,
};

mod export;
pub use export::{
    deliver_export, export_markov, export_topics, run_export, ExportError, MARKOV_EXPORT_FILE,
    TOPICS_EXPORT_FILE,
};

mod view;
pub use view::{
    present, ChartBackend, Presentation, TableRow, ViewController, ViewMode, VisibleCount,
};

use api::{TopicItem, Transition, TransitionEntry};

use crate::t;

/// Anything the entry renderer can show: a heading plus (label, weight)
/// pairs, already ranked by the service.
pub trait RankedEntries {
    fn heading(&self) -> String;
    fn ranked(&self) -> impl Iterator<Item = (&str, f64)> + '_;
}

impl RankedEntries for TopicItem {
    fn heading(&self) -> String {
        display_label(self)
    }

    fn ranked(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.label.as_str(), entry.weight))
    }
}

impl RankedEntries for TransitionEntry {
    fn heading(&self) -> String {
        format!("“{}” →", self.source_token)
    }

    fn ranked(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.transitions
            .iter()
            .map(|Transition { token, probability }| (token.as_str(), *probability))
    }
}

/// Label shown for an item: the user's name for it, or the localized
/// `results-item-label` fallback.
pub fn display_label(item: &TopicItem) -> String {
    match item.custom_label.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => t!("results-item-label", id = item.id.to_string()),
    }
}

/// The currently loaded analysis plus the user's label edits.
///
/// Replaced wholesale on every successful analysis, emptied on failure. The
/// generation counter lets dependent view state notice either.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    items: Vec<TopicItem>,
    generation: u64,
}

impl ResultStore {
    pub fn replace(&mut self, items: Vec<TopicItem>) {
        self.items = items;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Apply edited labels by position. Blank edits and positions past the
    /// end are ignored. Returns how many labels were applied.
    pub fn apply_label_edits<S: AsRef<str>>(&mut self, labels: &[S]) -> usize {
        let mut applied = 0;
        for (item, label) in self.items.iter_mut().zip(labels) {
            let label = label.as_ref().trim();
            if !label.is_empty() {
                item.custom_label = Some(label.to_string());
                applied += 1;
            }
        }
        applied
    }

    pub fn snapshot(&self) -> Vec<TopicItem> {
        self.items.clone()
    }

    pub fn items(&self) -> &[TopicItem] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&TopicItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current label for every item, in render order.
    pub fn display_labels(&self) -> Vec<String> {
        self.items.iter().map(display_label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::TopicEntry;

    fn item(id: u32, words: &[(&str, f64)]) -> TopicItem {
        TopicItem {
            id,
            entries: words
                .iter()
                .map(|(label, weight)| TopicEntry {
                    label: label.to_string(),
                    weight: *weight,
                })
                .collect(),
            custom_label: None,
        }
    }

    #[test]
    fn replace_swaps_everything_and_bumps_generation() {
        let mut store = ResultStore::default();
        store.replace(vec![item(0, &[("mago", 0.2)]), item(1, &[("robot", 0.3)])]);
        let first_generation = store.generation();

        store.replace(vec![item(7, &[("acero", 0.1)])]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id, 7);
        assert!(store.generation() > first_generation);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = ResultStore::default();
        store.replace(vec![item(0, &[])]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn label_edits_skip_blanks_and_overflow() {
        let mut store = ResultStore::default();
        store.replace(vec![item(0, &[]), item(1, &[])]);

        let applied = store.apply_label_edits(&["Magic", "   ", "Ignored"]);
        assert_eq!(applied, 1);
        assert_eq!(store.items()[0].custom_label.as_deref(), Some("Magic"));
        assert_eq!(store.items()[1].custom_label, None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn custom_label_wins_but_id_is_kept() {
        let mut store = ResultStore::default();
        store.replace(vec![item(3, &[])]);
        assert_eq!(store.display_labels(), vec!["Item 3".to_string()]);

        store.apply_label_edits(&["Robots"]);
        assert_eq!(store.display_labels(), vec!["Robots".to_string()]);
        assert_eq!(store.items()[0].id, 3);
        assert!(store.get(3).is_some());
    }

    #[test]
    fn snapshot_reflects_latest_edits() {
        let mut store = ResultStore::default();
        store.replace(vec![item(0, &[("casa", 0.5)])]);
        store.apply_label_edits(&["Home"]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].custom_label.as_deref(), Some("Home"));
        assert_eq!(snapshot[0].entries[0].label, "casa");
    }

    #[test]
    fn transition_entries_rank_like_topics() {
        let entry = TransitionEntry {
            source_token: "el".into(),
            transitions: vec![
                Transition { token: "perro".into(), probability: 0.5 },
                Transition { token: "gato".into(), probability: 0.25 },
            ],
        };
        let ranked: Vec<_> = entry.ranked().collect();
        assert_eq!(ranked, vec![("perro", 0.5), ("gato", 0.25)]);
        assert!(entry.heading().contains("el"));
    }
}
