//! State owned by the topics view: the loaded analysis, per-item view state,
//! the last sweep curve and the request fences for both endpoints.

use api::{AnalysisParams, ApiError, SweepParams, SweepPoint, TopicAnalysis, Upload};
use tracing::{info, warn};

use super::params::{AnalysisForm, AnalysisValidationError};
use super::sweep::{select_best, SweepForm, SweepValidationError};
use crate::core::config::AppConfig;
use crate::core::downsample::{downsample, DisplayPoint};
use crate::core::fence::{RequestFence, Ticket};
use crate::core::status::StatusLine;
use crate::results::{
    export_topics, ChartBackend, ExportError, RankedCardModel, RankedEntries, ResultStore,
    SvgCharts, ViewController, VisibleCount,
};
use crate::t;

/// What became of a finished sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    /// A newer sweep was issued meanwhile; nothing changed.
    Stale,
    Selected(u32),
    /// The curve came back without a usable score.
    NoCandidate,
    Failed(StatusLine),
}

pub struct TopicsSession<B: ChartBackend = SvgCharts> {
    store: ResultStore,
    views: ViewController<B>,
    entropy_trace: Option<Vec<f64>>,
    sweep_points: Vec<SweepPoint>,
    selected: Option<u32>,
    label_drafts: Vec<String>,
    visible: VisibleCount,
    default_visible: usize,
    analysis_fence: RequestFence,
    sweep_fence: RequestFence,
}

impl Default for TopicsSession<SvgCharts> {
    fn default() -> Self {
        Self::new(SvgCharts::default(), &AppConfig::default())
    }
}

impl<B: ChartBackend> TopicsSession<B> {
    pub fn new(backend: B, config: &AppConfig) -> Self {
        let default_visible = config.default_visible_entries;
        Self {
            store: ResultStore::default(),
            views: ViewController::new(backend),
            entropy_trace: None,
            sweep_points: Vec::new(),
            selected: None,
            label_drafts: Vec::new(),
            visible: VisibleCount {
                value: default_visible,
                corrected: false,
            },
            default_visible,
            analysis_fence: RequestFence::default(),
            sweep_fence: RequestFence::default(),
        }
    }

    /// Validate and take a ticket. Nothing changes on a validation error.
    pub fn begin_analysis(
        &mut self,
        form: &AnalysisForm,
        upload: Option<&Upload>,
    ) -> Result<(Ticket, AnalysisParams), AnalysisValidationError> {
        if upload.is_none() {
            return Err(AnalysisValidationError::MissingFile);
        }
        let params = form.validate()?;
        let ticket = self.analysis_fence.issue();
        info!(ticket = ticket.id(), k = params.k, "analysis requested");
        Ok((ticket, params))
    }

    /// Apply an analysis response. Returns `None` when the response is stale.
    pub fn finish_analysis(
        &mut self,
        ticket: Ticket,
        outcome: Result<TopicAnalysis, ApiError>,
    ) -> Option<StatusLine> {
        if !self.analysis_fence.is_current(ticket) {
            info!(ticket = ticket.id(), "discarding stale analysis response");
            return None;
        }
        self.views.reset();
        match outcome {
            Ok(analysis) => {
                let count = analysis.items.len();
                self.store.replace(analysis.items);
                self.entropy_trace = analysis.entropy_trace;
                self.label_drafts = self.store.display_labels();
                self.visible = VisibleCount {
                    value: self.default_visible,
                    corrected: true,
                };
                info!(ticket = ticket.id(), items = count, "analysis loaded");
                Some(StatusLine::done(t!("topics-status-done", count = count.to_string())))
            }
            Err(err) => {
                warn!(ticket = ticket.id(), error = %err, "analysis failed");
                self.store.clear();
                self.entropy_trace = None;
                self.label_drafts.clear();
                Some(StatusLine::from_api_error(&err))
            }
        }
    }

    /// Validate and take a ticket. Starting a sweep drops the previous curve.
    pub fn begin_sweep(
        &mut self,
        form: &SweepForm,
        upload: Option<&Upload>,
    ) -> Result<(Ticket, SweepParams), SweepValidationError> {
        if upload.is_none() {
            return Err(SweepValidationError::MissingFile);
        }
        let params = form.validate()?;
        self.sweep_points.clear();
        self.selected = None;
        let ticket = self.sweep_fence.issue();
        info!(
            ticket = ticket.id(),
            start = params.start,
            mode = params.bound.mode(),
            "sweep requested"
        );
        Ok((ticket, params))
    }

    /// Apply a sweep response. The analysis store is never touched here.
    pub fn finish_sweep(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<SweepPoint>, ApiError>,
    ) -> SweepOutcome {
        if !self.sweep_fence.is_current(ticket) {
            info!(ticket = ticket.id(), "discarding stale sweep response");
            return SweepOutcome::Stale;
        }
        match outcome {
            Ok(points) => {
                self.selected = select_best(&points);
                self.sweep_points = points;
                match self.selected {
                    Some(best) => {
                        info!(
                            ticket = ticket.id(),
                            best,
                            candidates = self.sweep_points.len(),
                            "sweep selected"
                        );
                        SweepOutcome::Selected(best)
                    }
                    None => {
                        warn!(ticket = ticket.id(), "sweep returned no usable candidate");
                        SweepOutcome::NoCandidate
                    }
                }
            }
            Err(err) => {
                warn!(ticket = ticket.id(), error = %err, "sweep failed");
                SweepOutcome::Failed(StatusLine::from_api_error(&err))
            }
        }
    }

    pub fn toggle_view(&mut self, id: u32) {
        let count = self.visible.value;
        if let Some(item) = self.store.get(id) {
            self.views.toggle(id, item, count);
        }
    }

    /// Re-read the visible-count control and rebuild any open charts.
    pub fn set_visible(&mut self, raw: &str) -> VisibleCount {
        self.visible = VisibleCount::parse_or(Some(raw), self.default_visible);
        self.refresh_views();
        self.visible
    }

    pub fn refresh_views(&mut self) {
        let count = self.visible.value;
        for item in self.store.items() {
            self.views.refresh(item.id, item, count);
        }
    }

    pub fn edit_label(&mut self, position: usize, text: String) {
        if let Some(draft) = self.label_drafts.get_mut(position) {
            *draft = text;
        }
    }

    pub fn export(&mut self) -> Result<String, ExportError> {
        export_topics(&mut self.store, &self.label_drafts)
    }

    pub fn cards(&self) -> Vec<RankedCardModel> {
        let count = self.visible.value;
        self.store
            .items()
            .iter()
            .enumerate()
            .map(|(position, item)| RankedCardModel {
                key: item.id,
                heading: self
                    .label_drafts
                    .get(position)
                    .cloned()
                    .unwrap_or_else(|| item.heading()),
                editable: true,
                mode: self.views.mode(item.id),
                presentation: self.views.presentation(item.id, item, count),
            })
            .collect()
    }

    pub fn entropy_points(&self, max_points: usize) -> Option<Vec<DisplayPoint>> {
        self.entropy_trace
            .as_deref()
            .filter(|trace| !trace.is_empty())
            .map(|trace| downsample(trace, max_points))
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn views(&self) -> &ViewController<B> {
        &self.views
    }

    pub fn sweep_points(&self) -> &[SweepPoint] {
        &self.sweep_points
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn visible(&self) -> VisibleCount {
        self.visible
    }

    pub fn has_results(&self) -> bool {
        !self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{TopicEntry, TopicItem};

    fn upload() -> Upload {
        Upload::new("libro.pdf", b"%PDF-1.4".to_vec())
    }

    fn analysis(ids: &[u32], words: usize) -> TopicAnalysis {
        TopicAnalysis {
            items: ids
                .iter()
                .map(|&id| TopicItem {
                    id,
                    entries: (0..words)
                        .map(|i| TopicEntry {
                            label: format!("t{id}w{i}"),
                            weight: 0.4 / (i as f64 + 1.0),
                        })
                        .collect(),
                    custom_label: None,
                })
                .collect(),
            entropy_trace: Some((0..1200).map(|i| 1000.0 - i as f64).collect()),
        }
    }

    fn loaded(ids: &[u32]) -> TopicsSession {
        let mut session: TopicsSession = TopicsSession::default();
        let (ticket, _) = session
            .begin_analysis(&AnalysisForm::default(), Some(&upload()))
            .unwrap();
        session.finish_analysis(ticket, Ok(analysis(ids, 12)));
        session
    }

    #[test]
    fn missing_file_is_caught_before_a_ticket_is_issued() {
        let mut session: TopicsSession = TopicsSession::default();
        let err = session
            .begin_analysis(&AnalysisForm::default(), None)
            .unwrap_err();
        assert_eq!(err, AnalysisValidationError::MissingFile);
        assert!(session.analysis_fence.latest().is_none());
    }

    #[test]
    fn success_replaces_and_failure_clears() {
        let mut session = loaded(&[0, 1, 2]);
        assert_eq!(session.store().len(), 3);
        assert!(session.entropy_points(500).unwrap().len() <= 501);

        let (ticket, _) = session
            .begin_analysis(&AnalysisForm::default(), Some(&upload()))
            .unwrap();
        let status = session
            .finish_analysis(ticket, Err(ApiError::Service("Error fatal".into())))
            .unwrap();
        assert_eq!(status, StatusLine::error("Error fatal"));
        assert!(!session.has_results());
        assert!(session.entropy_points(500).is_none());
    }

    #[test]
    fn stale_analysis_is_discarded() {
        let mut session: TopicsSession = TopicsSession::default();
        let form = AnalysisForm::default();
        let (first, _) = session.begin_analysis(&form, Some(&upload())).unwrap();
        let (second, _) = session.begin_analysis(&form, Some(&upload())).unwrap();

        assert!(session.finish_analysis(second, Ok(analysis(&[9], 3))).is_some());
        assert!(session.finish_analysis(first, Ok(analysis(&[0, 1], 3))).is_none());
        assert_eq!(session.store().items()[0].id, 9);
    }

    #[test]
    fn new_results_reset_view_state() {
        let mut session = loaded(&[0, 1]);
        session.toggle_view(0);
        assert_eq!(session.views().live_handles(), 1);

        let (ticket, _) = session
            .begin_analysis(&AnalysisForm::default(), Some(&upload()))
            .unwrap();
        session.finish_analysis(ticket, Ok(analysis(&[0, 1], 4)));
        assert_eq!(session.views().live_handles(), 0);
        assert_eq!(session.views().backend().live(), 0);
    }

    #[test]
    fn visible_count_rebuilds_open_charts() {
        let mut session = loaded(&[0]);
        session.toggle_view(0);

        let count = session.set_visible("4");
        assert_eq!(count.value, 4);
        let cards = session.cards();
        let crate::results::Presentation::Graphical(chart) = &cards[0].presentation else {
            panic!("expected chart");
        };
        assert_eq!(chart.bars.len(), 4);
        assert_eq!(session.views().backend().live(), 1);

        let healed = session.set_visible("abc");
        assert_eq!(healed, VisibleCount { value: 10, corrected: true });
    }

    #[test]
    fn label_drafts_flow_into_export() {
        let mut session = loaded(&[0, 1]);
        session.edit_label(0, "Custom".into());
        assert_eq!(session.cards()[0].heading, "Custom");

        let json = session.export().unwrap();
        assert!(json.contains("\"customLabel\": \"Custom\""));
        assert_eq!(
            session.store().items()[0].custom_label.as_deref(),
            Some("Custom")
        );
    }

    #[test]
    fn sweep_failure_leaves_analysis_alone() {
        let mut session = loaded(&[0, 1]);
        let (ticket, _) = session
            .begin_sweep(&SweepForm::default(), Some(&upload()))
            .unwrap();
        let outcome = session.finish_sweep(ticket, Err(ApiError::Status(500)));
        assert!(matches!(outcome, SweepOutcome::Failed(status) if status.is_error()));
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn sweep_selects_and_keeps_curve() {
        let mut session: TopicsSession = TopicsSession::default();
        let (ticket, _) = session
            .begin_sweep(&SweepForm::default(), Some(&upload()))
            .unwrap();
        let points = vec![
            SweepPoint { parameter: 2, mean_score: 5.0, std_dev: 0.1 },
            SweepPoint { parameter: 4, mean_score: 3.0, std_dev: 0.2 },
            SweepPoint { parameter: 6, mean_score: 3.0, std_dev: 0.1 },
        ];
        assert_eq!(session.finish_sweep(ticket, Ok(points)), SweepOutcome::Selected(4));
        assert_eq!(session.selected(), Some(4));
        assert_eq!(session.sweep_points().len(), 3);

        let (next, _) = session
            .begin_sweep(&SweepForm::default(), Some(&upload()))
            .unwrap();
        assert!(session.sweep_points().is_empty());
        assert_eq!(session.finish_sweep(next, Ok(Vec::new())), SweepOutcome::NoCandidate);
    }

    #[test]
    fn invalid_sweep_issues_no_ticket() {
        let mut session: TopicsSession = TopicsSession::default();
        let form = SweepForm {
            start: "0".into(),
            ..SweepForm::default()
        };
        assert_eq!(
            session.begin_sweep(&form, Some(&upload())).unwrap_err(),
            SweepValidationError::Start
        );
        assert!(session.sweep_fence.latest().is_none());
    }
}
