use api::{ApiError, MarkovRequest, MarkovResult};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::fence::{RequestFence, Ticket};
use crate::core::status::StatusLine;
use crate::results::{
    export_markov, ChartBackend, ExportError, RankedCardModel, RankedEntries, SvgCharts,
    ViewController, VisibleCount,
};
use crate::t;

/// Shortest source text (after trimming) worth sending.
pub const MIN_SOURCE_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkovValidationError {
    #[error("Please enter a longer source text (at least {MIN_SOURCE_CHARS} characters).")]
    SourceTooShort,
    #[error("Word count must be a whole number of at least 1.")]
    WordCount,
}

impl MarkovValidationError {
    pub fn message(&self) -> String {
        match self {
            Self::SourceTooShort => {
                t!("error-source-too-short", min = MIN_SOURCE_CHARS.to_string())
            }
            Self::WordCount => t!("error-word-count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkovForm {
    pub source_text: String,
    pub word_count: String,
}

impl Default for MarkovForm {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            word_count: "50".into(),
        }
    }
}

impl MarkovForm {
    pub fn validate(&self) -> Result<MarkovRequest, MarkovValidationError> {
        if self.source_text.trim().chars().count() < MIN_SOURCE_CHARS {
            return Err(MarkovValidationError::SourceTooShort);
        }
        let word_count = self
            .word_count
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(MarkovValidationError::WordCount)?;
        Ok(MarkovRequest {
            source_text: self.source_text.clone(),
            word_count,
        })
    }
}

/// The last generation and the view state of its transition cards. Cards
/// are keyed by their position in the matrix.
pub struct MarkovSession<B: ChartBackend = SvgCharts> {
    result: Option<MarkovResult>,
    views: ViewController<B>,
    visible: VisibleCount,
    default_visible: usize,
    fence: RequestFence,
}

impl Default for MarkovSession<SvgCharts> {
    fn default() -> Self {
        Self::new(SvgCharts::default(), &AppConfig::default())
    }
}

impl<B: ChartBackend> MarkovSession<B> {
    pub fn new(backend: B, config: &AppConfig) -> Self {
        Self {
            result: None,
            views: ViewController::new(backend),
            visible: VisibleCount {
                value: config.default_visible_entries,
                corrected: false,
            },
            default_visible: config.default_visible_entries,
            fence: RequestFence::default(),
        }
    }

    pub fn begin(
        &mut self,
        form: &MarkovForm,
    ) -> Result<(Ticket, MarkovRequest), MarkovValidationError> {
        let request = form.validate()?;
        let ticket = self.fence.issue();
        info!(ticket = ticket.id(), words = request.word_count, "generation requested");
        Ok((ticket, request))
    }

    /// Apply a generation response; `None` when it is stale. Errors clear
    /// whatever was shown before.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<MarkovResult, ApiError>,
    ) -> Option<StatusLine> {
        if !self.fence.is_current(ticket) {
            info!(ticket = ticket.id(), "discarding stale generation response");
            return None;
        }
        self.views.reset();
        match outcome {
            Ok(result) => {
                info!(
                    ticket = ticket.id(),
                    sources = result.transition_matrix.len(),
                    "generation loaded"
                );
                self.result = Some(result);
                Some(StatusLine::done(t!("markov-status-done")))
            }
            Err(err) => {
                warn!(ticket = ticket.id(), error = %err, "generation failed");
                self.result = None;
                Some(StatusLine::from_api_error(&err))
            }
        }
    }

    pub fn toggle_view(&mut self, key: u32) {
        let count = self.visible.value;
        let entry = usize::try_from(key)
            .ok()
            .and_then(|index| self.result.as_ref()?.transition_matrix.get(index));
        if let Some(entry) = entry {
            self.views.toggle(key, entry, count);
        }
    }

    pub fn set_visible(&mut self, raw: &str) -> VisibleCount {
        self.visible = VisibleCount::parse_or(Some(raw), self.default_visible);
        let count = self.visible.value;
        if let Some(result) = &self.result {
            for (key, entry) in (0_u32..).zip(&result.transition_matrix) {
                self.views.refresh(key, entry, count);
            }
        }
        self.visible
    }

    pub fn cards(&self) -> Vec<RankedCardModel> {
        let count = self.visible.value;
        let Some(result) = &self.result else {
            return Vec::new();
        };
        (0_u32..)
            .zip(&result.transition_matrix)
            .map(|(key, entry)| RankedCardModel {
                key,
                heading: entry.heading(),
                editable: false,
                mode: self.views.mode(key),
                presentation: self.views.presentation(key, entry, count),
            })
            .collect()
    }

    pub fn export(&self) -> Result<String, ExportError> {
        export_markov(self.result.as_ref())
    }

    pub fn generated_text(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.generated_text.as_str())
    }

    pub fn visible(&self) -> VisibleCount {
        self.visible
    }

    pub fn views(&self) -> &ViewController<B> {
        &self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{Transition, TransitionEntry};

    fn form(text: &str, words: &str) -> MarkovForm {
        MarkovForm {
            source_text: text.into(),
            word_count: words.into(),
        }
    }

    fn result() -> MarkovResult {
        MarkovResult {
            generated_text: "el gato come pescado".into(),
            transition_matrix: vec![
                TransitionEntry {
                    source_token: "el".into(),
                    transitions: vec![
                        Transition { token: "gato".into(), probability: 0.6 },
                        Transition { token: "perro".into(), probability: 0.4 },
                    ],
                },
                TransitionEntry {
                    source_token: "gato".into(),
                    transitions: vec![Transition { token: "come".into(), probability: 1.0 }],
                },
            ],
        }
    }

    #[test]
    fn short_text_is_rejected_locally() {
        assert_eq!(
            form("   hola mundo   ", "10").validate(),
            Err(MarkovValidationError::SourceTooShort)
        );
        assert_eq!(
            form("una frase bastante larga para el modelo", "0").validate(),
            Err(MarkovValidationError::WordCount)
        );
        let request = form("una frase bastante larga para el modelo", "25")
            .validate()
            .unwrap();
        assert_eq!(request.word_count, 25);
    }

    #[test]
    fn errors_clear_the_previous_result() {
        let mut session: MarkovSession = MarkovSession::default();
        let valid = form("una frase bastante larga para el modelo", "10");

        let (ticket, _) = session.begin(&valid).unwrap();
        session.finish(ticket, Ok(result()));
        assert_eq!(session.cards().len(), 2);

        let (ticket, _) = session.begin(&valid).unwrap();
        let status = session
            .finish(ticket, Err(ApiError::Service("texto vacío".into())))
            .unwrap();
        assert!(status.is_error());
        assert!(session.generated_text().is_none());
        assert!(session.cards().is_empty());
        assert!(matches!(session.export(), Err(ExportError::Empty)));
    }

    #[test]
    fn transition_cards_share_the_topic_renderer() {
        let mut session: MarkovSession = MarkovSession::default();
        let (ticket, _) = session
            .begin(&form("una frase bastante larga para el modelo", "10"))
            .unwrap();
        session.finish(ticket, Ok(result()));

        session.toggle_view(0);
        let cards = session.cards();
        assert!(cards[0].mode.is_graphical());
        assert!(!cards[1].mode.is_graphical());
        assert!(!cards[0].editable);
        assert_eq!(session.views().live_handles(), 1);

        session.set_visible("1");
        let crate::results::Presentation::Graphical(chart) = &session.cards()[0].presentation
        else {
            panic!("expected chart");
        };
        assert_eq!(chart.bars.len(), 1);
        assert_eq!(chart.bars[0].label, "gato");
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut session: MarkovSession = MarkovSession::default();
        let valid = form("una frase bastante larga para el modelo", "10");
        let (old, _) = session.begin(&valid).unwrap();
        let (_new, _) = session.begin(&valid).unwrap();
        assert!(session.finish(old, Ok(result())).is_none());
        assert!(session.generated_text().is_none());
    }

    #[test]
    fn short_source_message_states_the_minimum() {
        assert_eq!(
            MarkovValidationError::SourceTooShort.message(),
            "Please enter a longer source text (at least 20 characters)."
        );
    }
}
