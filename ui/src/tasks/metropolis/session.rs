use api::{ApiError, MetropolisRequest, MetropolisResult};
use tracing::{info, warn};

use super::params::{MetropolisForm, MetropolisValidationError};
use crate::core::config::AppConfig;
use crate::core::fence::{RequestFence, Ticket};
use crate::core::format::format_rate;
use crate::core::status::StatusLine;
use crate::core::trace::{segment, SegmentedTrace, TracePoint};
use crate::t;

/// The last sampling run, with its trace already split at the burn-in
/// cutoff.
#[derive(Debug, Default)]
pub struct MetropolisSession {
    result: Option<MetropolisResult>,
    trace: SegmentedTrace,
    warmup_fraction: f64,
    max_points: usize,
    fence: RequestFence,
}

impl MetropolisSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            warmup_fraction: config.warmup_fraction,
            max_points: config.trace_max_points,
            ..Self::default()
        }
    }

    pub fn begin(
        &mut self,
        form: &MetropolisForm,
    ) -> Result<(Ticket, MetropolisRequest), MetropolisValidationError> {
        let request = form.validate()?;
        let ticket = self.fence.issue();
        info!(
            ticket = ticket.id(),
            distribution = request.distribution.kind(),
            iterations = request.iterations,
            "sampling requested"
        );
        Ok((ticket, request))
    }

    /// Apply a sampling response; `None` when it is stale. A failed run
    /// leaves the previous plots in place.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<MetropolisResult, ApiError>,
    ) -> Option<StatusLine> {
        if !self.fence.is_current(ticket) {
            info!(ticket = ticket.id(), "discarding stale sampling response");
            return None;
        }
        match outcome {
            Ok(result) => {
                self.trace = segment(&result.sample_series_x, self.warmup_fraction);
                let rate = format_rate(result.acceptance_rate);
                info!(
                    ticket = ticket.id(),
                    samples = self.trace.len(),
                    cutoff = self.trace.cutoff,
                    "sampling loaded"
                );
                self.result = Some(result);
                Some(StatusLine::done(t!("metropolis-status-done", rate = rate)))
            }
            Err(err) => {
                warn!(ticket = ticket.id(), error = %err, "sampling failed");
                Some(StatusLine::from_api_error(&err))
            }
        }
    }

    pub fn result(&self) -> Option<&MetropolisResult> {
        self.result.as_ref()
    }

    pub fn acceptance(&self) -> Option<String> {
        self.result.as_ref().map(|r| format_rate(r.acceptance_rate))
    }

    pub fn trace(&self) -> &SegmentedTrace {
        &self.trace
    }

    pub fn trace_points(&self) -> Vec<TracePoint> {
        self.trace.thin(self.max_points)
    }

    pub fn has_surface(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|r| !r.surface_z.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(samples: usize) -> MetropolisResult {
        MetropolisResult {
            acceptance_rate: 43.217,
            sample_series_x: (0..samples).map(|i| (i as f64).sin()).collect(),
            histogram_x: vec![-1.0, 0.0, 1.0],
            histogram_y: vec![0.2, 0.5, 0.3],
            surface_x: vec![0.0, 1.0],
            surface_y: vec![0.0, 1.0],
            surface_z: vec![vec![0.1, 0.2], vec![0.3, 0.4]],
        }
    }

    fn started(session: &mut MetropolisSession) -> Ticket {
        session.begin(&MetropolisForm::default()).unwrap().0
    }

    #[test]
    fn success_segments_and_thins_the_trace() {
        let mut session = MetropolisSession::new(&AppConfig::default());
        let ticket = started(&mut session);
        let status = session.finish(ticket, Ok(run(2000))).unwrap();

        assert_eq!(status, StatusLine::done("Sampling finished. Acceptance rate: 43.22%"));
        assert_eq!(session.trace().cutoff, 200);
        let points = session.trace_points();
        assert!(points.len() <= 502);
        assert!(points.iter().any(|p| p.iteration == 200
            && p.warmup.is_some()
            && p.stationary.is_some()));
        assert_eq!(points.last().map(|p| p.iteration), Some(1999));
        assert!(session.has_surface());
    }

    #[test]
    fn failure_keeps_previous_plots() {
        let mut session = MetropolisSession::new(&AppConfig::default());
        let ticket = started(&mut session);
        session.finish(ticket, Ok(run(100)));

        let ticket = started(&mut session);
        let status = session
            .finish(ticket, Err(ApiError::Service("sigma inválido".into())))
            .unwrap();
        assert_eq!(status, StatusLine::error("sigma inválido"));
        assert_eq!(session.trace().len(), 100);
        assert_eq!(session.acceptance().as_deref(), Some("43.22%"));
    }

    #[test]
    fn invalid_form_takes_no_ticket() {
        let mut session = MetropolisSession::new(&AppConfig::default());
        let form = MetropolisForm {
            sigma: "-2".into(),
            ..MetropolisForm::default()
        };
        assert_eq!(
            session.begin(&form).unwrap_err(),
            MetropolisValidationError::Sigma
        );
        assert!(session.fence.latest().is_none());
    }

    #[test]
    fn stale_run_is_dropped() {
        let mut session = MetropolisSession::new(&AppConfig::default());
        let old = started(&mut session);
        let _new = started(&mut session);
        assert!(session.finish(old, Ok(run(10))).is_none());
        assert!(session.result().is_none());
    }
}
