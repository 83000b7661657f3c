//! Parameter sweep: validate the scan, then pick the candidate with the
//! lowest mean score.

use std::fmt;

use api::{SplitStrategy, SweepBound, SweepParams, SweepPoint};
use thiserror::Error;

use super::params::positive_count;
use crate::t;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepValidationError {
    #[error("Please select a PDF file.")]
    MissingFile,
    #[error("Sweep start must be a whole number of at least 1.")]
    Start,
    #[error("Sweep step must be a whole number of at least 1.")]
    Step,
    #[error("Repetitions must be a whole number of at least 1.")]
    Repetitions,
    #[error("Improvement threshold must be a percentage between 0 and 100.")]
    Threshold,
    #[error("Sweep end must be a whole number greater than the start ({start}).")]
    End { start: u32 },
}

impl SweepValidationError {
    pub fn message(&self) -> String {
        match self {
            Self::MissingFile => t!("error-missing-file"),
            Self::Start => t!("error-sweep-start"),
            Self::Step => t!("error-sweep-step"),
            Self::Repetitions => t!("error-sweep-repetitions"),
            Self::Threshold => t!("error-sweep-threshold"),
            Self::End { start } => t!("error-sweep-end", start = start.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    Threshold,
    #[default]
    End,
}

impl SweepMode {
    pub const ALL: [SweepMode; 2] = [SweepMode::End, SweepMode::Threshold];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::End => "end",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepForm {
    pub split: SplitStrategy,
    pub start: String,
    pub mode: SweepMode,
    /// Percentage in threshold mode, last candidate in end mode.
    pub bound: String,
    pub step: String,
    pub repetitions: String,
}

impl Default for SweepForm {
    fn default() -> Self {
        Self {
            split: SplitStrategy::default(),
            start: "2".into(),
            mode: SweepMode::default(),
            bound: "20".into(),
            step: "2".into(),
            repetitions: "3".into(),
        }
    }
}

impl SweepForm {
    pub fn validate(&self) -> Result<SweepParams, SweepValidationError> {
        let start = positive_count(&self.start).ok_or(SweepValidationError::Start)?;
        let step = positive_count(&self.step).ok_or(SweepValidationError::Step)?;
        let repetitions =
            positive_count(&self.repetitions).ok_or(SweepValidationError::Repetitions)?;

        let bound = match self.mode {
            SweepMode::Threshold => self
                .bound
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|pct| (0.0..=100.0).contains(pct))
                .map(SweepBound::Threshold)
                .ok_or(SweepValidationError::Threshold)?,
            SweepMode::End => self
                .bound
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|end| *end > start)
                .map(SweepBound::End)
                .ok_or(SweepValidationError::End { start })?,
        };

        Ok(SweepParams {
            split: self.split,
            start,
            bound,
            step,
            repetitions,
        })
    }
}

/// Parameter of the first point reaching a new strict minimum of
/// `mean_score`. Ties keep the earlier (lower) parameter; non-finite scores
/// never win.
pub fn select_best(points: &[SweepPoint]) -> Option<u32> {
    points
        .iter()
        .filter(|point| point.mean_score.is_finite())
        .fold(None::<&SweepPoint>, |best, point| match best {
            Some(current) if point.mean_score >= current.mean_score => Some(current),
            _ => Some(point),
        })
        .map(|point| point.parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(parameter: u32, mean_score: f64, std_dev: f64) -> SweepPoint {
        SweepPoint {
            parameter,
            mean_score,
            std_dev,
        }
    }

    #[test]
    fn first_strict_minimum_wins() {
        let points = [point(1, 5.0, 0.1), point(2, 3.0, 0.2), point(3, 3.0, 0.05)];
        assert_eq!(select_best(&points), Some(2));
    }

    #[test]
    fn empty_and_non_finite_curves() {
        assert_eq!(select_best(&[]), None);
        assert_eq!(select_best(&[point(4, f64::NAN, 0.0)]), None);
        assert_eq!(
            select_best(&[point(2, f64::NAN, 0.0), point(4, 9.0, 0.0), point(6, 8.5, 0.0)]),
            Some(6)
        );
    }

    #[test]
    fn zero_start_is_rejected() {
        let form = SweepForm {
            start: "0".into(),
            ..SweepForm::default()
        };
        assert_eq!(form.validate(), Err(SweepValidationError::Start));
    }

    #[test]
    fn end_must_exceed_start() {
        let form = SweepForm {
            start: "8".into(),
            bound: "8".into(),
            ..SweepForm::default()
        };
        assert_eq!(form.validate(), Err(SweepValidationError::End { start: 8 }));
    }

    #[test]
    fn threshold_mode_takes_a_percentage() {
        let mut form = SweepForm {
            mode: SweepMode::Threshold,
            bound: "2.5".into(),
            ..SweepForm::default()
        };
        assert_eq!(form.validate().unwrap().bound, SweepBound::Threshold(2.5));

        form.bound = "150".into();
        assert_eq!(form.validate(), Err(SweepValidationError::Threshold));
    }

    #[test]
    fn step_and_repetitions_must_be_positive() {
        let form = SweepForm {
            step: "0".into(),
            ..SweepForm::default()
        };
        assert_eq!(form.validate(), Err(SweepValidationError::Step));

        let form = SweepForm {
            repetitions: "x".into(),
            ..SweepForm::default()
        };
        assert_eq!(form.validate(), Err(SweepValidationError::Repetitions));
    }

    #[test]
    fn mode_labels_round_trip() {
        for mode in SweepMode::ALL {
            assert_eq!(SweepMode::parse(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn end_message_quotes_the_start() {
        assert_eq!(
            SweepValidationError::End { start: 4 }.message(),
            "Sweep end must be a whole number greater than the start (4)."
        );
    }
}
