use api::{AnalysisParams, SplitStrategy};
use thiserror::Error;

use crate::t;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisValidationError {
    #[error("Please select a PDF file.")]
    MissingFile,
    #[error("Number of topics must be a whole number of at least 1.")]
    TopicCount,
    #[error("Iterations must be a whole number of at least 1.")]
    Iterations,
    #[error("{0} must be a positive number, or left empty.")]
    Prior(&'static str),
    #[error("Convergence threshold must be a non-negative number.")]
    Threshold,
    #[error("Patience must be a whole number of at least 1.")]
    Patience,
}

impl AnalysisValidationError {
    /// Text for the status line, in the active language.
    pub fn message(&self) -> String {
        match self {
            Self::MissingFile => t!("error-missing-file"),
            Self::TopicCount => t!("error-topic-count"),
            Self::Iterations => t!("error-iterations"),
            Self::Prior(name) => t!("error-prior", name = name.to_string()),
            Self::Threshold => t!("error-convergence"),
            Self::Patience => t!("error-patience"),
        }
    }
}

/// The analysis form as typed. Fields stay raw text until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisForm {
    pub k: String,
    pub iterations: String,
    pub alpha: String,
    pub beta: String,
    pub threshold: String,
    pub patience: String,
    pub split: SplitStrategy,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self {
            k: "10".into(),
            iterations: "100".into(),
            alpha: String::new(),
            beta: String::new(),
            threshold: "0.01".into(),
            patience: "10".into(),
            split: SplitStrategy::default(),
        }
    }
}

impl AnalysisForm {
    pub fn validate(&self) -> Result<AnalysisParams, AnalysisValidationError> {
        Ok(AnalysisParams {
            k: positive_count(&self.k).ok_or(AnalysisValidationError::TopicCount)?,
            iterations: positive_count(&self.iterations)
                .ok_or(AnalysisValidationError::Iterations)?,
            alpha: optional_prior(&self.alpha, "Alpha")?,
            beta: optional_prior(&self.beta, "Beta")?,
            threshold: self
                .threshold
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or(AnalysisValidationError::Threshold)?,
            patience: positive_count(&self.patience).ok_or(AnalysisValidationError::Patience)?,
            split: self.split,
        })
    }

    /// Write a sweep winner into the topic-count field.
    pub fn adopt_topic_count(&mut self, k: u32) {
        self.k = k.to_string();
    }
}

pub(crate) fn positive_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v >= 1)
}

fn optional_prior(raw: &str, name: &'static str) -> Result<Option<f64>, AnalysisValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(Some)
        .ok_or(AnalysisValidationError::Prior(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let params = AnalysisForm::default().validate().unwrap();
        assert_eq!(params.k, 10);
        assert_eq!(params.iterations, 100);
        assert_eq!(params.alpha, None);
        assert_eq!(params.split, SplitStrategy::Chapters);
    }

    #[test]
    fn bad_fields_are_named() {
        let form = AnalysisForm {
            k: "0".into(),
            ..AnalysisForm::default()
        };
        assert_eq!(form.validate(), Err(AnalysisValidationError::TopicCount));

        let form = AnalysisForm {
            beta: "-0.1".into(),
            ..AnalysisForm::default()
        };
        assert_eq!(form.validate(), Err(AnalysisValidationError::Prior("Beta")));

        let form = AnalysisForm {
            threshold: "abc".into(),
            ..AnalysisForm::default()
        };
        assert_eq!(form.validate(), Err(AnalysisValidationError::Threshold));
    }

    #[test]
    fn messages_come_from_the_bundle() {
        assert_eq!(
            AnalysisValidationError::Prior("Beta").message(),
            "Beta must be a positive number, or left empty."
        );
        assert_eq!(
            AnalysisValidationError::MissingFile.message(),
            "Please select a PDF file."
        );
    }

    #[test]
    fn explicit_priors_are_kept() {
        let form = AnalysisForm {
            alpha: " 0.5 ".into(),
            ..AnalysisForm::default()
        };
        assert_eq!(form.validate().unwrap().alpha, Some(0.5));
    }

    #[test]
    fn adopting_a_sweep_winner_rewrites_k() {
        let mut form = AnalysisForm::default();
        form.adopt_topic_count(6);
        assert_eq!(form.k, "6");
        assert_eq!(form.validate().unwrap().k, 6);
    }
}
