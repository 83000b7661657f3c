//! Wire types shared by the client and the UI crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One ranked word (or token) inside a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub label: String,
    pub weight: f64,
}

/// One topic as returned by the service. Entries arrive sorted by weight,
/// highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicItem {
    pub id: u32,
    pub entries: Vec<TopicEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub items: Vec<TopicItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy_trace: Option<Vec<f64>>,
}

/// How the uploaded document is cut into documents before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    #[default]
    Chapters,
    Pages,
}

impl SplitStrategy {
    pub const ALL: [SplitStrategy; 2] = [SplitStrategy::Chapters, SplitStrategy::Pages];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chapters => "chapters",
            Self::Pages => "pages",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for `analyze-topics`. `alpha`/`beta` left empty let the service
/// pick its own priors.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub k: u32,
    pub iterations: u32,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub threshold: f64,
    pub patience: u32,
    pub split: SplitStrategy,
}

impl AnalysisParams {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("k", self.k.to_string()),
            ("iterations", self.iterations.to_string()),
            ("threshold", self.threshold.to_string()),
            ("patience", self.patience.to_string()),
            ("split", self.split.to_string()),
        ];
        if let Some(alpha) = self.alpha {
            fields.push(("alpha", alpha.to_string()));
        }
        if let Some(beta) = self.beta {
            fields.push(("beta", beta.to_string()));
        }
        fields
    }
}

/// Upper bound of a sweep: either a relative-improvement threshold in percent
/// or an explicit last parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepBound {
    Threshold(f64),
    End(u32),
}

impl SweepBound {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Threshold(_) => "threshold",
            Self::End(_) => "end",
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Threshold(pct) => pct.to_string(),
            Self::End(end) => end.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepParams {
    pub split: SplitStrategy,
    pub start: u32,
    pub bound: SweepBound,
    pub step: u32,
    pub repetitions: u32,
}

impl SweepParams {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("split", self.split.to_string()),
            ("sweepStart", self.start.to_string()),
            ("sweepMode", self.bound.mode().to_string()),
            ("sweepBound", self.bound.value()),
            ("sweepStep", self.step.to_string()),
            ("repetitions", self.repetitions.to_string()),
        ]
    }
}

/// One evaluated candidate of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub parameter: u32,
    pub mean_score: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkovRequest {
    pub source_text: String,
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub token: String,
    pub probability: f64,
}

/// Empirical distribution of the tokens that follow `source_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEntry {
    pub source_token: String,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkovResult {
    pub generated_text: String,
    #[serde(default)]
    pub transition_matrix: Vec<TransitionEntry>,
}

/// Target distribution for the sampler, with its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "distribution", rename_all = "lowercase")]
pub enum Distribution {
    Bimodal,
    Bivariate,
    Poisson { lambda: f64 },
    Binomial { n: u32, p: f64 },
    Beta { alpha: f64, beta: f64 },
    Student { nu: f64 },
    Chi2 { k: f64 },
    Fisher { d1: f64, d2: f64 },
}

impl Distribution {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bimodal => "bimodal",
            Self::Bivariate => "bivariate",
            Self::Poisson { .. } => "poisson",
            Self::Binomial { .. } => "binomial",
            Self::Beta { .. } => "beta",
            Self::Student { .. } => "student",
            Self::Chi2 { .. } => "chi2",
            Self::Fisher { .. } => "fisher",
        }
    }

    /// Discrete targets get integer-step proposals on the service side.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Poisson { .. } | Self::Binomial { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetropolisRequest {
    #[serde(flatten)]
    pub distribution: Distribution,
    pub iterations: u32,
    pub start_x: f64,
    pub start_y: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetropolisResult {
    /// Percentage of accepted proposals.
    pub acceptance_rate: f64,
    pub sample_series_x: Vec<f64>,
    pub histogram_x: Vec<f64>,
    pub histogram_y: Vec<f64>,
    #[serde(default)]
    pub surface_x: Vec<f64>,
    #[serde(default)]
    pub surface_y: Vec<f64>,
    /// Rows follow `surface_y`, columns follow `surface_x`.
    #[serde(default)]
    pub surface_z: Vec<Vec<f64>>,
}
