//! Status region shared by every tool view.

use api::ApiError;

use crate::t;

/// What the status region under a tool's form currently says.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum StatusLine {
    #[default]
    Idle,
    Working(String),
    Done(String),
    Warning(String),
    Error(String),
}

impl StatusLine {
    pub fn working(message: impl Into<String>) -> Self {
        Self::Working(message.into())
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self::Done(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Service-reported errors are shown verbatim; transport trouble gets a
    /// generic lead-in with the technical detail appended.
    pub fn from_api_error(err: &ApiError) -> Self {
        if err.is_semantic() {
            Self::Error(err.to_string())
        } else {
            Self::Error(t!("status-request-failed", detail = err.to_string()))
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Idle | Self::Working(_) => "status-line",
            Self::Done(_) => "status-line status-line--success",
            Self::Warning(_) => "status-line status-line--warning",
            Self::Error(_) => "status-line status-line--error",
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Self::Idle => None,
            Self::Working(label) => Some(format!("{label}…")),
            Self::Done(message) => Some(format!("✅ {message}")),
            Self::Warning(message) | Self::Error(message) => Some(format!("⚠️ {message}")),
        }
    }
}
