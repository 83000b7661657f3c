use thiserror::Error;

/// Failures surfaced by [`crate::NumericClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service could not be reached or the connection broke mid-request.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// The service answered normally but reported an error in the body.
    #[error("{0}")]
    Service(String),

    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True for errors the service itself reported, as opposed to transport
    /// or decoding trouble on our side.
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Service(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_service_errors_are_semantic() {
        assert!(ApiError::Service("empty vocabulary".into()).is_semantic());
        assert!(!ApiError::Status(502).is_semantic());
    }

    #[test]
    fn service_message_is_shown_verbatim() {
        let err = ApiError::Service("El vocabulario está vacío.".into());
        assert_eq!(err.to_string(), "El vocabulario está vacío.");
    }
}
