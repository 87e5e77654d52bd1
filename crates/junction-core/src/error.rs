//! The error type carried from handlers and conversion to the response
//! boundary.

use std::fmt;

use crate::convert::ConvertError;
use crate::media_type::MediaTypeError;
use crate::response::StatusCode;

/// An error with an HTTP status attached.
///
/// Every failure the dispatcher can see funnels into this type. The
/// status decides the response code; the message feeds the rendered
/// error body. Client-input failures map to 4xx, configuration failures
/// (a missing converter, a double send) to 500.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HttpError {
    /// Create an error with an explicit status.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The response status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ConvertError> for HttpError {
    fn from(err: ConvertError) -> Self {
        let status = match &err {
            ConvertError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ConvertError::InvalidUtf8 | ConvertError::Malformed { .. } | ConvertError::Io(_) => {
                StatusCode::BAD_REQUEST
            }
            ConvertError::NoReader { .. }
            | ConvertError::NoWriter { .. }
            | ConvertError::UnsupportedShape { .. }
            | ConvertError::AlreadySent => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = err.to_string();
        Self::new(status, message).with_source(err)
    }
}

impl From<MediaTypeError> for HttpError {
    fn from(err: MediaTypeError) -> Self {
        let message = err.to_string();
        Self::bad_request(message).with_source(err)
    }
}
