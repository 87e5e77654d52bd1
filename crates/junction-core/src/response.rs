//! Response model: status codes and the response value handed to
//! handlers.

use std::fmt;
use std::io::Write;

use crate::convert::{BodyWriter, ConvertError, Payload};
use crate::request::Headers;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: Self = Self(200);
    /// 201 Created
    pub const CREATED: Self = Self(201);
    /// 204 No Content
    pub const NO_CONTENT: Self = Self(204);
    /// 400 Bad Request
    pub const BAD_REQUEST: Self = Self(400);
    /// 404 Not Found
    pub const NOT_FOUND: Self = Self(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    /// 406 Not Acceptable
    pub const NOT_ACCEPTABLE: Self = Self(406);
    /// 413 Payload Too Large
    pub const PAYLOAD_TOO_LARGE: Self = Self(413);
    /// 415 Unsupported Media Type
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self(415);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Wrap a numeric status code.
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    /// The numeric code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The canonical reason phrase.
    #[must_use]
    pub fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            409 => "Conflict",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }

    /// Whether this is a 2xx code.
    #[must_use]
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Whether this is a 4xx code.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Whether this is a 5xx code.
    #[must_use]
    pub fn is_server_error(self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

enum Output {
    Buffer(Vec<u8>),
    Sink(Box<dyn Write + Send>),
}

impl Output {
    fn as_write(&mut self) -> &mut dyn Write {
        match self {
            Self::Buffer(buf) => buf,
            Self::Sink(sink) => sink.as_mut(),
        }
    }
}

/// An outgoing response.
///
/// The body goes to either an in-memory buffer (the default, used by the
/// test client) or a caller-supplied sink for streaming transports.
/// Handlers produce the body one of two ways: queue a typed payload with
/// [`send`](Self::send) and let conversion serialize it afterwards, or
/// write raw bytes directly. The first raw byte commits the response;
/// from then on the status line and headers are assumed to be on the
/// wire and failures can only be logged.
pub struct Response {
    status: StatusCode,
    headers: Headers,
    out: Output,
    committed: bool,
    pending: Option<Payload>,
}

impl Response {
    /// A buffered 200 response with no headers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Headers::new(),
            out: Output::Buffer(Vec::new()),
            committed: false,
            pending: None,
        }
    }

    /// A 200 response writing its body to the given sink.
    #[must_use]
    pub fn streaming(sink: Box<dyn Write + Send>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: Headers::new(),
            out: Output::Sink(sink),
            committed: false,
            pending: None,
        }
    }

    /// Current status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Set the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Whether body bytes have been emitted.
    #[must_use]
    pub fn committed(&self) -> bool {
        self.committed
    }

    /// Queue a typed payload for conversion once the handler returns.
    ///
    /// Only one payload may be queued per response.
    pub fn send(&mut self, payload: Payload) -> Result<(), ConvertError> {
        if self.pending.is_some() {
            return Err(ConvertError::AlreadySent);
        }
        self.pending = Some(payload);
        Ok(())
    }

    /// Whether a typed payload is queued.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the queued payload, if any.
    pub fn take_pending(&mut self) -> Option<Payload> {
        self.pending.take()
    }

    /// Write raw bytes, bypassing conversion. Commits the response.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConvertError> {
        self.body_writer().write_all(bytes)
    }

    /// Write raw text, bypassing conversion. Commits the response.
    pub fn write_text(&mut self, text: &str) -> Result<(), ConvertError> {
        self.write_bytes(text.as_bytes())
    }

    /// A body writer over this response's output.
    pub fn body_writer(&mut self) -> BodyWriter<'_> {
        let Self { out, committed, .. } = self;
        BodyWriter::new(out.as_write(), committed)
    }

    /// The buffered body, or `None` when writing to a sink.
    #[must_use]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.out {
            Output::Buffer(buf) => Some(buf),
            Output::Sink(_) => None,
        }
    }

    /// Split a buffered response into status, headers, and body.
    ///
    /// A sink-backed response yields an empty body; its bytes already
    /// went to the sink.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Headers, Vec<u8>) {
        let body = match self.out {
            Output::Buffer(buf) => buf,
            Output::Sink(_) => Vec::new(),
        };
        (self.status, self.headers, body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("committed", &self.committed)
            .field("pending", &self.pending)
            .finish()
    }
}
