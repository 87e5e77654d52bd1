//! The per-request exchange handed to handlers.
//!
//! An [`Exchange`] bundles the matched request, the response under
//! construction, the path captures, and the negotiated media types. The
//! request body is not read until the handler asks for it through
//! [`Exchange::body`], so routes that ignore their body never pay for
//! conversion.

use tracing::trace;

use crate::convert::{BodyReader, ConverterRegistry, Payload, Shape};
use crate::error::HttpError;
use crate::media_type::MediaType;
use crate::request::Request;
use crate::response::Response;

/// Path captures for a matched route.
///
/// Owned name/value pairs in pattern order, plus the remainder captured
/// by a trailing wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars {
    vars: Vec<(String, String)>,
    tail: Option<String>,
}

impl PathVars {
    /// Build from captured pairs and an optional wildcard remainder.
    #[must_use]
    pub fn new(vars: Vec<(String, String)>, tail: Option<String>) -> Self {
        Self { vars, tail }
    }

    /// Look up a capture by variable name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The remainder captured by a trailing wildcard, if the pattern had
    /// one. Empty when the wildcard matched zero segments.
    #[must_use]
    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    /// Iterate over captures in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of named captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether there are no named captures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Everything a handler can reach about one request.
#[derive(Debug)]
pub struct Exchange<'a> {
    request: &'a mut Request,
    response: &'a mut Response,
    vars: PathVars,
    produces: Option<MediaType>,
    content_type: Option<MediaType>,
    converters: &'a ConverterRegistry,
    max_body_size: usize,
}

impl<'a> Exchange<'a> {
    /// Assemble an exchange for one dispatch.
    pub fn new(
        request: &'a mut Request,
        response: &'a mut Response,
        vars: PathVars,
        produces: Option<MediaType>,
        content_type: Option<MediaType>,
        converters: &'a ConverterRegistry,
        max_body_size: usize,
    ) -> Self {
        Self {
            request,
            response,
            vars,
            produces,
            content_type,
            converters,
            max_body_size,
        }
    }

    /// The request being handled.
    #[must_use]
    pub fn request(&self) -> &Request {
        self.request
    }

    /// The response under construction.
    #[must_use]
    pub fn response(&self) -> &Response {
        self.response
    }

    /// Mutable access to the response, for status and headers.
    pub fn response_mut(&mut self) -> &mut Response {
        self.response
    }

    /// All path captures.
    #[must_use]
    pub fn vars(&self) -> &PathVars {
        &self.vars
    }

    /// A single path capture by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.vars.get(name)
    }

    /// The trailing-wildcard remainder, if the route pattern had one.
    #[must_use]
    pub fn tail(&self) -> Option<&str> {
        self.vars.tail()
    }

    /// The media type negotiated for the response, if the route declares
    /// producible types.
    #[must_use]
    pub fn produces(&self) -> Option<&MediaType> {
        self.produces.as_ref()
    }

    /// The parsed request content type, if one was sent.
    #[must_use]
    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    /// Read and convert the request body into the given shape.
    ///
    /// The body is consumed on first use; a second call sees an empty
    /// body. Requests without a Content-Type convert as
    /// `application/octet-stream`.
    pub fn body(&mut self, shape: Shape) -> Result<Payload, HttpError> {
        let media = self
            .content_type
            .clone()
            .unwrap_or_else(MediaType::octet_stream);
        trace!(shape = %shape, media = %media, "reading request body");
        let mut source = self.request.take_body().into_read();
        let mut reader = BodyReader::new(source.as_mut(), self.max_body_size);
        self.converters
            .read(shape, &media, &mut reader)
            .map_err(HttpError::from)
    }

    /// The request body as UTF-8 text.
    pub fn body_text(&mut self) -> Result<String, HttpError> {
        match self.body(Shape::Text)? {
            Payload::Text(text) => Ok(text),
            other => Err(converter_shape_mismatch(Shape::Text, &other)),
        }
    }

    /// The request body as raw bytes.
    pub fn body_bytes(&mut self) -> Result<Vec<u8>, HttpError> {
        match self.body(Shape::Bytes)? {
            Payload::Bytes(bytes) => Ok(bytes),
            other => Err(converter_shape_mismatch(Shape::Bytes, &other)),
        }
    }

    /// The request body as a JSON document.
    pub fn body_json(&mut self) -> Result<serde_json::Value, HttpError> {
        match self.body(Shape::Json)? {
            Payload::Json(value) => Ok(value),
            other => Err(converter_shape_mismatch(Shape::Json, &other)),
        }
    }

    /// Queue a typed payload on the response.
    ///
    /// Conversion happens after the handler returns, against the
    /// negotiated media type.
    pub fn send(&mut self, payload: Payload) -> Result<(), HttpError> {
        self.response.send(payload).map_err(HttpError::from)
    }
}

fn converter_shape_mismatch(requested: Shape, got: &Payload) -> HttpError {
    HttpError::internal(format!(
        "converter returned a {} payload for a {requested} read",
        got.shape()
    ))
}

/// A request handler.
///
/// Implemented by any `Fn(&mut Exchange) -> Result<(), HttpError>` that
/// is `Send + Sync`, so plain closures work:
///
/// ```
/// use junction_core::{Exchange, Handler, HttpError, Payload};
///
/// let handler = |ex: &mut Exchange<'_>| -> Result<(), HttpError> {
///     ex.send(Payload::text("hello"))
/// };
/// let _boxed: Box<dyn Handler> = Box::new(handler);
/// ```
pub trait Handler: Send + Sync {
    /// Handle one exchange.
    fn handle(&self, exchange: &mut Exchange<'_>) -> Result<(), HttpError>;
}

impl<F> Handler for F
where
    F: Fn(&mut Exchange<'_>) -> Result<(), HttpError> + Send + Sync,
{
    fn handle(&self, exchange: &mut Exchange<'_>) -> Result<(), HttpError> {
        self(exchange)
    }
}
