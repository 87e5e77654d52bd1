//! Request model: headers, body, and the request value itself.

use std::fmt;
use std::io::{self, Read};

use crate::media_type::{MediaType, MediaTypeError};
use crate::method::Method;

/// Ordered, case-insensitive header collection.
///
/// Names are lowercased on insertion. A name may appear more than once
/// (Accept and friends are legitimately repeatable); [`get`](Self::get)
/// returns the first value and [`get_all`](Self::get_all) every value in
/// insertion order.
#[derive(Debug, Default)]
pub struct Headers {
    inner: Vec<(String, Vec<u8>)>,
}

impl Headers {
    /// Create empty headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first value for a name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        let name = name.to_ascii_lowercase();
        self.inner
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Get the first value as UTF-8, if it is valid UTF-8.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Iterate over every value for a name, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a [u8]> {
        let name = name.to_ascii_lowercase();
        self.inner
            .iter()
            .filter(move |(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Insert a header, replacing any existing values for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        let name = name.into().to_ascii_lowercase();
        self.inner.retain(|(n, _)| *n != name);
        self.inner.push((name, value.into()));
    }

    /// Append a header, keeping existing values for the name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.inner.push((name.into().to_ascii_lowercase(), value.into()));
    }

    /// Whether any value exists for the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all headers as (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.inner
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_slice()))
    }

    /// Returns the number of header values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Request body.
///
/// Bodies arrive either fully buffered or as a byte stream handed over
/// by the transport. Conversion consumes the body; afterwards the
/// request holds [`Body::Empty`].
pub enum Body {
    /// No body.
    Empty,
    /// Fully buffered body.
    Bytes(Vec<u8>),
    /// Streaming body, read on demand.
    Stream(Box<dyn Read + Send>),
}

impl Body {
    /// Whether the body is known to be empty.
    ///
    /// A stream counts as non-empty; its length is unknown until read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(b) => b.is_empty(),
            Self::Stream(_) => false,
        }
    }

    /// Turn the body into a reader, consuming it.
    #[must_use]
    pub fn into_read(self) -> Box<dyn Read + Send> {
        match self {
            Self::Empty => Box::new(io::empty()),
            Self::Bytes(b) => Box::new(io::Cursor::new(b)),
            Self::Stream(r) => r,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// An incoming request, as handed over by the transport layer.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Body,
}

impl Request {
    /// Create a new request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: Headers::new(),
            body: Body::Empty,
        }
    }

    /// Get the request method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Get the request path (no query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Get the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Whether the request carries a body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Take the body, replacing it with [`Body::Empty`].
    pub fn take_body(&mut self) -> Body {
        std::mem::replace(&mut self.body, Body::Empty)
    }

    /// Set the body.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Set the query string.
    pub fn set_query(&mut self, query: Option<String>) {
        self.query = query;
    }

    /// Parse the Content-Type header, if present.
    ///
    /// A header that is not valid UTF-8 or not a media type is a client
    /// error and surfaces as [`MediaTypeError`].
    pub fn content_type(&self) -> Result<Option<MediaType>, MediaTypeError> {
        match self.headers.get("content-type") {
            None => Ok(None),
            Some(raw) => {
                let text = header_text(raw)?;
                MediaType::parse(text).map(Some)
            }
        }
    }

    /// Parse every Accept header into a flat list of requested types.
    ///
    /// Repeated Accept headers are concatenated in order. An absent
    /// Accept header yields an empty list, which negotiation treats as
    /// "accept anything".
    pub fn accept(&self) -> Result<Vec<MediaType>, MediaTypeError> {
        let mut out = Vec::new();
        for raw in self.headers.get_all("accept") {
            let text = header_text(raw)?;
            out.extend(MediaType::parse_list(text)?);
        }
        Ok(out)
    }
}

fn header_text(raw: &[u8]) -> Result<&str, MediaTypeError> {
    std::str::from_utf8(raw).map_err(|_| MediaTypeError::Malformed {
        input: String::from_utf8_lossy(raw).into_owned(),
    })
}
