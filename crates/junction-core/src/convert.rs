//! Body conversion: payload shapes, size-limited readers, commit-aware
//! writers, and the ordered converter registry.
//!
//! A [`BodyConverter`] bridges one or more media types and a set of
//! payload [`Shape`]s. The [`ConverterRegistry`] holds converters in
//! registration order and picks, per request, the first usable converter
//! whose declared types best match the concrete media type: an exact
//! declaration beats a wildcard one, and registration order breaks ties.

use std::fmt;
use std::io::{self, Read, Write};

use tracing::trace;

use crate::media_type::{MediaType, Specificity};

/// Default cap on buffered request bodies: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// The shape of a value crossing the conversion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
    /// A JSON document.
    Json,
    /// An opaque byte stream.
    Stream,
}

impl Shape {
    /// Lowercase label used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Json => "json",
            Self::Stream => "stream",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed body value, tagged with its shape.
pub enum Payload {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A JSON document.
    Json(serde_json::Value),
    /// An opaque byte stream, drained when written.
    Stream(Box<dyn Read + Send>),
}

impl Payload {
    /// Text payload.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Byte payload.
    #[must_use]
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// JSON payload.
    #[must_use]
    pub fn json(value: serde_json::Value) -> Self {
        Self::Json(value)
    }

    /// Stream payload.
    #[must_use]
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// The shape tag of this payload.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Text(_) => Shape::Text,
            Self::Bytes(_) => Shape::Bytes,
            Self::Json(_) => Shape::Json,
            Self::Stream(_) => Shape::Stream,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(&t.len()).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Error raised by body conversion.
#[derive(Debug)]
pub enum ConvertError {
    /// No registered converter reads the shape from the media type.
    NoReader {
        /// Request content type.
        media: MediaType,
        /// Requested payload shape.
        shape: Shape,
    },
    /// No registered converter writes the shape as the media type.
    NoWriter {
        /// Negotiated response type.
        media: MediaType,
        /// Payload shape to serialize.
        shape: Shape,
    },
    /// A converter was handed a shape it does not support.
    UnsupportedShape {
        /// Converter name.
        converter: &'static str,
        /// The unsupported shape.
        shape: Shape,
    },
    /// Body exceeded the configured size limit.
    TooLarge {
        /// Bytes seen before giving up.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// Body was not valid UTF-8 where text was required.
    InvalidUtf8,
    /// Body failed to parse in its declared format.
    Malformed {
        /// Parser diagnostic.
        detail: String,
    },
    /// A typed payload was already queued on the response.
    AlreadySent,
    /// Transport failure while reading or writing a body.
    Io(io::Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReader { media, shape } => {
                write!(f, "no converter reads {shape} from {media}")
            }
            Self::NoWriter { media, shape } => {
                write!(f, "no converter writes {shape} as {media}")
            }
            Self::UnsupportedShape { converter, shape } => {
                write!(f, "converter {converter} does not handle {shape} payloads")
            }
            Self::TooLarge { size, max } => {
                write!(f, "body of {size} bytes exceeds limit of {max} bytes")
            }
            Self::InvalidUtf8 => f.write_str("body is not valid UTF-8"),
            Self::Malformed { detail } => write!(f, "malformed body: {detail}"),
            Self::AlreadySent => f.write_str("a typed payload was already queued"),
            Self::Io(err) => write!(f, "body I/O error: {err}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConvertError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(io::Error::other(err))
        } else {
            Self::Malformed {
                detail: err.to_string(),
            }
        }
    }
}

/// Size-limited reader over a request body.
pub struct BodyReader<'a> {
    source: &'a mut dyn Read,
    max: usize,
}

impl<'a> BodyReader<'a> {
    /// Wrap a raw body source with a size limit.
    pub fn new(source: &'a mut dyn Read, max: usize) -> Self {
        Self { source, max }
    }

    /// Read the whole body, failing once it exceeds the limit.
    pub fn bytes(&mut self) -> Result<Vec<u8>, ConvertError> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = self.source.read(&mut chunk).map_err(ConvertError::Io)?;
            if n == 0 {
                break;
            }
            if buf.len() + n > self.max {
                return Err(ConvertError::TooLarge {
                    size: buf.len() + n,
                    max: self.max,
                });
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        Ok(buf)
    }

    /// Read the whole body as UTF-8 text.
    pub fn text(&mut self) -> Result<String, ConvertError> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes).map_err(|_| ConvertError::InvalidUtf8)
    }
}

/// Writer over the response output.
///
/// The first byte written flips the response's committed flag; after
/// that point a failure can no longer be turned into an error response.
pub struct BodyWriter<'a> {
    out: &'a mut dyn Write,
    committed: &'a mut bool,
}

impl<'a> BodyWriter<'a> {
    /// Wrap a raw output and its committed flag.
    pub fn new(out: &'a mut dyn Write, committed: &'a mut bool) -> Self {
        Self { out, committed }
    }

    /// Write a full byte slice.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), ConvertError> {
        if bytes.is_empty() {
            return Ok(());
        }
        *self.committed = true;
        self.out.write_all(bytes).map_err(ConvertError::Io)
    }

    /// Write a string slice.
    pub fn write_str(&mut self, text: &str) -> Result<(), ConvertError> {
        self.write_all(text.as_bytes())
    }

    /// Drain a reader into the response, returning the bytes copied.
    pub fn copy(&mut self, reader: &mut dyn Read) -> Result<u64, ConvertError> {
        let mut total = 0u64;
        let mut chunk = [0u8; 8192];
        loop {
            let n = reader.read(&mut chunk).map_err(ConvertError::Io)?;
            if n == 0 {
                break;
            }
            self.write_all(&chunk[..n])?;
            total += n as u64;
        }
        Ok(total)
    }
}

impl Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() {
            *self.committed = true;
        }
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// A bidirectional converter between payloads and raw bodies.
///
/// Implementations declare the media types they serve and the payload
/// shapes they can read and write. The registry consults the shape
/// predicates before ever calling [`read`](Self::read) or
/// [`write`](Self::write); a converter handed a shape outside its
/// predicate answers [`ConvertError::UnsupportedShape`].
pub trait BodyConverter: Send + Sync {
    /// The media types this converter serves.
    fn types(&self) -> &[MediaType];

    /// Whether this converter can produce payloads of the given shape.
    fn can_read(&self, shape: Shape) -> bool;

    /// Whether this converter can serialize payloads of the given shape.
    fn can_write(&self, shape: Shape) -> bool;

    /// Read a payload of the requested shape from a request body.
    fn read(&self, shape: Shape, reader: &mut BodyReader<'_>) -> Result<Payload, ConvertError>;

    /// Write a payload into a response body.
    fn write(&self, payload: Payload, writer: &mut BodyWriter<'_>) -> Result<(), ConvertError>;

    /// Diagnostic name.
    fn name(&self) -> &'static str;
}

/// Ordered converter registry.
///
/// Selection filters converters by their shape predicate and a
/// media-type match, then ranks the survivors by the specificity of the
/// best matching declared type. Registration order breaks ties, so
/// converters registered earlier shadow later ones for the same types.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Box<dyn BodyConverter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter at the end of the order.
    pub fn register<C: BodyConverter + 'static>(&mut self, converter: C) {
        self.converters.push(Box::new(converter));
    }

    /// Register an already-boxed converter at the end of the order.
    pub fn register_boxed(&mut self, converter: Box<dyn BodyConverter>) {
        self.converters.push(converter);
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Select the converter that reads `shape` from `media`.
    #[must_use]
    pub fn reader_for(&self, shape: Shape, media: &MediaType) -> Option<&dyn BodyConverter> {
        self.select(media, |c| c.can_read(shape))
    }

    /// Select the converter that writes `shape` as `media`.
    #[must_use]
    pub fn writer_for(&self, shape: Shape, media: &MediaType) -> Option<&dyn BodyConverter> {
        self.select(media, |c| c.can_write(shape))
    }

    /// Read a payload, selecting the appropriate converter.
    pub fn read(
        &self,
        shape: Shape,
        media: &MediaType,
        reader: &mut BodyReader<'_>,
    ) -> Result<Payload, ConvertError> {
        match self.reader_for(shape, media) {
            Some(converter) => {
                trace!(converter = converter.name(), media = %media, shape = %shape, "reading body");
                converter.read(shape, reader)
            }
            None => Err(ConvertError::NoReader {
                media: media.clone(),
                shape,
            }),
        }
    }

    /// Write a payload, selecting the appropriate converter.
    pub fn write(
        &self,
        payload: Payload,
        media: &MediaType,
        writer: &mut BodyWriter<'_>,
    ) -> Result<(), ConvertError> {
        let shape = payload.shape();
        match self.writer_for(shape, media) {
            Some(converter) => {
                trace!(converter = converter.name(), media = %media, shape = %shape, "writing body");
                converter.write(payload, writer)
            }
            None => Err(ConvertError::NoWriter {
                media: media.clone(),
                shape,
            }),
        }
    }

    fn select(
        &self,
        media: &MediaType,
        mut usable: impl FnMut(&dyn BodyConverter) -> bool,
    ) -> Option<&dyn BodyConverter> {
        let mut best: Option<(Specificity, usize)> = None;
        for (idx, converter) in self.converters.iter().enumerate() {
            if !usable(converter.as_ref()) {
                continue;
            }
            let Some(spec) = converter
                .types()
                .iter()
                .filter(|t| t.matches(media))
                .map(MediaType::specificity)
                .max()
            else {
                continue;
            };
            match best {
                // Earlier registration wins ties.
                Some((s, _)) if s >= spec => {}
                _ => best = Some((spec, idx)),
            }
        }
        best.map(|(_, idx)| self.converters[idx].as_ref())
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.converters.iter().map(|c| c.name()).collect();
        f.debug_struct("ConverterRegistry")
            .field("converters", &names)
            .finish()
    }
}
