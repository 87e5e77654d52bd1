//! Built-in converters of last resort.
//!
//! Registered after user converters in a fixed order: text copy, byte
//! copy, text read, then an HTML debug rendering. Together they keep
//! plain-text and raw-byte handlers working without any explicit
//! converter registration.

use crate::convert::{BodyConverter, BodyReader, BodyWriter, ConvertError, Payload, Shape};
use crate::media_type::MediaType;

/// The built-in converters, in registration order.
#[must_use]
pub fn fallback_converters() -> Vec<Box<dyn BodyConverter>> {
    vec![
        Box::new(CopyText::new()),
        Box::new(CopyBytes::new()),
        Box::new(ReadText::new()),
        Box::new(RenderDebug::new()),
    ]
}

/// Writes text payloads verbatim to text-like targets.
pub struct CopyText {
    types: Vec<MediaType>,
}

impl CopyText {
    /// Converter serving `text/*` and the textual application types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: vec![
                MediaType::text(),
                MediaType::json(),
                MediaType::javascript(),
                MediaType::xml(),
            ],
        }
    }
}

impl Default for CopyText {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyConverter for CopyText {
    fn types(&self) -> &[MediaType] {
        &self.types
    }

    fn can_read(&self, _: Shape) -> bool {
        false
    }

    fn can_write(&self, shape: Shape) -> bool {
        shape == Shape::Text
    }

    fn read(&self, shape: Shape, _: &mut BodyReader<'_>) -> Result<Payload, ConvertError> {
        Err(ConvertError::UnsupportedShape {
            converter: self.name(),
            shape,
        })
    }

    fn write(&self, payload: Payload, writer: &mut BodyWriter<'_>) -> Result<(), ConvertError> {
        match payload {
            Payload::Text(text) => writer.write_str(&text),
            other => Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape: other.shape(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "copy-text"
    }
}

/// Copies byte and stream payloads to any target, and reads raw bytes.
pub struct CopyBytes {
    types: Vec<MediaType>,
}

impl CopyBytes {
    /// Converter serving every media type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: vec![MediaType::any()],
        }
    }
}

impl Default for CopyBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyConverter for CopyBytes {
    fn types(&self) -> &[MediaType] {
        &self.types
    }

    fn can_read(&self, shape: Shape) -> bool {
        shape == Shape::Bytes
    }

    fn can_write(&self, shape: Shape) -> bool {
        matches!(shape, Shape::Bytes | Shape::Stream)
    }

    fn read(&self, shape: Shape, reader: &mut BodyReader<'_>) -> Result<Payload, ConvertError> {
        if shape == Shape::Bytes {
            Ok(Payload::Bytes(reader.bytes()?))
        } else {
            Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape,
            })
        }
    }

    fn write(&self, payload: Payload, writer: &mut BodyWriter<'_>) -> Result<(), ConvertError> {
        match payload {
            Payload::Bytes(bytes) => writer.write_all(&bytes),
            Payload::Stream(mut reader) => {
                writer.copy(reader.as_mut())?;
                Ok(())
            }
            other => Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape: other.shape(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "copy-bytes"
    }
}

/// Reads request bodies as UTF-8 text regardless of content type.
pub struct ReadText {
    types: Vec<MediaType>,
}

impl ReadText {
    /// Converter serving every media type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: vec![MediaType::any()],
        }
    }
}

impl Default for ReadText {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyConverter for ReadText {
    fn types(&self) -> &[MediaType] {
        &self.types
    }

    fn can_read(&self, shape: Shape) -> bool {
        shape == Shape::Text
    }

    fn can_write(&self, _: Shape) -> bool {
        false
    }

    fn read(&self, shape: Shape, reader: &mut BodyReader<'_>) -> Result<Payload, ConvertError> {
        if shape == Shape::Text {
            Ok(Payload::Text(reader.text()?))
        } else {
            Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape,
            })
        }
    }

    fn write(&self, payload: Payload, _: &mut BodyWriter<'_>) -> Result<(), ConvertError> {
        Err(ConvertError::UnsupportedShape {
            converter: self.name(),
            shape: payload.shape(),
        })
    }

    fn name(&self) -> &'static str {
        "read-text"
    }
}

/// Renders structured payloads as a minimal HTML page.
///
/// The last resort for a JSON payload negotiated into `text/html`:
/// browsers hitting an API route get a readable page instead of a
/// missing-converter failure.
pub struct RenderDebug {
    types: Vec<MediaType>,
}

impl RenderDebug {
    /// Converter serving `text/html`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: vec![MediaType::html()],
        }
    }
}

impl Default for RenderDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyConverter for RenderDebug {
    fn types(&self) -> &[MediaType] {
        &self.types
    }

    fn can_read(&self, _: Shape) -> bool {
        false
    }

    fn can_write(&self, shape: Shape) -> bool {
        shape == Shape::Json
    }

    fn read(&self, shape: Shape, _: &mut BodyReader<'_>) -> Result<Payload, ConvertError> {
        Err(ConvertError::UnsupportedShape {
            converter: self.name(),
            shape,
        })
    }

    fn write(&self, payload: Payload, writer: &mut BodyWriter<'_>) -> Result<(), ConvertError> {
        match payload {
            Payload::Json(value) => {
                let rendered = serde_json::to_string_pretty(&value).map_err(ConvertError::from)?;
                writer.write_str("<!DOCTYPE html>\n<html><body><pre>")?;
                writer.write_str(&escape_html(&rendered))?;
                writer.write_str("</pre></body></html>\n")
            }
            other => Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape: other.shape(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "render-debug"
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConverterRegistry;
    use std::io::Cursor;

    fn registry() -> ConverterRegistry {
        let mut registry = ConverterRegistry::new();
        for converter in fallback_converters() {
            registry.register_boxed(converter);
        }
        registry
    }

    fn write_with(registry: &ConverterRegistry, payload: Payload, media: &MediaType) -> Vec<u8> {
        let mut out = Vec::new();
        let mut committed = false;
        {
            let mut writer = BodyWriter::new(&mut out, &mut committed);
            registry.write(payload, media, &mut writer).unwrap();
        }
        out
    }

    #[test]
    fn order_and_names() {
        let names: Vec<_> = fallback_converters().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["copy-text", "copy-bytes", "read-text", "render-debug"]);
    }

    #[test]
    fn copy_text_serves_text_like_targets() {
        let registry = registry();
        for media in [
            MediaType::plain(),
            MediaType::html(),
            MediaType::css(),
            MediaType::json(),
            MediaType::javascript(),
            MediaType::xml(),
        ] {
            let chosen = registry.writer_for(Shape::Text, &media).unwrap();
            assert_eq!(chosen.name(), "copy-text", "target {media}");
        }
    }

    #[test]
    fn text_to_binary_target_has_no_writer() {
        let registry = registry();
        assert!(registry
            .writer_for(Shape::Text, &MediaType::octet_stream())
            .is_none());
    }

    #[test]
    fn copy_text_writes_verbatim() {
        let out = write_with(&registry(), Payload::text("<b>hi</b>"), &MediaType::html());
        assert_eq!(out, b"<b>hi</b>");
    }

    #[test]
    fn copy_bytes_serves_any_target() {
        let registry = registry();
        let chosen = registry
            .writer_for(Shape::Bytes, &MediaType::new("image", "png"))
            .unwrap();
        assert_eq!(chosen.name(), "copy-bytes");
    }

    #[test]
    fn copy_bytes_drains_streams() {
        let payload = Payload::stream(Cursor::new(b"chunked".to_vec()));
        let out = write_with(&registry(), payload, &MediaType::octet_stream());
        assert_eq!(out, b"chunked");
    }

    #[test]
    fn copy_bytes_reads_raw_bodies() {
        let registry = registry();
        let mut source = Cursor::new(b"raw".to_vec());
        let mut reader = BodyReader::new(&mut source, 64);
        let payload = registry
            .read(Shape::Bytes, &MediaType::octet_stream(), &mut reader)
            .unwrap();
        assert!(matches!(payload, Payload::Bytes(b) if b == b"raw"));
    }

    #[test]
    fn read_text_reads_any_content_type() {
        let registry = registry();
        let mut source = Cursor::new(b"plain words".to_vec());
        let mut reader = BodyReader::new(&mut source, 64);
        let payload = registry
            .read(Shape::Text, &MediaType::new("application", "vnd.custom"), &mut reader)
            .unwrap();
        assert!(matches!(payload, Payload::Text(t) if t == "plain words"));
    }

    #[test]
    fn json_to_html_uses_debug_rendering() {
        let registry = registry();
        let chosen = registry.writer_for(Shape::Json, &MediaType::html()).unwrap();
        assert_eq!(chosen.name(), "render-debug");

        let out = write_with(
            &registry,
            Payload::json(serde_json::json!({"tag": "<script>"})),
            &MediaType::html(),
        );
        let page = String::from_utf8(out).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn json_to_json_has_no_fallback_writer() {
        // JSON serialization is opt-in; the fallbacks do not cover it.
        let registry = registry();
        assert!(registry.writer_for(Shape::Json, &MediaType::json()).is_none());
    }

    #[test]
    fn unsupported_shape_is_reported() {
        let converter = CopyText::new();
        let mut out = Vec::new();
        let mut committed = false;
        let mut writer = BodyWriter::new(&mut out, &mut committed);
        match converter.write(Payload::bytes(vec![1, 2]), &mut writer) {
            Err(ConvertError::UnsupportedShape { converter: "copy-text", shape: Shape::Bytes }) => {}
            other => panic!("expected UnsupportedShape, got {other:?}"),
        }
    }

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(escape_html("a & b < c > d"), "a &amp; b &lt; c &gt; d");
        assert_eq!(escape_html("clean"), "clean");
    }
}
