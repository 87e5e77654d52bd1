//! Opt-in JSON body conversion.
//!
//! Not part of the fallback set: applications that speak JSON register
//! [`JsonConverter`] explicitly, and it takes precedence over the
//! fallbacks for `application/json` because user converters come first.
//!
//! # Example
//!
//! ```
//! use junction_core::{ConverterRegistry, JsonConverter, MediaType, Shape};
//!
//! let mut registry = ConverterRegistry::new();
//! registry.register(JsonConverter::new());
//! assert!(registry.reader_for(Shape::Json, &MediaType::json()).is_some());
//! ```

use crate::convert::{BodyConverter, BodyReader, BodyWriter, ConvertError, Payload, Shape};
use crate::media_type::MediaType;

/// Reads and writes JSON documents for `application/json`.
pub struct JsonConverter {
    types: Vec<MediaType>,
}

impl JsonConverter {
    /// Converter serving `application/json`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: vec![MediaType::json()],
        }
    }
}

impl Default for JsonConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyConverter for JsonConverter {
    fn types(&self) -> &[MediaType] {
        &self.types
    }

    fn can_read(&self, shape: Shape) -> bool {
        shape == Shape::Json
    }

    fn can_write(&self, shape: Shape) -> bool {
        shape == Shape::Json
    }

    fn read(&self, shape: Shape, reader: &mut BodyReader<'_>) -> Result<Payload, ConvertError> {
        if shape != Shape::Json {
            return Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape,
            });
        }
        let bytes = reader.bytes()?;
        let value = serde_json::from_slice(&bytes).map_err(ConvertError::from)?;
        Ok(Payload::Json(value))
    }

    fn write(&self, payload: Payload, writer: &mut BodyWriter<'_>) -> Result<(), ConvertError> {
        match payload {
            Payload::Json(value) => {
                let body = serde_json::to_string(&value).map_err(ConvertError::from)?;
                writer.write_str(&body)
            }
            other => Err(ConvertError::UnsupportedShape {
                converter: self.name(),
                shape: other.shape(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
