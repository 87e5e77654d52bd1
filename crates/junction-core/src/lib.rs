//! Core types and traits for the Junction dispatch framework.
//!
//! This crate provides the fundamental building blocks:
//! - [`Request`] and [`Response`] types with multi-value headers
//! - [`MediaType`] parsing, wildcard matching, and content negotiation
//! - The body-conversion pipeline: [`BodyConverter`], [`ConverterRegistry`],
//!   and the built-in fallback converters
//! - The handler contract: [`Handler`] and [`Exchange`]
//!
//! # Design Principles
//!
//! - No runtime reflection: payloads carry an explicit [`Shape`] tag
//! - Registries are immutable once built and shared by reference
//! - Converter I/O may block; the worker model belongs to the transport
//! - Routing decisions are data ([`Verb`], [`MediaType`] lists), not
//!   callbacks

#![forbid(unsafe_code)]

mod convert;
mod error;
mod exchange;
mod fallback;
mod json;
mod media_type;
mod method;
mod negotiate;
mod request;
mod response;

pub use convert::{
    BodyConverter, BodyReader, BodyWriter, ConvertError, ConverterRegistry, DEFAULT_MAX_BODY_SIZE,
    Payload, Shape,
};
pub use error::HttpError;
pub use exchange::{Exchange, Handler, PathVars};
pub use fallback::{CopyBytes, CopyText, ReadText, RenderDebug, fallback_converters};
pub use json::JsonConverter;
pub use media_type::{MediaType, MediaTypeError, Specificity};
pub use method::{Method, Verb};
pub use negotiate::{accepts, negotiate_produces};
pub use request::{Body, Headers, Request};
pub use response::{Response, StatusCode};
