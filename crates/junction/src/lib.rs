//! Content-negotiating request dispatch for Rust services.
//!
//! junction resolves requests through an ordered pattern table,
//! negotiates media types in both directions, and converts bodies
//! through a ranked converter registry:
//!
//! - **Ordered routing** — Ant-style patterns, first match wins, with a
//!   404 / 405 distinction and `Allow` lists
//! - **Bidirectional negotiation** — Accept and Content-Type, with
//!   wildcards, q-values, and declaration-order tie-breaking
//! - **Typed payloads** — handlers exchange text, bytes, JSON, and
//!   streams; converters produce the wire bytes
//! - **No transport opinion** — feed it requests from any source;
//!   buffered and streaming responses both work
//!
//! # Quick Start
//!
//! ```
//! use junction::prelude::*;
//! use junction::testing::TestClient;
//!
//! let app = App::builder()
//!     .converter(JsonConverter::new())
//!     .route(Route::get("/user/{id}", |ex: &mut Exchange<'_>| {
//!         let id = ex.param("id").unwrap_or("unknown").to_string();
//!         ex.send(Payload::json(serde_json::json!({ "id": id })))
//!     }).unwrap())
//!     .build();
//!
//! let client = TestClient::new(app);
//! let response = client.get("/user/7").send();
//! assert_eq!(response.status().as_u16(), 200);
//! assert_eq!(response.header("content-type"), Some("application/json"));
//! ```
//!
//! # Design Philosophy
//!
//! 1. **Order is precedence** — routes match in registration order;
//!    register exact paths before the patterns that would swallow them
//! 2. **Fail at registration** — bad patterns are rejected when the
//!    route is built, never at request time
//! 3. **Explicit wiring** — the route table, converter registry, and
//!    configuration are plain values handed to the dispatcher; no
//!    globals
//! 4. **Lazy bodies** — request bodies are only read, limited, and
//!    converted when a handler asks
//!
//! # Crate Structure
//!
//! - [`junction_core`] — media types, negotiation, body conversion, the
//!   handler exchange
//! - [`junction_router`] — path patterns and the ordered route table
//! - this crate — the application facade, the dispatcher, and the test
//!   client

#![forbid(unsafe_code)]

mod app;
mod dispatch;
pub mod testing;

// Re-export crates
pub use junction_core as core;
pub use junction_router as router;

// Re-export commonly used types
pub use junction_core::{
    Body, BodyConverter, BodyReader, BodyWriter, ConvertError, ConverterRegistry, CopyBytes,
    CopyText, DEFAULT_MAX_BODY_SIZE, Exchange, Handler, Headers, HttpError, JsonConverter,
    MediaType, MediaTypeError, Method, Payload, PathVars, ReadText, RenderDebug, Request,
    Response, Shape, Specificity, StatusCode, Verb, accepts, fallback_converters,
    negotiate_produces,
};
pub use junction_router::{
    AllowedMethods, PathMatch, PathPattern, PatternError, Route, RouteLookup, RouteMatch, Router,
};

pub use app::{App, AppBuilder, AppConfig};
pub use dispatch::Dispatcher;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        App, AppBuilder, AppConfig, Dispatcher, Exchange, Handler, HttpError, JsonConverter,
        MediaType, Method, Payload, Request, Response, Route, Router, Shape, StatusCode, Verb,
    };
    pub use serde::{Deserialize, Serialize};
}
