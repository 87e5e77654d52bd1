//! Ordered pattern-matching HTTP router.
//!
//! This crate compiles Ant-style path patterns and resolves requests
//! against an ordered route table for the junction framework.
//!
//! # Features
//!
//! - Ant-style patterns (`?`, `*`, trailing `**`)
//! - Named captures (`{id}`, `:id`) with optional regex constraints
//! - First-match resolution in registration order
//! - 404 / 405 distinction with `Allow` lists

#![warn(unsafe_code)]

mod r#match;
mod pattern;
mod registry;
mod route;

pub use r#match::{AllowedMethods, RouteLookup, RouteMatch};
pub use pattern::{PathMatch, PathPattern, PatternError};
pub use registry::Router;
pub use route::Route;
