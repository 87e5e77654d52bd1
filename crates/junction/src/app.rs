//! Application assembly.

use std::fmt;

use junction_core::{
    BodyConverter, ConverterRegistry, DEFAULT_MAX_BODY_SIZE, Request, Response,
    fallback_converters,
};
use junction_router::{Route, Router};
use tracing::info;

use crate::dispatch::Dispatcher;

/// Application-level settings.
///
/// Fields are public for direct reads; the setters keep construction
/// fluent.
///
/// # Example
///
/// ```
/// use junction::AppConfig;
///
/// let config = AppConfig::new()
///     .name("files-api")
///     .version("1.2.0")
///     .max_body_size(4 * 1024 * 1024);
/// assert_eq!(config.name, "files-api");
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application name, used in logs.
    pub name: String,
    /// Application version string.
    pub version: String,
    /// Include server-side error detail in 5xx bodies. Off by default:
    /// clients see only the canonical reason phrase.
    pub debug: bool,
    /// Upper bound for buffered request bodies, in bytes.
    pub max_body_size: usize,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "junction".to_string(),
            version: "0.1.0".to_string(),
            debug: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Set the application name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the version string.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Toggle detailed 5xx error bodies.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the request body size limit in bytes.
    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects routes, converters, and configuration, then assembles an
/// [`App`].
///
/// Converters registered here take precedence over the built-in
/// fallbacks, which are appended last at build time.
pub struct AppBuilder {
    config: AppConfig,
    router: Router,
    converters: Vec<Box<dyn BodyConverter>>,
}

impl AppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AppConfig::new(),
            router: Router::new(),
            converters: Vec::new(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a route. Registration order is match precedence.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.router.route(route);
        self
    }

    /// Register a body converter ahead of the built-in fallbacks.
    #[must_use]
    pub fn converter<C: BodyConverter + 'static>(mut self, converter: C) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Assemble the application.
    #[must_use]
    pub fn build(self) -> App {
        let mut registry = ConverterRegistry::new();
        for converter in self.converters {
            registry.register_boxed(converter);
        }
        for fallback in fallback_converters() {
            registry.register_boxed(fallback);
        }
        info!(
            name = %self.config.name,
            version = %self.config.version,
            routes = self.router.len(),
            converters = registry.len(),
            "application assembled"
        );
        App {
            config: self.config,
            router: self.router,
            converters: registry,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("config", &self.config)
            .field("routes", &self.router.len())
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// An assembled application: the route table, the converter registry,
/// and configuration, all read-only after build.
///
/// # Example
///
/// ```
/// use junction::{App, Payload, Route};
///
/// let app = App::builder()
///     .route(Route::get("/ping", |ex: &mut junction::Exchange<'_>| {
///         ex.send(Payload::text("pong"))
///     }).unwrap())
///     .build();
/// assert_eq!(app.route_count(), 1);
/// ```
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    router: Router,
    converters: ConverterRegistry,
}

impl App {
    /// Start building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Dispatch a request into a fresh buffered response.
    #[must_use]
    pub fn handle(&self, mut request: Request) -> Response {
        let mut response = Response::new();
        self.dispatch(&mut request, &mut response);
        response
    }

    /// Dispatch into a caller-supplied response, e.g. one wrapping a
    /// streaming sink.
    pub fn dispatch(&self, request: &mut Request, response: &mut Response) {
        self.dispatcher().dispatch(request, response);
    }

    /// A dispatcher borrowing this application's table and registry.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.router, &self.converters, &self.config)
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The route table.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The converter registry, fallbacks included.
    #[must_use]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_core::{Exchange, HttpError, JsonConverter, Method, StatusCode};

    fn noop(_: &mut Exchange<'_>) -> Result<(), HttpError> {
        Ok(())
    }

    #[test]
    fn config_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.name, "junction");
        assert!(!config.debug);
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn config_setters() {
        let config = AppConfig::new()
            .name("svc")
            .version("2.0.0")
            .debug(true)
            .max_body_size(512);
        assert_eq!(config.name, "svc");
        assert_eq!(config.version, "2.0.0");
        assert!(config.debug);
        assert_eq!(config.max_body_size, 512);
    }

    #[test]
    fn build_appends_fallbacks_after_user_converters() {
        let app = App::builder().converter(JsonConverter::new()).build();
        // One user converter plus the four built-in fallbacks.
        assert_eq!(app.converters().len(), 5);
    }

    #[test]
    fn empty_app_serves_404() {
        let app = App::builder().build();
        let response = app.handle(Request::new(Method::Get, "/anything"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn route_count_reflects_registrations() {
        let app = App::builder()
            .route(Route::get("/a", noop).unwrap())
            .route(Route::post("/b", noop).unwrap())
            .build();
        assert_eq!(app.route_count(), 2);
    }
}
