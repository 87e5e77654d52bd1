//! Route definitions.

use std::fmt;

use junction_core::{Handler, MediaType, Method, Verb};

use crate::pattern::{PathPattern, PatternError};

/// A single route: a verb filter, a compiled path pattern, a handler,
/// and the media types it consumes and produces.
///
/// The verb constructors compile the pattern eagerly, so a bad pattern
/// fails at registration time, never at request time.
///
/// # Example
///
/// ```
/// use junction_core::{MediaType, Payload};
/// use junction_router::Route;
///
/// let route = Route::get("/user/{id}", |ex: &mut junction_core::Exchange<'_>| {
///     let id = ex.param("id").unwrap_or("?").to_string();
///     ex.send(Payload::text(id))
/// })
/// .unwrap()
/// .produces([MediaType::plain()]);
/// assert_eq!(route.path(), "/user/{id}");
/// ```
pub struct Route {
    verb: Verb,
    pattern: PathPattern,
    handler: Box<dyn Handler>,
    produces: Vec<MediaType>,
    consumes: Vec<MediaType>,
    name: Option<String>,
}

impl Route {
    /// Build a route with an explicit verb filter.
    pub fn new<H>(verb: Verb, path: &str, handler: H) -> Result<Self, PatternError>
    where
        H: Handler + 'static,
    {
        let pattern = PathPattern::compile(path)?;
        Ok(Self {
            verb,
            pattern,
            handler: Box::new(handler),
            produces: Vec::new(),
            consumes: Vec::new(),
            name: None,
        })
    }

    /// GET route.
    pub fn get<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Get), path, handler)
    }

    /// POST route.
    pub fn post<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Post), path, handler)
    }

    /// PUT route.
    pub fn put<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Put), path, handler)
    }

    /// DELETE route.
    pub fn delete<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Delete), path, handler)
    }

    /// PATCH route.
    pub fn patch<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Patch), path, handler)
    }

    /// HEAD route.
    pub fn head<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Head), path, handler)
    }

    /// OPTIONS route.
    pub fn options<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Only(Method::Options), path, handler)
    }

    /// Route accepting every method, like a classic wildcard-verb
    /// filter.
    pub fn any<H: Handler + 'static>(path: &str, handler: H) -> Result<Self, PatternError> {
        Self::new(Verb::Any, path, handler)
    }

    /// Declare the types this route can produce, in preference order.
    #[must_use]
    pub fn produces(mut self, types: impl IntoIterator<Item = MediaType>) -> Self {
        self.produces = types.into_iter().collect();
        self
    }

    /// Declare the types this route accepts from clients.
    #[must_use]
    pub fn consumes(mut self, types: impl IntoIterator<Item = MediaType>) -> Self {
        self.consumes = types.into_iter().collect();
        self
    }

    /// Attach a diagnostic name used in logs.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The verb filter.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The pattern text as written.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.raw()
    }

    /// The handler.
    #[must_use]
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Producible types in declaration order. Empty means produce
    /// anything.
    #[must_use]
    pub fn producible(&self) -> &[MediaType] {
        &self.produces
    }

    /// Consumable types. Empty means accept anything.
    #[must_use]
    pub fn consumable(&self) -> &[MediaType] {
        &self.consumes
    }

    /// The diagnostic name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("path", &self.path())
            .field("produces", &self.produces)
            .field("consumes", &self.consumes)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.pattern)
    }
}
