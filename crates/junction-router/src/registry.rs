//! The ordered route table.

use junction_core::{Method, Verb};
use tracing::{debug, trace};

use crate::r#match::{AllowedMethods, RouteLookup, RouteMatch};
use crate::route::Route;

/// Ordered route table with first-match resolution.
///
/// Registration order is the only precedence rule: the first route
/// whose pattern matches the path and whose verb admits the method
/// wins, no matter how much more specific a later pattern might be.
/// Register exact paths before the patterns that would swallow them.
///
/// # Example
///
/// ```
/// use junction_core::{Method, Payload};
/// use junction_router::{Route, RouteLookup, Router};
///
/// let mut router = Router::new();
/// router.route(Route::get("/user/{id}", |ex: &mut junction_core::Exchange<'_>| {
///     ex.send(Payload::text("user"))
/// }).unwrap());
///
/// match router.resolve(Method::Get, "/user/7") {
///     RouteLookup::Match(m) => assert_eq!(m.param("id"), Some("7")),
///     other => panic!("expected a match, got {other:?}"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route to the table.
    pub fn route(&mut self, route: Route) {
        debug!(route = %route, position = self.routes.len(), "registered route");
        self.routes.push(route);
    }

    /// Resolve a method and path against the table in registration
    /// order.
    ///
    /// Routes that match the path but reject the verb are collected
    /// into the 405 allow list; if none matched the path either, the
    /// result is [`RouteLookup::NotFound`].
    #[must_use]
    pub fn resolve<'r, 'p>(&'r self, method: Method, path: &'p str) -> RouteLookup<'r, 'p> {
        let mut allowed: Vec<Method> = Vec::new();
        let mut path_matched = false;
        for route in &self.routes {
            let Some(captures) = route.pattern().match_path(path) else {
                continue;
            };
            if route.verb().admits(method) {
                trace!(route = %route, %method, path, "resolved");
                return RouteLookup::Match(RouteMatch::new(route, captures));
            }
            path_matched = true;
            if let Verb::Only(verb) = route.verb() {
                allowed.push(verb);
            }
        }
        if path_matched {
            trace!(%method, path, "path known, method rejected");
            RouteLookup::MethodNotAllowed {
                allowed: AllowedMethods::new(allowed),
            }
        } else {
            trace!(%method, path, "no route");
            RouteLookup::NotFound
        }
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
