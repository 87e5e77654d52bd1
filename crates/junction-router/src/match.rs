//! Route lookup results.

use std::fmt;

use junction_core::{Method, PathVars};

use crate::pattern::PathMatch;
use crate::route::Route;

/// A route that matched both path and verb, carrying the extracted
/// captures.
///
/// `'r` borrows the route table, `'p` the request path. The two stay
/// separate so the route reference survives after the path borrow is
/// released, which a dispatcher needs once it copies the captures out.
#[derive(Debug)]
pub struct RouteMatch<'r, 'p> {
    route: &'r Route,
    path: PathMatch<'r, 'p>,
}

impl<'r, 'p> RouteMatch<'r, 'p> {
    pub(crate) fn new(route: &'r Route, path: PathMatch<'r, 'p>) -> Self {
        Self { route, path }
    }

    /// The matched route.
    #[must_use]
    pub fn route(&self) -> &'r Route {
        self.route
    }

    /// A capture value by variable name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'p str> {
        self.path.var(name)
    }

    /// The remainder consumed by a trailing `**`, if the pattern had
    /// one.
    #[must_use]
    pub fn tail(&self) -> Option<&'p str> {
        self.path.tail()
    }

    /// Copy the captures into an owned bundle for the exchange.
    #[must_use]
    pub fn to_vars(&self) -> PathVars {
        self.path.to_vars()
    }
}

/// Outcome of resolving a method and path against the route table.
///
/// `MethodNotAllowed` is only reported when at least one pattern
/// matched the path; a path nothing matches is `NotFound`. This is the
/// distinction between a 405 and a 404.
#[derive(Debug)]
pub enum RouteLookup<'r, 'p> {
    /// A route matched path and verb.
    Match(RouteMatch<'r, 'p>),
    /// Some route matched the path, but none admitted the verb.
    MethodNotAllowed {
        /// Verbs that would have been accepted for this path.
        allowed: AllowedMethods,
    },
    /// No pattern matched the path at all.
    NotFound,
}

/// The verbs a path responds to, for the `Allow` response header.
///
/// Holds exactly the verbs of the routes whose patterns matched;
/// nothing is implied on top. Wildcard-verb routes never appear here
/// because they admit every method and so always produce a
/// [`RouteLookup::Match`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    /// Deduplicate and order a raw list of matching verbs.
    #[must_use]
    pub fn new(mut methods: Vec<Method>) -> Self {
        methods.sort_by_key(|m| method_order(*m));
        methods.dedup();
        Self { methods }
    }

    /// The allowed verbs in canonical order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether the verb is in the list.
    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Render the list as an `Allow` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let names: Vec<&str> = self.methods.iter().map(|m| m.as_str()).collect();
        names.join(", ")
    }
}

impl fmt::Display for AllowedMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}

/// Canonical ordering for `Allow` headers: common verbs first,
/// diagnostics last.
fn method_order(method: Method) -> u8 {
    match method {
        Method::Get => 0,
        Method::Head => 1,
        Method::Post => 2,
        Method::Put => 3,
        Method::Patch => 4,
        Method::Delete => 5,
        Method::Options => 6,
        Method::Trace => 7,
    }
}
