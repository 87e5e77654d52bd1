//! Integration tests for the pattern language and route resolution.
//!
//! Covers the full matching matrix through the public API:
//! - literal, `?`, `*`, `{name}`, `{name:regex}`, `:name`, trailing `**`
//! - first-match precedence in registration order
//! - 404 vs 405 resolution and `Allow` lists
//! - capture extraction and wildcard tails

use junction_core::{Exchange, HttpError, Method};
use junction_router::{PathPattern, Route, RouteLookup, Router};

fn noop(_: &mut Exchange<'_>) -> Result<(), HttpError> {
    Ok(())
}

fn matches(pattern: &str, path: &str) -> bool {
    PathPattern::compile(pattern).unwrap().match_path(path).is_some()
}

// ============================================================================
// PATTERN MATRIX
// ============================================================================

#[test]
fn test_literal_segments() {
    assert!(matches("/user/list", "/user/list"));
    assert!(!matches("/user/list", "/user/list/all"));
    assert!(!matches("/user/list", "/user"));
}

#[test]
fn test_single_char_wildcard() {
    assert!(matches("/t?st", "/test"));
    assert!(matches("/t?st", "/tost"));
    assert!(!matches("/t?st", "/tst"));
    assert!(!matches("/t?st", "/teest"));
    assert!(!matches("/t?st", "/te/st"));
}

#[test]
fn test_segment_wildcard() {
    assert!(matches("/*.html", "/index.html"));
    assert!(matches("/*.html", "/.html"));
    assert!(!matches("/*.html", "/docs/index.html"));
    assert!(matches("/files/*", "/files/report.pdf"));
    assert!(!matches("/files/*", "/files/a/b"));
}

#[test]
fn test_named_variables() {
    let pattern = PathPattern::compile("/user/{id}/posts/{post}").unwrap();
    let m = pattern.match_path("/user/7/posts/42").unwrap();
    assert_eq!(m.var("id"), Some("7"));
    assert_eq!(m.var("post"), Some("42"));
    assert!(pattern.match_path("/user//posts/42").is_none());
}

#[test]
fn test_colon_shorthand() {
    let pattern = PathPattern::compile("/user/:id").unwrap();
    let m = pattern.match_path("/user/9").unwrap();
    assert_eq!(m.var("id"), Some("9"));
}

#[test]
fn test_regex_constraints() {
    let pattern = PathPattern::compile("/order/{id:[0-9]+}").unwrap();
    assert!(pattern.match_path("/order/123").is_some());
    assert!(pattern.match_path("/order/abc").is_none());
    assert!(pattern.match_path("/order/12a").is_none());
}

#[test]
fn test_trailing_double_star() {
    let pattern = PathPattern::compile("/assets/**").unwrap();
    let m = pattern.match_path("/assets/css/site.css").unwrap();
    assert_eq!(m.tail(), Some("css/site.css"));
    // A bare slash still enters the wildcard with an empty tail.
    assert_eq!(pattern.match_path("/assets/").unwrap().tail(), Some(""));
    assert!(pattern.match_path("/assets").is_none());
}

#[test]
fn test_root_double_star() {
    let pattern = PathPattern::compile("/**").unwrap();
    assert_eq!(
        pattern.match_path("/any/depth/at/all").unwrap().tail(),
        Some("any/depth/at/all")
    );
}

#[test]
fn test_mixed_pattern() {
    let pattern = PathPattern::compile("/api/v?/{tenant}/files/**").unwrap();
    let m = pattern.match_path("/api/v1/acme/files/a/b.txt").unwrap();
    assert_eq!(m.var("tenant"), Some("acme"));
    assert_eq!(m.tail(), Some("a/b.txt"));
}

#[test]
fn test_compile_rejections() {
    assert!(PathPattern::compile("/a/**/b").is_err());
    assert!(PathPattern::compile("/a/{open").is_err());
    assert!(PathPattern::compile("/a/{}").is_err());
    assert!(PathPattern::compile("/a/{x}/{x}").is_err());
    assert!(PathPattern::compile("/a/{x:[}").is_err());
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_first_match_wins_over_later_literal() {
    let mut router = Router::new();
    router.route(Route::get("/user/{id}", noop).unwrap().named("dynamic"));
    router.route(Route::get("/user/me", noop).unwrap().named("literal"));

    let RouteLookup::Match(m) = router.resolve(Method::Get, "/user/me") else {
        panic!("expected match");
    };
    assert_eq!(m.route().name(), Some("dynamic"));
}

#[test]
fn test_literal_registered_first_shadows_pattern() {
    let mut router = Router::new();
    router.route(Route::get("/user/me", noop).unwrap().named("literal"));
    router.route(Route::get("/user/{id}", noop).unwrap().named("dynamic"));

    let RouteLookup::Match(m) = router.resolve(Method::Get, "/user/me") else {
        panic!("expected match");
    };
    assert_eq!(m.route().name(), Some("literal"));

    let RouteLookup::Match(m) = router.resolve(Method::Get, "/user/77") else {
        panic!("expected match");
    };
    assert_eq!(m.route().name(), Some("dynamic"));
    assert_eq!(m.param("id"), Some("77"));
}

#[test]
fn test_method_not_allowed_collects_verbs() {
    let mut router = Router::new();
    router.route(Route::get("/doc", noop).unwrap());
    router.route(Route::put("/doc", noop).unwrap());
    router.route(Route::post("/other", noop).unwrap());

    let RouteLookup::MethodNotAllowed { allowed } = router.resolve(Method::Delete, "/doc") else {
        panic!("expected 405");
    };
    assert_eq!(allowed.methods(), &[Method::Get, Method::Put]);
    assert_eq!(allowed.header_value(), "GET, PUT");
}

#[test]
fn test_not_found_when_no_pattern_matches() {
    let mut router = Router::new();
    router.route(Route::get("/doc", noop).unwrap());
    assert!(matches!(
        router.resolve(Method::Get, "/missing"),
        RouteLookup::NotFound
    ));
}

#[test]
fn test_wildcard_route_tail_through_router() {
    let mut router = Router::new();
    router.route(Route::get("/static/**", noop).unwrap());
    let RouteLookup::Match(m) = router.resolve(Method::Get, "/static/js/app.js") else {
        panic!("expected match");
    };
    assert_eq!(m.tail(), Some("js/app.js"));
    let vars = m.to_vars();
    assert_eq!(vars.tail(), Some("js/app.js"));
}
