//! Request dispatch.
//!
//! One dispatcher call runs the full per-request sequence: route
//! resolution, consumes and produces negotiation, handler invocation,
//! and conversion of the handler's payload. Every failure short-circuits
//! into a status code and a small error body negotiated against the
//! request's Accept header (HTML page, JSON object, or plain text).
//!
//! A failure after response bytes have been flushed cannot be turned
//! into an error response any more; it is logged and the response is
//! abandoned as-is.

use junction_core::{
    ConvertError, ConverterRegistry, Exchange, HttpError, MediaType, Payload, Request, Response,
    Shape, StatusCode, accepts, negotiate_produces,
};
use junction_router::{RouteLookup, Router};
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::app::AppConfig;

/// Borrowing view over an application's route table, converter
/// registry, and configuration, able to dispatch requests.
///
/// All three parts are read-only here, so one application can hand out
/// any number of dispatchers to concurrent workers.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    router: &'a Router,
    converters: &'a ConverterRegistry,
    config: &'a AppConfig,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new(
        router: &'a Router,
        converters: &'a ConverterRegistry,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            router,
            converters,
            config,
        }
    }

    /// Dispatch one request, leaving the outcome on `response`.
    ///
    /// Status mapping: unmatched path 404, matched path with wrong
    /// method 405 plus an `Allow` header, failed produces negotiation
    /// 406, rejected content type 415, oversized body 413, malformed
    /// input 400, handler and conversion failures the error's declared
    /// status.
    pub fn dispatch(&self, request: &mut Request, response: &mut Response) {
        let method = request.method();
        trace!(%method, path = request.path(), "dispatching");

        // Accept parses up front because error bodies negotiate
        // against it too.
        let accepted = match request.accept() {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "unparseable Accept header");
                self.fail(
                    response,
                    &[],
                    StatusCode::BAD_REQUEST,
                    &format!("invalid Accept header: {err}"),
                );
                return;
            }
        };

        let (route, vars) = match self.router.resolve(method, request.path()) {
            RouteLookup::Match(found) => (found.route(), found.to_vars()),
            RouteLookup::MethodNotAllowed { allowed } => {
                debug!(%method, path = request.path(), allow = %allowed, "method not allowed");
                response
                    .headers_mut()
                    .insert("allow", allowed.header_value());
                self.fail(
                    response,
                    &accepted,
                    StatusCode::METHOD_NOT_ALLOWED,
                    &format!("method {method} is not allowed for this path"),
                );
                return;
            }
            RouteLookup::NotFound => {
                debug!(%method, path = request.path(), "no route");
                self.fail(
                    response,
                    &accepted,
                    StatusCode::NOT_FOUND,
                    &format!("no route matches {}", request.path()),
                );
                return;
            }
        };

        let content_type = match request.content_type() {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(route = %route, error = %err, "unparseable Content-Type header");
                self.fail(
                    response,
                    &accepted,
                    StatusCode::BAD_REQUEST,
                    &format!("invalid Content-Type header: {err}"),
                );
                return;
            }
        };

        // Consumes gate, only for requests that actually carry a body.
        if request.has_body() && !route.consumable().is_empty() {
            let declared = content_type
                .clone()
                .unwrap_or_else(MediaType::octet_stream);
            if !accepts(&declared, route.consumable()) {
                debug!(route = %route, content_type = %declared, "unsupported media type");
                self.fail(
                    response,
                    &accepted,
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    &format!("{declared} is not accepted by this route"),
                );
                return;
            }
        }

        let produces = if route.producible().is_empty() {
            None
        } else {
            match negotiate_produces(&accepted, route.producible()) {
                Some(media) => Some(media),
                None => {
                    debug!(route = %route, "no acceptable representation");
                    self.fail(
                        response,
                        &accepted,
                        StatusCode::NOT_ACCEPTABLE,
                        "no acceptable representation",
                    );
                    return;
                }
            }
        };

        let negotiated = produces.clone();
        let mut exchange = Exchange::new(
            request,
            response,
            vars,
            produces,
            content_type,
            self.converters,
            self.config.max_body_size,
        );
        if let Err(err) = route.handler().handle(&mut exchange) {
            if response.committed() {
                error!(
                    route = %route,
                    error = %err,
                    "handler failed after response was committed; abandoning"
                );
                return;
            }
            warn!(route = %route, status = err.status().as_u16(), error = %err, "handler failed");
            self.fail(response, &accepted, err.status(), err.message());
            return;
        }

        // Convert a queued payload, if the handler sent one.
        if let Some(payload) = response.take_pending() {
            let target = writer_target(response, negotiated.as_ref(), &payload);
            if let Err(err) = self.write_payload(response, &target, payload) {
                if response.committed() {
                    error!(
                        target = %target,
                        error = %err,
                        "response write failed after commit; abandoning"
                    );
                    return;
                }
                let http = HttpError::from(err);
                error!(target = %target, status = http.status().as_u16(), error = %http, "response conversion failed");
                self.fail(response, &accepted, http.status(), http.message());
            }
        }
    }

    fn write_payload(
        &self,
        response: &mut Response,
        target: &MediaType,
        payload: Payload,
    ) -> Result<(), ConvertError> {
        if !response.headers().contains("content-type") {
            response
                .headers_mut()
                .insert("content-type", target.to_string());
        }
        let mut writer = response.body_writer();
        self.converters.write(payload, target, &mut writer)
    }

    /// Render an error outcome onto the response.
    ///
    /// The body format is negotiated among HTML, JSON, and plain text,
    /// HTML first for clients that state no preference. Server-side
    /// detail is redacted from 5xx bodies unless the configuration has
    /// `debug` set.
    fn fail(
        &self,
        response: &mut Response,
        accepted: &[MediaType],
        status: StatusCode,
        message: &str,
    ) {
        if response.committed() {
            error!(status = status.as_u16(), detail = message, "response already committed; error body suppressed");
            return;
        }
        let shown: &str = if status.is_server_error() && !self.config.debug {
            status.canonical_reason()
        } else {
            message
        };
        response.set_status(status);
        let formats = [MediaType::html(), MediaType::json(), MediaType::plain()];
        let target = negotiate_produces(accepted, &formats).unwrap_or_else(MediaType::plain);
        let problem = Problem {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            message: shown,
        };
        let (media, body) = render_problem(&target, &problem);
        response
            .headers_mut()
            .insert("content-type", media.to_string());
        if let Err(err) = response.write_text(&body) {
            error!(error = %err, "failed to write error body");
        }
    }
}

/// Pick the media type the response payload converts against:
/// an explicit `Content-Type` set by the handler wins, then the
/// negotiated type, then a default from the payload's own shape.
fn writer_target(
    response: &Response,
    negotiated: Option<&MediaType>,
    payload: &Payload,
) -> MediaType {
    if let Some(raw) = response.headers().get_str("content-type") {
        match MediaType::parse(raw) {
            Ok(explicit) => return explicit,
            Err(err) => {
                warn!(header = raw, error = %err, "ignoring unparseable response content type");
            }
        }
    }
    if let Some(media) = negotiated {
        return media.clone();
    }
    match payload.shape() {
        Shape::Text => MediaType::html(),
        Shape::Json => MediaType::json(),
        Shape::Bytes | Shape::Stream => MediaType::octet_stream(),
    }
}

#[derive(Debug, Serialize)]
struct Problem<'a> {
    status: u16,
    reason: &'static str,
    message: &'a str,
}

fn render_problem(target: &MediaType, problem: &Problem<'_>) -> (MediaType, String) {
    if *target == MediaType::json() {
        match serde_json::to_string(problem) {
            Ok(body) => return (MediaType::json(), body),
            Err(err) => {
                warn!(error = %err, "error body serialization failed; falling back to plain text");
            }
        }
    } else if *target == MediaType::html() {
        return (MediaType::html(), error_page(problem));
    }
    (
        MediaType::plain(),
        format!("{} {}\n{}", problem.status, problem.reason, problem.message),
    )
}

fn error_page(problem: &Problem<'_>) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><title>{status} {reason}</title></head>\n<body>\n\
         <h1>{reason}</h1>\n<p>{message}</p>\n<hr/>\n<footer>status: {status}</footer>\n\
         </body>\n</html>\n",
        status = problem.status,
        reason = escape(problem.reason),
        message = escape(problem.message),
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use junction_core::{JsonConverter, Method, fallback_converters};
    use junction_router::Route;

    fn noop(_: &mut Exchange<'_>) -> Result<(), HttpError> {
        Ok(())
    }

    fn registry() -> ConverterRegistry {
        let mut converters = ConverterRegistry::new();
        converters.register(JsonConverter::new());
        for fallback in fallback_converters() {
            converters.register_boxed(fallback);
        }
        converters
    }

    fn run(router: &Router, request: &mut Request) -> Response {
        let converters = registry();
        let config = AppConfig::new();
        let dispatcher = Dispatcher::new(router, &converters, &config);
        let mut response = Response::new();
        dispatcher.dispatch(request, &mut response);
        response
    }

    // ==== Error body negotiation ====

    #[test]
    fn not_found_renders_json_when_asked() {
        let router = Router::new();
        let mut request = Request::new(Method::Get, "/missing");
        request.headers_mut().insert("accept", "application/json");
        let response = run(&router, &mut request);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get_str("content-type"),
            Some("application/json")
        );
        let body: serde_json::Value =
            serde_json::from_slice(response.body_bytes().unwrap()).unwrap();
        assert_eq!(body["status"], 404);
        assert_eq!(body["reason"], "Not Found");
    }

    #[test]
    fn not_found_defaults_to_html_page() {
        let router = Router::new();
        let mut request = Request::new(Method::Get, "/missing");
        let response = run(&router, &mut request);

        assert_eq!(
            response.headers().get_str("content-type"),
            Some("text/html")
        );
        let text = String::from_utf8_lossy(response.body_bytes().unwrap()).to_string();
        assert!(text.starts_with("<!doctype html>"));
        assert!(text.contains("Not Found"));
    }

    #[test]
    fn plain_text_for_unnegotiable_accept() {
        let router = Router::new();
        let mut request = Request::new(Method::Get, "/missing");
        request.headers_mut().insert("accept", "image/png");
        let response = run(&router, &mut request);

        assert_eq!(
            response.headers().get_str("content-type"),
            Some("text/plain")
        );
        let text = String::from_utf8_lossy(response.body_bytes().unwrap()).to_string();
        assert!(text.starts_with("404 Not Found"));
    }

    // ==== Status mapping ====

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let mut router = Router::new();
        router.route(Route::get("/doc", noop).unwrap());
        router.route(Route::put("/doc", noop).unwrap());
        let mut request = Request::new(Method::Delete, "/doc");
        let response = run(&router, &mut request);

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get_str("allow"), Some("GET, PUT"));
    }

    #[test]
    fn malformed_accept_is_bad_request() {
        let router = Router::new();
        let mut request = Request::new(Method::Get, "/x");
        request.headers_mut().insert("accept", "nonsense");
        let response = run(&router, &mut request);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_error_detail_is_redacted_without_debug() {
        let mut router = Router::new();
        router.route(
            Route::get("/boom", |_: &mut Exchange<'_>| -> Result<(), HttpError> {
                Err(HttpError::internal("secret database path"))
            })
            .unwrap(),
        );
        let mut request = Request::new(Method::Get, "/boom");
        request.headers_mut().insert("accept", "text/plain");
        let response = run(&router, &mut request);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = String::from_utf8_lossy(response.body_bytes().unwrap()).to_string();
        assert!(!text.contains("secret database path"));
        assert!(text.contains("Internal Server Error"));
    }

    #[test]
    fn debug_mode_shows_server_error_detail() {
        let mut router = Router::new();
        router.route(
            Route::get("/boom", |_: &mut Exchange<'_>| -> Result<(), HttpError> {
                Err(HttpError::internal("broken wiring"))
            })
            .unwrap(),
        );
        let converters = registry();
        let config = AppConfig::new().debug(true);
        let dispatcher = Dispatcher::new(&router, &converters, &config);
        let mut request = Request::new(Method::Get, "/boom");
        request.headers_mut().insert("accept", "text/plain");
        let mut response = Response::new();
        dispatcher.dispatch(&mut request, &mut response);

        let text = String::from_utf8_lossy(response.body_bytes().unwrap()).to_string();
        assert!(text.contains("broken wiring"));
    }

    // ==== Committed responses ====

    #[test]
    fn committed_response_is_abandoned_on_handler_error() {
        let mut router = Router::new();
        router.route(
            Route::get("/partial", |ex: &mut Exchange<'_>| -> Result<(), HttpError> {
                ex.response_mut().write_text("partial output")?;
                Err(HttpError::internal("died mid-write"))
            })
            .unwrap(),
        );
        let mut request = Request::new(Method::Get, "/partial");
        let response = run(&router, &mut request);

        // The already-flushed bytes stand; no error body is appended.
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body_bytes(), Some(b"partial output".as_ref()));
    }

    // ==== Writer target selection ====

    #[test]
    fn explicit_content_type_overrides_negotiation() {
        let negotiated = MediaType::json();
        let mut response = Response::new();
        response.headers_mut().insert("content-type", "text/csv");
        let target = writer_target(
            &response,
            Some(&negotiated),
            &Payload::text("a,b"),
        );
        assert_eq!(target, MediaType::new("text", "csv"));
    }

    #[test]
    fn shape_defaults_apply_without_negotiation() {
        let response = Response::new();
        assert_eq!(
            writer_target(&response, None, &Payload::text("x")),
            MediaType::html()
        );
        assert_eq!(
            writer_target(&response, None, &Payload::json(serde_json::json!(1))),
            MediaType::json()
        );
        assert_eq!(
            writer_target(&response, None, &Payload::bytes(vec![1u8])),
            MediaType::octet_stream()
        );
    }

    // ==== Helpers ====

    #[test]
    fn escape_covers_markup() {
        assert_eq!(escape("<a href=\"x\">&"), "&lt;a href=&quot;x&quot;&gt;&amp;");
        assert_eq!(escape("clean"), "clean");
    }
}
