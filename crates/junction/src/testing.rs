//! In-process test client.
//!
//! Drives an [`App`] with no transport underneath: requests are built
//! with a small fluent builder and dispatched directly, responses come
//! back buffered and ready for assertions.
//!
//! # Example
//!
//! ```
//! use junction::{App, Payload, Route};
//! use junction::testing::TestClient;
//!
//! let app = App::builder()
//!     .route(Route::get("/ping", |ex: &mut junction::Exchange<'_>| {
//!         ex.send(Payload::text("pong"))
//!     }).unwrap())
//!     .build();
//!
//! let client = TestClient::new(app);
//! let response = client.get("/ping").send();
//! assert_eq!(response.status().as_u16(), 200);
//! assert_eq!(response.text(), "pong");
//! ```

use junction_core::{Body, Headers, Method, Request, Response, StatusCode};

use crate::app::App;

/// Wraps an [`App`] and dispatches requests against it in process.
#[derive(Debug)]
pub struct TestClient {
    app: App,
}

impl TestClient {
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// The wrapped application.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Start a GET request. A `?query` suffix on the path is split off.
    #[must_use]
    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::Get, path)
    }

    /// Start a POST request.
    #[must_use]
    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::Post, path)
    }

    /// Start a PUT request.
    #[must_use]
    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::Put, path)
    }

    /// Start a DELETE request.
    #[must_use]
    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::Delete, path)
    }

    /// Start a request with an arbitrary method.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest::new(&self.app, method, path)
    }
}

/// A request under construction.
#[derive(Debug)]
pub struct TestRequest<'a> {
    app: &'a App,
    request: Request,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a App, method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (path, None),
        };
        let mut request = Request::new(method, path);
        request.set_query(query);
        Self { app, request }
    }

    /// Set a header, replacing any earlier value.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request.headers_mut().insert(name, value);
        self
    }

    /// Add a header value without replacing earlier ones.
    #[must_use]
    pub fn append_header(mut self, name: &str, value: &str) -> Self {
        self.request.headers_mut().append(name, value);
        self
    }

    /// Attach a UTF-8 text body.
    #[must_use]
    pub fn body_text(mut self, text: &str) -> Self {
        self.request.set_body(Body::Bytes(text.as_bytes().to_vec()));
        self
    }

    /// Attach a raw byte body.
    #[must_use]
    pub fn body_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.request.set_body(Body::Bytes(bytes.into()));
        self
    }

    /// Attach a JSON body and set the `Content-Type` header.
    #[must_use]
    pub fn body_json(mut self, value: &serde_json::Value) -> Self {
        self.request
            .headers_mut()
            .insert("content-type", "application/json");
        self.request
            .set_body(Body::Bytes(value.to_string().into_bytes()));
        self
    }

    /// Dispatch the request and collect the buffered response.
    #[must_use]
    pub fn send(self) -> TestResponse {
        TestResponse::from_response(self.app.handle(self.request))
    }
}

/// A dispatched response, buffered for assertions.
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl TestResponse {
    fn from_response(response: Response) -> Self {
        let (status, headers, body) = response.into_parts();
        Self {
            status,
            headers,
            body,
        }
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_str(name)
    }

    /// All response headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body parsed as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
