//! Getting started walkthrough.
//!
//! Builds a small application and drives it with the in-process test
//! client, printing each interaction.
//!
//! Run with: cargo run --example getting_started -p junction

use junction::prelude::*;
use junction::testing::TestClient;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("junction walkthrough\n");

    // === Assemble the application ===
    let config = AppConfig::new().name("demo").version("1.0.0");
    let app = App::builder()
        .config(config)
        .converter(JsonConverter::new())
        .route(
            Route::get("/", |ex: &mut Exchange<'_>| {
                ex.send(Payload::text("Welcome!"))
            })
            .unwrap(),
        )
        .route(
            Route::get("/user/{id}", |ex: &mut Exchange<'_>| {
                let id = ex.param("id").unwrap_or("unknown").to_string();
                ex.send(Payload::json(serde_json::json!({ "id": id })))
            })
            .unwrap()
            .produces([MediaType::json()]),
        )
        .route(
            Route::post("/echo", |ex: &mut Exchange<'_>| {
                let body = ex.body_text()?;
                ex.send(Payload::text(body))
            })
            .unwrap(),
        )
        .route(
            Route::get("/assets/**", |ex: &mut Exchange<'_>| {
                let tail = ex.tail().unwrap_or("").to_string();
                ex.send(Payload::text(format!("asset: {tail}")))
            })
            .unwrap(),
        )
        .build();

    println!("routes registered: {}", app.route_count());
    let client = TestClient::new(app);

    // === Plain text ===
    let response = client.get("/").send();
    println!("GET / -> {} ({})", response.status().as_u16(), response.text());
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text(), "Welcome!");

    // === Path captures and JSON ===
    let response = client
        .get("/user/42")
        .header("accept", "application/json")
        .send();
    println!(
        "GET /user/42 -> {} ({})",
        response.status().as_u16(),
        response.text()
    );
    assert_eq!(response.header("content-type"), Some("application/json"));

    // === Request bodies ===
    let response = client.post("/echo").body_text("round trip").send();
    println!(
        "POST /echo -> {} ({})",
        response.status().as_u16(),
        response.text()
    );
    assert_eq!(response.text(), "round trip");

    // === Wildcard tails ===
    let response = client.get("/assets/css/site.css").send();
    println!("GET /assets/css/site.css -> {}", response.text());
    assert_eq!(response.text(), "asset: css/site.css");

    // === Unknown paths and methods ===
    let response = client.get("/missing").send();
    println!("GET /missing -> {}", response.status().as_u16());
    assert_eq!(response.status().as_u16(), 404);

    let response = client.delete("/echo").send();
    println!(
        "DELETE /echo -> {} (allow: {})",
        response.status().as_u16(),
        response.header("allow").unwrap_or("")
    );
    assert_eq!(response.status().as_u16(), 405);
    assert_eq!(response.header("allow"), Some("POST"));

    println!("\nall interactions behaved as expected");
}
