//! HTTP surface tests: envelopes, status mapping, auth/session flow, carts
//! and checkout.

mod common;

use common::spawn_server;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("client")
}

#[tokio::test]
async fn product_crud_round_trip_with_envelopes() {
    let addr = spawn_server().await;
    let client = client();
    let base = format!("http://{addr}/api/products");

    let created: serde_json::Value = client
        .post(&base)
        .json(&serde_json::json!({"title": "Teclado", "price": 25.0, "stock": 3}))
        .send()
        .await
        .expect("post")
        .json()
        .await
        .expect("json");
    assert_eq!(created["status"], "success");
    let id = created["payload"]["id"].as_str().expect("id").to_string();

    let listed: serde_json::Value = client
        .get(&base)
        .send()
        .await
        .expect("get")
        .json()
        .await
        .expect("json");
    let items = listed["payload"]["items"].as_array().expect("items");
    assert_eq!(items.iter().filter(|p| p["id"] == id.as_str()).count(), 1);
    assert_eq!(listed["payload"]["totalPages"], 1);

    let updated: serde_json::Value = client
        .put(format!("{base}/{id}"))
        .json(&serde_json::json!({"price": 19.5}))
        .send()
        .await
        .expect("put")
        .json()
        .await
        .expect("json");
    assert_eq!(updated["payload"]["price"], 19.5);
    assert_eq!(updated["payload"]["title"], "Teclado");

    let deleted = client
        .delete(format!("{base}/{id}"))
        .send()
        .await
        .expect("delete");
    assert!(deleted.status().is_success());

    let gone = client.get(format!("{base}/{id}")).send().await.expect("get");
    assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = gone.json().await.expect("json");
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn validation_errors_map_to_400() {
    let addr = spawn_server().await;
    let response = client()
        .post(format!("http://{addr}/api/products"))
        .json(&serde_json::json!({"title": "X", "price": -5}))
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("json");
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn auth_flow_sets_and_destroys_session() {
    let addr = spawn_server().await;
    let client = client();
    let base = format!("http://{addr}/api/auth");

    let registered = client
        .post(format!("{base}/register"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "hunter2"}))
        .send()
        .await
        .expect("register");
    assert!(registered.status().is_success());

    let logged_in = client
        .post(format!("{base}/login"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "hunter2"}))
        .send()
        .await
        .expect("login");
    assert!(logged_in.status().is_success());

    let current: serde_json::Value = client
        .get(format!("{base}/current"))
        .send()
        .await
        .expect("current")
        .json()
        .await
        .expect("json");
    assert_eq!(current["payload"]["email"], "ana@example.com");

    client
        .post(format!("{base}/logout"))
        .send()
        .await
        .expect("logout");

    // The session record is gone; the old cookie no longer attaches.
    let after = client
        .get(format!("{base}/current"))
        .send()
        .await
        .expect("current");
    assert_eq!(after.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_credentials_are_401() {
    let addr = spawn_server().await;
    let client = client();
    client
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "hunter2"}))
        .send()
        .await
        .expect("register");

    let response = client
        .post(format!("http://{addr}/api/auth/login"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "wrong"}))
        .send()
        .await
        .expect("login");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_400() {
    let addr = spawn_server().await;
    let client = client();
    let url = format!("http://{addr}/api/auth/register");
    let body = serde_json::json!({"email": "ana@example.com", "password": "hunter2"});
    client.post(&url).json(&body).send().await.expect("first");
    let second = client.post(&url).json(&body).send().await.expect("second");
    assert_eq!(second.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cart_checkout_creates_ticket_and_drops_cart() {
    let addr = spawn_server().await;
    let client = client();

    // Authenticated purchaser.
    client
        .post(format!("http://{addr}/api/auth/register"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "hunter2"}))
        .send()
        .await
        .expect("register");
    client
        .post(format!("http://{addr}/api/auth/login"))
        .json(&serde_json::json!({"email": "ana@example.com", "password": "hunter2"}))
        .send()
        .await
        .expect("login");

    let product: serde_json::Value = client
        .post(format!("http://{addr}/api/products"))
        .json(&serde_json::json!({"title": "Mouse", "price": 20.0, "stock": 10}))
        .send()
        .await
        .expect("product")
        .json()
        .await
        .expect("json");
    let product_id = product["payload"]["id"].as_str().expect("id");

    let cart: serde_json::Value = client
        .post(format!("http://{addr}/api/carts"))
        .send()
        .await
        .expect("cart")
        .json()
        .await
        .expect("json");
    let cart_id = cart["payload"]["id"].as_str().expect("id");

    client
        .post(format!("http://{addr}/api/carts/{cart_id}/products/{product_id}"))
        .json(&serde_json::json!({"quantity": 3}))
        .send()
        .await
        .expect("add item");

    let ticket: serde_json::Value = client
        .post(format!("http://{addr}/api/tickets"))
        .json(&serde_json::json!({"cart_id": cart_id}))
        .send()
        .await
        .expect("checkout")
        .json()
        .await
        .expect("json");
    assert_eq!(ticket["status"], "success");
    assert_eq!(ticket["payload"]["amount"], 60.0);
    assert_eq!(ticket["payload"]["purchaser"], "ana@example.com");

    let gone = client
        .get(format!("http://{addr}/api/carts/{cart_id}"))
        .send()
        .await
        .expect("cart gone");
    assert_eq!(gone.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tickets_require_a_session() {
    let addr = spawn_server().await;
    let response = client()
        .post(format!("http://{addr}/api/tickets"))
        .json(&serde_json::json!({"cart_id": "whatever"}))
        .send()
        .await
        .expect("checkout");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_logger_test_endpoints_respond() {
    let addr = spawn_server().await;
    let health: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health")
        .json()
        .await
        .expect("json");
    assert_eq!(health["status"], "ok");
    assert_eq!(health["connections"], 0);

    let logger = reqwest::get(format!("http://{addr}/loggertest"))
        .await
        .expect("loggertest")
        .text()
        .await
        .expect("text");
    assert_eq!(logger, "Logger test complete");
}

#[tokio::test]
async fn home_view_renders_products() {
    let addr = spawn_server().await;
    let client = client();
    client
        .post(format!("http://{addr}/api/products"))
        .json(&serde_json::json!({"title": "Monitor", "price": 99.0}))
        .send()
        .await
        .expect("product");

    let page = client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .expect("home")
        .text()
        .await
        .expect("text");
    assert!(page.contains("Monitor"));
}
