use catalog_api::{create_router, AppState, MemoryStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn patch(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .patch(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }
}

/// Serve the router over a real socket on an ephemeral port
async fn spawn_server() -> TestClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = create_router::<MemoryStore>()
        .with_state(AppState::with_default_pagination(Arc::new(MemoryStore::new())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestClient::new(format!("http://{}", address))
}

#[tokio::test]
async fn test_catalog_complete_workflow() {
    let client = spawn_server().await;

    // 1. Server is up
    let response = client.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 2. Invalid product
    let response = client
        .post(
            "/products",
            json!({ "name": "A", "description": "short", "price": 5, "tags": ["x"] }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());

    // 3. Valid product
    let response = client
        .post(
            "/products",
            json!({
                "name": "Chair",
                "description": "A sturdy chair",
                "price": 50,
                "tags": ["wood"]
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let product: Value = response.json().await.unwrap();
    let product_id = product["id"].as_str().unwrap().to_string();

    // 4. Comments on the product
    for content in ["nice!", "solid build", "arrived quickly"] {
        let response = client
            .post(
                &format!("/products/{}/comments", product_id),
                json!({ "content": content }),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // 5. Page through them
    let response = client
        .get(&format!("/products/{}/comments?limit=2", product_id))
        .await
        .unwrap();
    let first: Value = response.json().await.unwrap();
    assert_eq!(first["comments"].as_array().unwrap().len(), 2);
    assert_eq!(first["comments"][0]["content"], "arrived quickly");
    let cursor = first["cursor"].as_str().unwrap();

    let response = client
        .get(&format!(
            "/products/{}/comments?limit=2&cursor={}",
            product_id, cursor
        ))
        .await
        .unwrap();
    let second: Value = response.json().await.unwrap();
    assert_eq!(second["comments"].as_array().unwrap().len(), 1);
    assert_eq!(second["comments"][0]["content"], "nice!");
    assert!(second.get("cursor").is_none());

    // 6. Partial update
    let response = client
        .patch(&format!("/products/{}", product_id), json!({ "tags": ["oak"] }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["tags"], json!(["oak"]));
    assert_eq!(updated["price"], 50);

    // 7. Delete and confirm
    let response = client
        .delete(&format!("/products/{}", product_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client
        .get(&format!("/products/{}", product_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
