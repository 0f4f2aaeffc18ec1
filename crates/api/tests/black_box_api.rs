use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use stockroom_api::app::{build_app, services::AppServices};
use stockroom_api::config::ApiConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _data_dir: Option<tempfile::TempDir>,
}

impl TestServer {
    /// Build the production router over the given services, bound to an ephemeral port.
    async fn spawn_with(services: AppServices) -> Self {
        let origins = ApiConfig::default().cors_allowed_origins;
        let app = build_app(Arc::new(services), &origins);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _data_dir: None,
        }
    }

    async fn spawn() -> Self {
        Self::spawn_with(AppServices::in_memory()).await
    }

    /// Same router, backed by an in-memory SQLite database selected through config.
    async fn spawn_sqlite() -> Self {
        let config = ApiConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        })
        .unwrap();
        let services = AppServices::from_config(&config).await.unwrap();
        Self::spawn_with(services).await
    }

    /// Production-shaped backend: a database file and a multi-connection pool.
    async fn spawn_sqlite_file() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("inventory.db").display());
        let config = ApiConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some(url.clone()),
            "DATABASE_MAX_CONNECTIONS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        let services = AppServices::from_config(&config).await.unwrap();

        let mut srv = Self::spawn_with(services).await;
        srv._data_dir = Some(dir);
        srv
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn t_shirt() -> Value {
    json!({
        "name": "T-Shirt",
        "currentStock": 10,
        "unitCost": 5.0,
        "salePrice": 15.0,
        "category": "clothing",
        "suppliers": "Acme"
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: &Value) -> Value {
    let res = client
        .post(srv.url("/products/"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn order(
    client: &reqwest::Client,
    srv: &TestServer,
    path: &str,
    product_id: i64,
    quantity: i64,
) -> (StatusCode, Value) {
    let res = client
        .post(srv.url(path))
        .json(&json!({"productId": product_id, "quantity": quantity}))
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_reports_running() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": "OK", "message": "Inventory service is running"})
    );
}

#[tokio::test]
async fn t_shirt_order_scenario_over_http() {
    for srv in [TestServer::spawn().await, TestServer::spawn_sqlite().await] {
        let client = reqwest::Client::new();

        let created = create(&client, &srv, &t_shirt()).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["category"], "clothing");
        assert!(created["description"].is_null());
        assert!(created["createdAt"].is_string());
        assert!(created["updatedAt"].is_null());

        let (status, body) = order(&client, &srv, "/user-orders/", 1, 3).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User order processed", "newStock": 7}));

        let (status, body) = order(&client, &srv, "/supplier-orders/", 1, 20).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Supplier order processed", "newStock": 27})
        );

        let (status, body) = order(&client, &srv, "/user-orders/", 1, 100).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "insufficient_stock");

        let product: Value = client
            .get(srv.url("/products/1"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(product["currentStock"], 27);
        assert!(product["updatedAt"].is_string());
    }
}

#[tokio::test]
async fn invalid_create_reports_every_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&json!({
            "name": "",
            "currentStock": -1,
            "unitCost": 0.0,
            "salePrice": 15.0,
            "category": "clothing",
            "suppliers": "Acme"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "currentStock", "unitCost"]);

    let list: Value = client
        .get(srv.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn unknown_category_and_malformed_body_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = t_shirt();
    body["category"] = json!("hats");
    let res = client
        .post(srv.url("/products/"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
    assert_eq!(err["details"][0]["field"], "category");

    let mut body = t_shirt();
    body["unitCost"] = json!("cheap");
    let err: Value = client
        .post(srv.url("/products/"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(err["details"][0]["field"], "unitCost");

    let res = client
        .post(srv.url("/products/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn partial_update_changes_only_supplied_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut body = t_shirt();
    body["description"] = json!("heavyweight cotton");
    let created = create(&client, &srv, &body).await;

    let res = client
        .put(srv.url("/products/1"))
        .json(&json!({"salePrice": 18.5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["salePrice"], 18.5);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["description"], "heavyweight cotton");
    assert_eq!(updated["currentStock"], 10);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert!(updated["updatedAt"].is_string());

    let cleared: Value = client
        .put(srv.url("/products/1"))
        .json(&json!({"description": null}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared["description"].is_null());
    assert_eq!(cleared["salePrice"], 18.5);

    let res = client
        .put(srv.url("/products/1"))
        .json(&json!({"currentStock": -5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &t_shirt()).await;

    let res = client.delete(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client.get(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client.delete(srv.url("/products/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_products_and_bad_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/products/42"))
        .json(&json!({"name": "Ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let (status, _) = order(&client, &srv, "/user-orders", 42, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = order(&client, &srv, "/supplier-orders", 42, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/products/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn non_positive_quantities_are_validation_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &t_shirt()).await;

    for (path, quantity) in [("/user-orders/", 0), ("/supplier-orders/", -3)] {
        let (status, body) = order(&client, &srv, path, 1, quantity).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "quantity");
    }

    let product: Value = client
        .get(srv.url("/products/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["currentStock"], 10);
}

#[tokio::test]
async fn list_honours_skip_and_limit() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    for _ in 0..5 {
        create(&client, &srv, &t_shirt()).await;
    }

    let page: Value = client
        .get(srv.url("/products/?skip=1&limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3]);

    let res = client
        .get(srv.url("/products?skip=-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .get(srv.url("/products?limit=lots"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["details"][0]["field"], "limit");
}

#[tokio::test]
async fn missing_body_fields_are_named_in_details() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, &t_shirt()).await;

    let res = client
        .post(srv.url("/user-orders/"))
        .json(&json!({"productId": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
    assert_eq!(err["details"][0]["field"], "quantity");

    let err: Value = client
        .post(srv.url("/products"))
        .json(&json!({"name": "Cap"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let fields: Vec<&str> = err["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["currentStock", "unitCost", "salePrice", "category", "suppliers"]
    );
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, srv.url("/products/"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");

    let res = client
        .get(srv.url("/health"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert!(res.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_user_orders_never_oversell() {
    let srv = TestServer::spawn_sqlite_file().await;
    let client = reqwest::Client::new();

    let mut body = t_shirt();
    body["currentStock"] = json!(8);
    create(&client, &srv, &body).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let client = client.clone();
        let url = srv.url("/user-orders/");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"productId": 1, "quantity": 1}))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 8);

    let product: Value = client
        .get(srv.url("/products/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["currentStock"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn restock_race_refusals_are_insufficient_stock() {
    let srv = TestServer::spawn_sqlite_file().await;
    let client = reqwest::Client::new();

    let mut body = t_shirt();
    body["currentStock"] = json!(0);
    create(&client, &srv, &body).await;

    let mut handles = Vec::new();
    for i in 0..100 {
        let client = client.clone();
        let path = if i % 2 == 0 { "/supplier-orders/" } else { "/user-orders/" };
        let url = srv.url(path);
        handles.push(tokio::spawn(async move {
            let res = client
                .post(url)
                .json(&json!({"productId": 1, "quantity": 1}))
                .send()
                .await
                .unwrap();
            let status = res.status();
            let body: Value = res.json().await.unwrap();
            (i % 2 == 0, status, body)
        }));
    }

    let mut expected = 0i64;
    for handle in handles {
        let (supplier, status, body) = handle.await.unwrap();
        match status {
            StatusCode::OK => expected += if supplier { 1 } else { -1 },
            StatusCode::BAD_REQUEST => {
                assert!(!supplier);
                assert_eq!(body["error"], "insufficient_stock");
            }
            other => panic!("unexpected status {other}: {body}"),
        }
    }

    let product: Value = client
        .get(srv.url("/products/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["currentStock"], expected);
}
