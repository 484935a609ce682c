use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use httpmock::prelude::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use tenantdesk_api::app::services::AppServices;
use tenantdesk_auth::{JwtClaims, PrincipalId, Role};
use tenantdesk_core::TenantId;
use tenantdesk_infra::{AppConfig, ControlPlaneClient, InMemoryStore, RetryPolicy};
use tenantdesk_orders::Order;
use tenantdesk_products::Product;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    control_plane: MockServer,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Same router as prod, with in-memory stores and a mocked control plane,
    /// bound to an ephemeral port.
    async fn spawn() -> Self {
        let control_plane = MockServer::start();

        let config = AppConfig::from_lookup(|key| {
            match key {
                "AWS_REGION" => Some("ap-northeast-2".to_string()),
                "DYNAMODB_TABLE_NAME" => Some("product".to_string()),
                "CONTROL_PLANE_URL" => Some(control_plane.base_url()),
                "JWT_SECRET" => Some(JWT_SECRET.to_string()),
                _ => None,
            }
        });

        let products = Arc::new(InMemoryStore::<Product>::new());
        let orders = Arc::new(InMemoryStore::<Order>::new());
        let services = Arc::new(AppServices {
            control_plane: ControlPlaneClient::new(config.control_plane_url.clone())
                .expect("control plane client"),
            config,
            store_ping: products.clone(),
            products,
            orders,
            retry: RetryPolicy {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
            },
        });

        let app = tenantdesk_api::app::build_app_with_services(services);
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
            control_plane,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(tenant_id: &str, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        tenant_id: TenantId::new(tenant_id).unwrap(),
        roles,
        issued_at: now - ChronoDuration::minutes(1),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/whoami", "/products", "/orders", "/admin/tenants"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}

#[tokio::test]
async fn tenant_context_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("acme", vec![Role::new("admin")]);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenantId"].as_str().unwrap(), "acme");
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
}

#[tokio::test]
async fn product_crud_round_trip() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("acme", vec![Role::new("member")]);
    let client = reqwest::Client::new();

    // Create
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "SavingsPlus",
            "description": "A steady saver",
            "currency": "USD",
            "interestRate": 2.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["id"].as_str().unwrap(), "acme#SavingsPlus");
    assert_eq!(created["tenantId"].as_str().unwrap(), "acme");

    // List contains it
    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    // Duplicate create conflicts
    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "SavingsPlus",
            "description": "Again",
            "currency": "USD",
            "interestRate": 2.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Get by bare name (the tenant prefix is added server-side)
    let res = client
        .get(format!("{}/products/SavingsPlus", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Update the rate, keep the rest
    let res = client
        .put(format!("{}/products/SavingsPlus", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "interestRate": 3.25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["interestRate"].as_f64().unwrap(), 3.25);
    assert_eq!(updated["description"].as_str().unwrap(), "A steady saver");

    // Stats reflect the catalog
    let res = client
        .get(format!("{}/products/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["totalProducts"].as_u64().unwrap(), 1);

    // Delete, then the list excludes it
    let res = client
        .delete(format!("{}/products/SavingsPlus", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("acme", vec![Role::new("member")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "",
            "description": "x",
            "currency": "USD",
            "interestRate": 2.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Savings",
            "description": "x",
            "currency": "dollars",
            "interestRate": 2.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cross_tenant_access_is_forbidden() {
    let srv = TestServer::spawn().await;
    let acme = mint_jwt("acme", vec![Role::new("member")]);
    let globex = mint_jwt("globex", vec![Role::new("member")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&acme)
        .json(&json!({
            "name": "SavingsPlus",
            "description": "A steady saver",
            "currency": "USD",
            "interestRate": 2.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // A fully-qualified foreign key is rejected, not treated as a miss.
    let res = client
        .get(format!("{}/products/acme%23SavingsPlus", srv.base_url))
        .bearer_auth(&globex)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // And the foreign tenant's listing stays empty.
    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&globex)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn viewers_cannot_write() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("acme", vec![Role::new("viewer")]);
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/products", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Savings",
            "description": "x",
            "currency": "USD",
            "interestRate": 1.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_lifecycle_create_update_stats_delete() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("acme", vec![Role::new("member")]);
    let client = reqwest::Client::new();

    // Create
    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Q3 bundle",
            "lines": [
                { "productId": "SavingsPlus", "productName": "SavingsPlus", "price": 1000, "quantity": 2 },
                { "productId": "Checking", "productName": "Checking", "price": 250, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let order_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"].as_str().unwrap(), "pending");
    assert_eq!(created["totalAmount"].as_u64().unwrap(), 2250);

    // Move it to completed
    let res = client
        .put(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Illegal transition from a terminal state
    let res = client
        .put(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&token)
        .json(&json!({ "status": "pending" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Stats agree with the list
    let res = client
        .get(format!("{}/orders/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["totalOrders"].as_u64().unwrap(), 1);
    assert_eq!(stats["totalRevenue"].as_u64().unwrap(), 2250);
    assert_eq!(stats["completedOrders"].as_u64().unwrap(), 1);

    // Delete, then 404
    let res = client
        .delete(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tenant_config_proxy_validates_and_forwards() {
    let srv = TestServer::spawn().await;
    let mock = srv.control_plane.mock(|when, then| {
        when.method(GET)
            .path("/tenant-config")
            .query_param("tenantId", "acme");
        then.status(200).json_body(json!({
            "authServer": "https://cognito-idp.example.com/pool",
            "appClientId": "client-123",
            "redirectUrl": "https://app.example.com/auth/callback"
        }));
    });

    let client = reqwest::Client::new();

    // Missing tenantId is rejected locally.
    let res = client
        .get(format!("{}/tenant-config", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A valid tenant id is proxied upstream.
    let res = client
        .get(format!("{}/tenant-config?tenantId=acme", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let params: serde_json::Value = res.json().await.unwrap();
    assert_eq!(params["appClientId"].as_str().unwrap(), "client-123");
    mock.assert();
}

#[tokio::test]
async fn health_reports_all_checks() {
    let srv = TestServer::spawn().await;
    srv.control_plane.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("ok");
    });

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
    let report: serde_json::Value = res.json().await.unwrap();
    assert_eq!(report["status"].as_str().unwrap(), "healthy");
    assert_eq!(report["checks"]["controlPlane"], true);
}

#[tokio::test]
async fn preflight_requests_get_cors_headers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{}/products", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn admin_surface_requires_the_admin_role() {
    let srv = TestServer::spawn().await;
    srv.control_plane.mock(|when, then| {
        when.method(GET).path("/tenants");
        then.status(200).json_body(json!({ "data": [] }));
    });

    let client = reqwest::Client::new();

    let member = mint_jwt("acme", vec![Role::new("member")]);
    let res = client
        .get(format!("{}/admin/tenants", srv.base_url))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = mint_jwt("acme", vec![Role::new("admin")]);
    let res = client
        .get(format!("{}/admin/tenants", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
