//! Integration tests for PrintShare.
//!
//! Tests drive the full router (sessions, request IDs, error mapping) in
//! process with `tower::ServiceExt::oneshot`; no listener or network is
//! involved.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p printshare-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, sessions
//! - `printers` - Printer listing and owner-only mutation
//! - `orders` - Order visibility and the order lifecycle over HTTP

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use printshare_core::SequentialIds;
use printshare_server::config::ServerConfig;
use printshare_server::routes;
use printshare_server::services::HashCost;
use printshare_server::state::AppState;

/// Password used by [`TestApp::signup`].
pub const PASSWORD: &str = "hunter22";

/// A response reduced to what tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON body, or `Value::Null` for an empty or non-JSON body.
    pub body: Value,
    /// `name=value` part of the `Set-Cookie` header, if any.
    pub cookie: Option<String>,
}

impl TestResponse {
    /// The `error` message of an error body.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// An in-process PrintShare server with fresh stores.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the app with the cheapest password hashing and sequential IDs.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let config = ServerConfig {
            hash_cost: HashCost::minimum(),
            ..ServerConfig::default()
        };
        let state = AppState::with_ids(config, Arc::new(SequentialIds::new()))
            .expect("test state should build");
        Self {
            router: routes::app(routes::routes(), state),
        }
    }

    /// Send a request, optionally with a JSON body and a session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        self.dispatch(request).await
    }

    /// Send a request with a raw body, for malformed-input tests.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: &'static str,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(body)).expect("request should build");
        self.dispatch(request).await
    }

    #[allow(clippy::expect_used)]
    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            cookie,
        }
    }

    /// Register an account with [`PASSWORD`].
    pub async fn register(&self, email: &str, name: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "name": name, "password": PASSWORD })),
        )
        .await
    }

    /// Log in with [`PASSWORD`].
    pub async fn login(&self, email: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": PASSWORD })),
        )
        .await
    }

    /// Register and log in, returning the session cookie and user ID.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    #[allow(clippy::expect_used)]
    pub async fn signup(&self, email: &str, name: &str) -> Session {
        let registered = self.register(email, name).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        let logged_in = self.login(email).await;
        assert_eq!(logged_in.status, StatusCode::OK, "{:?}", logged_in.body);

        Session {
            cookie: logged_in.cookie.expect("login should set a session cookie"),
            user_id: registered.body["userId"]
                .as_str()
                .expect("register returns userId")
                .to_string(),
        }
    }

    /// List a printer as `session`, returning its ID.
    ///
    /// # Panics
    ///
    /// Panics unless the printer is created.
    #[allow(clippy::expect_used)]
    pub async fn create_printer(&self, session: &Session, name: &str, status: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/printers",
                Some(&session.cookie),
                Some(printer_body(name, status)),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"]
            .as_str()
            .expect("printer has an id")
            .to_string()
    }

    /// Place an order on `printer_id` as `session`, returning its ID.
    ///
    /// # Panics
    ///
    /// Panics unless the order is created.
    #[allow(clippy::expect_used)]
    pub async fn create_order(&self, session: &Session, printer_id: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/orders",
                Some(&session.cookie),
                Some(order_body(printer_id)),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"]
            .as_str()
            .expect("order has an id")
            .to_string()
    }
}

/// A logged-in test user.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookie: String,
    pub user_id: String,
}

impl Session {
    /// The cookie, ready to pass to [`TestApp::send`].
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        Some(&self.cookie)
    }
}

/// A complete printer listing body.
#[must_use]
pub fn printer_body(name: &str, status: &str) -> Value {
    json!({
        "name": name,
        "description": "Well calibrated FDM printer",
        "specifications": {
            "buildVolume": "220x220x250mm",
            "layerHeight": "0.1-0.3mm",
            "materials": ["PLA", "PETG"],
            "technology": "FDM"
        },
        "pricePerHour": 15,
        "location": "San Francisco, CA",
        "images": ["/printer1.jpg"],
        "status": status
    })
}

/// A complete order body for `printer_id`.
#[must_use]
pub fn order_body(printer_id: &str) -> Value {
    json!({
        "printerId": printer_id,
        "modelFileUrl": "/models/bracket.stl",
        "modelFileName": "bracket.stl",
        "totalPrice": 45
    })
}
