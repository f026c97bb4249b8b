#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use warbler_api::{ApiConfig, AppState, AppStateInner};
use warbler_crypto::Argon2Scheme;
use warbler_db::Database;
use warbler_types::{NewUser, User};

pub const PASSWORD: &str = "password";

/// What a test needs from a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the router like a browser holding one session cookie.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// An app over a fresh in-memory database, CSRF checks off.
    pub fn new() -> Self {
        Self::with_config(ApiConfig {
            csrf_enabled: false,
            ..ApiConfig::default()
        })
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().expect("in-memory database"),
            passwords: Arc::new(Argon2Scheme::default()),
            config,
        });

        Self {
            router: warbler_api::router(state.clone()),
            state,
            cookie: None,
        }
    }

    /// Insert a user directly, password [`PASSWORD`].
    pub fn signup(&self, username: &str) -> User {
        self.state
            .db
            .signup(
                self.state.passwords.as_ref(),
                NewUser {
                    username: Some(username.into()),
                    email: Some(format!("{username}@test.com")),
                    password: Some(PASSWORD.into()),
                    image_url: None,
                },
            )
            .expect("signup")
    }

    /// Log in through the login form.
    pub async fn login(&mut self, username: &str) {
        let resp = self
            .post("/login", &[("username", username), ("password", PASSWORD)])
            .await;
        assert_eq!(resp.status, StatusCode::FOUND, "login failed: {}", resp.body);
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = Request::get(uri).body(Body::empty()).expect("request");
        self.send(req).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("request");
        self.send(req).await
    }

    /// Follow a redirect the way a browser would.
    pub async fn follow(&mut self, resp: TestResponse) -> TestResponse {
        let location = resp.location.expect("redirect location");
        self.get(&location).await
    }

    async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().expect("cookie header"));
        }

        let resp = self.router.clone().oneshot(req).await.expect("infallible");

        if let Some(set_cookie) = resp.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .expect("ascii cookie")
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string();
            self.cookie = Some(pair);
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().expect("ascii location").to_string());
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// Pull the hidden form token out of a rendered page.
pub fn csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let len = html[start..].find('"')?;
    Some(html[start..start + len].to_string())
}
