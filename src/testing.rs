//! Test doubles and helpers shared by the unit tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::app::build_router;
use crate::config::Config;
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::item_repo::{ItemRow, ItemStore, NewItem};
use crate::services::auth::AuthService;
use crate::services::organization::{Organization, OrganizationError, OrganizationResolver};
use crate::state::AppState;

pub const PRIVATE_KEY_PEM: &str = include_str!("../testdata/jwt_rs256_private.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../testdata/jwt_rs256_public.pem");

pub const TEST_ISSUER: &str = "https://id.example.com/";
pub const TEST_AUDIENCE: &str = "inventory-api";

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn sign_claims(claims: Value) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

/// A valid access token for `subject`.
pub fn token_for(subject: &str) -> String {
    sign_claims(json!({
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "sub": subject,
        "exp": now() + 300,
    }))
}

/// Items kept in memory; can be told to fail or to create nothing.
#[derive(Default)]
pub struct InMemoryItemStore {
    items: Mutex<Vec<NewItem>>,
    fail: AtomicBool,
    create_returns_none: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryItemStore {
    pub fn with_items(items: Vec<NewItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn create_nothing(&self) {
        self.create_returns_none.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<NewItem> {
        self.items.lock().unwrap().clone()
    }

    fn check(&self) -> RepoResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn to_row(item: &NewItem) -> ItemRow {
    ItemRow {
        id: item.id.clone(),
        name: item.name.clone(),
        item_type: item.item_type,
        unit: item.unit,
        sku: item.sku.clone(),
        returnable: item.returnable,
        organization_id: item.organization_id.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_by_organization(&self, organization_id: &str) -> RepoResult<Vec<ItemRow>> {
        self.check()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .map(to_row)
            .collect())
    }

    async fn create(&self, item: &NewItem) -> RepoResult<Option<ItemRow>> {
        self.check()?;
        if self.create_returns_none.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.items.lock().unwrap().push(item.clone());
        Ok(Some(to_row(item)))
    }

    async fn delete_many(&self, organization_id: &str, ids: &[String]) -> RepoResult<u64> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !(i.organization_id == organization_id && ids.contains(&i.id)));
        Ok((before - items.len()) as u64)
    }
}

/// Maps token subjects to organization ids and counts lookups.
#[derive(Default)]
pub struct StaticOrganizationResolver {
    organizations: HashMap<String, String>,
    calls: AtomicUsize,
    last_headers: Mutex<Option<HeaderMap>>,
}

impl StaticOrganizationResolver {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            organizations: pairs
                .iter()
                .map(|(sub, org)| (sub.to_string(), org.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_headers(&self) -> Option<HeaderMap> {
        self.last_headers.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrganizationResolver for StaticOrganizationResolver {
    async fn resolve(
        &self,
        headers: &HeaderMap,
        subject: &str,
    ) -> Result<Organization, OrganizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_headers.lock().unwrap() = Some(headers.clone());
        self.organizations
            .get(subject)
            .map(|id| Organization { id: id.clone() })
            .ok_or(OrganizationError::Status(404))
    }
}

pub fn test_config() -> Config {
    let env: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/inventory_test"),
        ("AUTH_ISSUER", TEST_ISSUER),
        ("AUTH_AUDIENCE", TEST_AUDIENCE),
        ("AUTH_JWT_PUBLIC_KEY_PEM", PUBLIC_KEY_PEM),
        ("INTERNAL_SECRET", "s3cret"),
        ("API_ORGANIZATION_URL", "http://127.0.0.1:9/api/organization"),
    ]);
    Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub items: Arc<InMemoryItemStore>,
    pub organizations: Arc<StaticOrganizationResolver>,
}

impl TestApp {
    pub fn new(items: InMemoryItemStore, organizations: StaticOrganizationResolver) -> Self {
        let items = Arc::new(items);
        let organizations = Arc::new(organizations);
        let auth = Arc::new(
            AuthService::new(PUBLIC_KEY_PEM, TEST_ISSUER, TEST_AUDIENCE, 0).unwrap(),
        );
        let state = AppState::new(items.clone(), organizations.clone(), auth);

        Self {
            router: build_router(state, &test_config()),
            items,
            organizations,
        }
    }

    /// Send a request; `body` is sent as JSON when present.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let body = body.map(|value| ("application/json", value.to_string()));
        self.send_raw(method, uri, token, body).await
    }

    /// Send a request with an arbitrary `(content-type, body)` pair.
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<(&str, String)>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some((content_type, text)) => {
                builder = builder.header(header::CONTENT_TYPE, content_type);
                Body::from(text)
            }
            None => Body::empty(),
        };

        let res = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, headers, value)
    }
}
