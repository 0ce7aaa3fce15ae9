#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use clinic_records_api::app::{app, AppState};
use clinic_records_api::auth::{generate_jwt, Claims};
use clinic_records_api::config::AppConfig;
use clinic_records_api::database::MemoryStore;
use clinic_records_api::types::Entitlement;

pub const SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Router served in-process on a free port, backed by a fresh memory store
    async fn spawn(state: AppState<MemoryStore>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token granting every entitlement on every entity
    pub fn admin_token(&self) -> String {
        token(&[("*", &Entitlement::ALL[..])])
    }

    pub async fn create(&self, route: &str, body: &Value) -> Result<String> {
        let res = self
            .client
            .post(self.url(&format!("/api/{}", route)))
            .bearer_auth(self.admin_token())
            .json(body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "create {} failed: {}", route, res.status());
        let payload = res.json::<Value>().await?;
        payload["id"]
            .as_str()
            .map(str::to_string)
            .context("create response has no id")
    }

    pub async fn list(&self, route: &str, query: &[(&str, &str)]) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .get(self.url(&format!("/api/{}", route)))
            .bearer_auth(self.admin_token())
            .query(query)
            .send()
            .await?;
        Ok((res.status(), res.json::<Value>().await?))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    config.pagination.max_page_size = 50;
    config.api.enable_request_logging = false;
    config
}

pub async fn start_server() -> Result<TestServer> {
    start_server_with(test_config()).await
}

pub async fn start_server_with(config: AppConfig) -> Result<TestServer> {
    start_server_with_state(AppState::new(MemoryStore::new(), config)).await
}

pub async fn start_server_with_state(state: AppState<MemoryStore>) -> Result<TestServer> {
    let server = TestServer::spawn(state).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn token(grants: &[(&str, &[Entitlement])]) -> String {
    let entitlements: BTreeMap<String, Vec<Entitlement>> = grants
        .iter()
        .map(|(entity, list)| (entity.to_string(), list.to_vec()))
        .collect();
    let claims = Claims::new("tester", entitlements, 1);
    generate_jwt(&claims, SECRET).expect("failed to sign test token")
}
