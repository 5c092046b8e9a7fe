//! Cloud database collaborator. The core only needs four row operations
//! plus a "current user or none" query; everything else the managed
//! service does is opaque to us.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use crate::config::RemoteConfig;
use crate::models::{LogEntry, TimeUnit, WorkTime, utc_timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("cloud request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cloud rejected the request with status {0}")]
    Status(StatusCode),
}

/// Wire shape of one row in the cloud `logs` table. Field names follow
/// the remote schema; the mapping to the canonical [`LogEntry`] happens
/// in [`LogRow::decode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub id: String,
    pub user_id: String,
    pub project: String,
    pub work_time: WorkTimeRow,
    pub created_at: String,
    #[serde(default)]
    pub gains: Option<String>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTimeRow {
    pub duration: u32,
    pub unit: String,
}

impl LogRow {
    pub fn from_entry(entry: &LogEntry, user: &UserId) -> Self {
        Self {
            id: entry.id.clone(),
            user_id: user.0.clone(),
            project: entry.project.clone(),
            work_time: WorkTimeRow {
                duration: entry.work_time.amount,
                unit: entry.work_time.unit.as_str().to_string(),
            },
            created_at: entry.created_at.to_rfc3339(),
            gains: Some(entry.gains.clone()),
            challenges: Some(entry.challenges.clone()),
            plan: Some(entry.plan.clone()),
        }
    }

    /// Validated mapping into the canonical entity. Unknown units and
    /// unreadable timestamps are decode failures, not panics.
    pub fn decode(self) -> Result<LogEntry, String> {
        let unit = match self.work_time.unit.as_str() {
            "minutes" => TimeUnit::Minutes,
            "hours" => TimeUnit::Hours,
            other => return Err(format!("unknown work time unit: {other}")),
        };
        let created_at = utc_timestamp::parse(&self.created_at)?;
        Ok(LogEntry {
            id: self.id,
            created_at,
            project: self.project,
            work_time: WorkTime {
                amount: self.work_time.duration,
                unit,
            },
            gains: self.gains.unwrap_or_default(),
            challenges: self.challenges.unwrap_or_default(),
            plan: self.plan.unwrap_or_default(),
        })
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn current_user(&self) -> Option<UserId>;
    async fn insert(&self, row: &LogRow) -> Result<(), RemoteError>;
    async fn select_all(&self, user: &UserId) -> Result<Vec<LogRow>, RemoteError>;
    async fn update(&self, row: &LogRow) -> Result<(), RemoteError>;
    async fn delete(&self, id: &str, user: &UserId) -> Result<(), RemoteError>;
}

/// REST client for the managed database, constructed once at startup and
/// handed to the repository. Rows are scoped to their owner on every
/// read, write, and delete.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/logs", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RemoteError::Status(response.status()))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn current_user(&self) -> Option<UserId> {
        let request = self.authed(self.client.get(format!("{}/auth/v1/user", self.base_url)));
        match request.send().await {
            Ok(response) if response.status().is_success() => response
                .json::<RemoteUser>()
                .await
                .map(|user| UserId(user.id))
                .ok(),
            Ok(response) => {
                warn!("auth state query returned status {}", response.status());
                None
            }
            Err(err) => {
                warn!("auth state query failed: {err}");
                None
            }
        }
    }

    async fn insert(&self, row: &LogRow) -> Result<(), RemoteError> {
        let response = self
            .authed(self.client.post(self.rows_url()))
            .json(row)
            .send()
            .await?;
        Self::check(response).map(|_| ())
    }

    async fn select_all(&self, user: &UserId) -> Result<Vec<LogRow>, RemoteError> {
        let response = self
            .authed(self.client.get(self.rows_url()))
            .query(&[("user_id", format!("eq.{}", user.0)), ("select", "*".to_string())])
            .send()
            .await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn update(&self, row: &LogRow) -> Result<(), RemoteError> {
        let response = self
            .authed(self.client.patch(self.rows_url()))
            .query(&[
                ("id", format!("eq.{}", row.id)),
                ("user_id", format!("eq.{}", row.user_id)),
            ])
            .json(row)
            .send()
            .await?;
        Self::check(response).map(|_| ())
    }

    async fn delete(&self, id: &str, user: &UserId) -> Result<(), RemoteError> {
        let response = self
            .authed(self.client.delete(self.rows_url()))
            .query(&[("id", format!("eq.{id}")), ("user_id", format!("eq.{}", user.0))])
            .send()
            .await?;
        Self::check(response).map(|_| ())
    }
}

/// Auth state consumed from the external service: a "current user or
/// none" snapshot plus a change-notification subscription.
#[derive(Clone)]
pub struct AuthSession {
    tx: watch::Sender<Option<UserId>>,
}

impl AuthSession {
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    pub fn set_user(&self, user: Option<UserId>) {
        self.tx.send_replace(user);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}
