// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Directus REST client with typed collection operations.
//!
//! The client is built once at startup and shared. It logs in with the admin
//! credentials on first use, keeps the access token in memory, refreshes it
//! shortly before expiry, and logs in again if Directus ever answers 401.

use crate::db::{collections, ContentStore, UserQuery, VideoQuery};
use crate::error::{AppError, Result};
use crate::models::{DailyStat, Page, User, Video, VideoRecord};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Margin before token expiration when we proactively refresh (1 minute).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// `limit=-1` asks Directus for every row.
const UNLIMITED: &str = "-1";

/// Admin credentials used for login.
#[derive(Clone)]
pub struct DirectusCredentials {
    pub email: String,
    pub password: String,
}

/// Cached session tokens.
#[derive(Clone)]
struct Session {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Directus database client.
#[derive(Clone)]
pub struct DirectusDb {
    http: reqwest::Client,
    base_url: String,
    credentials: DirectusCredentials,
    /// Held across login/refresh so concurrent callers wait for one renewal.
    session: Arc<Mutex<Option<Session>>>,
}

/// `{"data": ..., "meta": ...}` wrapper around every Directus response.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Deserialize, Default)]
struct Meta {
    #[serde(default)]
    filter_count: Option<u64>,
}

#[derive(Deserialize)]
struct AuthData {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Access token lifetime in milliseconds
    expires: i64,
}

#[derive(Serialize)]
struct LastMediaUpdated {
    #[serde(with = "crate::time_utils::millis")]
    last_media_updated: DateTime<Utc>,
}

impl DirectusDb {
    /// Create a client. No request is made until the first operation.
    pub fn new(base_url: &str, credentials: DirectusCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn items_url(&self, collection: &str) -> String {
        format!("{}/items/{}", self.base_url, collection)
    }

    fn item_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/items/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(id)
        )
    }

    // ─── Credential Management ───────────────────────────────────

    /// Get a valid access token, logging in or refreshing as needed.
    async fn access_token(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        if let Some(current) = session.as_ref() {
            if now + margin < current.expires_at {
                return Ok(current.access_token.clone());
            }
        }

        let renewed = match session.as_ref().and_then(|s| s.refresh_token.clone()) {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::info!(error = %e, "Directus token refresh failed, logging in again");
                    self.login().await?
                }
            },
            None => self.login().await?,
        };

        let token = renewed.access_token.clone();
        *session = Some(renewed);
        Ok(token)
    }

    /// Drop the cached session so the next call logs in again.
    async fn invalidate_session(&self) {
        *self.session.lock().await = None;
    }

    async fn login(&self) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({
                "email": self.credentials.email,
                "password": self.credentials.password,
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Directus login request failed: {}", e)))?;

        let auth: Envelope<AuthData> = parse_json(check_response(response).await?).await?;
        tracing::info!("Logged in to Directus");
        Ok(session_from(auth.data))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&json!({
                "refresh_token": refresh_token,
                "mode": "json",
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Directus refresh request failed: {}", e)))?;

        let auth: Envelope<AuthData> = parse_json(check_response(response).await?).await?;
        tracing::debug!("Directus token refreshed");
        Ok(session_from(auth.data))
    }

    /// Send an authenticated request, retrying once with a fresh login on 401.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.access_token().await?;

        match self.send_with_token(&build, &token).await {
            Err(e) if e.is_backend_auth_error() => {
                tracing::warn!("Directus rejected access token, logging in again");
                self.invalidate_session().await;
                let token = self.access_token().await?;
                self.send_with_token(&build, &token).await
            }
            other => other,
        }
    }

    async fn send_with_token<F>(&self, build: &F, token: &str) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let response = build(&self.http)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(response).await
    }

    /// Authenticated request whose body is a `{"data": ...}` envelope.
    async fn send_json<T, F>(&self, build: F) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        parse_json(self.send(build).await?).await
    }

    /// Read items with query parameters; returns rows and `filter_count` if asked.
    async fn read_items<T: DeserializeOwned>(
        &self,
        collection: &str,
        params: &[(&str, String)],
    ) -> Result<(Vec<T>, Option<u64>)> {
        let url = self.items_url(collection);
        let envelope: Envelope<Vec<T>> = self
            .send_json(|http| http.get(&url).query(params))
            .await?;
        let count = envelope.meta.and_then(|m| m.filter_count);
        Ok((envelope.data, count))
    }

    async fn create_item<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.items_url(collection);
        let envelope: Envelope<T> = self.send_json(|http| http.post(&url).json(body)).await?;
        Ok(envelope.data)
    }

    async fn update_item<B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<()> {
        let url = self.item_url(collection, id);
        // PATCH may answer 204 depending on the `fields` setting; the body is unused.
        self.send(|http| http.patch(&url).json(body)).await?;
        Ok(())
    }
}

fn session_from(auth: AuthData) -> Session {
    Session {
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
        expires_at: Utc::now() + Duration::milliseconds(auth.expires),
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // Expired or revoked token - caller logs in again
    if status.as_u16() == 401 {
        return Err(AppError::Backend(format!(
            "{}: {}",
            AppError::BACKEND_UNAUTHORIZED,
            body
        )));
    }

    Err(AppError::Backend(format!("HTTP {}: {}", status, body)))
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
}

/// Directus filter for a video listing.
fn video_filter(query: &VideoQuery) -> Option<Value> {
    let mut clauses = Vec::new();

    if let Some((from, to)) = query.created_between {
        clauses.push(json!({ "created": {
            "_gte": from.timestamp_millis(),
            "_lte": to.timestamp_millis(),
        }}));
    }

    if let Some(usernames) = &query.usernames {
        clauses.push(json!({ "author": { "unique_id": { "_in": usernames } } }));
    }

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "_and": clauses })),
    }
}

fn page_params(page: u32, page_size: u32, sort_field: &str) -> Vec<(&'static str, String)> {
    vec![
        ("limit", page_size.to_string()),
        ("page", page.max(1).to_string()),
        // Descending on the key, id as tie-breaker keeps pages disjoint.
        ("sort", format!("-{},id", sort_field)),
        ("meta", "filter_count".to_string()),
    ]
}

#[async_trait]
impl ContentStore for DirectusDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>> {
        let (rows, _): (Vec<Value>, _) = self
            .read_items(collections::USERS, &[("limit", UNLIMITED.to_string())])
            .await?;

        // A bad row only drops that user from the run.
        let users = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<User>(row.clone()) {
                Ok(user) => Some(user),
                Err(e) => {
                    let id = row.get("id").unwrap_or(&Value::Null);
                    tracing::warn!(id = %id, error = %e, "Skipping malformed user row");
                    None
                }
            })
            .collect();
        Ok(users)
    }

    async fn find_user(&self, unique_id: &str) -> Result<Option<User>> {
        let filter = json!({ "unique_id": { "_eq": unique_id } });
        let (users, _): (Vec<User>, _) = self
            .read_items(
                collections::USERS,
                &[("filter", filter.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        Ok(users.into_iter().next())
    }

    async fn query_users(&self, query: &UserQuery) -> Result<Page<User>> {
        let params = page_params(query.page, query.page_size, query.sort.field());
        let (items, total) = self.read_items(collections::USERS, &params).await?;
        let total = total.ok_or_else(|| {
            AppError::Backend("Directus response is missing meta.filter_count".to_string())
        })?;
        Ok(Page { items, total })
    }

    async fn set_last_media_updated(&self, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.update_item(
            collections::USERS,
            user_id,
            &LastMediaUpdated {
                last_media_updated: at,
            },
        )
        .await
    }

    // ─── Video Operations ────────────────────────────────────────

    async fn find_video(&self, tiktok_id: &str) -> Result<Option<Video>> {
        let filter = json!({ "tiktok_id": { "_eq": tiktok_id } });
        let (videos, _): (Vec<Video>, _) = self
            .read_items(
                collections::VIDEOS,
                &[("filter", filter.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        Ok(videos.into_iter().next())
    }

    async fn insert_video(&self, video: &VideoRecord) -> Result<Video> {
        self.create_item(collections::VIDEOS, video).await
    }

    async fn update_video(&self, id: &str, video: &VideoRecord) -> Result<()> {
        self.update_item(collections::VIDEOS, id, video).await
    }

    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<Video>> {
        let mut params = page_params(query.page, query.page_size, query.sort.field());
        if let Some(filter) = video_filter(query) {
            params.push(("filter", filter.to_string()));
        }

        let (items, total) = self.read_items(collections::VIDEOS, &params).await?;
        let total = total.ok_or_else(|| {
            AppError::Backend("Directus response is missing meta.filter_count".to_string())
        })?;
        Ok(Page { items, total })
    }

    // ─── Daily Stats Operations ──────────────────────────────────

    async fn list_daily_stats(&self) -> Result<Vec<DailyStat>> {
        let (stats, _) = self
            .read_items(
                collections::DAILY_STATS,
                &[
                    ("limit", UNLIMITED.to_string()),
                    ("sort", "date".to_string()),
                ],
            )
            .await?;
        Ok(stats)
    }

    async fn upsert_daily_stat(&self, stat: &DailyStat) -> Result<()> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "crate::models::wire::id")]
            id: String,
        }

        let filter = json!({ "date": { "_eq": stat.date } });
        let (existing, _): (Vec<Row>, _) = self
            .read_items(
                collections::DAILY_STATS,
                &[
                    ("filter", filter.to_string()),
                    ("fields", "id".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        match existing.into_iter().next() {
            Some(row) => self.update_item(collections::DAILY_STATS, &row.id, stat).await,
            None => {
                let _: Value = self.create_item(collections::DAILY_STATS, stat).await?;
                Ok(())
            }
        }
    }
}
