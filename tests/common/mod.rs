// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hastok::config::Config;
use hastok::db::MemoryStore;
use hastok::error::{AppError, Result};
use hastok::models::User;
use hastok::routes::create_router;
use hastok::services::{VideoPage, VideoSource};
use hastok::time_utils::ManualClock;
use hastok::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed "now" used by the suites: 2023-11-14T22:13:20Z.
#[allow(dead_code)]
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Video source that replays scripted pages and records every call.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<(String, Option<String>), Option<Value>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for this username and cursor.
    pub fn page(&self, username: &str, cursor: Option<&str>, body: Value) {
        self.pages.lock().unwrap().insert(
            (username.to_string(), cursor.map(str::to_string)),
            Some(body),
        );
    }

    /// Fail requests for this username and cursor.
    pub fn fail(&self, username: &str, cursor: Option<&str>) {
        self.pages
            .lock()
            .unwrap()
            .insert((username.to_string(), cursor.map(str::to_string)), None);
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, username: &str) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == username)
            .map(|(_, cursor)| cursor)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn fetch_page(&self, username: &str, cursor: Option<&str>) -> Result<VideoPage> {
        let key = (username.to_string(), cursor.map(str::to_string));
        self.calls.lock().unwrap().push(key.clone());

        let scripted = self.pages.lock().unwrap().get(&key).cloned();
        match scripted {
            Some(Some(body)) => VideoPage::from_body(body),
            Some(None) => Err(AppError::Upstream("HTTP 502 Bad Gateway: scripted".to_string())),
            None => Err(AppError::Upstream(format!(
                "no scripted page for {username} at {cursor:?}"
            ))),
        }
    }
}

/// Everything a test needs to drive the app.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub source: Arc<ScriptedSource>,
    pub clock: Arc<ManualClock>,
}

/// Create a test app over an in-memory store and a scripted video source.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(ScriptedSource::new());
    let clock = Arc::new(ManualClock::new(test_now()));

    let state = Arc::new(AppState::new(
        config,
        store.clone(),
        source.clone(),
        clock.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        source,
        clock,
    }
}

/// A tracked creator with no sync history.
#[allow(dead_code)]
pub fn user(id: &str, unique_id: &str) -> User {
    User {
        id: id.to_string(),
        unique_id: unique_id.to_string(),
        nickname: None,
        avatar: None,
        followers: 0,
        following: 0,
        hearts: 0,
        videos: 0,
        last_media_updated: None,
        media_interval: Some(60),
        last_video_activity: None,
    }
}

/// One upstream video item.
#[allow(dead_code)]
pub fn video_item(id: &str, create_time: i64, plays: u64) -> Value {
    json!({
        "id": id,
        "createTime": create_time,
        "desc": format!("video {id}"),
        "statsV2": {
            "collectCount": "1",
            "commentCount": "2",
            "playCount": plays.to_string(),
            "shareCount": "3"
        },
        "video": {"cover": format!("https://cdn.example/{id}.jpg"), "duration": 15}
    })
}

/// Upstream page body with an optional cursor.
#[allow(dead_code)]
pub fn page_body(items: Vec<Value>, next_page_id: Option<&str>) -> Value {
    match next_page_id {
        Some(cursor) => json!({"itemList": items, "next_page_id": cursor}),
        None => json!({"itemList": items}),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
