// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the third-party TikTok data API.
//!
//! One call returns one page of a creator's videos:
//! `GET {base}/user/videos/by/username?username=..&page_id=..` with the
//! access key in the `x-access-key` header. The body is kept as raw JSON
//! (`VideoPayload`) and only picked apart by the upsert path, since the
//! provider has shipped the item list under more than one key.

use crate::error::{AppError, Result};
use crate::models::wire;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

pub const VIDEOS_BY_USERNAME_PATH: &str = "/user/videos/by/username";
pub const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Anything that can hand out pages of a creator's videos.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch one page. `cursor` is the `next_page_id` of the previous page,
    /// `None` for the newest page.
    async fn fetch_page(&self, username: &str, cursor: Option<&str>) -> Result<VideoPage>;
}

/// TikTok data API client.
#[derive(Clone)]
pub struct TikTokClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl TikTokClient {
    pub fn new(base_url: &str, access_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
        })
    }

    /// List one page of a creator's videos, newest first.
    pub async fn list_user_videos(&self, username: &str, cursor: Option<&str>) -> Result<VideoPage> {
        let url = format!("{}{}", self.base_url, VIDEOS_BY_USERNAME_PATH);

        let mut query = vec![("username", username)];
        if let Some(cursor) = cursor {
            query.push(("page_id", cursor));
        }

        let response = self
            .http
            .get(&url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Upstream(format!("Request for {} timed out", username))
                } else {
                    AppError::Upstream(e.to_string())
                }
            })?;

        let body = check_response_json(response).await?;
        VideoPage::from_body(body)
    }
}

#[async_trait]
impl VideoSource for TikTokClient {
    async fn fetch_page(&self, username: &str, cursor: Option<&str>) -> Result<VideoPage> {
        self.list_user_videos(username, cursor).await
    }
}

/// Check response status and parse the body as JSON.
async fn check_response_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("TikTok API rate limit hit (429)");
        }

        return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
}

/// One page of results: the raw body plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct VideoPage {
    pub payload: VideoPayload,
    pub next_cursor: Option<String>,
}

impl VideoPage {
    /// Wrap a decoded response body. Anything but a JSON object is rejected.
    pub fn from_body(body: Value) -> Result<Self> {
        let payload = VideoPayload::from_value(body)?;
        let next_cursor = payload.next_cursor();
        Ok(Self {
            payload,
            next_cursor,
        })
    }
}

/// Raw response body of the videos endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPayload(Map<String, Value>);

impl VideoPayload {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AppError::Upstream(format!(
                "Response body is not a JSON object: {}",
                json_kind(&other)
            ))),
        }
    }

    /// Some responses nest the useful part under `response`.
    fn wrapped(&self) -> Option<&Map<String, Value>> {
        self.0.get("response").and_then(Value::as_object)
    }

    /// Locate the item array, preferring `itemList` over `items`.
    ///
    /// The `response` wrapper is searched first; the top level is the
    /// fallback when the wrapper has neither key.
    pub fn item_list(&self) -> Result<ItemList<'_>> {
        let found = self
            .wrapped()
            .and_then(find_item_list)
            .or_else(|| find_item_list(&self.0));
        if let Some(list) = found {
            return Ok(list);
        }

        let keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        Err(AppError::Shape(format!(
            "No itemList or items array in payload (keys: {})",
            keys.join(", ")
        )))
    }

    /// `next_page_id` of this page, top level first. Empty means no more pages.
    pub fn next_cursor(&self) -> Option<String> {
        let raw = self
            .0
            .get("next_page_id")
            .or_else(|| self.wrapped()?.get("next_page_id"))?;

        let cursor = match raw {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!cursor.is_empty()).then_some(cursor)
    }
}

fn find_item_list(body: &Map<String, Value>) -> Option<ItemList<'_>> {
    if let Some(items) = body.get("itemList").and_then(Value::as_array) {
        return Some(ItemList::ItemList(items));
    }
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| ItemList::Items(items))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The item array, tagged with the key it was found under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemList<'a> {
    ItemList(&'a [Value]),
    Items(&'a [Value]),
}

impl<'a> ItemList<'a> {
    pub fn items(self) -> &'a [Value] {
        match self {
            ItemList::ItemList(items) | ItemList::Items(items) => items,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ItemList::ItemList(_) => "itemList",
            ItemList::Items(_) => "items",
        }
    }
}

/// One video item as the provider sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokVideo {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    /// Unix seconds
    #[serde(deserialize_with = "wire::epoch_seconds")]
    pub create_time: i64,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub stats_v2: Option<TikTokStats>,
    #[serde(default)]
    pub video: Option<TikTokMedia>,
}

/// Engagement counters; the provider sends these as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokStats {
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub collect_count: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub play_count: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    pub share_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokMedia {
    #[serde(default)]
    pub cover: Option<String>,
    /// Seconds
    #[serde(default, deserialize_with = "wire::lenient_count_opt")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub dynamic_cover: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_list_prefers_item_list_key() {
        let payload = VideoPayload::from_value(json!({
            "itemList": [{"id": "1"}],
            "items": [{"id": "2"}, {"id": "3"}]
        }))
        .unwrap();

        let list = payload.item_list().unwrap();
        assert_eq!(list.key(), "itemList");
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_item_list_falls_back_to_items_under_response() {
        let payload = VideoPayload::from_value(json!({
            "response": {"itemList": null, "items": [{"id": "2"}]}
        }))
        .unwrap();

        let list = payload.item_list().unwrap();
        assert_eq!(list.key(), "items");
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_item_list_empty_wrapper_uses_top_level() {
        let payload = VideoPayload::from_value(json!({
            "response": {},
            "itemList": [{"id": "1"}, {"id": "2"}]
        }))
        .unwrap();

        let list = payload.item_list().unwrap();
        assert_eq!(list.key(), "itemList");
        assert_eq!(list.items().len(), 2);
    }

    #[test]
    fn test_missing_item_list_is_shape_error() {
        let payload = VideoPayload::from_value(json!({"data": []})).unwrap();
        assert!(matches!(payload.item_list(), Err(AppError::Shape(_))));

        let payload = VideoPayload::from_value(json!({"itemList": {"0": {}}})).unwrap();
        assert!(matches!(payload.item_list(), Err(AppError::Shape(_))));
    }

    #[test]
    fn test_non_object_body_is_upstream_error() {
        assert!(matches!(
            VideoPage::from_body(json!([1, 2])),
            Err(AppError::Upstream(_))
        ));
    }

    #[test]
    fn test_next_cursor() {
        let page = VideoPage::from_body(json!({"itemList": [], "next_page_id": "abc"})).unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));

        let page = VideoPage::from_body(json!({"itemList": [], "next_page_id": 1712})).unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("1712"));

        let page = VideoPage::from_body(json!({"itemList": [], "next_page_id": ""})).unwrap();
        assert_eq!(page.next_cursor, None);

        let page = VideoPage::from_body(json!({"itemList": []})).unwrap();
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_video_item_parsing() {
        let item: TikTokVideo = serde_json::from_value(json!({
            "id": "7300000000000000001",
            "createTime": 1700000000,
            "desc": "hello",
            "statsV2": {
                "collectCount": "12",
                "commentCount": "3",
                "playCount": "4500",
                "shareCount": "7"
            },
            "video": {"cover": "https://c/1.jpg", "duration": 15, "dynamicCover": "https://c/1.webp"}
        }))
        .unwrap();

        assert_eq!(item.id, "7300000000000000001");
        assert_eq!(item.create_time, 1_700_000_000);
        let stats = item.stats_v2.unwrap();
        assert_eq!(stats.play_count, 4500);
        assert_eq!(stats.collect_count, 12);
        assert_eq!(item.video.unwrap().duration, Some(15));
    }

    #[test]
    fn test_video_item_requires_create_time() {
        let result = serde_json::from_value::<TikTokVideo>(json!({"id": "1"}));
        assert!(result.is_err());

        let item: TikTokVideo =
            serde_json::from_value(json!({"id": 5, "createTime": "1700000000"})).unwrap();
        assert_eq!(item.id, "5");
        assert!(item.stats_v2.is_none());
    }
}
