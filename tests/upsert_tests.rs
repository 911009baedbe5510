// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Video upsert tests against the in-memory store.

use hastok::db::MemoryStore;
use hastok::error::AppError;
use hastok::services::tiktok::VideoPayload;
use hastok::services::VideoWriter;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{page_body, user, video_item};

fn setup() -> (Arc<MemoryStore>, VideoWriter) {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(user("7", "creator"));
    let writer = VideoWriter::new(store.clone());
    (store, writer)
}

fn payload(body: serde_json::Value) -> VideoPayload {
    VideoPayload::from_value(body).unwrap()
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let (store, writer) = setup();
    let body = payload(page_body(
        vec![video_item("100", 1_700_000_000, 10), video_item("101", 1_700_000_100, 20)],
        None,
    ));

    let first = writer.upsert_videos(&body, "7").await.unwrap();
    let snapshot = store.video_by_tiktok_id("100").unwrap();
    let second = writer.upsert_videos(&body, "7").await.unwrap();

    assert_eq!((first.inserted, first.updated, first.written), (2, 0, 2));
    assert_eq!((second.inserted, second.updated, second.written), (0, 2, 2));
    assert_eq!(store.video_count(), 2);
    assert_eq!(store.video_by_tiktok_id("100").unwrap(), snapshot);
}

#[tokio::test]
async fn test_update_keeps_identity_and_refreshes_counters() {
    let (store, writer) = setup();
    writer
        .upsert_videos(&payload(page_body(vec![video_item("200", 1_700_000_000, 10)], None)), "7")
        .await
        .unwrap();
    let original = store.video_by_tiktok_id("200").unwrap();

    writer
        .upsert_videos(&payload(page_body(vec![video_item("200", 1_700_000_000, 9999)], None)), "7")
        .await
        .unwrap();

    let updated = store.video_by_tiktok_id("200").unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.record.plays, 9999);
    assert_eq!(updated.record.author, "7");
    assert_eq!(updated.record.created.timestamp_millis(), 1_700_000_000_000);
}

#[tokio::test]
async fn test_item_failures_are_isolated() {
    let (store, writer) = setup();
    store.fail_writes_for("301");
    let body = payload(json!({
        "itemList": [
            video_item("300", 1_700_000_000, 1),
            video_item("301", 1_700_000_000, 1),
            {"desc": "no id or createTime"},
            video_item("302", 1_700_000_000, 1)
        ]
    }));

    let summary = writer.upsert_videos(&body, "7").await.unwrap();

    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 2);
    assert!(store.video_by_tiktok_id("300").is_some());
    assert!(store.video_by_tiktok_id("301").is_none());
    assert!(store.video_by_tiktok_id("302").is_some());
}

#[tokio::test]
async fn test_items_key_and_response_wrapper() {
    let (store, writer) = setup();
    let body = payload(json!({
        "response": {"items": [video_item("400", 1_700_000_000, 5)]}
    }));

    let summary = writer.upsert_videos(&body, "7").await.unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(store.video_by_tiktok_id("400").unwrap().record.plays, 5);
}

#[tokio::test]
async fn test_missing_item_list_writes_nothing() {
    let (store, writer) = setup();

    let result = writer
        .upsert_videos(&payload(json!({"itemList": "nope"})), "7")
        .await;

    assert!(matches!(result, Err(AppError::Shape(_))));
    assert_eq!(store.video_count(), 0);
}

#[tokio::test]
async fn test_realistic_page_fixture() {
    let (store, writer) = setup();
    let body: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string("tests/fixtures/user_videos_page.json").unwrap(),
    )
    .unwrap();
    let page = hastok::services::VideoPage::from_body(body).unwrap();

    let summary = writer.upsert_videos(&page.payload, "7").await.unwrap();

    assert_eq!(page.next_cursor.as_deref(), Some("1699750000000"));
    assert_eq!(summary.inserted, 30);
    assert_eq!(summary.failed, 0);
    let newest = store.video_by_tiktok_id("7300000000000000000").unwrap();
    assert_eq!(newest.record.plays, 900_000);
    assert_eq!(newest.record.collected, 1000);
    assert_eq!(newest.record.duration, Some(15));
}
