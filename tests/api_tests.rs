// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read API tests: listings, lookups and parameter validation.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Duration;
use hastok::db::ContentStore;
use hastok::models::VideoRecord;
use serde_json::Value;
use std::collections::HashSet;
use tower::ServiceExt;

mod common;
use common::{body_json, test_now, user, TestApp};

async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn add_video(app: &TestApp, tiktok_id: &str, author: &str, age: Duration, plays: u64) {
    app.store
        .insert_video(&VideoRecord {
            tiktok_id: tiktok_id.to_string(),
            author: author.to_string(),
            created: test_now() - age,
            desc: String::new(),
            collected: 0,
            comments: 0,
            plays,
            shares: 0,
            cover: None,
            duration: None,
            dynamic_cover: None,
        })
        .await
        .unwrap();
}

fn tiktok_ids(body: &Value) -> Vec<String> {
    body["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["tiktok_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = common::create_test_app();
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_users_sorted_by_followers() {
    let app = common::create_test_app();
    for (id, name, followers) in [("1", "small", 10), ("2", "big", 1000), ("3", "mid", 100)] {
        let mut u = user(id, name);
        u.followers = followers;
        app.store.insert_user(u);
    }

    let response = get(&app, "/api/users?page=1&pageSize=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["totalUsers"], 3);
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["unique_id"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["big", "mid"]);
}

#[tokio::test]
async fn test_single_user_lookup() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));

    let response = get(&app, "/api/users?uniqueId=alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["unique_id"], "alice");

    let response = get(&app, "/api/users?uniqueId=nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_parameters_are_rejected() {
    let app = common::create_test_app();

    for uri in [
        "/api/users?sortBy=-followers",
        "/api/users?page=0",
        "/api/videos?sortBy=likes",
        "/api/videos?dateFilter=fortnight",
        "/api/videos?page=0",
        "/api/videos?page=abc",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_video_pages_are_disjoint_and_cover_everything() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));
    for i in 0..7 {
        add_video(&app, &format!("v{i}"), "1", Duration::hours(i), 0).await;
    }

    let mut seen = HashSet::new();
    for page in 1..=3 {
        let body = body_json(get(&app, &format!("/api/videos?page={page}&pageSize=3")).await).await;
        assert_eq!(body["totalVideos"], 7);
        for id in tiktok_ids(&body) {
            assert!(seen.insert(id), "video listed twice");
        }
    }
    assert_eq!(seen.len(), 7);

    let body = body_json(get(&app, "/api/videos?page=4&pageSize=3").await).await;
    assert!(tiktok_ids(&body).is_empty());
    assert_eq!(body["totalVideos"], 7);
}

#[tokio::test]
async fn test_default_sort_is_newest_first() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));
    add_video(&app, "old", "1", Duration::days(3), 0).await;
    add_video(&app, "new", "1", Duration::hours(1), 0).await;

    let body = body_json(get(&app, "/api/videos").await).await;
    assert_eq!(tiktok_ids(&body), vec!["new", "old"]);

    let body = body_json(get(&app, "/api/videos?sortBy=plays").await).await;
    assert_eq!(body["videos"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_date_filter_window() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));
    add_video(&app, "edge", "1", Duration::hours(24), 0).await;
    add_video(&app, "outside", "1", Duration::hours(24) + Duration::milliseconds(1), 0).await;
    add_video(&app, "month", "1", Duration::days(20), 0).await;

    let body = body_json(get(&app, "/api/videos?dateFilter=day").await).await;
    assert_eq!(tiktok_ids(&body), vec!["edge"]);

    let body = body_json(get(&app, "/api/videos?dateFilter=month").await).await;
    assert_eq!(body["totalVideos"], 3);

    let body = body_json(get(&app, "/api/videos?dateFilter=all").await).await;
    assert_eq!(body["totalVideos"], 3);
}

#[tokio::test]
async fn test_usernames_filter() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));
    app.store.insert_user(user("2", "bob"));
    app.store.insert_user(user("3", "carol"));
    add_video(&app, "a1", "1", Duration::hours(1), 0).await;
    add_video(&app, "b1", "2", Duration::hours(2), 0).await;
    add_video(&app, "c1", "3", Duration::hours(3), 0).await;

    let body = body_json(get(&app, "/api/videos?usernames=alice,carol").await).await;
    assert_eq!(tiktok_ids(&body), vec!["a1", "c1"]);
    assert_eq!(body["totalVideos"], 2);

    let body = body_json(get(&app, "/api/videos?usernames=").await).await;
    assert_eq!(body["totalVideos"], 3);
}

#[tokio::test]
async fn test_page_size_is_clamped() {
    let app = common::create_test_app();
    app.store.insert_user(user("1", "alice"));
    for i in 0..3 {
        add_video(&app, &format!("v{i}"), "1", Duration::hours(i), 0).await;
    }

    let body = body_json(get(&app, "/api/videos?pageSize=0").await).await;
    assert_eq!(body["videos"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalVideos"], 3);
}

#[tokio::test]
async fn test_response_headers() {
    let app = common::create_test_app();

    let response = get(&app, "/api/users").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("Cache-Control").unwrap(),
        "public, s-maxage=300, stale-while-revalidate=1800"
    );
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );

    let response = get(&app, "/api/users?uniqueId=ghost").await;
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = common::create_test_app();
    let mut alice = user("1", "alice");
    alice.followers = 100;
    app.store.insert_user(alice);
    app.source.page("alice", None, common::page_body(vec![], None));

    let response = get(&app, "/api/stats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["latestDate"], Value::Null);

    app.state.sync.sync_all().await.unwrap();

    let body = body_json(get(&app, "/api/stats").await).await;
    let followers = body["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["metric"] == "followers")
        .unwrap();
    assert_eq!(followers["total"], 100);
    assert_eq!(followers["gainLast24Hours"], Value::Null);
    assert_eq!(body["dailyStats"].as_array().unwrap().len(), 1);

    let today = &body["dailyStats"][0];
    assert_eq!(today["date"], "2023-11-14");
    assert_eq!(today["accountCount"], 1);
    assert_eq!(today["followers"], 100);
    assert!(today.get("account_count").is_none());
}

#[tokio::test]
async fn test_backend_failure_is_undifferentiated_500() {
    let app = common::create_test_app();
    app.store.set_unavailable(true);

    let response = get(&app, "/api/videos").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}
