//! Daily aggregate snapshots across all tracked creators.
//!
//! One row per calendar day (UTC) in `tiktok_daily_stats`, recomputed after
//! each sync run. Growth figures on the stats endpoint are differences
//! between these rows.

use crate::models::{wire, User};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Totals across all users for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyStat {
    /// Day the snapshot covers (UTC, `YYYY-MM-DD`)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub hearts: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub followers: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub videos: u64,
    /// Sum of following counts
    #[serde(default, deserialize_with = "wire::lenient_count")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub friends: u64,
    #[serde(default, deserialize_with = "wire::lenient_count")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub account_count: u64,
}

impl DailyStat {
    /// Aggregate the current user rows into a snapshot for `date`.
    pub fn from_users(date: NaiveDate, users: &[User]) -> Self {
        users.iter().fold(
            Self {
                date,
                hearts: 0,
                followers: 0,
                videos: 0,
                friends: 0,
                account_count: 0,
            },
            |mut acc, u| {
                acc.hearts += u.hearts;
                acc.followers += u.followers;
                acc.videos += u.videos;
                acc.friends += u.following;
                acc.account_count += 1;
                acc
            },
        )
    }
}

/// Metrics reported on the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Hearts,
    Followers,
    Videos,
    Friends,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Hearts,
        Metric::Followers,
        Metric::Videos,
        Metric::Friends,
    ];

    /// Read this metric out of a snapshot.
    pub fn value(self, stat: &DailyStat) -> u64 {
        match self {
            Metric::Hearts => stat.hearts,
            Metric::Followers => stat.followers,
            Metric::Videos => stat.videos,
            Metric::Friends => stat.friends,
        }
    }
}
