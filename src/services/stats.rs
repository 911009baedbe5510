//! Growth figures derived from daily snapshots.

use crate::models::{DailyStat, Metric};
use chrono::NaiveDate;
use serde::Serialize;

#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Trailing windows reported on the stats endpoint, in days.
pub const GAIN_WINDOWS: [i64; 3] = [1, 7, 30];

/// Latest totals plus gains over each window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "web/src/lib/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Date of the latest snapshot, `None` when there are none
    pub latest_date: Option<String>,
    pub metrics: Vec<MetricSummary>,
    /// Actual span in days behind each gain (0 when no baseline)
    pub days_calculated_for_24_hours: i64,
    pub days_calculated_for_7_days: i64,
    pub days_calculated_for_30_days: i64,
    /// Every snapshot, oldest first
    pub daily_stats: Vec<DailyStatSummary>,
}

/// One day of the series as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "web/src/lib/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct DailyStatSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub hearts: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub followers: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub videos: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub friends: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub account_count: u64,
}

impl From<&DailyStat> for DailyStatSummary {
    fn from(stat: &DailyStat) -> Self {
        Self {
            date: stat.date,
            hearts: stat.hearts,
            followers: stat.followers,
            videos: stat.videos,
            friends: stat.friends,
            account_count: stat.account_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "web/src/lib/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub metric: Metric,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub gain_last_24_hours: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub gain_last_7_days: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub gain_last_30_days: Option<i64>,
}

/// Snapshot a window's gain is measured against.
///
/// The newest snapshot at least `days` before the latest one; if history is
/// shorter than that, the oldest snapshot. `None` with fewer than two days.
fn baseline(sorted: &[DailyStat], days: i64) -> Option<&DailyStat> {
    let latest = sorted.last()?;
    let target = latest.date - chrono::Duration::days(days);

    sorted
        .iter()
        .rev()
        .find(|s| s.date <= target)
        .or_else(|| sorted.first().filter(|oldest| oldest.date < latest.date))
}

/// Summarize snapshots in any order.
pub fn summarize(stats: &[DailyStat]) -> StatsSummary {
    let mut sorted = stats.to_vec();
    sorted.sort_by_key(|s| s.date);

    let Some(latest) = sorted.last() else {
        return StatsSummary {
            latest_date: None,
            metrics: Metric::ALL
                .into_iter()
                .map(|metric| MetricSummary {
                    metric,
                    total: 0,
                    gain_last_24_hours: None,
                    gain_last_7_days: None,
                    gain_last_30_days: None,
                })
                .collect(),
            days_calculated_for_24_hours: 0,
            days_calculated_for_7_days: 0,
            days_calculated_for_30_days: 0,
            daily_stats: Vec::new(),
        };
    };

    let baselines = GAIN_WINDOWS.map(|days| baseline(&sorted, days));
    let span = |base: Option<&DailyStat>| base.map_or(0, |b| (latest.date - b.date).num_days());
    let gain = |metric: Metric, base: Option<&DailyStat>| {
        base.map(|b| metric.value(latest) as i64 - metric.value(b) as i64)
    };

    StatsSummary {
        latest_date: Some(latest.date.to_string()),
        metrics: Metric::ALL
            .into_iter()
            .map(|metric| MetricSummary {
                metric,
                total: metric.value(latest),
                gain_last_24_hours: gain(metric, baselines[0]),
                gain_last_7_days: gain(metric, baselines[1]),
                gain_last_30_days: gain(metric, baselines[2]),
            })
            .collect(),
        days_calculated_for_24_hours: span(baselines[0]),
        days_calculated_for_7_days: span(baselines[1]),
        days_calculated_for_30_days: span(baselines[2]),
        daily_stats: sorted.iter().map(DailyStatSummary::from).collect(),
    }
}
