//! Listing filters and sort keys accepted by the read API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trailing window applied to video creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl DateFilter {
    pub const ALL: [DateFilter; 5] = [
        DateFilter::Day,
        DateFilter::Week,
        DateFilter::Month,
        DateFilter::Year,
        DateFilter::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::Day => "day",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
            DateFilter::Year => "year",
            DateFilter::All => "all",
        }
    }

    /// Window length, `None` for unbounded.
    pub fn window(self) -> Option<Duration> {
        match self {
            DateFilter::Day => Some(Duration::hours(24)),
            DateFilter::Week => Some(Duration::days(7)),
            DateFilter::Month => Some(Duration::days(30)),
            DateFilter::Year => Some(Duration::days(365)),
            DateFilter::All => None,
        }
    }

    /// Inclusive `[from, now]` bounds, `None` for `all`.
    pub fn bounds(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.window().map(|w| (now - w, now))
    }

    pub fn contains(self, created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.bounds(now) {
            Some((from, to)) => created >= from && created <= to,
            None => true,
        }
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateFilter::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown date filter '{s}'"))
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descending sort keys for the user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    #[default]
    Followers,
    Following,
    Hearts,
    Videos,
    LastVideoActivity,
}

impl UserSort {
    pub const ALL: [UserSort; 5] = [
        UserSort::Followers,
        UserSort::Following,
        UserSort::Hearts,
        UserSort::Videos,
        UserSort::LastVideoActivity,
    ];

    /// Directus field name.
    pub fn field(self) -> &'static str {
        match self {
            UserSort::Followers => "followers",
            UserSort::Following => "following",
            UserSort::Hearts => "hearts",
            UserSort::Videos => "videos",
            UserSort::LastVideoActivity => "last_video_activity",
        }
    }
}

impl FromStr for UserSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserSort::ALL
            .into_iter()
            .find(|k| k.field() == s)
            .ok_or_else(|| format!("unknown user sort key '{s}'"))
    }
}

/// Descending sort keys for the video listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSort {
    #[default]
    Created,
    Plays,
    Collected,
    Comments,
    Shares,
}

impl VideoSort {
    pub const ALL: [VideoSort; 5] = [
        VideoSort::Created,
        VideoSort::Plays,
        VideoSort::Collected,
        VideoSort::Comments,
        VideoSort::Shares,
    ];

    pub fn field(self) -> &'static str {
        match self {
            VideoSort::Created => "created",
            VideoSort::Plays => "plays",
            VideoSort::Collected => "collected",
            VideoSort::Comments => "comments",
            VideoSort::Shares => "shares",
        }
    }
}

impl FromStr for VideoSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoSort::ALL
            .into_iter()
            .find(|k| k.field() == s)
            .ok_or_else(|| format!("unknown video sort key '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_day_boundary_is_inclusive() {
        let now = now();
        let edge = now - Duration::hours(24);
        assert!(DateFilter::Day.contains(edge, now));
        assert!(!DateFilter::Day.contains(edge - Duration::milliseconds(1), now));
        assert!(DateFilter::Day.contains(now, now));
    }

    #[test]
    fn test_future_videos_are_outside_bounded_windows() {
        let now = now();
        let later = now + Duration::milliseconds(1);
        assert!(!DateFilter::Week.contains(later, now));
        assert!(DateFilter::All.contains(later, now));
    }

    #[test]
    fn test_window_lengths() {
        assert_eq!(DateFilter::Month.window(), Some(Duration::days(30)));
        assert_eq!(DateFilter::Year.window(), Some(Duration::days(365)));
        assert_eq!(DateFilter::All.window(), None);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("week".parse::<DateFilter>(), Ok(DateFilter::Week));
        assert!("fortnight".parse::<DateFilter>().is_err());
        assert_eq!("plays".parse::<VideoSort>(), Ok(VideoSort::Plays));
        assert_eq!("hearts".parse::<UserSort>(), Ok(UserSort::Hearts));
        assert!("-followers".parse::<UserSort>().is_err());
    }
}
