//! Per-user refresh policy.

use crate::models::User;
use chrono::{DateTime, Utc};

/// Whether `user` is due for a sync at `now`.
///
/// Never-synced users are always due. Otherwise strictly more than
/// `media_interval` minutes must have passed since the last stamp; a stamp
/// in the future (clock skew) keeps the user waiting.
pub fn should_refresh(user: &User, now: DateTime<Utc>) -> bool {
    match user.last_media_updated {
        None => true,
        Some(last) => {
            (now - last).num_milliseconds() > user.refresh_interval().num_milliseconds()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(last: Option<DateTime<Utc>>, interval: Option<u32>) -> User {
        User {
            id: "1".to_string(),
            unique_id: "creator".to_string(),
            nickname: None,
            avatar: None,
            followers: 0,
            following: 0,
            hearts: 0,
            videos: 0,
            last_media_updated: last,
            media_interval: interval,
            last_video_activity: None,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_never_synced_is_due() {
        assert!(should_refresh(&user(None, Some(60)), now()));
        assert!(should_refresh(&user(None, None), now()));
    }

    #[test]
    fn test_interval_boundary_is_exclusive() {
        let now = now();
        let exactly = user(Some(now - Duration::minutes(60)), Some(60));
        assert!(!should_refresh(&exactly, now));

        let just_past = user(
            Some(now - Duration::minutes(60) - Duration::milliseconds(1)),
            Some(60),
        );
        assert!(should_refresh(&just_past, now));
    }

    #[test]
    fn test_recent_sync_is_not_due() {
        let now = now();
        assert!(!should_refresh(&user(Some(now - Duration::minutes(5)), Some(60)), now));
    }

    #[test]
    fn test_zero_interval() {
        let now = now();
        assert!(!should_refresh(&user(Some(now), None), now));
        assert!(should_refresh(
            &user(Some(now - Duration::milliseconds(1)), Some(0)),
            now
        ));
    }

    #[test]
    fn test_future_stamp_is_not_due() {
        let now = now();
        assert!(!should_refresh(&user(Some(now + Duration::hours(1)), Some(0)), now));
    }
}
