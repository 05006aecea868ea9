use chrono::NaiveDate;
use std::fmt;

/// Record kinds stored in the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Meals,
    Water,
    Profile,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Meals => "meals",
            CacheKind::Water => "water",
            CacheKind::Profile => "profile",
        }
    }
}

/// A composite cache key.
///
/// Per-day records use `{kind}:{user_id}:{YYYY-MM-DD}`, profile-wide records
/// use `{kind}:{user_id}`. The user segment is percent-encoded so a `:` inside
/// a user id never reads as a separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn day(kind: CacheKind, user_id: &str, date: NaiveDate) -> Self {
        Self(format!(
            "{}:{}:{}",
            kind.as_str(),
            encode_user(user_id),
            date.format("%Y-%m-%d")
        ))
    }

    pub fn profile(user_id: &str) -> Self {
        Self(format!("{}:{}", CacheKind::Profile.as_str(), encode_user(user_id)))
    }

    /// Prefix matching every per-day record of `kind` for one user. The
    /// trailing separator keeps `u1` from matching `u10`.
    pub fn day_prefix(kind: CacheKind, user_id: &str) -> String {
        format!("{}:{}:", kind.as_str(), encode_user(user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn encode_user(user_id: &str) -> String {
    let mut out = String::with_capacity(user_id.len());
    for c in user_id.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(
            CacheKey::day(CacheKind::Meals, "u1", date).as_str(),
            "meals:u1:2025-01-05"
        );
        assert_eq!(
            CacheKey::day(CacheKind::Water, "u1", date).as_str(),
            "water:u1:2025-01-05"
        );
    }

    #[test]
    fn test_profile_key_layout() {
        assert_eq!(CacheKey::profile("u1").as_str(), "profile:u1");
    }

    #[test]
    fn test_day_prefix_matches_only_that_user() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let prefix = CacheKey::day_prefix(CacheKind::Meals, "u1");
        assert!(CacheKey::day(CacheKind::Meals, "u1", date)
            .as_str()
            .starts_with(&prefix));
        assert!(!CacheKey::day(CacheKind::Meals, "u10", date)
            .as_str()
            .starts_with(&prefix));
    }

    #[test]
    fn test_separator_in_user_id_is_encoded() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(
            CacheKey::day(CacheKind::Meals, "alice:work", date).as_str(),
            "meals:alice%3Awork:2025-01-05"
        );
        assert_eq!(CacheKey::profile("a%b").as_str(), "profile:a%25b");

        let prefix = CacheKey::day_prefix(CacheKind::Meals, "alice");
        assert!(!CacheKey::day(CacheKind::Meals, "alice:work", date)
            .as_str()
            .starts_with(&prefix));
    }
}
