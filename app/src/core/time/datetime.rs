use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use tokio::task_local;

use super::Duration;

task_local! {
    pub static FIXED_NOW: DateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DateTime {
    delegate: chrono::DateTime<chrono::Local>,
}

impl DateTime {
    fn new<T: chrono::TimeZone>(delegate: chrono::DateTime<T>) -> Self {
        Self {
            delegate: delegate.with_timezone(&chrono::Local),
        }
    }

    pub fn now() -> Self {
        FIXED_NOW
            .try_with(|t| *t)
            .unwrap_or_else(|_| chrono::Local::now().into())
    }

    pub fn from_iso(iso8601: &str) -> anyhow::Result<Self> {
        Ok(chrono::DateTime::parse_from_rfc3339(iso8601)?.into())
    }

    pub fn to_iso_string(&self) -> String {
        self.delegate.to_rfc3339()
    }

    /// Truncates to the top of the hour in the local timezone.
    pub fn truncated_to_hour(&self) -> Self {
        use chrono::Timelike;

        //with_* only fails for out-of-range values, 0 is always valid
        self.delegate
            .with_minute(0)
            .and_then(|dt| dt.with_second(0))
            .and_then(|dt| dt.with_nanosecond(0))
            .unwrap()
            .into()
    }

    pub fn elapsed_since(&self, since: Self) -> Duration {
        Duration::new(self.delegate - since.delegate)
    }

    pub fn into_db(self) -> chrono::DateTime<chrono::Local> {
        self.delegate
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.delegate)
    }
}

impl Add<Duration> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate + rhs.into_chrono())
    }
}

impl Sub<Duration> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate - rhs.into_chrono())
    }
}

impl<T: chrono::TimeZone> From<chrono::DateTime<T>> for DateTime {
    fn from(val: chrono::DateTime<T>) -> Self {
        DateTime::new(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_to_hour() {
        let dt = DateTime::from_iso("2024-11-03T15:23:46+01:00").unwrap();
        let truncated = dt.truncated_to_hour();

        assert_eq!(truncated, DateTime::from_iso("2024-11-03T15:00:00+01:00").unwrap());
        assert_eq!(truncated.truncated_to_hour(), truncated);
    }

    #[test]
    fn test_iso_roundtrip() {
        let dt = DateTime::from_iso("2024-11-03T15:00:00+01:00").unwrap();
        assert_eq!(DateTime::from_iso(&dt.to_iso_string()).unwrap(), dt);
    }

    #[tokio::test]
    async fn test_fixed_now() {
        let fake_now = DateTime::from_iso("2024-11-03T15:23:46+01:00").unwrap();

        FIXED_NOW
            .scope(fake_now, async {
                assert_eq!(DateTime::now(), fake_now);
            })
            .await;
    }
}
