use chrono::{DateTime, TimeZone, Utc};

/// A row of the roster. Rows are never removed, `opt_out` marks a withdrawn subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEntry {
    pub id: i64,
    pub email: String,
    pub confirmed_at: DateTime<Utc>,
    pub opt_out: bool,
}

impl SubscriberEntry {
    /// `confirmed_at` value of an address that never confirmed its subscription.
    pub fn unconfirmed() -> DateTime<Utc> {
        DateTime::<Utc>::from(std::time::UNIX_EPOCH)
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at != Self::unconfirmed()
    }
}

/// Seconds since the epoch, the only representation the table and the wire formats use.
pub fn to_epoch_seconds(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp()
}

pub fn from_epoch_seconds(seconds: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| format!("{} is not a representable timestamp", seconds))
}
