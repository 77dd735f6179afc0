use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::FinalResult;

/// Scoring result stamped with the moment it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub result: FinalResult,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn record(result: FinalResult, timestamp: DateTime<Utc>) -> Self {
        Self { result, timestamp }
    }

    pub fn now(result: FinalResult) -> Self {
        Self::record(result, Utc::now())
    }
}

mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts RFC 3339 as well as offset-less ISO-8601 stamps, read as UTC.
    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|err| format!("failed to parse '{raw}' as an ISO-8601 timestamp ({err})"))
    }
}
