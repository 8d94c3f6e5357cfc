mod conversation;
mod message;
mod request;

pub use conversation::{Conversation, ConversationStatus, ConversationSummary};
pub use message::{LocalIds, Message, Sender, APOLOGY_TEXT, SENTINEL_MESSAGE_ID};
pub use request::{
    ChatResponse, DateRange, QueryRequest, QueryResponse, SendMessageRequest, SupportingExcerpt,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

/// Layouts accepted for timestamps that carry no UTC offset.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp.
///
/// RFC 3339 is tried first. A timestamp without an offset (what the backend
/// emits when it is not timezone aware) is read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text)))
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", text))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        assert_eq!(
            parse_timestamp("2024-03-01T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-01T10:00:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_without_offset_is_utc() {
        let parsed = parse_timestamp("2024-03-01T10:15:30.123456").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:15:30.123456+00:00");
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-03-01"), None);
    }
}
