//! Record - the unit of synchronized data (a prompt template + timestamps).

use crate::error::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Directory of synced records in the remote repository
pub const REMOTE_PROMPTS_DIR: &str = "prompts";

/// Wire format: `{"id", "content", "createdAt", "updatedAt", "syncedAt"?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique, immutable; doubles as storage key and remote file name
    pub id: String,
    pub content: String,
    #[serde(with = "millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis::option")]
    pub synced_at: Option<DateTime<Utc>>,
}

/// Current time at the millisecond precision of the wire format.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, the JavaScript `toISOString` shape.
/// Parsing accepts any RFC 3339 precision.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

impl Record {
    /// New record with a random id.
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), content)
    }

    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: id.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
            synced_at: None,
        }
    }

    /// Replace the content and bump `updatedAt`.
    pub fn touch(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.updated_at = timestamp_now();
    }

    pub fn remote_path(&self) -> String {
        remote_path(&self.id)
    }
}

/// Check that `name` can stand alone as one file-name component of a
/// repository path (`prompts/{id}.json`, `templates/{name}.json`).
///
/// Rejected: empty names, path separators (`/`, `\`) and control
/// characters. Everything else, including `#`, `?`, `%` and spaces, is
/// percent-encoded on the wire.
pub fn validate_identifier(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.chars().any(|c| c == '/' || c == '\\' || c.is_control());

    if invalid {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// `prompts/{id}.json`
pub fn remote_path(id: &str) -> String {
    format!("{}/{}.json", REMOTE_PROMPTS_DIR, id)
}

/// Sync state of one record, inferred from timestamps. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    LocalOnly,
    RemoteOnly,
    Synced,
    Diverged,
}

impl SyncStatus {
    /// `None` when neither side has the record.
    pub fn infer(local: Option<&Record>, remote: Option<&Record>) -> Option<Self> {
        match (local, remote) {
            (None, None) => None,
            (Some(_), None) => Some(SyncStatus::LocalOnly),
            (None, Some(_)) => Some(SyncStatus::RemoteOnly),
            (Some(local), Some(remote)) => {
                let fresh = remote
                    .synced_at
                    .is_some_and(|synced| synced >= local.updated_at);
                if fresh && remote.content == local.content {
                    Some(SyncStatus::Synced)
                } else {
                    Some(SyncStatus::Diverged)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn record(content: &str) -> Record {
        Record {
            id: "p1".to_string(),
            content: content.to_string(),
            created_at: t0(),
            updated_at: t0(),
            synced_at: None,
        }
    }

    #[test]
    fn test_wire_format_is_camel_case() -> serde_json::Result<()> {
        let json = serde_json::to_value(record("hello"))?;

        assert_eq!(json["id"], "p1");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
        assert_eq!(json["updatedAt"], "2024-01-01T00:00:00.000Z");
        assert!(json.get("syncedAt").is_none());
        Ok(())
    }

    #[test]
    fn test_parses_js_style_timestamps() -> serde_json::Result<()> {
        let parsed: Record = serde_json::from_str(
            r#"{"id":"p1","content":"world","createdAt":"2024-01-01T00:00:00.000Z",
                "updatedAt":"2024-01-02T10:30:00.123Z","syncedAt":"2024-01-02T10:31:00.000Z"}"#,
        )?;

        assert_eq!(parsed.content, "world");
        assert_eq!(parsed.created_at, t0());
        assert!(parsed.synced_at.is_some());
        Ok(())
    }

    #[test]
    fn test_timestamps_serialize_with_millis() -> serde_json::Result<()> {
        let mut rec = record("hello");
        rec.updated_at = t0() + Duration::nanoseconds(123_456_789);
        rec.synced_at = Some(t0() + Duration::milliseconds(5));

        let json = serde_json::to_value(&rec)?;
        assert_eq!(json["updatedAt"], "2024-01-01T00:00:00.123Z");
        assert_eq!(json["syncedAt"], "2024-01-01T00:00:00.005Z");
        Ok(())
    }

    #[test]
    fn test_new_records_round_trip_exactly() -> serde_json::Result<()> {
        let mut rec = Record::with_id("p1", "hello");
        rec.synced_at = Some(timestamp_now());

        let parsed: Record = serde_json::from_str(&serde_json::to_string(&rec)?)?;
        assert_eq!(parsed, rec);
        Ok(())
    }

    #[test]
    fn test_validate_identifier() {
        for ok in ["p1", "notes#draft", "what?", "a b%2Fc", "..", "日本語"] {
            assert!(validate_identifier(ok).is_ok(), "rejected {:?}", ok);
        }
        for bad in ["", "../README", "a/b", "a\\b", "tab\there"] {
            assert!(
                matches!(validate_identifier(bad), Err(Error::InvalidIdentifier(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_remote_path() {
        assert_eq!(remote_path("p1"), "prompts/p1.json");
        assert_eq!(record("x").remote_path(), "prompts/p1.json");
    }

    #[test]
    fn test_touch_bumps_updated_at() {
        let mut rec = record("old");
        rec.touch("new");

        assert_eq!(rec.content, "new");
        assert!(rec.updated_at > rec.created_at);
    }

    #[test]
    fn test_sync_status_inference() {
        let local = record("hello");
        let mut remote = record("hello");

        assert_eq!(SyncStatus::infer(None, None), None);
        assert_eq!(
            SyncStatus::infer(Some(&local), None),
            Some(SyncStatus::LocalOnly)
        );
        assert_eq!(
            SyncStatus::infer(None, Some(&remote)),
            Some(SyncStatus::RemoteOnly)
        );

        // never stamped -> diverged
        assert_eq!(
            SyncStatus::infer(Some(&local), Some(&remote)),
            Some(SyncStatus::Diverged)
        );

        remote.synced_at = Some(t0() + Duration::minutes(1));
        assert_eq!(
            SyncStatus::infer(Some(&local), Some(&remote)),
            Some(SyncStatus::Synced)
        );

        let mut edited = local.clone();
        edited.content = "hello again".to_string();
        edited.updated_at = t0() + Duration::minutes(2);
        assert_eq!(
            SyncStatus::infer(Some(&edited), Some(&remote)),
            Some(SyncStatus::Diverged)
        );
    }
}
