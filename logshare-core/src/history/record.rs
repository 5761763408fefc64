// Data models for upload history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies the managed server instance a history belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this subject's history is persisted.
    pub fn storage_key(&self) -> String {
        format!("{}_mclogs", self.0)
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One successful upload to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Stamp a record with the local clock.
    pub fn new(id: String, url: String) -> Self {
        Self {
            id,
            url,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            _ => Err(format!("Invalid sort order: {}. Must be 'newest' or 'oldest'", s)),
        }
    }
}

/// Stable sort by upload time. Ties keep their incoming relative order.
pub fn reorder(mut records: Vec<UploadRecord>, order: SortOrder) -> Vec<UploadRecord> {
    match order {
        SortOrder::Newest => records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at)),
        SortOrder::Oldest => records.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at)),
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, secs: i64) -> UploadRecord {
        UploadRecord {
            id: id.to_string(),
            url: format!("https://mclo.gs/{}", id),
            uploaded_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_value(record("abc", 0)).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["url"], "https://mclo.gs/abc");
        assert!(json["uploadedAt"].is_string());
        assert!(json.get("uploaded_at").is_none());
    }

    #[test]
    fn test_record_parses_browser_iso_strings() {
        let json = r#"{"id":"x1","url":"https://mclo.gs/x1","uploadedAt":"2024-05-01T10:20:30.123Z"}"#;
        let parsed: UploadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, "x1");
        assert_eq!(parsed.uploaded_at.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_reorder_newest_and_oldest_are_reverses() {
        let records = vec![record("b", 20), record("a", 10), record("d", 40), record("c", 30)];

        let newest = reorder(records.clone(), SortOrder::Newest);
        let oldest = reorder(newest.clone(), SortOrder::Oldest);

        let newest_ids: Vec<&str> = newest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(newest_ids, vec!["d", "c", "b", "a"]);

        let mut reversed = newest.clone();
        reversed.reverse();
        assert_eq!(oldest, reversed);
    }

    #[test]
    fn test_reorder_is_stable_for_equal_timestamps() {
        let records = vec![record("first", 10), record("second", 10), record("early", 5)];

        let newest = reorder(records.clone(), SortOrder::Newest);
        let ids: Vec<&str> = newest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "early"]);

        let oldest = reorder(records, SortOrder::Oldest);
        let ids: Vec<&str> = oldest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("NEWEST".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert!("random".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Newest);
    }

    #[test]
    fn test_storage_key() {
        let subject = SubjectKey::new("1a2b3c4d");
        assert_eq!(subject.storage_key(), "1a2b3c4d_mclogs");
    }
}
