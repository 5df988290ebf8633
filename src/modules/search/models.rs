use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One hit from a search backend page: unique id plus the raw field map
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

/// One transaction/event record, immutable once fetched.
///
/// The raw timestamp string is kept verbatim: the pagination fetcher
/// feeds it back into the continuation query unchanged.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub raw_timestamp: String,
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a hit; `None` when the timestamp field is
    /// missing or not RFC 3339 (such a record cannot be bucketed).
    pub fn from_hit(hit: SearchHit, timestamp_field: &str) -> Option<Self> {
        let raw = hit.source.get(timestamp_field)?.as_str()?.to_string();
        let timestamp = DateTime::parse_from_rfc3339(&raw).ok()?;
        Some(Self {
            id: hit.id,
            timestamp,
            raw_timestamp: raw,
            fields: hit.source,
        })
    }

    /// Numeric field value; accepts JSON numbers and numeric strings
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String field value
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.as_str()
    }
}
