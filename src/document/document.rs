//! Document records.
//!
//! A [`SourceRecord`] is what the upstream feed hands over: any field may be
//! missing. [`SourceRecord::into_document`] validates it into a
//! [`Document`], the immutable unit the index stores.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{LoupeError, Result};

/// A validated document: one crawled item keyed by its url.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique key; stored verbatim and matched exactly.
    pub url: String,
    /// Analyzed and stored.
    pub title: String,
    /// Unix timestamp in seconds; stored, matched exactly.
    pub time: i64,
}

impl Document {
    /// Create a new document.
    pub fn new<U, T>(url: U, title: T, time: i64) -> Self
    where
        U: Into<String>,
        T: Into<String>,
    {
        Document {
            url: url.into(),
            title: title.into(),
            time,
        }
    }
}

/// A raw record from the document source feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_time")]
    pub time: Option<i64>,
}

impl SourceRecord {
    /// Create a complete record.
    pub fn new<U, T>(url: U, title: T, time: i64) -> Self
    where
        U: Into<String>,
        T: Into<String>,
    {
        SourceRecord {
            url: Some(url.into()),
            title: Some(title.into()),
            time: Some(time),
        }
    }

    /// Validate the record.
    ///
    /// A missing or blank `url` or `title` is a
    /// [`LoupeError::MalformedDocument`]. A missing `time` defaults to 0.
    pub fn into_document(self) -> Result<Document> {
        let url = match self.url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                return Err(LoupeError::malformed_document(format!(
                    "record without url (title: {:?})",
                    self.title
                )));
            }
        };
        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => {
                return Err(LoupeError::malformed_document(format!(
                    "record {url} has no title"
                )));
            }
        };

        Ok(Document {
            url,
            title,
            time: self.time.unwrap_or(0),
        })
    }
}

impl From<Document> for SourceRecord {
    fn from(doc: Document) -> Self {
        SourceRecord {
            url: Some(doc.url),
            title: Some(doc.title),
            time: Some(doc.time),
        }
    }
}

/// Feeds disagree on whether timestamps are numbers or strings; accept both.
fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("time out of range: {n}"))),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid time: {s:?}")))
        }
        Some(other) => Err(D::Error::custom(format!("invalid time: {other}"))),
    }
}
