//! Reshaping of upstream news payloads into a small, stable record.

use serde::Serialize;
use serde_json::Value;

/// Reduced news record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub id: Value,
    pub title: Value,
    pub url: Value,
    pub source: Value,
    pub published_on: Value,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl NewsItem {
    /// Build from one element of the upstream `Data` list.
    pub fn from_upstream(item: &Value) -> Self {
        let field = |name: &str| item.get(name).cloned().unwrap_or(Value::Null);
        let categories = item
            .get("categories")
            .and_then(Value::as_str)
            .unwrap_or("");
        let tags = item.get("tags").and_then(Value::as_str).unwrap_or("");

        Self {
            id: field("id"),
            title: field("title"),
            url: field("url"),
            source: field("source"),
            published_on: field("published_on"),
            categories: categories.split('|').map(str::to_string).collect(),
            tags: if tags.is_empty() {
                Vec::new()
            } else {
                tags.split('|').map(str::to_string).collect()
            },
        }
    }
}

/// Envelope returned by the news endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsEnvelope {
    pub status: &'static str,
    pub count: usize,
    pub news: Vec<NewsItem>,
}

/// Keep at most `limit` items of the upstream `Data` list and reshape them.
///
/// A negative limit keeps nothing. A payload without a `Data` list yields an
/// empty envelope.
pub fn reshape_news(payload: &Value, limit: i64) -> NewsEnvelope {
    let keep = usize::try_from(limit).unwrap_or(0);
    let news: Vec<NewsItem> = payload
        .get("Data")
        .and_then(Value::as_array)
        .map(|items| items.iter().take(keep).map(NewsItem::from_upstream).collect())
        .unwrap_or_default();

    NewsEnvelope {
        status: "success",
        count: news.len(),
        news,
    }
}
