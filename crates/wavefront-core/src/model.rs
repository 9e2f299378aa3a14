//! Wire types for the Wavefront v2 REST API.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Tags are compared as sets; a sorted set keeps result records stable.
pub type TagSet = BTreeSet<String>;

/// A monitored entity (host, service) tracked by Wavefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SourceBody", into = "SourceBody")]
pub struct Source {
    pub name: String,
    pub description: Option<String>,
    pub hidden: bool,
    pub tags: TagSet,
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            hidden: false,
            tags: TagSet::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// JSON shape of a source. The API keys sources by `id` on reads and by
/// `sourceName` on writes, and stores tags as a `tag -> bool` map.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    tags: BTreeMap<String, bool>,
}

impl TryFrom<SourceBody> for Source {
    type Error = String;

    fn try_from(body: SourceBody) -> Result<Self, Self::Error> {
        let name = body
            .source_name
            .or(body.id)
            .ok_or_else(|| "source has neither `id` nor `sourceName`".to_string())?;
        Ok(Self {
            name,
            description: body.description,
            hidden: body.hidden,
            tags: body
                .tags
                .into_iter()
                .filter_map(|(tag, enabled)| enabled.then_some(tag))
                .collect(),
        })
    }
}

impl From<Source> for SourceBody {
    fn from(source: Source) -> Self {
        Self {
            id: Some(source.name.clone()),
            source_name: Some(source.name),
            description: source.description,
            hidden: source.hidden,
            tags: source.tags.into_iter().map(|tag| (tag, true)).collect(),
        }
    }
}

/// Standard response envelope: `{"status": {...}, "response": ...}`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<ApiStatus>,
    pub response: Option<T>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
}

/// Paged list payload (`response.items`).
#[derive(Debug, Deserialize)]
pub struct PagedItems<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// One filter of an event search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub matching_method: MatchingMethod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchingMethod {
    #[default]
    Contains,
    Startswith,
    Equals,
}

impl std::str::FromStr for MatchingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONTAINS" => Ok(Self::Contains),
            "STARTSWITH" => Ok(Self::Startswith),
            "EQUALS" => Ok(Self::Equals),
            other => Err(format!(
                "unknown matching method `{other}` (expected CONTAINS, STARTSWITH or EQUALS)"
            )),
        }
    }
}
