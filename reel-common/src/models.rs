//! Video record model and admin form input

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder name for videos added without one
pub const DEFAULT_NAME: &str = "Untitled Video";

/// Placeholder category for videos added without one
pub const DEFAULT_CATEGORY: &str = "Custom Video";

/// Placeholder role for videos added without one
pub const DEFAULT_ROLE: &str = "Motion Designer";

/// One project video in the catalog
///
/// `id` is the YouTube video ID. `timestamp` is the creation time in Unix
/// epoch milliseconds and is carried over unchanged by updates.
///
/// Documents read from the remote, fallback or cache sources are trusted
/// as-is; fields they omit or leave `null` take the same placeholders used
/// at creation, and a fractional `timestamp` is truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default = "default_name", deserialize_with = "loose_name")]
    pub name: String,
    #[serde(default = "default_category", deserialize_with = "loose_category")]
    pub category: String,
    #[serde(default = "default_role", deserialize_with = "loose_role")]
    pub role: String,
    #[serde(default, deserialize_with = "loose_description")]
    pub description: String,
    #[serde(default, deserialize_with = "loose_timestamp")]
    pub timestamp: i64,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Any JSON scalar as text; `null` is absent
fn loose_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn loose_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_text(d)?.unwrap_or_default())
}

fn loose_name<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_text(d)?.unwrap_or_else(default_name))
}

fn loose_category<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_text(d)?.unwrap_or_else(default_category))
}

fn loose_role<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_text(d)?.unwrap_or_else(default_role))
}

fn loose_description<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(loose_text(d)?.unwrap_or_default())
}

/// Epoch millis written as an integer, a float or numeric text; anything else is 0
fn loose_timestamp<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
    let millis = match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    };
    Ok(millis)
}

impl VideoRecord {
    /// Build a record from form input, applying placeholders
    ///
    /// The caller is responsible for validating `input.id`.
    pub fn from_input(input: &VideoInput, timestamp: i64) -> Self {
        Self {
            id: input.trimmed_id(),
            name: input.name_or_default(),
            category: input.category_or_default(),
            role: input.role_or_default(),
            description: input.description_or_default(),
            timestamp,
        }
    }

    /// YouTube embed URL opened by the video modal
    pub fn embed_url(&self) -> String {
        embed_url(&self.id)
    }

    /// YouTube thumbnail URL used on the project card
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/mqdefault.jpg", self.id)
    }
}

/// YouTube embed URL for a video ID (autoplay, no related videos)
pub fn embed_url(id: &str) -> String {
    format!("https://www.youtube.com/embed/{}?autoplay=1&rel=0", id)
}

/// Admin form contents (a partial video record)
///
/// Every field is optional. Blank values count as omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl VideoInput {
    /// Input with only an ID set
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Pre-populated form for editing an existing record
    pub fn from_record(record: &VideoRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            category: Some(record.category.clone()),
            role: Some(record.role.clone()),
            description: Some(record.description.clone()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// ID after trimming; empty when missing
    pub fn trimmed_id(&self) -> String {
        self.id.as_deref().map(str::trim).unwrap_or_default().to_string()
    }

    fn name_or_default(&self) -> String {
        non_blank(&self.name).unwrap_or_else(default_name)
    }

    fn category_or_default(&self) -> String {
        non_blank(&self.category).unwrap_or_else(default_category)
    }

    fn role_or_default(&self) -> String {
        non_blank(&self.role).unwrap_or_else(default_role)
    }

    fn description_or_default(&self) -> String {
        non_blank(&self.description).unwrap_or_default()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
