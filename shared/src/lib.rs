use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Closed set of to-do categories a screenshot can fall into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Shopping,
    Reading,
    Cooking,
    Articles,
    #[default]
    Other,
}

fn category_of(value: &str) -> Category {
    Category::from_str(value.trim()).unwrap_or(Category::Other)
}

/// Anything that is not one of the known names, `null` included, is `Other`.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => category_of(s.as_str()),
            _ => Category::Other,
        })
    }
}

/// Models sometimes answer `"price": 29.99` or `"author": null`: scalars are kept
/// as text and null is treated as absent.
pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(serde::de::Error::custom(
            "Expected string, number, boolean or null",
        )),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(default, deserialize_with = "deserialize_lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string", skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
}

/// A `"metadata": null` reply carries no metadata rather than a malformed one.
pub fn deserialize_metadata_or_default<'de, D>(deserializer: D) -> Result<TaskMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TaskMetadata>::deserialize(deserializer)?.unwrap_or_default())
}

/// One extracted to-do item, keyed back to the uploaded file it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub file_name: String,
    pub task: String,
    pub category: Category,
    #[serde(default)]
    pub metadata: TaskMetadata,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub count: usize,
    pub tasks: Vec<TaskRecord>,
}

impl BatchResult {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            success: true,
            count: tasks.len(),
            tasks,
        }
    }
}

/// Payloads written to the `text/event-stream` progress feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Progress {
        current: usize,
        total: usize,
        task: TaskRecord,
    },
    Complete {
        total: usize,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
