use serde::Deserialize;
use shared::{
    deserialize_lenient_string, deserialize_metadata_or_default, Category, TaskMetadata, TaskRecord,
};

pub const UNKNOWN_TASK: &str = "Unknown task";
const FALLBACK_TASK_CHARS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("Reply contains no JSON object")]
    NoJsonObject,
    #[error("Invalid JSON in reply: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The model's answer for one screenshot, before it is tied to a file name.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ParsedTask {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub task: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "deserialize_metadata_or_default")]
    pub metadata: TaskMetadata,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub notes: Option<String>,
}

impl ParsedTask {
    pub fn into_record(self, file_name: String) -> TaskRecord {
        TaskRecord {
            file_name,
            task: self.task.unwrap_or_default(),
            category: self.category,
            metadata: self.metadata,
            notes: self.notes.unwrap_or_default(),
            error: false,
        }
    }
}

/// Span from the first `{` to the last `}`, if the text has one.
fn brace_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_reply(text: &str) -> Result<ParsedTask, ParseFailure> {
    let candidate = brace_region(text).ok_or(ParseFailure::NoJsonObject)?;
    Ok(serde_json::from_str(candidate)?)
}

pub fn fallback_task(text: &str) -> ParsedTask {
    let task: String = text.chars().take(FALLBACK_TASK_CHARS).collect();
    ParsedTask {
        task: Some(if task.is_empty() {
            UNKNOWN_TASK.to_string()
        } else {
            task
        }),
        category: Category::Other,
        metadata: TaskMetadata::default(),
        notes: Some(String::new()),
    }
}

/// Never fails: anything that does not parse degrades to [`fallback_task`].
pub fn parse_or_fallback(text: &str) -> ParsedTask {
    match parse_reply(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Falling back to raw reply text: {}", e);
            fallback_task(text)
        }
    }
}
