use futures::stream::{self, Stream, StreamExt};
use shared::{Category, TaskMetadata, TaskRecord};
use std::sync::Arc;

use crate::upload::models::UploadedImage;
use crate::vision::model::{RemoteCallError, VisionModel};
use crate::vision::prompt::TASK_PROMPT;

use super::parser::parse_or_fallback;

/// Outcome of one image. Both arms carry a full record so sinks never have to
/// special-case failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Analyzed(TaskRecord),
    Failed(TaskRecord),
}

impl Extraction {
    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }

    pub fn into_record(self) -> TaskRecord {
        match self {
            Extraction::Analyzed(record) | Extraction::Failed(record) => record,
        }
    }
}

pub fn failure_record(file_name: String, error: &RemoteCallError) -> TaskRecord {
    TaskRecord {
        task: format!("Error analyzing {}", file_name),
        file_name,
        category: Category::Other,
        metadata: TaskMetadata::default(),
        notes: format!("Error: {}", error),
        error: true,
    }
}

pub async fn extract_task(model: &dyn VisionModel, image: UploadedImage) -> Extraction {
    let UploadedImage {
        file_name,
        media_type,
        data,
    } = image;

    match model.analyze(&data, &media_type, &TASK_PROMPT).await {
        Ok(reply) => Extraction::Analyzed(parse_or_fallback(&reply).into_record(file_name)),
        Err(e) => {
            log::error!("Error processing {}: {}", file_name, e);
            Extraction::Failed(failure_record(file_name, &e))
        }
    }
}

/// Lazily analyzes `images` one after another, in upload order. The next model
/// call starts only after the previous item has been consumed.
pub fn extract_tasks(
    model: Arc<dyn VisionModel>,
    images: Vec<UploadedImage>,
) -> impl Stream<Item = Extraction> + 'static {
    stream::iter(images).then(move |image| {
        let model = model.clone();
        async move { extract_task(model.as_ref(), image).await }
    })
}
