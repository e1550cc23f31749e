use actix_web::http::header;
use actix_web::test::TestRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::upload::receiver::UPLOAD_FIELD;
use crate::vision::model::{RemoteCallError, VisionModel};

pub const BOUNDARY: &str = "----screentask-test-boundary";

pub struct FilePart {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: &str, content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            field: UPLOAD_FIELD.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.map(str::to_string),
            data,
        }
    }

    /// A plain form field without a file name.
    pub fn text(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }
}

pub fn multipart_body(parts: &[FilePart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match &part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.field),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[FilePart]) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(parts))
}

pub fn png_parts(count: usize) -> Vec<FilePart> {
    (1..=count)
        .map(|i| FilePart::new(&format!("shot-{i}.png"), Some("image/png"), vec![i as u8; 4]))
        .collect()
}

/// Replays canned replies in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, RemoteCallError>>>,
    calls: Mutex<Vec<(Vec<u8>, String)>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, RemoteCallError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn media_types(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, media_type)| media_type.clone())
            .collect()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn analyze(
        &self,
        image: &[u8],
        media_type: &str,
        _prompt: &str,
    ) -> Result<String, RemoteCallError> {
        self.calls
            .lock()
            .unwrap()
            .push((image.to_vec(), media_type.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

pub fn reply_for(task: &str, category: &str) -> Result<String, RemoteCallError> {
    Ok(format!(
        r#"{{"task": "{task}", "category": "{category}", "metadata": {{}}, "notes": ""}}"#
    ))
}
