use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::app_config::ModelConfig;

use super::model::{RemoteCallError, VisionModel};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl MessagesResponse {
    fn first_text(self) -> String {
        self.content
            .into_iter()
            .find_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Unsupported => None,
            })
            .unwrap_or_default()
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|response| response.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicService {
    http_client: HttpClient,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicService {
    pub fn new(config: &ModelConfig) -> Result<Self, RemoteCallError> {
        let endpoint = Url::parse(&config.api_url)?.join("v1/messages")?;
        Ok(Self {
            http_client: HttpClient::new(),
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, image: &[u8], media_type: &'a str, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: vec![
                    RequestBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type,
                            data: general_purpose::STANDARD.encode(image),
                        },
                    },
                    RequestBlock::Text { text: prompt },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionModel for AnthropicService {
    async fn analyze(
        &self,
        image: &[u8],
        media_type: &str,
        prompt: &str,
    ) -> Result<String, RemoteCallError> {
        let request = self.build_request(image, media_type, prompt);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(RemoteCallError::Api {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        let message: MessagesResponse = response.json().await?;
        Ok(message.first_text())
    }
}
