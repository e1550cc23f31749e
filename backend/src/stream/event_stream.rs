use actix_web::web::Bytes;
use futures::stream::{self, Stream, StreamExt};
use shared::{StreamEvent, TaskRecord};
use std::convert::Infallible;
use std::pin::Pin;

pub type RecordStream = Pin<Box<dyn Stream<Item = TaskRecord>>>;

const FALLBACK_ERROR_FRAME: &str = "data: {\"type\":\"error\",\"error\":\"Failed to encode event\"}\n\n";

/// Encodes one event as a `text/event-stream` frame: `data: <json>` followed by
/// a blank line.
pub fn encode_frame(event: &StreamEvent) -> Result<Bytes, serde_json::Error> {
    let payload = serde_json::to_string(event)?;
    Ok(Bytes::from(format!("data: {}\n\n", payload)))
}

fn error_frame(message: String) -> Bytes {
    encode_frame(&StreamEvent::Error { error: message })
        .unwrap_or_else(|_| Bytes::from_static(FALLBACK_ERROR_FRAME.as_bytes()))
}

// The unpolled body is the idle state; `Completed` and `Errored` end the stream.
enum EmitterState {
    Streaming {
        records: RecordStream,
        current: usize,
        total: usize,
    },
    Failing(String),
    Completed,
    Errored,
}

impl EmitterState {
    async fn advance(self) -> Option<(Bytes, EmitterState)> {
        match self {
            EmitterState::Streaming {
                mut records,
                current,
                total,
            } => match records.next().await {
                Some(task) => {
                    let current = current + 1;
                    log::debug!("Streaming task {}/{} for {}", current, total, task.file_name);
                    match encode_frame(&StreamEvent::Progress { current, total, task }) {
                        Ok(frame) => Some((
                            frame,
                            EmitterState::Streaming {
                                records,
                                current,
                                total,
                            },
                        )),
                        Err(e) => {
                            log::error!("Failed to encode progress event: {}", e);
                            Some((error_frame(e.to_string()), EmitterState::Errored))
                        }
                    }
                }
                None => match encode_frame(&StreamEvent::Complete { total }) {
                    Ok(frame) => Some((frame, EmitterState::Completed)),
                    Err(e) => Some((error_frame(e.to_string()), EmitterState::Errored)),
                },
            },
            EmitterState::Failing(message) => Some((error_frame(message), EmitterState::Errored)),
            EmitterState::Completed | EmitterState::Errored => None,
        }
    }
}

/// One `progress` frame per record, then a single `complete` frame. The body
/// ends after the terminal frame.
pub fn progress_events(
    records: RecordStream,
    total: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static {
    emit(EmitterState::Streaming {
        records,
        current: 0,
        total,
    })
}

/// A body carrying exactly one `error` frame.
pub fn failure_events(message: String) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static {
    emit(EmitterState::Failing(message))
}

fn emit(initial: EmitterState) -> impl Stream<Item = Result<Bytes, Infallible>> + 'static {
    stream::unfold(initial, EmitterState::advance).map(Ok)
}
