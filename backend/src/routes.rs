use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use futures::StreamExt;
use log::{error, info, warn};
use serde::Serialize;
use shared::{BatchResult, HealthResponse};
use std::path::Path;
use uuid::Uuid;

use crate::analysis::extractor::{extract_tasks, Extraction};
use crate::config::app_config::UploadLimits;
use crate::stream::event_stream::{failure_events, progress_events, RecordStream};
use crate::upload::receiver::{receive_images, UploadError};
use crate::vision::model::VisionModel;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: Option<String>) {
    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/analyze").route(web::post().to(analyze)))
        .service(web::resource("/api/analyze-batch").route(web::post().to(analyze_batch)));

    match static_dir {
        Some(dir) if Path::new(&dir).is_dir() => {
            cfg.service(Files::new("/", dir).index_file("index.html"));
        }
        Some(dir) => warn!("Static directory {} not found, client page is not served", dir),
        None => {}
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: "ScreenTask API is running".to_string(),
    })
}

fn upload_error_response(batch_id: Uuid, err: UploadError) -> HttpResponse {
    match err {
        UploadError::NoFiles => {
            info!("Batch {}: no files uploaded", batch_id);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: err.to_string(),
            })
        }
        err => {
            if err.is_client_error() {
                warn!("Batch {}: upload rejected: {}", batch_id, err);
            } else {
                error!("Batch {}: upload failed: {}", batch_id, err);
            }
            HttpResponse::build(err.status_code()).json(FailureResponse {
                success: false,
                error: err.to_string(),
            })
        }
    }
}

async fn analyze(
    req: HttpRequest,
    payload: Multipart,
    model: web::Data<dyn VisionModel>,
    limits: web::Data<UploadLimits>,
) -> HttpResponse {
    let batch_id = Uuid::new_v4();
    let images = match receive_images(&req, payload, &limits).await {
        Ok(images) => images,
        Err(e) => return upload_error_response(batch_id, e),
    };

    info!("Batch {}: analyzing {} screenshots", batch_id, images.len());
    let extractions: Vec<Extraction> = extract_tasks(model.into_inner(), images).collect().await;

    let failed = extractions.iter().filter(|e| e.is_failed()).count();
    info!(
        "Batch {}: finished {} screenshots ({} failed)",
        batch_id,
        extractions.len(),
        failed
    );

    let tasks = extractions.into_iter().map(Extraction::into_record).collect();
    HttpResponse::Ok().json(BatchResult::new(tasks))
}

fn event_stream_response() -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        // actix-http's HTTP/1 encoder writes its own `Connection` header from the
        // connection type and drops this one; over HTTP/1.1 the response is
        // already persistent.
        .insert_header((header::CONNECTION, "keep-alive"));
    builder
}

async fn analyze_batch(
    req: HttpRequest,
    payload: Multipart,
    model: web::Data<dyn VisionModel>,
    limits: web::Data<UploadLimits>,
) -> HttpResponse {
    let batch_id = Uuid::new_v4();
    let images = match receive_images(&req, payload, &limits).await {
        Ok(images) => images,
        Err(e) if e.is_client_error() => return upload_error_response(batch_id, e),
        Err(e) => {
            error!("Batch {}: upload failed: {}", batch_id, e);
            return event_stream_response().streaming(failure_events(e.to_string()));
        }
    };

    let total = images.len();
    info!("Batch {}: streaming analysis of {} screenshots", batch_id, total);

    let records: RecordStream =
        Box::pin(extract_tasks(model.into_inner(), images).map(Extraction::into_record));
    event_stream_response().streaming(progress_events(records, total))
}
