use actix_files::NamedFile;
use actix_web::error::InternalError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use std::time::Instant;

use crate::analysis::{self, AnalysisReport};
use crate::app_state::AppState;
use crate::dataset::Dataset;
use crate::error::AppError;
use crate::models::{ApiResponse, PredictionRequest, PredictionResult};
use crate::pages::{self, Page};

const JSON_LIMIT: usize = 64 * 1024;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("Restaurant rating dashboard"))
}

pub async fn list_pages() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(Page::ALL))
}

pub async fn introduction() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(pages::introduction()))
}

pub async fn prediction_form() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(pages::prediction_form()))
}

pub async fn model_info(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.adapter.get_model_info()))
}

pub async fn stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(state.stats.snapshot()))
}

pub async fn analysis(state: web::Data<AppState>) -> impl Responder {
    let start_time = Instant::now();
    let path = state.dataset_path.clone();

    let outcome = web::block(move || {
        let dataset = Dataset::load(&path)?;
        analysis::build_report(&dataset)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            info!(
                "Analysis built: {} rows, {} columns",
                report.rows,
                report.columns.len()
            );
            HttpResponse::Ok().json(ApiResponse::success(report).timed(start_time))
        }
        Ok(Err(e)) => {
            error!("Analysis failed: {}", e);
            error_response::<AnalysisReport>(&e, start_time)
        }
        Err(e) => {
            error!("Blocking execution error: {}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<AnalysisReport>::error("Execution error").timed(start_time))
        }
    }
}

pub async fn predict(
    state: web::Data<AppState>,
    req: web::Json<PredictionRequest>,
) -> impl Responder {
    let start_time = Instant::now();
    info!("New prediction request received");

    let adapter = state.adapter.clone();
    let request = req.into_inner();

    match web::block(move || adapter.predict(&request)).await {
        Ok(Ok(prediction)) => {
            state.stats.record(true);
            info!(
                "Prediction succeeded: raw={:.4} rating={}",
                prediction.raw_score, prediction.rounded
            );
            HttpResponse::Ok()
                .json(ApiResponse::success(PredictionResult::new(prediction)).timed(start_time))
        }
        Ok(Err(e)) => {
            state.stats.record(false);
            match e {
                AppError::TypeConversion { .. } => warn!("Prediction rejected: {}", e),
                _ => error!("Prediction failed: {}", e),
            }
            error_response::<PredictionResult>(&e, start_time)
        }
        Err(e) => {
            state.stats.record(false);
            error!("Blocking execution error: {}", e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<PredictionResult>::error("Execution error").timed(start_time))
        }
    }
}

fn error_response<T: serde::Serialize>(e: &AppError, start_time: Instant) -> HttpResponse {
    HttpResponse::build(e.status_code())
        .json(ApiResponse::<T>::error(&e.to_string()).timed(start_time))
}

pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match NamedFile::open_async(state.static_dir.join("index.html")).await {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            error!("Failed to open index.html: {}", e);
            HttpResponse::InternalServerError().body("Failed to load interface")
        }
    }
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ApiResponse::<String>::error("Endpoint not found"))
}

/// Malformed bodies and unknown choice values come back in the usual envelope
/// and count as failed predictions.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, req| {
            warn!("Rejected request body: {}", err);
            if let Some(state) = req.app_data::<web::Data<AppState>>() {
                state.stats.record(false);
            }
            let response =
                HttpResponse::BadRequest().json(ApiResponse::<String>::error(&err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/api/health", web::get().to(health_check))
        .route("/api/pages", web::get().to(list_pages))
        .route("/api/introduction", web::get().to(introduction))
        .route("/api/form", web::get().to(prediction_form))
        .route("/api/model-info", web::get().to(model_info))
        .route("/api/stats", web::get().to(stats))
        .route("/api/analysis", web::get().to(analysis))
        .route("/api/predict", web::post().to(predict));
}
