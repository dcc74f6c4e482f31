use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{error, info};
use std::sync::Arc;

use rating_dashboard::config::Config;
use rating_dashboard::handlers;
use rating_dashboard::{AppState, OnnxPipeline, PredictionAdapter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting restaurant rating dashboard");

    let config = Config::from_env()?;

    // The pipeline is fatal at startup; the dataset is read per Analysis request.
    let pipeline = match OnnxPipeline::load(&config.model_path) {
        Ok(pipeline) => {
            info!("Pipeline loaded from {}", config.model_path.display());
            pipeline
        }
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let state = web::Data::new(
        AppState::new(
            PredictionAdapter::new(Arc::new(pipeline)),
            config.dataset_path.clone(),
        )
        .with_static_dir(config.static_dir.clone()),
    );

    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();

    info!("Server listening on: http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Dataset: {}", config.dataset_path.display());
    info!("API endpoints:");
    info!("   GET  /api/health       - liveness");
    info!("   GET  /api/pages        - page list");
    info!("   GET  /api/introduction - dataset introduction");
    info!("   GET  /api/analysis     - exploratory charts");
    info!("   GET  /api/form         - prediction form");
    info!("   GET  /api/model-info   - pipeline schema");
    info!("   GET  /api/stats        - prediction counters");
    info!("   POST /api/predict      - rating prediction");

    let allowed_port = config.port;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&format!("http://localhost:{allowed_port}"))
            .allowed_origin(&format!("http://127.0.0.1:{allowed_port}"))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::configure)
            .route("/", web::get().to(handlers::index))
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(handlers::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
