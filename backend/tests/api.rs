use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use rating_dashboard::handlers;
use rating_dashboard::models::{FeatureRecord, FEATURE_COLUMNS};
use rating_dashboard::{AppState, Pipeline, PredictionAdapter};

struct StubPipeline {
    columns: Vec<String>,
    score: f64,
}

impl StubPipeline {
    fn fixed(score: f64) -> Self {
        Self {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            score,
        }
    }
}

impl Pipeline for StubPipeline {
    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
        Ok(self.score)
    }
}

fn state(pipeline: StubPipeline, dataset_path: PathBuf) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        PredictionAdapter::new(Arc::new(pipeline)),
        dataset_path,
    ))
}

fn form(rate: &str) -> Value {
    json!({
        "url": "https://www.zomato.com/bangalore/jalsa-banashankari",
        "address": "942, 21st Main Road, Banashankari",
        "name": "Jalsa",
        "online_order": "Yes",
        "book_table": "Yes",
        "rate": rate,
        "location": "Banashankari",
        "rest_type": "Casual Dining",
        "dish_liked": "Pasta",
        "cuisines": "North Indian",
        "menu_item": "[]",
        "dining_type": "Buffet",
        "location_city": "Banashankari",
        "cost_category": "Low Cost",
        "online_booking_combined": "Yes",
        "vote_category": "High"
    })
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state).configure(handlers::configure)).await
    };
}

#[actix_web::test]
async fn predict_returns_exponentiated_score() {
    let app = app!(state(StubPipeline::fixed(1.5), PathBuf::from("unused.csv")));

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(form("4.2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["prediction"]["rounded"], 4.48);
    assert_eq!(body["data"]["message"], "The predicted result is: 4.48");
}

#[actix_web::test]
async fn non_numeric_rate_is_a_bad_request() {
    let app = app!(state(StubPipeline::fixed(1.5), PathBuf::from("unused.csv")));

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(form("four point two"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("'rate'"));
}

#[actix_web::test]
async fn unknown_choice_is_rejected_in_envelope() {
    let app = app!(state(StubPipeline::fixed(1.5), PathBuf::from("unused.csv")));

    let mut body = form("4.2");
    body["cost_category"] = json!("Medium Cost");
    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn schema_mismatch_is_a_server_error() {
    let pipeline = StubPipeline {
        columns: vec!["name".into(), "rate".into()],
        score: 1.0,
    };
    let app = app!(state(pipeline, PathBuf::from("unused.csv")));

    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(form("4.2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Schema mismatch"));
}

#[actix_web::test]
async fn stats_count_failures() {
    let app = app!(state(StubPipeline::fixed(1.2), PathBuf::from("unused.csv")));

    for rate in ["4.0", "oops", "3.1"] {
        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(form(rate))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total_predictions"], 3);
    assert_eq!(body["data"]["failed_predictions"], 1);
}

#[actix_web::test]
async fn rejected_bodies_count_as_failures() {
    let app = app!(state(StubPipeline::fixed(1.5), PathBuf::from("unused.csv")));

    let mut body = form("4.2");
    body["cost_category"] = json!("Medium Cost");
    let req = test::TestRequest::post()
        .uri("/api/predict")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total_predictions"], 1);
    assert_eq!(body["data"]["failed_predictions"], 1);
}

#[actix_web::test]
async fn analysis_reads_dataset() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name,online_order,book_table,rate,rest_type,cuisines,dining_type,location_city,cost_category,vote_category"
    )
    .unwrap();
    writeln!(file, "Jalsa,Yes,Yes,4.1,Casual Dining,North Indian,Buffet,Banashankari,High Cost,High").unwrap();
    writeln!(file, "Grand Village,No,No,3.8,Casual Dining,North Indian,Buffet,Basavanagudi,Low Cost,Low").unwrap();

    let app = app!(state(StubPipeline::fixed(1.0), file.path().to_path_buf()));
    let req = test::TestRequest::get().uri("/api/analysis").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["rows"], 2);
    assert_eq!(body["data"]["head"][0]["name"], "Jalsa");
    assert_eq!(body["data"]["bivariate"][0]["charts"][0]["kind"], "box");
}

#[actix_web::test]
async fn analysis_flags_missing_columns() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name,votes").unwrap();
    writeln!(file, "Jalsa,775").unwrap();

    let app = app!(state(StubPipeline::fixed(1.0), file.path().to_path_buf()));
    let req = test::TestRequest::get().uri("/api/analysis").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("rate"));
    assert!(message.contains("cost_category"));
}

#[actix_web::test]
async fn analysis_reports_missing_dataset() {
    let app = app!(state(StubPipeline::fixed(1.0), PathBuf::from("missing/cleaned_df.csv")));
    let req = test::TestRequest::get().uri("/api/analysis").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "File 'cleaned_df.csv' not found. Please ensure it's in the correct directory."
    );
}

#[actix_web::test]
async fn pages_and_form_are_served() {
    let app = app!(state(StubPipeline::fixed(1.0), PathBuf::from("unused.csv")));

    let req = test::TestRequest::get().uri("/api/pages").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!(["Introduction", "Analysis", "Model Classification"]));

    let req = test::TestRequest::get().uri("/api/form").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 16);
    assert_eq!(body["data"][13]["choices"], json!(["High Cost", "Low Cost"]));

    let req = test::TestRequest::get().uri("/api/model-info").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["features"][5], "rate");
}

#[actix_web::test]
async fn index_renders_server_text_as_text() {
    let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../static");
    let data = web::Data::new(
        AppState::new(
            PredictionAdapter::new(Arc::new(StubPipeline::fixed(1.0))),
            PathBuf::from("unused.csv"),
        )
        .with_static_dir(static_dir),
    );
    let app = test::init_service(
        App::new()
            .app_data(data)
            .route("/", web::get().to(handlers::index)),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("textContent"));
    assert!(!page.contains("innerHTML"));
}
