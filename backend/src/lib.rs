pub mod analysis;
pub mod app_state;
pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod models;
pub mod pages;

pub use app_state::AppState;
pub use error::{AppError, Result};
pub use inference::{OnnxPipeline, Pipeline, PredictionAdapter};
