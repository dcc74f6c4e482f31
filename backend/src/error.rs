use actix_web::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Dataset or model artifact absent on disk
    #[error("File '{}' not found. Please ensure it's in the correct directory.", file_name(.path))]
    MissingFile { path: PathBuf },

    /// A form value could not be converted to the type the pipeline expects
    #[error("Field '{field}' must be numeric (got '{value}')")]
    TypeConversion { field: &'static str, value: String },

    /// Record columns differ from the columns the pipeline was fitted on
    #[error("Schema mismatch: pipeline expects {expected:?}, record has {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Whatever the pipeline itself raised
    #[error("Pipeline error: {0:#}")]
    Pipeline(#[from] anyhow::Error),

    #[error("Pipeline produced a non-finite prediction (raw score {raw_score})")]
    NonFiniteOutput { raw_score: f64 },

    #[error("Dataset is missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Column '{column}' has a non-numeric value '{value}' on line {line}")]
    NonNumeric {
        column: String,
        line: u64,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TypeConversion { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingColumns { .. } | AppError::NonNumeric { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::MissingFile { .. }
            | AppError::SchemaMismatch { .. }
            | AppError::Pipeline(_)
            | AppError::NonFiniteOutput { .. }
            | AppError::Csv(_)
            | AppError::Io(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
