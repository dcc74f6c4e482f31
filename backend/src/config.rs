use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = parse_var("PORT", lookup("PORT"), 8080)?;
        let workers = parse_var("WORKERS", lookup("WORKERS"), num_cpus::get())?;
        if workers == 0 {
            return Err(AppError::Config("WORKERS must be at least 1".to_string()));
        }

        Ok(Self {
            host: or("HOST", "127.0.0.1"),
            port,
            workers,
            model_path: or("MODEL_PATH", "RF_pipeline.onnx").into(),
            dataset_path: or("DATASET_PATH", "cleaned_df.csv").into(),
            static_dir: or("STATIC_DIR", "./static").into(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value '{raw}'"))),
    }
}
