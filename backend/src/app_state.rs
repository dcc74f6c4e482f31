use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::inference::PredictionAdapter;

pub struct AppState {
    pub adapter: PredictionAdapter,
    pub dataset_path: PathBuf,
    pub static_dir: PathBuf,
    pub stats: PredictionStats,
}

impl AppState {
    pub fn new(adapter: PredictionAdapter, dataset_path: PathBuf) -> Self {
        Self {
            adapter,
            dataset_path,
            static_dir: PathBuf::from("./static"),
            stats: PredictionStats::default(),
        }
    }

    pub fn with_static_dir(mut self, static_dir: PathBuf) -> Self {
        self.static_dir = static_dir;
        self
    }
}

#[derive(Default)]
pub struct PredictionStats {
    total: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_predictions: u64,
    pub failed_predictions: u64,
}

impl PredictionStats {
    pub fn record(&self, ok: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_predictions: self.total.load(Ordering::Relaxed),
            failed_predictions: self.failed.load(Ordering::Relaxed),
        }
    }
}
