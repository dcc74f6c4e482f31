use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Columns the rating pipeline was fitted on, in fit order.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "url",
    "address",
    "name",
    "online_order",
    "book_table",
    "rate",
    "location",
    "rest_type",
    "dish_liked",
    "cuisines",
    "menu_item",
    "dining_type",
    "location_city",
    "cost_category",
    "online_booking_combined",
    "vote_category",
];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CostCategory {
    #[serde(rename = "High Cost")]
    High,
    #[serde(rename = "Low Cost")]
    Low,
}

impl CostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::High => "High Cost",
            CostCategory::Low => "Low Cost",
        }
    }
}

/// Values submitted by the Model Classification form.
///
/// `rate` stays a string here: the form accepts free text and conversion
/// errors have to reach the user as such.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictionRequest {
    pub url: String,
    pub address: String,
    pub name: String,
    pub online_order: YesNo,
    pub book_table: YesNo,
    pub rate: String,
    pub location: String,
    pub rest_type: String,
    pub dish_liked: String,
    pub cuisines: String,
    pub menu_item: String,
    pub dining_type: String,
    pub location_city: String,
    pub cost_category: CostCategory,
    pub online_booking_combined: YesNo,
    pub vote_category: String,
}

impl PredictionRequest {
    pub fn parse_rate(&self) -> Result<f64> {
        let trimmed = self.rate.trim();
        match trimmed.parse::<f64>() {
            Ok(rate) if rate.is_finite() => Ok(rate),
            _ => Err(AppError::TypeConversion {
                field: "rate",
                value: self.rate.clone(),
            }),
        }
    }

    /// Builds the single-row record in `FEATURE_COLUMNS` order.
    pub fn to_record(&self) -> Result<FeatureRecord> {
        let rate = self.parse_rate()?;
        let text = |value: &str| FeatureValue::Text(value.to_string());

        let values = [
            text(&self.url),
            text(&self.address),
            text(&self.name),
            text(self.online_order.as_str()),
            text(self.book_table.as_str()),
            FeatureValue::Number(rate),
            text(&self.location),
            text(&self.rest_type),
            text(&self.dish_liked),
            text(&self.cuisines),
            text(&self.menu_item),
            text(&self.dining_type),
            text(&self.location_city),
            text(self.cost_category.as_str()),
            text(self.online_booking_combined.as_str()),
            text(&self.vote_category),
        ];

        Ok(FeatureRecord {
            fields: FEATURE_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .zip(values)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

/// One row handed to a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    fields: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub raw_score: f64,
    pub predicted_rating: f64,
    pub rounded: f64,
}

impl Prediction {
    /// Reverses the log transform the target was trained under.
    pub fn from_log_score(raw_score: f64) -> Result<Self> {
        let predicted_rating = raw_score.exp();
        if !raw_score.is_finite() || !predicted_rating.is_finite() || predicted_rating <= 0.0 {
            return Err(AppError::NonFiniteOutput { raw_score });
        }

        Ok(Prediction {
            raw_score,
            predicted_rating,
            rounded: round_to(predicted_rating, 2),
        })
    }
}

/// Half-to-even, matching how the rating was displayed before.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Serialize, Clone)]
pub struct PredictionResult {
    pub prediction: Prediction,
    pub message: String,
    pub timestamp: String,
}

impl PredictionResult {
    pub fn new(prediction: Prediction) -> Self {
        PredictionResult {
            message: format!("The predicted result is: {}", prediction.rounded),
            prediction,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, start: std::time::Instant) -> Self {
        self.execution_time_ms = Some(start.elapsed().as_millis() as u64);
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_request(rate: &str) -> PredictionRequest {
    PredictionRequest {
        url: "https://www.zomato.com/bangalore/jalsa-banashankari".into(),
        address: "942, 21st Main Road, Banashankari".into(),
        name: "Jalsa".into(),
        online_order: YesNo::Yes,
        book_table: YesNo::Yes,
        rate: rate.into(),
        location: "Banashankari".into(),
        rest_type: "Casual Dining".into(),
        dish_liked: "Pasta, Lunch Buffet".into(),
        cuisines: "North Indian, Mughlai, Chinese".into(),
        menu_item: "[]".into(),
        dining_type: "Buffet".into(),
        location_city: "Banashankari".into(),
        cost_category: CostCategory::Low,
        online_booking_combined: YesNo::Yes,
        vote_category: "High".into(),
    }
}
