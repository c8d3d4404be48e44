use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Display label for a predicted growth-quality class code.
///
/// The model emits codes 0..=2; anything else has no mapping and the
/// backend reports it as a pipeline failure instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum GrowthLabel {
    Kurang,
    Cukup,
    Baik,
}

impl GrowthLabel {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(GrowthLabel::Kurang),
            1 => Some(GrowthLabel::Cukup),
            2 => Some(GrowthLabel::Baik),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            GrowthLabel::Kurang => 0,
            GrowthLabel::Cukup => 1,
            GrowthLabel::Baik => 2,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TransformRequest {
    pub features: Vec<Vec<f64>>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AccuracyRequest {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TransformResponse {
    pub transformed_features: Vec<Vec<f64>>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PredictResponse {
    pub prediction: GrowthLabel,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct AccuracyResponse {
    pub accuracy: f64,
}
