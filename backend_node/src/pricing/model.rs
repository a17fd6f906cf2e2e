//! Linear regression over one-hot encoded item features.
//!
//! The training pipeline one-hot encodes `itemType` and `rarity` and passes
//! `bonusValue` through, so the serving side only needs the category lists,
//! a weight vector and a bias. The artifact is a JSON document produced by
//! the training job; it is loaded once at startup and never reloaded.

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("could not read model artifact {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("weight vector length {got} does not match feature width {want}")]
    Shape { got: usize, want: usize },
    #[error("recommended price is zero; deviation is undefined")]
    ZeroRecommendation,
}

/// Serialized form of the trained model.
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    item_types: Vec<String>,
    rarities: Vec<String>,
    weights: Vec<f64>,
    bias: f64,
}

/// The loaded regression model. Category lookups are case-insensitive;
/// unknown categories encode as all-zero, matching the training encoder's
/// unknown-handling.
#[derive(Debug)]
pub struct PriceModel {
    item_types: Vec<String>,
    rarities: Vec<String>,
    weights: Array1<f64>,
    bias: f64,
}

/// Three-way classification of how an observed price relates to the
/// recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Underpriced,
    Normal,
    Overpriced,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceAssessment {
    pub recommended: i64,
    pub deviation: f64,
    pub band: PriceBand,
}

impl PriceModel {
    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let bytes = std::fs::read(path).map_err(|source| PricingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_slice(&bytes)?;
        info!(
            "loaded price model from {} ({} item types, {} rarity tiers)",
            path.display(),
            model.item_types.len(),
            model.rarities.len()
        );
        Ok(model)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PricingError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        let want = artifact.item_types.len() + artifact.rarities.len() + 1;
        if artifact.weights.len() != want {
            return Err(PricingError::Shape {
                got: artifact.weights.len(),
                want,
            });
        }
        Ok(Self {
            item_types: artifact
                .item_types
                .into_iter()
                .map(|t| t.to_lowercase())
                .collect(),
            rarities: artifact
                .rarities
                .into_iter()
                .map(|r| r.to_lowercase())
                .collect(),
            weights: Array1::from(artifact.weights),
            bias: artifact.bias,
        })
    }

    fn features(&self, item_type: &str, rarity: &str, bonus_value: f64) -> Array1<f64> {
        let mut features = Array1::zeros(self.weights.len());
        let item_type = item_type.to_lowercase();
        let rarity = rarity.to_lowercase();
        if let Some(i) = self.item_types.iter().position(|t| *t == item_type) {
            features[i] = 1.0;
        }
        if let Some(i) = self.rarities.iter().position(|r| *r == rarity) {
            features[self.item_types.len() + i] = 1.0;
        }
        features[self.weights.len() - 1] = bonus_value;
        features
    }

    /// Recommended price for an item, rounded to the nearest integer.
    pub fn recommend(&self, item_type: &str, rarity: &str, bonus_value: f64) -> i64 {
        let prediction = self.features(item_type, rarity, bonus_value).dot(&self.weights) + self.bias;
        prediction.round() as i64
    }

    /// Recommendation plus deviation of an observed price, as a percentage
    /// of the recommendation rounded to two decimals, classified into a
    /// [`PriceBand`]. A zero recommendation makes the deviation undefined
    /// and is reported as an error.
    pub fn assess(
        &self,
        item_type: &str,
        rarity: &str,
        bonus_value: f64,
        observed: f64,
    ) -> Result<PriceAssessment, PricingError> {
        let recommended = self.recommend(item_type, rarity, bonus_value);
        if recommended == 0 {
            return Err(PricingError::ZeroRecommendation);
        }
        let deviation = round2((observed - recommended as f64) / recommended as f64 * 100.0);
        let band = if deviation < -10.0 {
            PriceBand::Underpriced
        } else if deviation > 10.0 {
            PriceBand::Overpriced
        } else {
            PriceBand::Normal
        };
        Ok(PriceAssessment {
            recommended,
            deviation,
            band,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
