use super::predictor::Regressor;
use crate::domain::errors::InferenceError;
use crate::domain::features::FeatureRow;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// On-disk regressor artifact: the forest plus the column order it was trained with
#[derive(Serialize, Deserialize)]
pub struct RegressorArtifact {
    pub feature_names: Vec<String>,
    pub model: ForestModel,
}

/// Random forest estimating the current groundwater level
pub struct RandomForestLevelRegressor {
    feature_names: Vec<String>,
    model: ForestModel,
}

impl RandomForestLevelRegressor {
    pub fn new(feature_names: Vec<String>, model: ForestModel) -> Result<Self> {
        if feature_names.is_empty() {
            anyhow::bail!("Regressor artifact lists no feature names");
        }
        Ok(Self {
            feature_names,
            model,
        })
    }

    pub fn from_artifact(artifact: RegressorArtifact) -> Result<Self> {
        Self::new(artifact.feature_names, artifact.model)
    }

    /// Load a `RegressorArtifact` serialized as JSON
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open regressor model at {:?}", path))?;
        let artifact: RegressorArtifact = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize regressor model at {:?}", path))?;

        let regressor = Self::from_artifact(artifact)?;
        info!(
            "Loaded regressor from {:?} ({} features: {})",
            path,
            regressor.feature_names.len(),
            regressor.feature_names.join(", ")
        );
        Ok(regressor)
    }
}

impl Regressor for RandomForestLevelRegressor {
    fn predict(&self, features: &FeatureRow) -> Result<f64, InferenceError> {
        let input_vec = features.to_vector(&self.feature_names)?;

        let input_matrix =
            DenseMatrix::from_2d_vec(&vec![input_vec]).map_err(|e| InferenceError::Regressor {
                reason: format!("Matrix creation failed: {}", e),
            })?;

        let predictions = self
            .model
            .predict(&input_matrix)
            .map_err(|e| InferenceError::Regressor {
                reason: format!("Prediction failed: {}", e),
            })?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Regressor {
                reason: "No prediction returned".to_string(),
            })
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;
    use std::io::Write;

    fn names() -> Vec<String> {
        vec!["rainfall_mm".to_string(), "temperature".to_string()]
    }

    /// Level tracks rainfall; temperature is noise
    fn train_forest() -> ForestModel {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let rain = i as f64 * 0.25;
            x.push(vec![rain, 20.0 + (i % 5) as f64]);
            y.push(rain);
        }
        let x = DenseMatrix::from_2d_vec(&x).unwrap();
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(10)
            .with_max_depth(6)
            .with_min_samples_split(2);
        RandomForestRegressor::fit(&x, &y, params).unwrap()
    }

    #[test]
    fn test_predicts_from_named_features() {
        let regressor = RandomForestLevelRegressor::new(names(), train_forest()).unwrap();
        let row = FeatureRow::new()
            .with("temperature", 21.0)
            .with("rainfall_mm", 8.0)
            .with("station", "north-7");

        let value = regressor.predict(&row).unwrap();
        assert!(value.is_finite());
        assert!(value > 3.0, "expected a high level for heavy rain, got {}", value);
    }

    #[test]
    fn test_missing_feature_is_an_inference_error() {
        let regressor = RandomForestLevelRegressor::new(names(), train_forest()).unwrap();
        let row = FeatureRow::new().with("rainfall_mm", 8.0);

        assert_eq!(
            regressor.predict(&row),
            Err(InferenceError::MissingFeature {
                name: "temperature".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_artifact_without_feature_names() {
        assert!(RandomForestLevelRegressor::new(Vec::new(), train_forest()).is_err());
    }

    #[test]
    fn test_load_round_trip_through_artifact_file() {
        let artifact = RegressorArtifact {
            feature_names: names(),
            model: train_forest(),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &artifact).unwrap();
        file.flush().unwrap();

        let regressor = RandomForestLevelRegressor::load(file.path()).unwrap();
        assert_eq!(regressor.feature_names, names());
        let row = FeatureRow::new().with("rainfall_mm", 0.0).with("temperature", 20.0);
        assert!(regressor.predict(&row).unwrap() < 1.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = RandomForestLevelRegressor::load(Path::new("/nonexistent/rf.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to open regressor model"));
    }
}
