//! ARIMA(p, d, q) forecaster over a fitted, serialized state.
//!
//! The state is produced offline and holds everything needed to project the
//! series forward:
//!
//! - `history`: the original series the model was fitted on
//! - `ar_coeffs` / `ma_coeffs`: AR and MA coefficients
//! - `constant`: mean of the `d`-times differenced series
//! - `residuals`: in-sample residuals on the differenced scale
//!
//! Forecasting differences `history` `d` times, extends it with the AR/MA
//! recursion (future residuals are zero) and integrates back to the original
//! scale.

use super::predictor::Forecaster;
use crate::domain::errors::InferenceError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub const MAX_AR_ORDER: usize = 10;
pub const MAX_DIFFERENCING: usize = 2;
pub const MAX_MA_ORDER: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaState {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub ar_coeffs: Vec<f64>,
    pub ma_coeffs: Vec<f64>,
    pub constant: f64,
    pub history: Vec<f64>,
    #[serde(default)]
    pub residuals: Vec<f64>,
}

impl ArimaState {
    fn validate(&self) -> Result<()> {
        if self.p > MAX_AR_ORDER {
            anyhow::bail!("AR order must be <= {}, got {}", MAX_AR_ORDER, self.p);
        }
        if self.d > MAX_DIFFERENCING {
            anyhow::bail!(
                "Differencing order must be <= {}, got {}",
                MAX_DIFFERENCING,
                self.d
            );
        }
        if self.q > MAX_MA_ORDER {
            anyhow::bail!("MA order must be <= {}, got {}", MAX_MA_ORDER, self.q);
        }
        if self.ar_coeffs.len() != self.p {
            anyhow::bail!(
                "Expected {} AR coefficients, got {}",
                self.p,
                self.ar_coeffs.len()
            );
        }
        if self.ma_coeffs.len() != self.q {
            anyhow::bail!(
                "Expected {} MA coefficients, got {}",
                self.q,
                self.ma_coeffs.len()
            );
        }

        let required = (self.d + self.p).max(1);
        if self.history.len() < required {
            anyhow::bail!(
                "History too short: need at least {} points, got {}",
                required,
                self.history.len()
            );
        }

        let all_finite = std::iter::once(&self.constant)
            .chain(&self.ar_coeffs)
            .chain(&self.ma_coeffs)
            .chain(&self.history)
            .chain(&self.residuals)
            .all(|v| v.is_finite());
        if !all_finite {
            anyhow::bail!("ARIMA state contains NaN or infinite values");
        }

        Ok(())
    }
}

/// Forecaster projecting the groundwater level series from its retained history
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    state: ArimaState,
    /// `levels[k]` is the history differenced `k` times, `k = 0..=d`
    levels: Vec<Vec<f64>>,
}

impl ArimaForecaster {
    pub fn from_state(state: ArimaState) -> Result<Self> {
        state.validate()?;

        let mut levels = Vec::with_capacity(state.d + 1);
        levels.push(state.history.clone());
        for k in 0..state.d {
            let next = difference(&levels[k]);
            levels.push(next);
        }

        Ok(Self { state, levels })
    }

    /// Load an `ArimaState` serialized as JSON
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open forecaster model at {:?}", path))?;
        let state: ArimaState = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize forecaster model at {:?}", path))?;

        let forecaster = Self::from_state(state)
            .with_context(|| format!("Invalid forecaster model at {:?}", path))?;
        let (p, d, q) = forecaster.order();
        info!(
            "Loaded ARIMA({}, {}, {}) forecaster from {:?} ({} history points)",
            p,
            d,
            q,
            path,
            forecaster.state.history.len()
        );
        Ok(forecaster)
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.state.p, self.state.d, self.state.q)
    }

    /// Forecasts on the `d`-times differenced scale
    fn forecast_differenced(&self, steps: usize) -> Vec<f64> {
        let state = &self.state;
        let mut extended = self.levels[state.d].clone();
        let mut extended_residuals = state.residuals.clone();
        let start = extended.len();

        for _ in 0..steps {
            let mut forecast = state.constant;

            for (j, coeff) in state.ar_coeffs.iter().enumerate() {
                let idx = extended.len() - j - 1;
                forecast += coeff * (extended[idx] - state.constant);
            }

            for (j, coeff) in state.ma_coeffs.iter().enumerate() {
                if extended_residuals.len() > j {
                    let idx = extended_residuals.len() - j - 1;
                    forecast += coeff * extended_residuals[idx];
                }
            }

            extended.push(forecast);
            extended_residuals.push(0.0);
        }

        extended.split_off(start)
    }

    /// Integrate differenced forecasts back onto the original scale
    fn integrate(&self, mut forecasts: Vec<f64>) -> Vec<f64> {
        for k in (0..self.state.d).rev() {
            let mut last = self.levels[k].last().copied().unwrap_or(0.0);
            for value in forecasts.iter_mut() {
                last += *value;
                *value = last;
            }
        }
        forecasts
    }
}

impl Forecaster for ArimaForecaster {
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, InferenceError> {
        if steps == 0 {
            return Ok(Vec::new());
        }

        let forecasts = self.integrate(self.forecast_differenced(steps));

        if forecasts.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::Forecaster {
                reason: "forecast diverged to a non-finite value".to_string(),
            });
        }
        Ok(forecasts)
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}

fn difference(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}
