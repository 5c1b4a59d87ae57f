//! # Settings Module
//!
//! ## Purpose
//! Run parameters that are not part of the input tables: temperature, integration time,
//! solver tolerances, the pre-exponential factor shared by all reactions, the name of the
//! concentration column and the size of the sweep worker pool.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "temperature": 298.15,
//!   "run_time": 1e8,
//!   "abs_tol": 1e-12,
//!   "rel_tol": 1e-12,
//!   "pre_exponential": 6.21e12,
//!   "concentration_column": "Concentration",
//!   "deck_file_name": "input_file.mkm",
//!   "workers": 4
//! }
//! ```
//! Every key is optional, absent keys take the defaults above (`workers` defaults to the
//! available parallelism).
//!
//! ## Usage
//! ```rust
//! use mkm_deck::settings::RunSettings;
//! let settings = RunSettings::load("mkm_settings.json").unwrap_or_default();
//! assert!(settings.worker_count() >= 1);
//! ```
use crate::Microkinetics::errors::DeckError;
use crate::Microkinetics::number_format::Numeric;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_FILE: &str = "mkm_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// K
    pub temperature: Numeric,
    /// s, printed as `1.00e+08`
    pub run_time: f64,
    pub abs_tol: Numeric,
    pub rel_tol: Numeric,
    /// forward and backward prefactor of every reaction, kT/h at room temperature
    pub pre_exponential: f64,
    /// column of the species table holding gas concentrations
    pub concentration_column: String,
    pub deck_file_name: String,
    pub workers: Option<usize>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            temperature: Numeric::Float(298.15),
            run_time: 1e8,
            abs_tol: Numeric::Float(1e-12),
            rel_tol: Numeric::Float(1e-12),
            pre_exponential: 6.21e12,
            concentration_column: "Concentration".to_string(),
            deck_file_name: "input_file.mkm".to_string(),
            workers: None,
        }
    }
}

impl RunSettings {
    /// Reads settings from a JSON file. A missing file yields the defaults, a malformed one
    /// is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeckError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| DeckError::io(path, e))?;
        let settings: RunSettings = serde_json::from_str(&content)
            .map_err(|e| DeckError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DeckError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DeckError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| DeckError::io(path, e))
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        let positive = [
            ("run_time", self.run_time),
            ("abs_tol", self.abs_tol.as_f64()),
            ("rel_tol", self.rel_tol.as_f64()),
            ("pre_exponential", self.pre_exponential),
            ("temperature", self.temperature.as_f64()),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DeckError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.deck_file_name.is_empty()
            || self.deck_file_name.contains(['/', '\\'])
        {
            return Err(DeckError::Config(format!(
                "deck_file_name must be a bare file name, got '{}'",
                self.deck_file_name
            )));
        }
        if self.workers == Some(0) {
            return Err(DeckError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Size of the sweep worker pool.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}
