//! JSON configuration and file helpers.

use crate::error::SheetIoError;
use crate::input::SheetInput;
use crate::report::SheetReport;
use omr_sig_core::{Scale, ScaleError};
use omr_sig_dots::DotParams;
use omr_sig_slurs::SlurParams;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

fn default_interline() -> f32 {
    20.0
}

/// Sheet-level configuration: scale and every resolver threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Interline in pixels, used when the input does not carry one.
    #[serde(default = "default_interline")]
    pub interline: f32,
    #[serde(default)]
    pub dots: DotParams,
    #[serde(default)]
    pub slurs: SlurParams,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            interline: default_interline(),
            dots: DotParams::default(),
            slurs: SlurParams::default(),
        }
    }
}

impl SheetConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SheetIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SheetIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn scale(&self) -> Result<Scale, ScaleError> {
        Scale::new(self.interline)
    }
}

impl SheetInput {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SheetIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SheetReport {
    pub fn to_json(&self) -> Result<String, SheetIoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SheetIoError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
