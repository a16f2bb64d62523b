/*!
 * Supported translation directions.
 *
 * The tool translates between Vietnamese and Japanese only; the target code
 * picks the direction.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Target language of a run, which fixes the source language too
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranslationDirection {
    /// Vietnamese to Japanese
    #[default]
    Ja,
    /// Japanese to Vietnamese
    Vi,
}

impl TranslationDirection {
    /// Target language code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::Vi => "vi",
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Ja => "Vietnamese",
            Self::Vi => "Japanese",
        }
    }

    pub fn target_name(&self) -> &'static str {
        match self {
            Self::Ja => "Japanese",
            Self::Vi => "Vietnamese",
        }
    }

    /// Direction as named in the translation request, e.g. `Vietnamese to Japanese`
    pub fn label(&self) -> String {
        format!("{} to {}", self.source_name(), self.target_name())
    }
}

impl fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TranslationDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ja" => Ok(Self::Ja),
            "vi" => Ok(Self::Vi),
            other => Err(anyhow!("Unsupported target language: {} (expected ja or vi)", other)),
        }
    }
}
