//! Configuration management and validation.
//!
//! Provides one immutable configuration structure per concern (parsing,
//! validation bounds, repair, classification, carbon tables) and an
//! aggregate [`Config`] that is validated once before processing starts.

use crate::constants::{self, reference_points};
use crate::error::{Result, TreeError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Record parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Field delimiter character
    pub delimiter: char,

    /// Quoting character; delimiters inside a quoted span are not separators
    pub quote: char,

    /// Number of columns in a complete record
    pub field_count: usize,

    /// Physical lines that may be appended to complete one record
    pub max_continuation_lines: usize,

    /// Hard limit of physical lines read from the input
    pub max_lines: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: constants::DEFAULT_DELIMITER,
            quote: constants::DEFAULT_QUOTE,
            field_count: constants::FIELD_COUNT,
            max_continuation_lines: constants::MAX_CONTINUATION_LINES,
            max_lines: constants::MAX_LINES,
        }
    }
}

/// Range limits applied when a tree record is constructed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationBounds {
    /// Year the register was recorded; planting year + age must equal it
    pub reference_year: i32,

    /// Earliest accepted planting year
    pub min_year_planted: i32,

    pub max_crown_diameter_m: f64,
    pub max_girth_cm: i32,
    pub max_height_m: f64,

    /// String values treated as missing (case-insensitive)
    pub excluded_values: Vec<String>,
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            reference_year: constants::REFERENCE_YEAR,
            min_year_planted: constants::MIN_YEAR_PLANTED,
            max_crown_diameter_m: constants::MAX_CROWN_DIAMETER_M,
            max_girth_cm: constants::MAX_GIRTH_CM,
            max_height_m: constants::MAX_HEIGHT_M,
            excluded_values: constants::EXCLUDED_VALUES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ValidationBounds {
    /// Oldest accepted age
    pub fn max_age(&self) -> i32 {
        self.reference_year - self.min_year_planted
    }

    /// Check whether a raw string is on the exclusion vocabulary
    pub fn is_excluded(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.excluded_values
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(trimmed))
    }
}

/// Repair engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Age = girth * factor; girth = age / factor
    pub mitchell_factor: f64,

    /// Construction attempts per line before it is discarded
    pub max_construction_attempts: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            mitchell_factor: constants::MITCHELL_FACTOR,
            max_construction_attempts: constants::MAX_CONSTRUCTION_ATTEMPTS,
        }
    }
}

/// Calibration for one feature of the confidence score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureReference {
    /// Value at which the deciduous contribution peaks
    pub deciduous: f64,
    /// Value at which the coniferous contribution peaks
    pub coniferous: f64,
    pub min: f64,
    pub max: f64,
}

impl FeatureReference {
    pub fn new(deciduous: f64, coniferous: f64, min: f64, max: f64) -> Self {
        Self {
            deciduous,
            coniferous,
            min,
            max,
        }
    }

    /// Reject reference points that would divide by a zero span
    fn validate(&self, feature: &str) -> Result<()> {
        for (category, reference) in [("deciduous", self.deciduous), ("coniferous", self.coniferous)]
        {
            if !(self.min < reference && reference < self.max) {
                return Err(TreeError::configuration(format!(
                    "{} {} reference point {} must lie strictly inside [{}, {}]",
                    category, feature, reference, self.min, self.max
                )));
            }
        }
        Ok(())
    }
}

/// Deciduous/coniferous classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub height: FeatureReference,
    pub crown_diameter: FeatureReference,
    pub girth: FeatureReference,

    /// Scores at or above this value are deciduous
    pub threshold: f64,

    /// Scientific species names that are always coniferous
    pub coniferous_species: Vec<String>,

    /// Scientific species names that are always deciduous
    pub deciduous_species: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let bounds = ValidationBounds::default();
        Self {
            height: FeatureReference::new(
                reference_points::DECIDUOUS_HEIGHT_M,
                reference_points::CONIFEROUS_HEIGHT_M,
                0.0,
                bounds.max_height_m,
            ),
            crown_diameter: FeatureReference::new(
                reference_points::DECIDUOUS_CROWN_DIAMETER_M,
                reference_points::CONIFEROUS_CROWN_DIAMETER_M,
                0.0,
                bounds.max_crown_diameter_m,
            ),
            girth: FeatureReference::new(
                reference_points::DECIDUOUS_GIRTH_CM,
                reference_points::CONIFEROUS_GIRTH_CM,
                0.0,
                f64::from(bounds.max_girth_cm),
            ),
            threshold: constants::CONFIDENCE_THRESHOLD,
            coniferous_species: constants::CONIFEROUS_SPECIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            deciduous_species: constants::DECIDUOUS_SPECIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ClassificationConfig {
    /// Check every reference point; a zero span is a configuration error
    pub fn validate(&self) -> Result<()> {
        self.height.validate("height")?;
        self.crown_diameter.validate("crown diameter")?;
        self.girth.validate("girth")?;
        Ok(())
    }
}

/// Carbon lookup table geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonConfig {
    /// Height at which row index 0 sits minus one
    pub min_height_m: f64,
    /// Heights above this are read from the last row
    pub max_height_m: f64,
    /// Diameter at which column index 0 sits minus one
    pub min_diameter_cm: f64,
    /// Diameters above this are read from this column
    pub max_diameter_cm: f64,
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            min_height_m: constants::CARBON_MIN_HEIGHT_M,
            max_height_m: constants::CARBON_MAX_HEIGHT_M,
            min_diameter_cm: constants::CARBON_MIN_DIAMETER_CM,
            max_diameter_cm: constants::CARBON_MAX_DIAMETER_CM,
        }
    }
}

impl CarbonConfig {
    /// Subtrahend turning a clamped height into a row index
    pub fn height_offset(&self) -> f64 {
        self.min_height_m + 1.0
    }

    /// Subtrahend turning a clamped diameter into a column index
    pub fn diameter_offset(&self) -> f64 {
        self.min_diameter_cm + 1.0
    }
}

/// Global configuration for a processing run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub parser: ParserConfig,
    pub bounds: ValidationBounds,
    pub repair: RepairConfig,
    pub classification: ClassificationConfig,
    pub carbon: CarbonConfig,

    /// Show progress bars during long passes
    pub show_progress: bool,
}

impl Config {
    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.parser.delimiter = delimiter;
        self
    }

    /// Use a different quoting character
    pub fn with_quote(mut self, quote: char) -> Self {
        self.parser.quote = quote;
        self
    }

    /// Use a different reference year
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.bounds.reference_year = year;
        self
    }

    /// Enable progress bars
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Replace the classification calibration
    pub fn with_classification(mut self, classification: ClassificationConfig) -> Self {
        self.classification = classification;
        self
    }

    /// Validate the configuration before any data is touched
    pub fn validate(&self) -> Result<()> {
        if self.parser.delimiter == self.parser.quote {
            return Err(TreeError::configuration(format!(
                "delimiter and quote must differ (both '{}')",
                self.parser.delimiter
            )));
        }

        if self.parser.field_count == 0 {
            return Err(TreeError::configuration("field count must be positive"));
        }

        let current_year = chrono::Local::now().year();
        if self.bounds.reference_year > current_year {
            return Err(TreeError::configuration(format!(
                "reference year {} lies in the future (current year {})",
                self.bounds.reference_year, current_year
            )));
        }

        if self.bounds.min_year_planted >= self.bounds.reference_year {
            return Err(TreeError::configuration(format!(
                "minimum planting year {} must precede reference year {}",
                self.bounds.min_year_planted, self.bounds.reference_year
            )));
        }

        if self.repair.mitchell_factor <= 0.0 {
            return Err(TreeError::configuration(format!(
                "mitchell factor must be positive, got {}",
                self.repair.mitchell_factor
            )));
        }

        if self.carbon.max_height_m <= self.carbon.min_height_m
            || self.carbon.max_diameter_cm <= self.carbon.min_diameter_cm
        {
            return Err(TreeError::configuration(
                "carbon table maxima must exceed their minima",
            ));
        }

        self.classification.validate()?;

        debug!(
            "Configuration validated: delimiter='{}', quote='{}', reference year {}",
            self.parser.delimiter, self.parser.quote, self.bounds.reference_year
        );
        Ok(())
    }
}
