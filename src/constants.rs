//! Application constants for the tree census processor
//!
//! This module contains the input format constants, validation defaults,
//! calibration values and species lists used throughout the application.

// =============================================================================
// Input Format
// =============================================================================

/// Number of columns in every tree record
pub const FIELD_COUNT: usize = 12;

/// Reserved out-of-domain value marking a missing field, as written in the input
pub const SENTINEL_STR: &str = "-1";

/// Float rendering of the sentinel, also treated as missing
pub const SENTINEL_FLOAT_STR: &str = "-1.0";

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ';';

/// Default quoting character
pub const DEFAULT_QUOTE: char = '"';

/// Physical lines that may be appended to one logical record
pub const MAX_CONTINUATION_LINES: usize = 3;

/// Hard limit of physical lines read from one input file
pub const MAX_LINES: usize = 999_999;

/// Default input file name below the user data directory
pub const DEFAULT_DATA_DIR_NAME: &str = "tree-census";
pub const DEFAULT_INPUT_FILE_NAME: &str = "trees.csv";

// =============================================================================
// Validation Defaults
// =============================================================================

/// Year in which the register was recorded
pub const REFERENCE_YEAR: i32 = 2023;

/// Earliest plausible planting year
pub const MIN_YEAR_PLANTED: i32 = 1322;

/// Upper bounds for measurements
pub const MAX_CROWN_DIAMETER_M: f64 = 2.5;
pub const MAX_GIRTH_CM: i32 = 780;
pub const MAX_HEIGHT_M: f64 = 43.0;

/// String values treated as missing (compared case-insensitively)
pub const EXCLUDED_VALUES: &[&str] = &["unbekannt", "unknown", "null", ""];

// =============================================================================
// Repair
// =============================================================================

/// Linear age/girth factor: age = girth * factor
pub const MITCHELL_FACTOR: f64 = 0.6;

/// Construction attempts per line, one per distinct failing column
pub const MAX_CONSTRUCTION_ATTEMPTS: usize = FIELD_COUNT;

// =============================================================================
// Classification
// =============================================================================

/// Scores at or above this value classify a tree as deciduous
pub const CONFIDENCE_THRESHOLD: f64 = 0.0;

/// Reference points taken from the mean traits of six popular species per category
pub mod reference_points {
    pub const DECIDUOUS_HEIGHT_M: f64 = 6.47;
    pub const CONIFEROUS_HEIGHT_M: f64 = 8.0;

    pub const DECIDUOUS_CROWN_DIAMETER_M: f64 = 1.75;
    pub const CONIFEROUS_CROWN_DIAMETER_M: f64 = 1.53;

    pub const DECIDUOUS_GIRTH_CM: f64 = 37.17;
    pub const CONIFEROUS_GIRTH_CM: f64 = 63.61;
}

/// Well-known coniferous taxa, matched against the scientific species name
pub const CONIFEROUS_SPECIES: &[&str] = &[
    "picea",
    "pinus",
    "taxus",
    "abies",
    "juniperus",
    "larix",
    "cupressus",
    "thuja",
    "cryptomeria",
    "pseudotsuga",
    "tsuga",
    "pseudolarix amabilis",
    "cedrus",
    "sequoioideae",
    "picea abies",
    "abies nordmanniana",
    "larix decidua",
    "pinus mugo",
    "juniperus communis",
    "picea pungens",
    "taxus baccata",
    "thuja plicata",
    "cedrus atlantica",
];

/// Well-known deciduous taxa, matched against the scientific species name
pub const DECIDUOUS_SPECIES: &[&str] = &[
    "acer campestre",
    "acer palmatum",
    "acer pseudoplatanus",
    "quercus",
    "ulmus",
    "betula",
    "malus domestica",
    "pyrus",
    "prunus domestica",
    "prunus avium",
    "juglans regia",
    "castanea",
    "prunus dulcis",
    "corylus colurna",
    "fagus sylvatica",
    "betula pendula",
    "tilia platyphyllos",
    "alnus glutinosa",
    "castanea sativa",
    "fraxinus excelsior",
];

// =============================================================================
// Carbon Lookup Tables
// =============================================================================

/// Height range covered by the carbon tables (metres)
pub const CARBON_MIN_HEIGHT_M: f64 = 6.0;
pub const CARBON_MAX_HEIGHT_M: f64 = 42.0;

/// Stem diameter range covered by the carbon tables (centimetres)
pub const CARBON_MIN_DIAMETER_CM: f64 = 7.0;
pub const CARBON_MAX_DIAMETER_CM: f64 = 60.0;
