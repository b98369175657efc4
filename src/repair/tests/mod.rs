//! Tests for the repair module
//!
//! Shared fixtures build records from semicolon-separated lines the way they
//! appear in a register file.

pub mod engine_tests;

use crate::config::{Config, ValidationBounds};
use crate::models::TreeRecord;
use crate::repair::RepairEngine;

/// Build a tree from a semicolon-separated line; `-1` marks missing values
pub fn create_test_tree(line: &str) -> TreeRecord {
    let fields: Vec<Option<String>> = line.split(';').map(|v| Some(v.to_string())).collect();
    TreeRecord::from_fields(&fields, &ValidationBounds::default()).unwrap()
}

/// A complete lime tree in Pankow
pub fn complete_lime(id: i64) -> TreeRecord {
    create_test_tree(&format!(
        "{};Winterlinde;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;1.8;120;14.5;Pankow",
        id
    ))
}

/// A complete pine tree in Spandau
pub fn complete_pine(id: i64) -> TreeRecord {
    create_test_tree(&format!(
        "{};Waldkiefer;Kiefer;Pinus;Wald-Kiefer;Pinus sylvestris;1973;50;1.4;150;22;Spandau",
        id
    ))
}

pub fn create_test_engine(trees: &[TreeRecord]) -> RepairEngine {
    RepairEngine::new(trees, &Config::default()).unwrap()
}
