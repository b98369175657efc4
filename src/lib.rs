//! Tree Census Library
//!
//! A Rust library for cleaning and analysing semicolon-delimited urban tree
//! registers.
//!
//! This library provides tools for:
//! - Reading registers with quoted fields and records folded over several lines
//! - Validating every field and resetting invalid values to a missing marker
//! - Repairing incomplete records from name correlations, growth formulas and
//!   register averages
//! - Classifying trees as deciduous or coniferous from their measurements
//! - Estimating stored carbon from bundled height/diameter tables
//! - Answering fixed statistical questions about the cleaned register

pub mod carbon;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod formulas;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod reader;
pub mod repair;
pub mod statistics;

// Re-export commonly used types
pub use carbon::CarbonEstimator;
pub use classifier::Classifier;
pub use config::Config;
pub use error::{LookupMiss, Result, TreeError};
pub use models::{Category, Field, TreeRecord};
pub use pipeline::PipelineOutcome;
pub use repair::{RepairEngine, RepairSession};
pub use statistics::{Answer, Question, Statistics};
