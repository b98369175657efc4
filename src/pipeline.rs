//! End-to-end processing of one register file.
//!
//! Validates the configuration, loads the trees, builds the repair tables over
//! the complete input, repairs and classifies every record and prepares the
//! carbon estimator used by the statistics.

use crate::carbon::CarbonEstimator;
use crate::config::Config;
use crate::error::{Result, TreeError};
use crate::models::TreeRecord;
use crate::reader::{LoadStats, read_trees};
use crate::repair::{RepairEngine, RepairSession};
use crate::statistics::Statistics;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Repaired and classified trees
    pub trees: Vec<TreeRecord>,
    pub load: LoadStats,
    pub repair: RepairSession,
    pub estimator: CarbonEstimator,
    pub load_time_ms: u128,
    pub repair_time_ms: u128,
}

impl PipelineOutcome {
    /// Question answering over the repaired trees
    pub fn statistics(&self) -> Statistics<'_> {
        Statistics::new(&self.trees, &self.estimator)
    }
}

/// Process the register at `path`
///
/// Only structural failures are returned: an invalid configuration, an
/// unreadable file or a file without a single usable record. Bad lines and
/// irreparable records are counted instead.
pub fn run(path: &Path, config: &Config) -> Result<PipelineOutcome> {
    config.validate()?;
    let estimator = CarbonEstimator::builtin(config.carbon.clone())?;

    let start = Instant::now();
    let loaded = read_trees(path, &config.parser, &config.bounds, &config.repair)?;
    let load_time_ms = start.elapsed().as_millis();

    if loaded.trees.is_empty() {
        return Err(TreeError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    info!("Reading took {}ms", load_time_ms);

    let start = Instant::now();
    let engine = RepairEngine::new(&loaded.trees, config)?;
    let repaired = engine.repair_all(&loaded.trees, config.show_progress);
    let repair_time_ms = start.elapsed().as_millis();
    info!("Repair took {}ms", repair_time_ms);

    Ok(PipelineOutcome {
        trees: repaired.trees,
        load: loaded.stats,
        repair: repaired.session,
        estimator,
        load_time_ms,
        repair_time_ms,
    })
}
