//! Repair of incomplete tree records
//!
//! This module fills missing values of loaded trees before they are classified
//! and queried. Records that cannot be repaired are dropped and counted.
//!
//! # Architecture
//!
//! - [`correlation`] - Greedy clustering of common and scientific names
//! - [`average`] - Dataset-wide average tree for last-resort fills
//! - [`session`] - Corrupt, repaired and deleted counters
//! - [`engine`] - Per-record repair decisions and the full pass
//!
//! # Repair Sequence
//!
//! Every record goes through the same straight-line sequence:
//!
//! 1. **Filter**: text values on the exclusion vocabulary become missing
//! 2. **Check**: records without missing values are kept as they are
//! 3. **Repairability**: records missing both names of a pair, the name or
//!    the district are dropped
//! 4. **Fill**: correlated names first, then age and girth via the Mitchell
//!    relation, then the average tree
//! 5. **Rebuild**: the filled values are validated into a new record and
//!    classified
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tree_census::config::Config;
//! use tree_census::repair::RepairEngine;
//! # fn example(trees: Vec<tree_census::models::TreeRecord>) -> tree_census::Result<()> {
//! let config = Config::default();
//! let engine = RepairEngine::new(&trees, &config)?;
//! let result = engine.repair_all(&trees, false);
//! println!("{}", result.session.summary());
//! # Ok(())
//! # }
//! ```

pub mod average;
pub mod correlation;
pub mod engine;
pub mod session;

#[cfg(test)]
pub mod tests;

pub use average::AverageTree;
pub use correlation::{CorrelationTable, Side};
pub use engine::{IrreparableReason, RepairEngine, RepairOutcome, RepairResult};
pub use session::RepairSession;
