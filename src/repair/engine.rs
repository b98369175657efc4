//! Per-record repair decisions and the full repair pass.

use super::average::AverageTree;
use super::correlation::{CorrelationTable, Side};
use super::session::RepairSession;
use crate::classifier::Classifier;
use crate::config::{Config, RepairConfig, ValidationBounds};
use crate::error::{Result, TreeError};
use crate::formulas::{mitchell_age, mitchell_girth};
use crate::models::{Field, RawRecord, TreeRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use tracing::{debug, info};

/// Why a record could not be repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrreparableReason {
    /// Common and scientific type names both missing
    MissingType,
    /// Common and scientific species names both missing
    MissingSpecies,
    MissingName,
    MissingDistrict,
    /// No tree in the dataset measured this field
    NoAverage(Field),
    /// The repaired values failed validation in this field
    Rebuild(Field),
}

impl fmt::Display for IrreparableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingType => f.write_str("type unknown in both vocabularies"),
            Self::MissingSpecies => f.write_str("species unknown in both vocabularies"),
            Self::MissingName => f.write_str("name missing"),
            Self::MissingDistrict => f.write_str("district missing"),
            Self::NoAverage(field) => write!(f, "no observed average for {}", field),
            Self::Rebuild(field) => write!(f, "repaired {} failed validation", field),
        }
    }
}

/// Result of repairing one record
#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    /// Nothing was missing; the record is returned classified
    Intact(TreeRecord),
    /// Missing values were filled; the new record is returned classified
    Repaired(TreeRecord),
    Irreparable(IrreparableReason),
}

impl RepairOutcome {
    pub fn tree(&self) -> Option<&TreeRecord> {
        match self {
            Self::Intact(tree) | Self::Repaired(tree) => Some(tree),
            Self::Irreparable(_) => None,
        }
    }
}

/// Trees kept by a repair pass and the pass counters
#[derive(Debug, Clone)]
pub struct RepairResult {
    pub trees: Vec<TreeRecord>,
    pub session: RepairSession,
}

/// Repair engine holding the dataset-wide lookup state
///
/// Correlation tables and the average tree are built once over the complete
/// input before any record is repaired.
#[derive(Debug, Clone)]
pub struct RepairEngine {
    types: CorrelationTable,
    species: CorrelationTable,
    average: AverageTree,
    classifier: Classifier,
    bounds: ValidationBounds,
    repair: RepairConfig,
}

impl RepairEngine {
    pub fn new(trees: &[TreeRecord], config: &Config) -> Result<Self> {
        let classifier = Classifier::new(config.classification.clone())?;
        let types = CorrelationTable::types(trees, &config.bounds);
        let species = CorrelationTable::species(trees, &config.bounds);
        let average = AverageTree::from_trees(trees);

        debug!(
            "Repair tables built: {} type clusters, {} species clusters",
            types.cluster_count(),
            species.cluster_count()
        );

        Ok(Self {
            types,
            species,
            average,
            classifier,
            bounds: config.bounds.clone(),
            repair: config.repair.clone(),
        })
    }

    pub fn average(&self) -> &AverageTree {
        &self.average
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Repair one record
    pub fn repair(&self, tree: &TreeRecord) -> RepairOutcome {
        let mut raw = tree.to_raw();
        self.filter_excluded(&mut raw);

        if raw.missing_fields().is_empty() {
            return RepairOutcome::Intact(self.classify(tree.clone()));
        }

        self.repair_raw(raw)
    }

    /// Fill the missing values of a raw field array and rebuild it
    ///
    /// Unlike [`RepairEngine::repair`] the values are not reconciled by a
    /// prior construction, so a planting year and a girth can both be present
    /// while the age is missing. The planting year then wins and the girth is
    /// re-derived from it.
    pub fn repair_raw(&self, mut raw: RawRecord) -> RepairOutcome {
        self.filter_excluded(&mut raw);

        if let Some(reason) = irreparable_reason(&raw) {
            return RepairOutcome::Irreparable(reason);
        }

        cross_fill(&mut raw, &self.types);
        cross_fill(&mut raw, &self.species);
        self.apply_mitchell(&mut raw);

        for field in Field::MEASUREMENTS {
            if !raw.is_missing(field) {
                continue;
            }
            match self.average.raw(field) {
                Some(value) => raw.set(field, value),
                None => return RepairOutcome::Irreparable(IrreparableReason::NoAverage(field)),
            }
        }

        match raw.build(&self.bounds) {
            Ok(repaired) => RepairOutcome::Repaired(self.classify(repaired)),
            Err(TreeError::FieldInvalid { field, .. }) => {
                RepairOutcome::Irreparable(IrreparableReason::Rebuild(field))
            }
            Err(_) => RepairOutcome::Irreparable(IrreparableReason::Rebuild(Field::Id)),
        }
    }

    /// Repair every record, counting the outcomes into a fresh session
    pub fn repair_all(&self, trees: &[TreeRecord], show_progress: bool) -> RepairResult {
        let mut session = RepairSession::new();
        let mut kept = Vec::with_capacity(trees.len());

        let pb = if show_progress {
            Some(create_repair_progress_bar(trees.len() as u64))
        } else {
            None
        };

        for tree in trees {
            session.total_input += 1;
            match self.repair(tree) {
                RepairOutcome::Intact(tree) => kept.push(tree),
                RepairOutcome::Repaired(tree) => {
                    session.corrupt += 1;
                    session.repaired += 1;
                    kept.push(tree);
                }
                RepairOutcome::Irreparable(reason) => {
                    session.corrupt += 1;
                    session.deleted += 1;
                    debug!("Dropping tree {}: {}", tree.id(), reason);
                }
            }

            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message(format!("Repair complete: {} trees", kept.len()));
        }

        info!("{}", session.summary());
        RepairResult {
            trees: kept,
            session,
        }
    }

    fn classify(&self, tree: TreeRecord) -> TreeRecord {
        let category = self.classifier.classify(&tree);
        tree.with_category(category)
    }

    fn filter_excluded(&self, raw: &mut RawRecord) {
        for field in Field::ALL.into_iter().filter(|f| f.is_text()) {
            if self.bounds.is_excluded(raw.get(field)) {
                raw.mark_missing(field);
            }
        }
    }

    /// Derive age and girth from each other, preferring the planting year
    fn apply_mitchell(&self, raw: &mut RawRecord) {
        let factor = self.repair.mitchell_factor;
        let year = raw.get_i32(Field::YearPlanted);
        let age = raw.get_i32(Field::Age);
        let girth = raw.get_i32(Field::Girth);

        match (age, year, girth) {
            (None, Some(year), _) => {
                let age = self.bounds.reference_year - year;
                raw.set(Field::Age, age.to_string());
                raw.set(Field::Girth, self.capped_girth(age).to_string());
            }
            (None, None, Some(girth)) => {
                let age = mitchell_age(girth, factor);
                raw.set(Field::Age, age.to_string());
                raw.set(
                    Field::YearPlanted,
                    (self.bounds.reference_year - age).to_string(),
                );
            }
            (Some(age), _, None) => {
                raw.set(Field::Girth, self.capped_girth(age).to_string());
            }
            _ => {}
        }
    }

    fn capped_girth(&self, age: i32) -> i32 {
        mitchell_girth(age, self.repair.mitchell_factor).min(self.bounds.max_girth_cm)
    }
}

fn irreparable_reason(raw: &RawRecord) -> Option<IrreparableReason> {
    if raw.is_missing(Field::TypeCommon) && raw.is_missing(Field::TypeScientific) {
        Some(IrreparableReason::MissingType)
    } else if raw.is_missing(Field::SpeciesCommon) && raw.is_missing(Field::SpeciesScientific) {
        Some(IrreparableReason::MissingSpecies)
    } else if raw.is_missing(Field::Name) {
        Some(IrreparableReason::MissingName)
    } else if raw.is_missing(Field::District) {
        Some(IrreparableReason::MissingDistrict)
    } else {
        None
    }
}

/// Fill one missing side of a correlated pair from the other
fn cross_fill(raw: &mut RawRecord, table: &CorrelationTable) {
    let common = table.field(Side::Common);
    let scientific = table.field(Side::Scientific);

    let (known, side, target) = match (raw.is_missing(common), raw.is_missing(scientific)) {
        (true, false) => (scientific, Side::Scientific, common),
        (false, true) => (common, Side::Common, scientific),
        _ => return,
    };

    if let Some(value) = table.find_correlate(raw.get(known), side) {
        let value = value.to_string();
        raw.set(target, value);
    }
}

fn create_repair_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Repairing trees");
    pb
}
