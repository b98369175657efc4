//! Stored carbon estimation from bundled lookup tables.
//!
//! Each table maps a rounded tree height (rows) and a rounded stem diameter
//! (columns) to kilograms of stored carbon. Rows are jagged: small trees have
//! no entries for large diameters. Deciduous trees are read from the beech and
//! oak tables, coniferous trees from the pine and spruce tables, and the two
//! matched cells are averaged.

use crate::config::CarbonConfig;
use crate::error::{LookupMiss, Result, TreeError};
use crate::formulas::stem_diameter_from_girth;
use crate::models::{Category, TreeRecord};
use tracing::debug;

const BEECH: &str = include_str!("../data/carbon/beech.csv");
const OAK: &str = include_str!("../data/carbon/oak.csv");
const PINE: &str = include_str!("../data/carbon/pine.csv");
const SPRUCE: &str = include_str!("../data/carbon/spruce.csv");

/// One jagged height-by-diameter table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    name: String,
    rows: Vec<Vec<u32>>,
}

impl LookupTable {
    /// Parse semicolon-separated rows; `#` lines and blank lines are ignored
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut rows = Vec::new();

        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = line
                .split(';')
                .map(|cell| cell.trim().parse::<u32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    TreeError::configuration(format!(
                        "carbon table '{}' line {}: {}",
                        name,
                        line_number + 1,
                        e
                    ))
                })?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(TreeError::configuration(format!(
                "carbon table '{}' has no rows",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at a row and column, checked against the row's own length
    pub fn get(&self, row: usize, column: usize) -> Option<u32> {
        self.rows.get(row)?.get(column).copied()
    }
}

/// The two table pairs, one per category
#[derive(Debug, Clone)]
pub struct CarbonTables {
    deciduous: [LookupTable; 2],
    coniferous: [LookupTable; 2],
}

impl CarbonTables {
    pub fn new(deciduous: [LookupTable; 2], coniferous: [LookupTable; 2]) -> Self {
        Self {
            deciduous,
            coniferous,
        }
    }

    /// Tables bundled with the binary
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            [
                LookupTable::parse("beech", BEECH)?,
                LookupTable::parse("oak", OAK)?,
            ],
            [
                LookupTable::parse("pine", PINE)?,
                LookupTable::parse("spruce", SPRUCE)?,
            ],
        ))
    }

    fn pair(&self, category: Category) -> &[LookupTable; 2] {
        match category {
            Category::Deciduous => &self.deciduous,
            Category::Coniferous => &self.coniferous,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarbonEstimator {
    tables: CarbonTables,
    config: CarbonConfig,
}

impl CarbonEstimator {
    pub fn new(tables: CarbonTables, config: CarbonConfig) -> Self {
        Self { tables, config }
    }

    /// Estimator over the bundled tables
    pub fn builtin(config: CarbonConfig) -> Result<Self> {
        Ok(Self::new(CarbonTables::builtin()?, config))
    }

    /// Stored carbon of a classified tree in kilograms
    ///
    /// Fails with [`TreeError::LookupUnavailable`] when the tree falls outside
    /// the tables or the matched cells hold no data.
    pub fn estimate(&self, tree: &TreeRecord) -> Result<u32> {
        let (height, girth) = match (tree.height_m(), tree.girth_cm()) {
            (Some(height), Some(girth)) => (height, girth),
            _ => return Err(TreeError::lookup(LookupMiss::MissingMeasurement)),
        };
        let category = tree
            .category()
            .ok_or_else(|| TreeError::lookup(LookupMiss::Unclassified))?;

        let height = height.round().min(self.config.max_height_m);
        let diameter = stem_diameter_from_girth(f64::from(girth))
            .round()
            .min(self.config.max_diameter_cm);

        let row = height - self.config.height_offset();
        let column = diameter - self.config.diameter_offset();
        if row < 0.0 || column < 0.0 {
            return Err(TreeError::lookup(LookupMiss::BelowTable));
        }
        let (row, column) = (row as usize, column as usize);

        let [first, second] = self.tables.pair(category);
        let (a, b) = match (first.get(row, column), second.get(row, column)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                debug!(
                    "Tree {} at row {}, column {} lies outside the {}/{} tables",
                    tree.id(),
                    row,
                    column,
                    first.name(),
                    second.name()
                );
                return Err(TreeError::lookup(LookupMiss::OutsideTable));
            }
        };

        let carbon = (f64::from(a + b) / 2.0).round() as u32;
        if carbon == 0 {
            return Err(TreeError::lookup(LookupMiss::NoData));
        }
        Ok(carbon)
    }

    /// Stored carbon, `None` when the tree is excluded from sums
    pub fn try_estimate(&self, tree: &TreeRecord) -> Option<u32> {
        self.estimate(tree).ok()
    }
}
