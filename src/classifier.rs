//! Deciduous/coniferous classification.
//!
//! Well-known species are decided by name. Every other tree is scored from
//! its height, crown diameter and girth: each feature contributes the
//! difference between its deciduous and coniferous confidence, and the tree is
//! deciduous when the summed score reaches the configured threshold.

use crate::config::{ClassificationConfig, FeatureReference};
use crate::error::Result;
use crate::models::{Category, TreeRecord};
use tracing::debug;

/// Piecewise-linear confidence peaking at `reference`
///
/// `x` is not clamped, so values outside `[min, max]` yield confidences
/// outside `[0, 1]`.
pub fn confidence(x: f64, reference: f64, min: f64, max: f64) -> f64 {
    if x > reference {
        (max - x) / (max - reference)
    } else {
        (x - min) / (reference - min)
    }
}

/// Deciduous minus coniferous confidence for one feature, 0 when unmeasured
fn feature_score(value: Option<f64>, feature: &FeatureReference) -> f64 {
    match value {
        Some(x) => {
            confidence(x, feature.deciduous, feature.min, feature.max)
                - confidence(x, feature.coniferous, feature.min, feature.max)
        }
        None => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassificationConfig,
}

impl Classifier {
    /// Create a classifier; zero reference spans are rejected here
    pub fn new(config: ClassificationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Category fixed by the scientific species name, if it is well known
    pub fn species_override(&self, tree: &TreeRecord) -> Option<Category> {
        let species = tree.species_scientific()?.trim();
        let listed = |names: &[String]| names.iter().any(|n| n.eq_ignore_ascii_case(species));

        if listed(&self.config.coniferous_species) {
            Some(Category::Coniferous)
        } else if listed(&self.config.deciduous_species) {
            Some(Category::Deciduous)
        } else {
            None
        }
    }

    /// Summed confidence score over height, crown diameter and girth
    pub fn score(&self, tree: &TreeRecord) -> f64 {
        feature_score(tree.height_m(), &self.config.height)
            + feature_score(tree.crown_diameter_m(), &self.config.crown_diameter)
            + feature_score(tree.girth_cm().map(f64::from), &self.config.girth)
    }

    pub fn classify(&self, tree: &TreeRecord) -> Category {
        if let Some(category) = self.species_override(tree) {
            return category;
        }

        let score = self.score(tree);
        debug!("Tree {} scored {:.3}", tree.id(), score);
        if score >= self.config.threshold {
            Category::Deciduous
        } else {
            Category::Coniferous
        }
    }

    pub fn is_deciduous(&self, tree: &TreeRecord) -> bool {
        self.classify(tree) == Category::Deciduous
    }
}
