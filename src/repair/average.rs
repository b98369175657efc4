//! Dataset-wide average tree used as the last-resort fill.

use crate::models::{Field, TreeRecord};

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Mean of every observed (non-missing) measurement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AverageTree {
    pub year_planted: Option<i32>,
    pub age: Option<i32>,
    pub crown_diameter_m: Option<f64>,
    pub girth_cm: Option<i32>,
    pub height_m: Option<f64>,
}

impl AverageTree {
    pub fn from_trees(trees: &[TreeRecord]) -> Self {
        let mut year = Mean::default();
        let mut age = Mean::default();
        let mut crown = Mean::default();
        let mut girth = Mean::default();
        let mut height = Mean::default();

        for tree in trees {
            year.add(tree.year_planted().map(f64::from));
            age.add(tree.age().map(f64::from));
            crown.add(tree.crown_diameter_m());
            girth.add(tree.girth_cm().map(f64::from));
            height.add(tree.height_m());
        }

        Self {
            year_planted: year.value().map(|v| v.round() as i32),
            age: age.value().map(|v| v.round() as i32),
            crown_diameter_m: crown.value(),
            girth_cm: girth.value().map(|v| v.round() as i32),
            height_m: height.value(),
        }
    }

    /// Raw string form of a measurement, `None` when nothing was observed
    pub fn raw(&self, field: Field) -> Option<String> {
        match field {
            Field::YearPlanted => self.year_planted.map(|v| v.to_string()),
            Field::Age => self.age.map(|v| v.to_string()),
            Field::CrownDiameter => self.crown_diameter_m.map(|v| v.to_string()),
            Field::Girth => self.girth_cm.map(|v| v.to_string()),
            Field::Height => self.height_m.map(|v| v.to_string()),
            _ => None,
        }
    }
}
