//! Fixed statistical questions answered over the repaired register.
//!
//! Grouping uses ordered maps so that ties between groups resolve to the
//! alphabetically first key. Trees without a carbon estimate are left out of
//! every carbon sum.

use crate::carbon::CarbonEstimator;
use crate::error::{Result, TreeError};
use crate::models::{Field, TreeRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The questions offered by the console menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    DistrictWithMostTrees,
    DistrictOfTallestTree,
    LargestGirth,
    LargestCrown,
    OldestTree,
    TypeCount,
    SpeciesCount,
    MostCommonSpecies,
    MostDiverseDistrict,
    TallestSpecies,
    WidestSpecies,
    TotalCarbon,
    DistrictWithMostCarbon,
    SpeciesWithMostCarbon,
}

impl Question {
    pub const ALL: [Question; 14] = [
        Question::DistrictWithMostTrees,
        Question::DistrictOfTallestTree,
        Question::LargestGirth,
        Question::LargestCrown,
        Question::OldestTree,
        Question::TypeCount,
        Question::SpeciesCount,
        Question::MostCommonSpecies,
        Question::MostDiverseDistrict,
        Question::TallestSpecies,
        Question::WidestSpecies,
        Question::TotalCarbon,
        Question::DistrictWithMostCarbon,
        Question::SpeciesWithMostCarbon,
    ];

    /// Menu number of the question
    pub fn number(self) -> usize {
        self as usize
    }

    /// Parse a menu selection; anything but a listed number is rejected
    pub fn from_selection(input: &str) -> Result<Self> {
        input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|number| Self::ALL.get(number).copied())
            .ok_or_else(|| TreeError::invalid_selection(input.trim()))
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::DistrictWithMostTrees => "Which district has the most trees?",
            Question::DistrictOfTallestTree => "In which district stands the tallest tree?",
            Question::LargestGirth => "Which tree has the largest girth?",
            Question::LargestCrown => "Which tree has the largest crown?",
            Question::OldestTree => "Which tree is the oldest?",
            Question::TypeCount => "How many tree types are there?",
            Question::SpeciesCount => "How many species are there?",
            Question::MostCommonSpecies => "Which species occurs most often?",
            Question::MostDiverseDistrict => "Which district has the most distinct species?",
            Question::TallestSpecies => "Which species is the tallest on average?",
            Question::WidestSpecies => "Which species has the largest girth on average?",
            Question::TotalCarbon => "How much carbon do all trees store?",
            Question::DistrictWithMostCarbon => "Which district stores the most carbon?",
            Question::SpeciesWithMostCarbon => "Which species stores the most carbon?",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Question::DistrictWithMostTrees => "Most trees stand in the district:",
            Question::DistrictOfTallestTree => "The tallest tree stands in the district:",
            Question::LargestGirth => "The largest girth has the tree:",
            Question::LargestCrown => "The largest crown has the tree:",
            Question::OldestTree => "The oldest tree is:",
            Question::TypeCount => "Total number of tree types:",
            Question::SpeciesCount => "Total number of species:",
            Question::MostCommonSpecies => "The most common species is:",
            Question::MostDiverseDistrict => "The district with the most species is:",
            Question::TallestSpecies => "The tallest species on average is:",
            Question::WidestSpecies => "The species with the largest average girth is:",
            Question::TotalCarbon => "Total stored carbon (kg):",
            Question::DistrictWithMostCarbon => "The district storing the most carbon is:",
            Question::SpeciesWithMostCarbon => "The species storing the most carbon is:",
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}: {}", self.number(), self.prompt())
    }
}

/// Value answering one question
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Name(String),
    Count(usize),
    Tree(Box<TreeRecord>),
    CarbonKg(u64),
    /// The register holds no tree the question applies to
    NoData,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Name(name) => f.write_str(name),
            Answer::Count(count) => write!(f, "{}", count),
            Answer::Tree(tree) => f.write_str(&format_tree(tree)),
            Answer::CarbonKg(kg) => write!(f, "{}", kg),
            Answer::NoData => f.write_str("no data"),
        }
    }
}

/// Multi-line report of one tree
pub fn format_tree(tree: &TreeRecord) -> String {
    fn text(value: Option<&str>) -> &str {
        value.unwrap_or("-")
    }
    fn number<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
        value.map_or_else(|| "-".to_string(), |v| format!("{}{}", v, unit))
    }

    let category = tree
        .category()
        .map_or_else(|| "-".to_string(), |c| c.to_string());

    format!(
        "\n  Tree number:\t{}\n  Name:\t\t{}\n  Type:\t\t{} / {}\n  Species:\t{} / {}\n  \
         Planted:\t{}\tAge: {}\n  Crown:\t{}\n  Girth:\t{}\n  Height:\t{}\n  \
         District:\t{}\n  Category:\t{}",
        tree.id(),
        text(tree.name()),
        text(tree.type_common()),
        text(tree.type_scientific()),
        text(tree.species_common()),
        text(tree.species_scientific()),
        number(tree.year_planted(), ""),
        number(tree.age(), ""),
        number(tree.crown_diameter_m(), "m"),
        number(tree.girth_cm(), "cm"),
        number(tree.height_m(), "m"),
        text(tree.district()),
        category
    )
}

/// Key of the largest value; ties keep the first key in map order
fn max_key<V: PartialOrd + Copy>(map: &BTreeMap<String, V>) -> Option<String> {
    let mut best: Option<(&String, V)> = None;
    for (key, value) in map {
        match best {
            Some((_, best_value)) if *value <= best_value => {}
            _ => best = Some((key, *value)),
        }
    }
    best.map(|(key, _)| key.clone())
}

/// Tree with the largest value; ties keep the earliest tree
fn max_tree<'a>(
    trees: &'a [TreeRecord],
    value: impl Fn(&TreeRecord) -> Option<f64>,
) -> Option<&'a TreeRecord> {
    let mut best: Option<(&TreeRecord, f64)> = None;
    for tree in trees {
        let Some(v) = value(tree) else {
            continue;
        };
        match best {
            Some((_, best_value)) if v <= best_value => {}
            _ => best = Some((tree, v)),
        }
    }
    best.map(|(tree, _)| tree)
}

/// Question answering over a set of repaired trees
pub struct Statistics<'a> {
    trees: &'a [TreeRecord],
    estimator: &'a CarbonEstimator,
}

impl<'a> Statistics<'a> {
    pub fn new(trees: &'a [TreeRecord], estimator: &'a CarbonEstimator) -> Self {
        Self { trees, estimator }
    }

    pub fn answer(&self, question: Question) -> Answer {
        let name = |value: Option<String>| value.map_or(Answer::NoData, Answer::Name);
        let tree = |value: Option<&TreeRecord>| {
            value.map_or(Answer::NoData, |t| Answer::Tree(Box::new(t.clone())))
        };

        match question {
            Question::DistrictWithMostTrees => name(self.district_with_most_trees()),
            Question::DistrictOfTallestTree => name(self.district_of_tallest_tree()),
            Question::LargestGirth => {
                tree(max_tree(self.trees, |t| t.girth_cm().map(f64::from)))
            }
            Question::LargestCrown => tree(max_tree(self.trees, |t| t.crown_diameter_m())),
            Question::OldestTree => tree(max_tree(self.trees, |t| t.age().map(f64::from))),
            Question::TypeCount => Answer::Count(self.distinct(Field::TypeScientific)),
            Question::SpeciesCount => Answer::Count(self.distinct(Field::SpeciesScientific)),
            Question::MostCommonSpecies => name(self.most_common_species()),
            Question::MostDiverseDistrict => name(self.most_diverse_district()),
            Question::TallestSpecies => {
                name(max_key(&self.mean_by_species(|t| t.height_m())))
            }
            Question::WidestSpecies => {
                name(max_key(&self.mean_by_species(|t| t.girth_cm().map(f64::from))))
            }
            Question::TotalCarbon => Answer::CarbonKg(self.total_carbon()),
            Question::DistrictWithMostCarbon => {
                name(max_key(&self.carbon_by(Field::District)))
            }
            Question::SpeciesWithMostCarbon => {
                name(max_key(&self.carbon_by(Field::SpeciesScientific)))
            }
        }
    }

    /// Answer line as printed by the console
    pub fn render(&self, question: Question) -> String {
        format!("{} {}", question.label(), self.answer(question))
    }

    /// Number of trees per value of a text column
    pub fn count_by(&self, field: Field) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for value in self.trees.iter().filter_map(|t| t.text(field)) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn district_with_most_trees(&self) -> Option<String> {
        max_key(&self.count_by(Field::District))
    }

    pub fn district_of_tallest_tree(&self) -> Option<String> {
        max_tree(self.trees, |t| t.height_m())
            .and_then(|t| t.district())
            .map(str::to_string)
    }

    pub fn distinct(&self, field: Field) -> usize {
        self.count_by(field).len()
    }

    pub fn most_common_species(&self) -> Option<String> {
        max_key(&self.count_by(Field::SpeciesScientific))
    }

    pub fn most_diverse_district(&self) -> Option<String> {
        let mut species: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        for tree in self.trees {
            if let (Some(district), Some(name)) = (tree.district(), tree.species_scientific()) {
                species.entry(district.to_string()).or_default().insert(name);
            }
        }

        let counts: BTreeMap<String, usize> = species
            .into_iter()
            .map(|(district, names)| (district, names.len()))
            .collect();
        max_key(&counts)
    }

    /// Mean of a measurement per scientific species, over trees that have it
    pub fn mean_by_species(
        &self,
        value: impl Fn(&TreeRecord) -> Option<f64>,
    ) -> BTreeMap<String, f64> {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for tree in self.trees {
            if let (Some(species), Some(v)) = (tree.species_scientific(), value(tree)) {
                let entry = sums.entry(species.to_string()).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }

        sums.into_iter()
            .map(|(species, (sum, count))| (species, sum / count as f64))
            .collect()
    }

    /// Stored carbon over every tree with an estimate
    pub fn total_carbon(&self) -> u64 {
        self.trees
            .iter()
            .filter_map(|t| self.estimator.try_estimate(t))
            .map(u64::from)
            .sum()
    }

    /// Stored carbon per value of a text column
    ///
    /// A group whose trees all lack an estimate does not appear.
    pub fn carbon_by(&self, field: Field) -> BTreeMap<String, u64> {
        let mut sums = BTreeMap::new();
        for tree in self.trees {
            let (Some(key), Some(carbon)) = (tree.text(field), self.estimator.try_estimate(tree))
            else {
                continue;
            };
            *sums.entry(key.to_string()).or_insert(0) += u64::from(carbon);
        }
        sums
    }
}
