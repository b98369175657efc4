//! Core data structures for tree register processing.
//!
//! Defines the fixed column layout, the raw field array used while repairing,
//! and the validated [`TreeRecord`] entity.

use crate::config::ValidationBounds;
use crate::constants::{FIELD_COUNT, SENTINEL_FLOAT_STR, SENTINEL_STR};
use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column positions of a tree record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Id,
    Name,
    TypeCommon,
    TypeScientific,
    SpeciesCommon,
    SpeciesScientific,
    YearPlanted,
    Age,
    CrownDiameter,
    Girth,
    Height,
    District,
}

impl Field {
    /// All columns in input order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Id,
        Field::Name,
        Field::TypeCommon,
        Field::TypeScientific,
        Field::SpeciesCommon,
        Field::SpeciesScientific,
        Field::YearPlanted,
        Field::Age,
        Field::CrownDiameter,
        Field::Girth,
        Field::Height,
        Field::District,
    ];

    /// Numeric columns that the average tree can fill
    pub const MEASUREMENTS: [Field; 5] = [
        Field::YearPlanted,
        Field::Age,
        Field::CrownDiameter,
        Field::Girth,
        Field::Height,
    ];

    /// Zero-based column index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column at a zero-based index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::TypeCommon => "type_common",
            Field::TypeScientific => "type_scientific",
            Field::SpeciesCommon => "species_common",
            Field::SpeciesScientific => "species_scientific",
            Field::YearPlanted => "year_planted",
            Field::Age => "age",
            Field::CrownDiameter => "crown_diameter_m",
            Field::Girth => "girth_cm",
            Field::Height => "height_m",
            Field::District => "district",
        }
    }

    /// Free-text columns subject to the exclusion vocabulary
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::Name
                | Field::TypeCommon
                | Field::TypeScientific
                | Field::SpeciesCommon
                | Field::SpeciesScientific
                | Field::District
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check whether a raw value is the missing-value sentinel
pub fn is_sentinel(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed == SENTINEL_STR || trimmed == SENTINEL_FLOAT_STR
}

/// Deciduous or coniferous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Deciduous,
    Coniferous,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Deciduous => f.write_str("deciduous"),
            Category::Coniferous => f.write_str("coniferous"),
        }
    }
}

/// Fixed-size array of raw field strings, missing values as the sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    pub fn get(&self, field: Field) -> &str {
        &self.fields[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields[field.index()] = value.into();
    }

    pub fn mark_missing(&mut self, field: Field) {
        self.set(field, SENTINEL_STR);
    }

    pub fn is_missing(&self, field: Field) -> bool {
        is_sentinel(self.get(field))
    }

    /// Columns currently holding the sentinel
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.is_missing(*field))
            .collect()
    }

    /// Parse an integer column, `None` when missing or unparsable
    pub fn get_i32(&self, field: Field) -> Option<i32> {
        if self.is_missing(field) {
            return None;
        }
        self.get(field).trim().parse().ok()
    }

    /// Validate the array into a new entity
    pub fn build(&self, bounds: &ValidationBounds) -> Result<TreeRecord> {
        let fields: Vec<Option<&str>> = self.fields.iter().map(|s| Some(s.as_str())).collect();
        TreeRecord::from_fields(&fields, bounds)
    }
}

/// One validated tree of the register
///
/// Missing values are `None`. Field values never change after construction;
/// only the category is assigned once by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    id: i64,
    name: Option<String>,
    type_common: Option<String>,
    type_scientific: Option<String>,
    species_common: Option<String>,
    species_scientific: Option<String>,
    year_planted: Option<i32>,
    age: Option<i32>,
    crown_diameter_m: Option<f64>,
    girth_cm: Option<i32>,
    height_m: Option<f64>,
    district: Option<String>,
    category: Option<Category>,
}

impl TreeRecord {
    /// Validate raw fields into a tree
    ///
    /// Fails with [`TreeError::FieldInvalid`] naming the first offending
    /// column: absent fields first, then the id, then numeric range checks.
    pub fn from_fields<S: AsRef<str>>(
        fields: &[Option<S>],
        bounds: &ValidationBounds,
    ) -> Result<Self> {
        for field in Field::ALL {
            raw_field(fields, field)?;
        }

        let id_raw = raw_field(fields, Field::Id)?;
        let id = id_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| TreeError::field_invalid(Field::Id, id_raw))?;

        let year_planted = parse_bounded_int(
            Field::YearPlanted,
            raw_field(fields, Field::YearPlanted)?,
            bounds.min_year_planted,
            bounds.reference_year,
        )?;
        let age = parse_bounded_int(
            Field::Age,
            raw_field(fields, Field::Age)?,
            0,
            bounds.max_age(),
        )?;
        let crown_diameter_m = parse_bounded_float(
            Field::CrownDiameter,
            raw_field(fields, Field::CrownDiameter)?,
            bounds.max_crown_diameter_m,
        )?;
        let girth_cm = parse_bounded_int(
            Field::Girth,
            raw_field(fields, Field::Girth)?,
            0,
            bounds.max_girth_cm,
        )?;
        let height_m = parse_bounded_float(
            Field::Height,
            raw_field(fields, Field::Height)?,
            bounds.max_height_m,
        )?;

        let (year_planted, age) = reconcile_age(year_planted, age, bounds.reference_year);

        Ok(Self {
            id,
            name: parse_text(raw_field(fields, Field::Name)?),
            type_common: parse_text(raw_field(fields, Field::TypeCommon)?),
            type_scientific: parse_text(raw_field(fields, Field::TypeScientific)?),
            species_common: parse_text(raw_field(fields, Field::SpeciesCommon)?),
            species_scientific: parse_text(raw_field(fields, Field::SpeciesScientific)?),
            year_planted,
            age,
            crown_diameter_m,
            girth_cm,
            height_m,
            district: parse_text(raw_field(fields, Field::District)?),
            category: None,
        })
    }

    /// Assign the category decided by the classifier
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Render back into a raw field array
    pub fn to_raw(&self) -> RawRecord {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| SENTINEL_STR.to_string());
        let number = |value: Option<String>| value.unwrap_or_else(|| SENTINEL_STR.to_string());

        let fields = vec![
            self.id.to_string(),
            text(&self.name),
            text(&self.type_common),
            text(&self.type_scientific),
            text(&self.species_common),
            text(&self.species_scientific),
            number(self.year_planted.map(|v| v.to_string())),
            number(self.age.map(|v| v.to_string())),
            number(self.crown_diameter_m.map(|v| v.to_string())),
            number(self.girth_cm.map(|v| v.to_string())),
            number(self.height_m.map(|v| v.to_string())),
            text(&self.district),
        ];
        RawRecord { fields }
    }

    /// True when any column is missing
    pub fn has_missing(&self) -> bool {
        !self.to_raw().missing_fields().is_empty()
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn type_common(&self) -> Option<&str> {
        self.type_common.as_deref()
    }

    pub fn type_scientific(&self) -> Option<&str> {
        self.type_scientific.as_deref()
    }

    pub fn species_common(&self) -> Option<&str> {
        self.species_common.as_deref()
    }

    pub fn species_scientific(&self) -> Option<&str> {
        self.species_scientific.as_deref()
    }

    pub fn year_planted(&self) -> Option<i32> {
        self.year_planted
    }

    pub fn age(&self) -> Option<i32> {
        self.age
    }

    pub fn crown_diameter_m(&self) -> Option<f64> {
        self.crown_diameter_m
    }

    pub fn girth_cm(&self) -> Option<i32> {
        self.girth_cm
    }

    pub fn height_m(&self) -> Option<f64> {
        self.height_m
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn is_deciduous(&self) -> bool {
        self.category == Some(Category::Deciduous)
    }

    /// Text value of a column, for grouping queries
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name(),
            Field::TypeCommon => self.type_common(),
            Field::TypeScientific => self.type_scientific(),
            Field::SpeciesCommon => self.species_common(),
            Field::SpeciesScientific => self.species_scientific(),
            Field::District => self.district(),
            _ => None,
        }
    }
}

fn raw_field<S: AsRef<str>>(fields: &[Option<S>], field: Field) -> Result<&str> {
    fields
        .get(field.index())
        .and_then(|value| value.as_ref())
        .map(|value| value.as_ref())
        .ok_or_else(|| TreeError::field_invalid(field, ""))
}

fn parse_text(raw: &str) -> Option<String> {
    if is_sentinel(raw) {
        None
    } else {
        Some(raw.trim().to_string())
    }
}

/// Integer must parse, be at most `max`, and at least `min` unless it is the sentinel
fn parse_bounded_int(field: Field, raw: &str, min: i32, max: i32) -> Result<Option<i32>> {
    if is_sentinel(raw) {
        return Ok(None);
    }

    let value = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| TreeError::field_invalid(field, raw))?;

    if value > max || value < min {
        return Err(TreeError::field_invalid(field, raw));
    }
    Ok(Some(value))
}

/// Float must parse, be finite, within [0, max] unless it is the sentinel
fn parse_bounded_float(field: Field, raw: &str, max: f64) -> Result<Option<f64>> {
    if is_sentinel(raw) {
        return Ok(None);
    }

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| TreeError::field_invalid(field, raw))?;

    if !value.is_finite() || value > max || value < 0.0 {
        return Err(TreeError::field_invalid(field, raw));
    }
    Ok(Some(value))
}

/// Make planting year and age add up to the reference year
///
/// A single known value derives the other. When both are known but disagree,
/// the year is re-derived from the age.
fn reconcile_age(
    year_planted: Option<i32>,
    age: Option<i32>,
    reference_year: i32,
) -> (Option<i32>, Option<i32>) {
    match (year_planted, age) {
        (Some(year), None) => (Some(year), Some(reference_year - year)),
        (None, Some(age)) => (Some(reference_year - age), Some(age)),
        (Some(year), Some(age)) if year + age != reference_year => {
            (Some(reference_year - age), Some(age))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: [&str; FIELD_COUNT]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn complete() -> [&'static str; FIELD_COUNT] {
        [
            "17", "Winterlinde", "Linde", "Tilia", "Winter-Linde", "Tilia cordata", "1983",
            "40", "1.8", "120", "14.5", "Pankow",
        ]
    }

    #[test]
    fn test_complete_record_is_accepted() {
        let tree = TreeRecord::from_fields(&fields(complete()), &ValidationBounds::default())
            .unwrap();

        assert_eq!(tree.id(), 17);
        assert_eq!(tree.species_scientific(), Some("Tilia cordata"));
        assert_eq!(tree.year_planted(), Some(1983));
        assert_eq!(tree.age(), Some(40));
        assert_eq!(tree.crown_diameter_m(), Some(1.8));
        assert_eq!(tree.girth_cm(), Some(120));
        assert_eq!(tree.height_m(), Some(14.5));
        assert_eq!(tree.district(), Some("Pankow"));
        assert_eq!(tree.category(), None);
        assert!(!tree.has_missing());
    }

    #[test]
    fn test_sentinels_become_missing() {
        let mut values = complete();
        values[Field::Name.index()] = "-1";
        values[Field::Height.index()] = "-1.0";
        let tree = TreeRecord::from_fields(&fields(values), &ValidationBounds::default())
            .unwrap();

        assert_eq!(tree.name(), None);
        assert_eq!(tree.height_m(), None);
        assert!(tree.has_missing());
    }

    #[test]
    fn test_out_of_range_field_is_reported() {
        let mut values = complete();
        values[Field::Girth.index()] = "781";
        let result = TreeRecord::from_fields(&fields(values), &ValidationBounds::default());

        match result {
            Err(TreeError::FieldInvalid { field, value }) => {
                assert_eq!(field, Field::Girth);
                assert_eq!(value, "781");
            }
            _ => panic!("Expected FieldInvalid error"),
        }
    }

    #[test]
    fn test_unparsable_float_is_reported() {
        let mut values = complete();
        values[Field::CrownDiameter.index()] = "wide";
        let result = TreeRecord::from_fields(&fields(values), &ValidationBounds::default());
        assert!(matches!(
            result,
            Err(TreeError::FieldInvalid {
                field: Field::CrownDiameter,
                ..
            })
        ));
    }

    #[test]
    fn test_absent_field_is_reported_first() {
        let mut parsed = fields(complete());
        parsed[Field::District.index()] = None;
        parsed[Field::Girth.index()] = Some("9999".to_string());
        let result = TreeRecord::from_fields(&parsed, &ValidationBounds::default());
        assert!(matches!(
            result,
            Err(TreeError::FieldInvalid {
                field: Field::District,
                ..
            })
        ));
    }

    #[test]
    fn test_year_below_minimum_is_rejected_but_sentinel_is_not() {
        let mut values = complete();
        values[Field::YearPlanted.index()] = "1200";
        let result = TreeRecord::from_fields(&fields(values), &ValidationBounds::default());
        assert!(matches!(
            result,
            Err(TreeError::FieldInvalid {
                field: Field::YearPlanted,
                ..
            })
        ));

        values[Field::YearPlanted.index()] = "-1";
        assert!(TreeRecord::from_fields(&fields(values), &ValidationBounds::default()).is_ok());
    }

    #[test]
    fn test_age_derived_from_year() {
        let mut values = complete();
        values[Field::Age.index()] = "-1";
        let tree = TreeRecord::from_fields(&fields(values), &ValidationBounds::default())
            .unwrap();
        assert_eq!(tree.age(), Some(40));
    }

    #[test]
    fn test_year_derived_from_age() {
        let mut values = complete();
        values[Field::YearPlanted.index()] = "-1";
        values[Field::Age.index()] = "23";
        let tree = TreeRecord::from_fields(&fields(values), &ValidationBounds::default())
            .unwrap();
        assert_eq!(tree.year_planted(), Some(2000));
    }

    #[test]
    fn test_inconsistent_year_follows_age() {
        let mut values = complete();
        values[Field::YearPlanted.index()] = "1990";
        values[Field::Age.index()] = "10";
        let tree = TreeRecord::from_fields(&fields(values), &ValidationBounds::default())
            .unwrap();
        assert_eq!(tree.year_planted(), Some(2013));
        assert_eq!(tree.age(), Some(10));
    }

    #[test]
    fn test_raw_round_trip_keeps_missing_markers() {
        let mut values = complete();
        values[Field::SpeciesCommon.index()] = "-1";
        let tree = TreeRecord::from_fields(&fields(values), &ValidationBounds::default())
            .unwrap();
        let raw = tree.to_raw();

        assert_eq!(raw.missing_fields(), vec![Field::SpeciesCommon]);
        assert_eq!(raw.build(&ValidationBounds::default()).unwrap(), tree);
    }

    #[test]
    fn test_field_index_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_index(field.index()), Some(field));
        }
        assert_eq!(Field::from_index(FIELD_COUNT), None);
    }
}
