//! Correlation clustering between two vocabularies naming the same concept.
//!
//! Common and scientific type names (and likewise species names) that share a
//! record are grouped under one cluster id. The scan is single-pass and
//! greedy: a record reuses the cluster of the first of its values already
//! seen, otherwise opens a new cluster. Two clusters are never merged
//! afterwards.

use crate::config::ValidationBounds;
use crate::models::{Field, TreeRecord};
use std::collections::HashMap;

/// One of the two columns of a correlated pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Common,
    Scientific,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Common => Side::Scientific,
            Side::Scientific => Side::Common,
        }
    }
}

/// Value to cluster mapping for one vocabulary
#[derive(Debug, Clone, Default)]
struct Vocabulary {
    ids: HashMap<String, usize>,
    /// Values of each cluster in first-seen order
    members: Vec<Vec<String>>,
}

impl Vocabulary {
    fn get(&self, value: &str) -> Option<usize> {
        self.ids.get(value).copied()
    }

    fn insert(&mut self, value: &str, cluster: usize) {
        if self.ids.contains_key(value) {
            return;
        }
        if self.members.len() <= cluster {
            self.members.resize_with(cluster + 1, Vec::new);
        }
        self.ids.insert(value.to_string(), cluster);
        self.members[cluster].push(value.to_string());
    }

    fn first_member(&self, cluster: usize) -> Option<&str> {
        self.members
            .get(cluster)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Forward and backward lookup between two correlated columns
#[derive(Debug, Clone)]
pub struct CorrelationTable {
    common_field: Field,
    scientific_field: Field,
    common: Vocabulary,
    scientific: Vocabulary,
    clusters: usize,
}

impl CorrelationTable {
    /// Cluster the values of two columns over every tree, in input order
    ///
    /// Missing values and values on the exclusion vocabulary are ignored.
    pub fn build(
        trees: &[TreeRecord],
        common_field: Field,
        scientific_field: Field,
        bounds: &ValidationBounds,
    ) -> Self {
        let mut table = Self {
            common_field,
            scientific_field,
            common: Vocabulary::default(),
            scientific: Vocabulary::default(),
            clusters: 0,
        };

        let usable = |value| Option::<&str>::filter(value, |v| !bounds.is_excluded(v));

        for tree in trees {
            let common = usable(tree.text(common_field));
            let scientific = usable(tree.text(scientific_field));
            table.observe(common, scientific);
        }

        table
    }

    /// Cluster the common and scientific type names
    pub fn types(trees: &[TreeRecord], bounds: &ValidationBounds) -> Self {
        Self::build(trees, Field::TypeCommon, Field::TypeScientific, bounds)
    }

    /// Cluster the common and scientific species names
    pub fn species(trees: &[TreeRecord], bounds: &ValidationBounds) -> Self {
        Self::build(
            trees,
            Field::SpeciesCommon,
            Field::SpeciesScientific,
            bounds,
        )
    }

    fn observe(&mut self, common: Option<&str>, scientific: Option<&str>) {
        if common.is_none() && scientific.is_none() {
            return;
        }

        let existing = common
            .and_then(|value| self.common.get(value))
            .or_else(|| scientific.and_then(|value| self.scientific.get(value)));

        let cluster = match existing {
            Some(cluster) => cluster,
            None => {
                self.clusters += 1;
                self.clusters - 1
            }
        };

        if let Some(value) = common {
            self.common.insert(value, cluster);
        }
        if let Some(value) = scientific {
            self.scientific.insert(value, cluster);
        }
    }

    fn vocabulary(&self, side: Side) -> &Vocabulary {
        match side {
            Side::Common => &self.common,
            Side::Scientific => &self.scientific,
        }
    }

    /// Column holding the given side's values
    pub fn field(&self, side: Side) -> Field {
        match side {
            Side::Common => self.common_field,
            Side::Scientific => self.scientific_field,
        }
    }

    /// Cluster id assigned to a value
    pub fn cluster_of(&self, value: &str, side: Side) -> Option<usize> {
        self.vocabulary(side).get(value)
    }

    /// Value on the other side sharing the known value's cluster
    ///
    /// Returns the first value seen for that cluster, or `None` when the
    /// known value was never observed or its cluster has no partner.
    pub fn find_correlate(&self, known: &str, side: Side) -> Option<&str> {
        let cluster = self.cluster_of(known, side)?;
        self.vocabulary(side.other()).first_member(cluster)
    }

    /// Number of clusters opened
    pub fn cluster_count(&self) -> usize {
        self.clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(id: i64, type_common: &str, type_scientific: &str) -> TreeRecord {
        let values = [
            id.to_string().as_str(),
            "Baum",
            type_common,
            type_scientific,
            "Art",
            "Species",
            "2000",
            "23",
            "1.5",
            "50",
            "10",
            "Mitte",
        ]
        .map(|v| Some(v.to_string()));
        TreeRecord::from_fields(&values, &ValidationBounds::default()).unwrap()
    }

    #[test]
    fn test_pairs_share_cluster() {
        let trees = vec![
            tree(1, "Linde", "Tilia"),
            tree(2, "Ahorn", "Acer"),
            tree(3, "Linde", "Tilia"),
        ];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        assert_eq!(table.cluster_count(), 2);
        assert_eq!(table.find_correlate("Tilia", Side::Scientific), Some("Linde"));
        assert_eq!(table.find_correlate("Ahorn", Side::Common), Some("Acer"));
    }

    #[test]
    fn test_missing_partner_joins_later() {
        let trees = vec![tree(1, "Linde", "-1"), tree(2, "Linde", "Tilia")];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        assert_eq!(table.cluster_count(), 1);
        assert_eq!(table.find_correlate("Tilia", Side::Scientific), Some("Linde"));
        assert_eq!(table.find_correlate("Linde", Side::Common), Some("Tilia"));
    }

    #[test]
    fn test_first_seen_cluster_wins() {
        let trees = vec![
            tree(1, "Linde", "Tilia"),
            tree(2, "Winterlinde", "Tilia"),
            tree(3, "Linde", "Tilia cordata"),
        ];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        assert_eq!(table.cluster_count(), 1);
        assert_eq!(table.cluster_of("Winterlinde", Side::Common), Some(0));
        assert_eq!(table.cluster_of("Tilia cordata", Side::Scientific), Some(0));
        assert_eq!(table.find_correlate("Winterlinde", Side::Common), Some("Tilia"));
    }

    #[test]
    fn test_late_link_does_not_merge_clusters() {
        let trees = vec![
            tree(1, "Linde", "-1"),
            tree(2, "-1", "Tilia"),
            tree(3, "Linde", "Tilia"),
        ];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        assert_eq!(table.cluster_count(), 2);
        assert_eq!(table.cluster_of("Linde", Side::Common), Some(0));
        assert_eq!(table.cluster_of("Tilia", Side::Scientific), Some(1));
        assert_eq!(table.find_correlate("Linde", Side::Common), None);
    }

    #[test]
    fn test_lookup_is_symmetric_within_cluster() {
        let trees = vec![
            tree(1, "Linde", "Tilia"),
            tree(2, "Eiche", "Quercus"),
            tree(3, "Kiefer", "Pinus"),
        ];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        for (common, scientific) in [("Linde", "Tilia"), ("Eiche", "Quercus"), ("Kiefer", "Pinus")] {
            let forward = table.find_correlate(common, Side::Common).unwrap();
            let backward = table.find_correlate(forward, Side::Scientific).unwrap();
            assert_eq!(forward, scientific);
            assert_eq!(
                table.cluster_of(backward, Side::Common),
                table.cluster_of(common, Side::Common)
            );
        }
    }

    #[test]
    fn test_excluded_and_unknown_values() {
        let trees = vec![tree(1, "unbekannt", "Tilia")];
        let table = CorrelationTable::types(&trees, &ValidationBounds::default());

        assert_eq!(table.cluster_of("unbekannt", Side::Common), None);
        assert_eq!(table.find_correlate("Tilia", Side::Scientific), None);
        assert_eq!(table.find_correlate("Quercus", Side::Scientific), None);
        assert_eq!(table.field(Side::Common), Field::TypeCommon);
    }
}
