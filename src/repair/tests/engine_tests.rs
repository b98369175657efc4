//! Tests for per-record repair decisions

use super::*;
use crate::models::{Category, Field};
use crate::repair::{IrreparableReason, RepairOutcome};

#[test]
fn test_complete_record_is_intact_and_classified() {
    let lime = complete_lime(1);
    let engine = create_test_engine(&[lime.clone()]);

    match engine.repair(&lime) {
        RepairOutcome::Intact(tree) => {
            assert_eq!(tree.to_raw(), lime.to_raw());
            assert_eq!(tree.category(), Some(Category::Deciduous));
        }
        other => panic!("Expected Intact outcome, got {:?}", other),
    }
}

#[test]
fn test_repairing_a_repaired_record_changes_nothing() {
    let trees = vec![
        complete_lime(1),
        create_test_tree("2;Linde am Weg;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;1.8;-1;-1;Pankow"),
    ];
    let engine = create_test_engine(&trees);

    let repaired = match engine.repair(&trees[1]) {
        RepairOutcome::Repaired(tree) => tree,
        other => panic!("Expected Repaired outcome, got {:?}", other),
    };

    match engine.repair(&repaired) {
        RepairOutcome::Intact(again) => assert_eq!(again, repaired),
        other => panic!("Expected Intact outcome, got {:?}", other),
    }
}

#[test]
fn test_excluded_name_makes_record_irreparable() {
    let tree = create_test_tree(
        "3;Unbekannt;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;1.8;120;14.5;Pankow",
    );
    let engine = create_test_engine(&[tree.clone()]);

    assert_eq!(
        engine.repair(&tree),
        RepairOutcome::Irreparable(IrreparableReason::MissingName)
    );
}

#[test]
fn test_missing_district_and_type_pair() {
    let no_district =
        create_test_tree("4;Linde;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;1.8;120;14.5;-1");
    let no_type =
        create_test_tree("5;Linde;-1;unknown;Winter-Linde;Tilia cordata;1983;40;1.8;120;14.5;Mitte");
    let engine = create_test_engine(&[no_district.clone(), no_type.clone()]);

    assert_eq!(
        engine.repair(&no_district),
        RepairOutcome::Irreparable(IrreparableReason::MissingDistrict)
    );
    assert_eq!(
        engine.repair(&no_type),
        RepairOutcome::Irreparable(IrreparableReason::MissingType)
    );
}

#[test]
fn test_type_and_species_are_cross_filled() {
    let trees = vec![
        complete_lime(1),
        create_test_tree("2;Linde am Weg;-1;Tilia;-1;Tilia cordata;1983;40;1.8;120;14.5;Pankow"),
        create_test_tree("3;Linde am Hof;Linde;-1;Winter-Linde;-1;1983;40;1.8;120;14.5;Pankow"),
    ];
    let engine = create_test_engine(&trees);

    let backward = engine.repair(&trees[1]);
    let tree = backward.tree().unwrap();
    assert_eq!(tree.type_common(), Some("Linde"));
    assert_eq!(tree.species_common(), Some("Winter-Linde"));

    let forward = engine.repair(&trees[2]);
    let tree = forward.tree().unwrap();
    assert_eq!(tree.type_scientific(), Some("Tilia"));
    assert_eq!(tree.species_scientific(), Some("Tilia cordata"));
}

#[test]
fn test_uncorrelated_name_stays_missing() {
    let tree = create_test_tree(
        "6;Eiche;-1;Quercus;Stiel-Eiche;Quercus robur;1983;40;1.8;120;14.5;Mitte",
    );
    let engine = create_test_engine(&[tree.clone()]);

    match engine.repair(&tree) {
        RepairOutcome::Repaired(repaired) => assert_eq!(repaired.type_common(), None),
        other => panic!("Expected Repaired outcome, got {:?}", other),
    }
}

#[test]
fn test_age_derived_from_girth() {
    let tree = create_test_tree(
        "7;Linde;Linde;Tilia;Winter-Linde;Tilia cordata;-1;-1;1.8;120;14.5;Pankow",
    );
    let engine = create_test_engine(&[tree.clone()]);

    let outcome = engine.repair(&tree);
    let repaired = outcome.tree().unwrap();
    assert_eq!(repaired.age(), Some(72));
    assert_eq!(repaired.year_planted(), Some(1951));
    assert_eq!(repaired.girth_cm(), Some(120));
}

#[test]
fn test_derived_girth_is_capped() {
    let tree = create_test_tree(
        "8;Eibe;Eibe;Taxus;Gemeine Eibe;Taxus baccata;1423;600;2.0;-1;12;Spandau",
    );
    let engine = create_test_engine(&[tree.clone()]);

    let outcome = engine.repair(&tree);
    let repaired = outcome.tree().unwrap();
    assert_eq!(repaired.girth_cm(), Some(780));
    assert_eq!(repaired.category(), Some(Category::Coniferous));
}

#[test]
fn test_average_tree_fills_remaining_measurements() {
    let trees = vec![
        complete_lime(1),
        complete_pine(2),
        create_test_tree("3;Linde;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;-1;120;-1;Pankow"),
    ];
    let engine = create_test_engine(&trees);

    let outcome = engine.repair(&trees[2]);
    let repaired = outcome.tree().unwrap();
    assert_eq!(repaired.crown_diameter_m(), engine.average().crown_diameter_m);
    assert_eq!(repaired.height_m(), engine.average().height_m);
    assert!((repaired.height_m().unwrap() - 18.25).abs() < 1e-9);
}

#[test]
fn test_unobserved_measurement_is_irreparable() {
    let tree = create_test_tree(
        "9;Linde;Linde;Tilia;Winter-Linde;Tilia cordata;1983;40;1.8;120;-1;Pankow",
    );
    let engine = create_test_engine(&[tree.clone()]);

    assert_eq!(
        engine.repair(&tree),
        RepairOutcome::Irreparable(IrreparableReason::NoAverage(Field::Height))
    );
}

#[test]
fn test_planting_year_takes_priority_over_supplied_girth() {
    let lime = complete_lime(1);
    let engine = create_test_engine(&[lime.clone()]);

    let mut raw = lime.to_raw();
    raw.mark_missing(Field::Age);
    raw.set(Field::Girth, "500");

    match engine.repair_raw(raw) {
        RepairOutcome::Repaired(tree) => {
            assert_eq!(tree.year_planted(), Some(1983));
            assert_eq!(tree.age(), Some(40));
            assert_eq!(tree.girth_cm(), Some(67));
            assert!(tree.category().is_some());
        }
        other => panic!("Expected Repaired outcome, got {:?}", other),
    }
}

#[test]
fn test_raw_repair_applies_exclusion_vocabulary() {
    let lime = complete_lime(1);
    let engine = create_test_engine(&[lime.clone()]);

    let mut raw = lime.to_raw();
    raw.set(Field::District, "unbekannt");

    assert_eq!(
        engine.repair_raw(raw),
        RepairOutcome::Irreparable(IrreparableReason::MissingDistrict)
    );
}
