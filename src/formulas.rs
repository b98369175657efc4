//! Closed-form biometric relations between age, girth and stem diameter.

use std::f64::consts::PI;

/// Girth in cm expected for a tree of the given age
///
/// `girth = age / factor`, rounded to the nearest centimetre.
pub fn mitchell_girth(age: i32, factor: f64) -> i32 {
    (f64::from(age) / factor).round() as i32
}

/// Age in years expected for a tree of the given girth
///
/// `age = girth * factor`, rounded to the nearest year.
pub fn mitchell_age(girth_cm: i32, factor: f64) -> i32 {
    (f64::from(girth_cm) * factor).round() as i32
}

/// Stem diameter in cm of a circular trunk with the given girth
pub fn stem_diameter_from_girth(girth_cm: f64) -> f64 {
    girth_cm / PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MITCHELL_FACTOR;

    #[test]
    fn test_mitchell_girth() {
        assert_eq!(mitchell_girth(0, MITCHELL_FACTOR), 0);
        assert_eq!(mitchell_girth(30, MITCHELL_FACTOR), 50);
        assert_eq!(mitchell_girth(40, MITCHELL_FACTOR), 67);
    }

    #[test]
    fn test_mitchell_age() {
        assert_eq!(mitchell_age(50, MITCHELL_FACTOR), 30);
        assert_eq!(mitchell_age(120, MITCHELL_FACTOR), 72);
    }

    #[test]
    fn test_age_survives_girth_round_trip() {
        for age in [1, 5, 17, 23, 40, 77, 150, 300, 468] {
            let back = mitchell_age(mitchell_girth(age, MITCHELL_FACTOR), MITCHELL_FACTOR);
            assert!((back - age).abs() <= 1, "age {} came back as {}", age, back);
        }
    }

    #[test]
    fn test_stem_diameter() {
        assert!((stem_diameter_from_girth(PI * 20.0) - 20.0).abs() < 1e-9);
        assert_eq!(stem_diameter_from_girth(0.0), 0.0);
    }
}
