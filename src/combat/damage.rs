//! Damage formula

/// Offset added to the attack/defense ratio
pub const RATIO_OFFSET: f64 = 0.4696;
/// Scale applied to the offset ratio
pub const RATIO_SCALE: f64 = 0.296;
/// Per-level growth of the damage curve
pub const LEVEL_SCALE: f64 = 2.71828;
/// Damage curve intercept
pub const LEVEL_OFFSET: f64 = 13.358;

/// Unmultiplied, unvaried damage of `attack` against `defense` at `level`
///
/// Defense is floored at 1 so a zeroed stat cannot divide by zero.
pub fn raw_damage(level: u32, attack: f64, defense: f64) -> f64 {
    let ratio = attack / defense.max(1.0);
    (ratio + RATIO_OFFSET) * RATIO_SCALE * (level as f64 * LEVEL_SCALE + LEVEL_OFFSET)
}

/// Final damage from a pre-variance value
///
/// Zero stays zero; anything else rounds and never drops below 1.
pub fn finalize(pre_variance: f64, variance: f64) -> i32 {
    if pre_variance == 0.0 {
        return 0;
    }
    ((pre_variance * variance).round() as i32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_value() {
        let expected = 1.4696 * 0.296 * (27.1828 + 13.358);
        assert!((raw_damage(10, 50.0, 50.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stronger_attack_more_damage() {
        assert!(raw_damage(10, 90.0, 83.0) < raw_damage(10, 120.0, 83.0));
        assert!(raw_damage(10, 90.0, 83.0) < raw_damage(20, 90.0, 83.0));
    }

    #[test]
    fn test_zero_defense_is_floored() {
        assert_eq!(raw_damage(1, 10.0, 0.0), raw_damage(1, 10.0, 1.0));
    }

    #[test]
    fn test_finalize_floor_and_zero() {
        assert_eq!(finalize(0.0, 1.3), 0);
        assert_eq!(finalize(0.2, 0.7), 1);
        assert_eq!(finalize(10.0, 1.25), 13);
    }
}
