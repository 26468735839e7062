//! Tolerance math shared by the range-bounded builders

use crate::guard::IntegerOperator;

/// Symmetric band half-width around `value` for a percentage
///
/// Computed as `value * percent / 100` in 128-bit integer arithmetic, so
/// large token amounts and lamport balances never suffer float rounding
/// drift. `percent = 0` yields a zero-width band, which makes the
/// resulting bounds equivalent to strict equality.
pub fn tolerance_range(value: u64, percent: u8) -> u64 {
    ((value as u128 * percent as u128) / 100) as u64
}

/// Bound operators for a tolerance band
///
/// Inclusive bands use `>=`/`<=`, exclusive ones `>`/`<`.
pub(crate) fn band_operators(inclusive: bool) -> (IntegerOperator, IntegerOperator) {
    if inclusive {
        (
            IntegerOperator::GreaterThanOrEqual,
            IntegerOperator::LessThanOrEqual,
        )
    } else {
        (IntegerOperator::GreaterThan, IntegerOperator::LessThan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_percent_is_zero_width() {
        assert_eq!(tolerance_range(1_000_000, 0), 0);
        assert_eq!(tolerance_range(u64::MAX, 0), 0);
    }

    #[test]
    fn test_two_percent_of_a_million() {
        assert_eq!(tolerance_range(1_000_000, 2), 20_000);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 1% of 99 is 0.99, floor division drops the fraction
        assert_eq!(tolerance_range(99, 1), 0);
        assert_eq!(tolerance_range(150, 1), 1);
    }

    #[test]
    fn test_full_percent_is_identity() {
        assert_eq!(tolerance_range(123_456_789, 100), 123_456_789);
    }

    #[test]
    fn test_no_overflow_on_max_value() {
        assert_eq!(tolerance_range(u64::MAX, 100), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_range_matches_exact_integer_division(value in any::<u64>(), percent in 0u8..=100) {
            let range = tolerance_range(value, percent);
            prop_assert_eq!(range as u128, value as u128 * percent as u128 / 100);
        }

        #[test]
        fn prop_bounds_bracket_the_value(value in any::<u64>(), percent in 0u8..=100) {
            let range = tolerance_range(value, percent);
            let lower = value.saturating_sub(range);
            let upper = value.saturating_add(range);
            prop_assert!(lower <= value);
            prop_assert!(value <= upper);
        }
    }
}
