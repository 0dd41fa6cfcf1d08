use fixed::types::I32F32;

use crate::resource::Amount;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Subunits in one whole unit of resource (e.g. millibuckets per bucket).
pub const SUBUNITS_PER_UNIT: Amount = 1000;

/// Convert a subunit count to whole units. Use only for display, never in
/// the tick loop.
pub fn amount_to_units(amount: Amount) -> Fixed64 {
    Fixed64::saturating_from_num(amount) / Fixed64::from_num(SUBUNITS_PER_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_units_convert_exactly() {
        assert_eq!(amount_to_units(2000), Fixed64::from_num(2));
        assert_eq!(amount_to_units(0), Fixed64::ZERO);
    }

    #[test]
    fn fractional_units_are_exact_for_binary_fractions() {
        assert_eq!(amount_to_units(1500), Fixed64::from_num(1.5));
        assert_eq!(amount_to_units(250), Fixed64::from_num(0.25));
    }

    #[test]
    fn huge_amounts_saturate() {
        let expected = Fixed64::MAX / Fixed64::from_num(SUBUNITS_PER_UNIT);
        assert_eq!(amount_to_units(Amount::MAX), expected);
    }
}
