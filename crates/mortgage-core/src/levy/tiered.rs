use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One progressive band. `upper_bound` is cumulative; `None` means the band
/// is unbounded and must be the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyBand {
    #[serde(default)]
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

impl LevyBand {
    pub const fn capped(upper_bound: Money, rate: Rate) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub const fn unbounded(rate: Rate) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}

/// The part of an amount that fell into one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSlice {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate: Rate,
    pub taxed_amount: Money,
    pub contribution: Money,
}

// ---------------------------------------------------------------------------
// Band tables
// ---------------------------------------------------------------------------

/// Memorandum of transfer duty: 1% / 2% / 3% / 4%.
pub const MOT_BANDS: [LevyBand; 4] = [
    LevyBand::capped(dec!(100_000), dec!(0.01)),
    LevyBand::capped(dec!(500_000), dec!(0.02)),
    LevyBand::capped(dec!(1_000_000), dec!(0.03)),
    LevyBand::unbounded(dec!(0.04)),
];

/// Conveyancing scale for the sale and purchase agreement.
pub const LEGAL_FEE_BANDS: [LevyBand; 5] = [
    LevyBand::capped(dec!(500_000), dec!(0.01)),
    LevyBand::capped(dec!(1_000_000), dec!(0.008)),
    LevyBand::capped(dec!(3_000_000), dec!(0.007)),
    LevyBand::capped(dec!(5_000_000), dec!(0.006)),
    LevyBand::unbounded(dec!(0.005)),
];

/// Loan instrument duty is a flat 0.5%.
pub const LOAN_INSTRUMENT_BANDS: [LevyBand; 1] = [LevyBand::unbounded(dec!(0.005))];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Progressive levy on `amount`. Unrounded; negative input yields zero.
///
/// Bands are walked in order and each consumes at most its own width
/// (`upper_bound - previous upper_bound`). Anything left once the bands run
/// out is untaxed, so the last band should be unbounded.
pub fn compute_tiered_amount(amount: Money, bands: &[LevyBand]) -> Money {
    let mut remaining = amount.max(Decimal::ZERO);
    let mut previous = Decimal::ZERO;
    let mut total = Decimal::ZERO;

    for band in bands {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = remaining.min(band_width(band, previous, remaining));
        total += slice * band.rate;
        remaining -= slice;
        previous = band.upper_bound.unwrap_or(previous);
    }

    total
}

/// Same walk as [`compute_tiered_amount`], reporting every band touched.
pub fn tiered_breakdown(amount: Money, bands: &[LevyBand]) -> Vec<BandSlice> {
    let mut remaining = amount.max(Decimal::ZERO);
    let mut previous = Decimal::ZERO;
    let mut slices = Vec::new();

    for band in bands {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxed = remaining.min(band_width(band, previous, remaining));
        slices.push(BandSlice {
            lower_bound: previous,
            upper_bound: band.upper_bound,
            rate: band.rate,
            taxed_amount: taxed,
            contribution: taxed * band.rate,
        });
        remaining -= taxed;
        previous = band.upper_bound.unwrap_or(previous);
    }

    slices
}

fn band_width(band: &LevyBand, previous: Money, remaining: Money) -> Money {
    match band.upper_bound {
        Some(upper) => (upper - previous).max(Decimal::ZERO),
        None => remaining,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mot_600k() {
        // 1% × 100k + 2% × 400k + 3% × 100k
        assert_eq!(compute_tiered_amount(dec!(600_000), &MOT_BANDS), dec!(12_000));
    }

    #[test]
    fn test_first_band_only() {
        assert_eq!(compute_tiered_amount(dec!(80_000), &MOT_BANDS), dec!(800));
    }

    #[test]
    fn test_unbounded_tail() {
        // 1000 + 8000 + 15000 + 4% × 1m
        assert_eq!(compute_tiered_amount(dec!(2_000_000), &MOT_BANDS), dec!(64_000));
    }

    #[test]
    fn test_negative_and_zero_amounts() {
        assert_eq!(compute_tiered_amount(dec!(-10), &MOT_BANDS), Decimal::ZERO);
        assert_eq!(compute_tiered_amount(Decimal::ZERO, &MOT_BANDS), Decimal::ZERO);
        assert!(tiered_breakdown(Decimal::ZERO, &MOT_BANDS).is_empty());
    }

    #[test]
    fn test_flat_band() {
        assert_eq!(
            compute_tiered_amount(dec!(405_000), &LOAN_INSTRUMENT_BANDS),
            dec!(2025)
        );
    }

    #[test]
    fn test_breakdown_matches_total() {
        let slices = tiered_breakdown(dec!(3_600_000), &LEGAL_FEE_BANDS);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].taxed_amount, dec!(500_000));
        assert_eq!(slices[3].lower_bound, dec!(3_000_000));
        assert_eq!(slices[3].taxed_amount, dec!(600_000));
        let summed: Decimal = slices.iter().map(|s| s.contribution).sum();
        assert_eq!(summed, compute_tiered_amount(dec!(3_600_000), &LEGAL_FEE_BANDS));
    }

    #[test]
    fn test_missing_unbounded_band_leaves_tail_untaxed() {
        let bands = [LevyBand::capped(dec!(1000), dec!(0.1))];
        assert_eq!(compute_tiered_amount(dec!(5000), &bands), dec!(100));
    }
}
