//! The aggregate calculator behind the per-student and per-subject averages.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept in a reported average.
pub const AVERAGE_SCALE: u32 = 2;

/// Arithmetic mean of `values`, rounded to [`AVERAGE_SCALE`] places.
///
/// Rounding is decimal half-up: a midpoint rounds away from zero, so `12.345`
/// becomes `12.35`. An empty slice has no mean and yields `0`.
pub fn compute_average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }

    let sum: Decimal = values.iter().sum();
    let mean = sum / Decimal::from(values.len());
    mean.round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
