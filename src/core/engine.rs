use super::error::{Result, ScenarioError};
use super::types::{Payout, SamplePoint, Scenario};

/// Number of equal intervals the exit range is split into; the curve has one more point.
pub const SAMPLE_INTERVALS: u32 = 100;

/// Lower bound on the sampled exit range, whatever the deal size.
pub const MIN_EXIT_RANGE: f64 = 100_000_000.0;

/// The sampled range always reaches this multiple of the invested capital.
pub const EXIT_RANGE_INVESTMENT_MULTIPLE: f64 = 10.0;

/// Splits `exit_value` between investor and founder.
///
/// Participating preferred takes the preference plus its pro-rata share, capped at
/// the exit value. Non-participating takes the larger of the preference and the
/// as-converted share; that amount is not capped, so below the preference the
/// investor claim exceeds the exit value and the founder receives 0.
///
/// Negative exit values and invalid scenarios are outside the domain of this
/// function; use [`try_compute_payout`] at untrusted boundaries.
pub fn compute_payout(exit_value: f64, scenario: &Scenario) -> Payout {
    let liquidation_preference = scenario.liquidation_preference();
    let ownership_payout = exit_value * (scenario.ownership_percentage / 100.0);

    let investor = if scenario.has_participation {
        exit_value.min(liquidation_preference + ownership_payout)
    } else {
        liquidation_preference.max(ownership_payout)
    };
    let founder = (exit_value - investor).max(0.0);

    Payout { investor, founder }
}

pub fn try_compute_payout(exit_value: f64, scenario: &Scenario) -> Result<Payout> {
    if !exit_value.is_finite() || exit_value < 0.0 {
        return Err(ScenarioError::InvalidExitValue(exit_value));
    }
    scenario.validate()?;
    Ok(compute_payout(exit_value, scenario))
}

pub fn max_exit_value(scenario: &Scenario) -> f64 {
    MIN_EXIT_RANGE.max(scenario.investment_amount * EXIT_RANGE_INVESTMENT_MULTIPLE)
}

/// Evaluates the payout curve at `SAMPLE_INTERVALS + 1` evenly spaced exit values
/// from 0 to [`max_exit_value`] inclusive.
pub fn sample(scenario: &Scenario) -> Vec<SamplePoint> {
    let max_exit = max_exit_value(scenario);
    (0..=SAMPLE_INTERVALS)
        .map(|i| {
            // Scaling by the fraction keeps the last point exactly at `max_exit`.
            let exit_value = max_exit * (f64::from(i) / f64::from(SAMPLE_INTERVALS));
            let payout = compute_payout(exit_value, scenario);
            SamplePoint {
                exit_value,
                investor_payout: payout.investor,
                founder_payout: payout.founder,
            }
        })
        .collect()
}

pub fn try_sample(scenario: &Scenario) -> Result<Vec<SamplePoint>> {
    scenario.validate()?;
    Ok(sample(scenario))
}

/// Upper bound of the payout axis: the largest single payout across the curve.
pub fn max_payout_value(points: &[SamplePoint]) -> f64 {
    points
        .iter()
        .map(|p| p.investor_payout.max(p.founder_payout))
        .fold(0.0, f64::max)
}
