use serde::Serialize;

use super::types::{Scenario, ScenarioKey};

const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// Short money label for axes and summaries: `$2.3B`, `$1.5M`, `$250K`.
///
/// Halves round away from zero (`$1.25M` shows as `$1.3M`).
pub fn format_currency(value: f64) -> String {
    if value >= BILLION {
        format!("${:.1}B", round_tenths(value / BILLION))
    } else if value >= MILLION {
        format!("${:.1}M", round_tenths(value / MILLION))
    } else {
        format!("${:.0}K", (value / THOUSAND).round())
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub name: String,
    pub investment_amount: String,
    pub multiple: String,
    pub ownership_percentage: String,
    pub participation: String,
}

impl ScenarioSummary {
    pub fn new(key: ScenarioKey, scenario: &Scenario) -> Self {
        Self {
            name: key.display_name().to_string(),
            investment_amount: format_currency(scenario.investment_amount),
            multiple: format!("{}x", scenario.multiple),
            ownership_percentage: format!("{}%", scenario.ownership_percentage),
            participation: if scenario.has_participation { "Yes" } else { "No" }.to_string(),
        }
    }
}
