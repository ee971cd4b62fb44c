use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::engine::EXIT_RANGE_INVESTMENT_MULTIPLE;
use super::error::{Result, ScenarioError};

/// Deal terms for a single preferred-equity investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub investment_amount: f64,
    pub multiple: f64,
    pub ownership_percentage: f64,
    pub has_participation: bool,
}

impl Scenario {
    pub fn new(
        investment_amount: f64,
        multiple: f64,
        ownership_percentage: f64,
        has_participation: bool,
    ) -> Result<Self> {
        let scenario = Self {
            investment_amount,
            multiple,
            ownership_percentage,
            has_participation,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.investment_amount.is_finite() || self.investment_amount <= 0.0 {
            return Err(invalid(
                ScenarioField::InvestmentAmount,
                format!("must be > 0, got {}", self.investment_amount),
            ));
        }
        if !self.multiple.is_finite() || self.multiple < 1.0 {
            return Err(invalid(
                ScenarioField::Multiple,
                format!("must be >= 1, got {}", self.multiple),
            ));
        }
        if !(0.0..=100.0).contains(&self.ownership_percentage) {
            return Err(invalid(
                ScenarioField::OwnershipPercentage,
                format!("must be between 0 and 100, got {}", self.ownership_percentage),
            ));
        }
        // Derived amounts feed the sampled exit range and must stay representable.
        if !(self.investment_amount * EXIT_RANGE_INVESTMENT_MULTIPLE).is_finite() {
            return Err(invalid(
                ScenarioField::InvestmentAmount,
                format!("too large to sample, got {}", self.investment_amount),
            ));
        }
        if !self.liquidation_preference().is_finite() {
            return Err(invalid(
                ScenarioField::Multiple,
                format!(
                    "preference {} x {} overflows",
                    self.investment_amount, self.multiple
                ),
            ));
        }
        Ok(())
    }

    pub fn liquidation_preference(&self) -> f64 {
        self.investment_amount * self.multiple
    }

    /// Returns a copy with one field replaced. The original is never touched.
    pub fn with_edit(&self, edit: ScenarioEdit) -> Result<Self> {
        let mut next = *self;
        match edit {
            ScenarioEdit::InvestmentAmount(v) => next.investment_amount = v,
            ScenarioEdit::Multiple(v) => next.multiple = v,
            ScenarioEdit::OwnershipPercentage(v) => next.ownership_percentage = v,
            ScenarioEdit::HasParticipation(v) => next.has_participation = v,
        }
        next.validate()?;
        Ok(next)
    }
}

fn invalid(field: ScenarioField, reason: String) -> ScenarioError {
    ScenarioError::InvalidValue {
        field: field.as_str(),
        reason,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payout {
    pub investor: f64,
    pub founder: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePoint {
    pub exit_value: f64,
    pub investor_payout: f64,
    pub founder_payout: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScenarioKey {
    FounderFriendly,
    VcFriendly,
    Balanced,
    Custom,
}

impl ScenarioKey {
    pub const ALL: [ScenarioKey; 4] = [
        ScenarioKey::FounderFriendly,
        ScenarioKey::VcFriendly,
        ScenarioKey::Balanced,
        ScenarioKey::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKey::FounderFriendly => "founderFriendly",
            ScenarioKey::VcFriendly => "vcFriendly",
            ScenarioKey::Balanced => "balanced",
            ScenarioKey::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioKey::FounderFriendly => "Founder-friendly",
            ScenarioKey::VcFriendly => "VC-friendly",
            ScenarioKey::Balanced => "Balanced",
            ScenarioKey::Custom => "Custom",
        }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKey {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        ScenarioKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ScenarioError::UnknownScenario(s.to_string()))
    }
}

impl Serialize for ScenarioKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScenarioField {
    InvestmentAmount,
    Multiple,
    OwnershipPercentage,
    HasParticipation,
}

/// Slider bounds used by input layers. Not enforced by the store.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ScenarioField {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioField::InvestmentAmount => "investmentAmount",
            ScenarioField::Multiple => "multiple",
            ScenarioField::OwnershipPercentage => "ownershipPercentage",
            ScenarioField::HasParticipation => "hasParticipation",
        }
    }

    pub fn slider_range(self) -> Option<SliderRange> {
        match self {
            ScenarioField::InvestmentAmount => Some(SliderRange {
                min: 1_000_000.0,
                max: 100_000_000.0,
                step: 1_000_000.0,
            }),
            ScenarioField::Multiple => Some(SliderRange {
                min: 1.0,
                max: 3.0,
                step: 0.1,
            }),
            ScenarioField::OwnershipPercentage => Some(SliderRange {
                min: 1.0,
                max: 50.0,
                step: 1.0,
            }),
            ScenarioField::HasParticipation => None,
        }
    }
}

impl FromStr for ScenarioField {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "investmentAmount" => Ok(ScenarioField::InvestmentAmount),
            "multiple" => Ok(ScenarioField::Multiple),
            "ownershipPercentage" => Ok(ScenarioField::OwnershipPercentage),
            "hasParticipation" => Ok(ScenarioField::HasParticipation),
            other => Err(ScenarioError::UnknownField(other.to_string())),
        }
    }
}

/// A single-field replacement applied to the custom scenario.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScenarioEdit {
    InvestmentAmount(f64),
    Multiple(f64),
    OwnershipPercentage(f64),
    HasParticipation(bool),
}

impl ScenarioEdit {
    pub fn field(self) -> ScenarioField {
        match self {
            ScenarioEdit::InvestmentAmount(_) => ScenarioField::InvestmentAmount,
            ScenarioEdit::Multiple(_) => ScenarioField::Multiple,
            ScenarioEdit::OwnershipPercentage(_) => ScenarioField::OwnershipPercentage,
            ScenarioEdit::HasParticipation(_) => ScenarioField::HasParticipation,
        }
    }

    /// Builds an edit from a wire field name and a loosely typed JSON value.
    pub fn from_json(field: &str, value: &serde_json::Value) -> Result<Self> {
        let field = field.parse::<ScenarioField>()?;
        let number = || {
            value
                .as_f64()
                .ok_or_else(|| invalid(field, format!("expected a number, got {value}")))
        };
        match field {
            ScenarioField::InvestmentAmount => number().map(ScenarioEdit::InvestmentAmount),
            ScenarioField::Multiple => number().map(ScenarioEdit::Multiple),
            ScenarioField::OwnershipPercentage => number().map(ScenarioEdit::OwnershipPercentage),
            ScenarioField::HasParticipation => value
                .as_bool()
                .map(ScenarioEdit::HasParticipation)
                .ok_or_else(|| invalid(field, format!("expected a boolean, got {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Scenario {
        Scenario::new(10_000_000.0, 1.0, 20.0, false).expect("valid scenario")
    }

    #[test]
    fn new_rejects_non_positive_investment() {
        let err = Scenario::new(0.0, 1.0, 20.0, false).expect_err("must reject zero investment");
        assert!(err.to_string().contains("investmentAmount"));
    }

    #[test]
    fn new_rejects_multiple_below_one() {
        let err = Scenario::new(1_000_000.0, 0.5, 20.0, false).expect_err("must reject 0.5x");
        assert!(err.to_string().contains("multiple"));
    }

    #[test]
    fn new_rejects_ownership_out_of_range() {
        assert!(Scenario::new(1_000_000.0, 1.0, 100.5, false).is_err());
        assert!(Scenario::new(1_000_000.0, 1.0, -1.0, false).is_err());
        assert!(Scenario::new(1_000_000.0, 1.0, f64::NAN, false).is_err());
        assert!(Scenario::new(1_000_000.0, 1.0, 0.0, false).is_ok());
        assert!(Scenario::new(1_000_000.0, 1.0, 100.0, false).is_ok());
    }

    #[test]
    fn new_rejects_amounts_whose_derived_values_overflow() {
        let err = Scenario::new(1e308, 1.0, 20.0, false).expect_err("exit range overflows");
        assert!(err.to_string().contains("investmentAmount"));

        let err = Scenario::new(1e300, 1e10, 20.0, false).expect_err("preference overflows");
        assert!(err.to_string().contains("multiple"));
    }

    #[test]
    fn with_edit_replaces_only_the_named_field() {
        let original = base();
        let edited = original
            .with_edit(ScenarioEdit::Multiple(2.5))
            .expect("valid edit");

        assert_eq!(edited.multiple, 2.5);
        assert_eq!(edited.investment_amount, original.investment_amount);
        assert_eq!(edited.ownership_percentage, original.ownership_percentage);
        assert_eq!(edited.has_participation, original.has_participation);
        assert_eq!(original.multiple, 1.0);
    }

    #[test]
    fn with_edit_rejects_values_that_break_the_scenario() {
        let err = base()
            .with_edit(ScenarioEdit::InvestmentAmount(-5.0))
            .expect_err("negative investment must fail");
        assert!(matches!(
            err,
            ScenarioError::InvalidValue {
                field: "investmentAmount",
                ..
            }
        ));
    }

    #[test]
    fn scenario_key_round_trips_wire_names() {
        for key in ScenarioKey::ALL {
            assert_eq!(key.as_str().parse::<ScenarioKey>(), Ok(key));
        }
        assert_eq!(
            "angelFriendly".parse::<ScenarioKey>(),
            Err(ScenarioError::UnknownScenario("angelFriendly".to_string()))
        );
    }

    #[test]
    fn edit_from_json_checks_field_name_and_value_type() {
        assert_eq!(
            ScenarioEdit::from_json("multiple", &json!(1.5)),
            Ok(ScenarioEdit::Multiple(1.5))
        );
        assert_eq!(
            ScenarioEdit::from_json("hasParticipation", &json!(true)),
            Ok(ScenarioEdit::HasParticipation(true))
        );
        assert!(matches!(
            ScenarioEdit::from_json("valuation", &json!(1.0)),
            Err(ScenarioError::UnknownField(_))
        ));
        assert!(matches!(
            ScenarioEdit::from_json("hasParticipation", &json!(1)),
            Err(ScenarioError::InvalidValue { .. })
        ));
        assert!(matches!(
            ScenarioEdit::from_json("ownershipPercentage", &json!("20")),
            Err(ScenarioError::InvalidValue { .. })
        ));
    }

    #[test]
    fn scenario_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&base()).expect("scenario should serialize");
        assert!(json.contains("\"investmentAmount\""));
        assert!(json.contains("\"ownershipPercentage\""));
        assert!(json.contains("\"hasParticipation\""));
    }

    #[test]
    fn only_numeric_fields_have_slider_ranges() {
        let range = ScenarioField::Multiple.slider_range().expect("multiple has a slider");
        assert_eq!((range.min, range.max), (1.0, 3.0));
        assert!(ScenarioField::HasParticipation.slider_range().is_none());
    }
}
