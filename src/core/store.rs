use tracing::debug;

use super::error::Result;
use super::types::{Scenario, ScenarioEdit, ScenarioKey};

pub const FOUNDER_FRIENDLY: Scenario = Scenario {
    investment_amount: 10_000_000.0,
    multiple: 1.0,
    ownership_percentage: 15.0,
    has_participation: false,
};

pub const VC_FRIENDLY: Scenario = Scenario {
    investment_amount: 20_000_000.0,
    multiple: 2.0,
    ownership_percentage: 30.0,
    has_participation: true,
};

pub const BALANCED: Scenario = Scenario {
    investment_amount: 15_000_000.0,
    multiple: 1.5,
    ownership_percentage: 20.0,
    has_participation: false,
};

/// Starting point of the editable scenario.
pub const DEFAULT_CUSTOM: Scenario = Scenario {
    investment_amount: 10_000_000.0,
    multiple: 1.0,
    ownership_percentage: 20.0,
    has_participation: false,
};

/// Holds the selected scenario key and the live custom scenario.
///
/// Presets are constants; only the custom entry ever changes, and it is
/// replaced wholesale on each edit so readers never see a partial update.
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    active: ScenarioKey,
    custom: Scenario,
}

impl Default for ScenarioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self {
            active: ScenarioKey::Custom,
            custom: DEFAULT_CUSTOM,
        }
    }

    pub fn active_key(&self) -> ScenarioKey {
        self.active
    }

    pub fn select(&mut self, key: &str) -> Result<ScenarioKey> {
        let key = key.parse::<ScenarioKey>()?;
        self.select_key(key);
        Ok(key)
    }

    pub fn select_key(&mut self, key: ScenarioKey) {
        debug!(from = %self.active, to = %key, "scenario selected");
        self.active = key;
    }

    /// Replaces one field of the custom scenario. Does not change the selection.
    ///
    /// On error the stored custom scenario is left as it was.
    pub fn edit_custom_field(&mut self, edit: ScenarioEdit) -> Result<Scenario> {
        let next = self.custom.with_edit(edit)?;
        debug!(field = edit.field().as_str(), ?edit, "custom scenario edited");
        self.custom = next;
        Ok(next)
    }

    pub fn edit_custom_field_json(
        &mut self,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Scenario> {
        let edit = ScenarioEdit::from_json(field, value)?;
        self.edit_custom_field(edit)
    }

    pub fn custom(&self) -> Scenario {
        self.custom
    }

    pub fn scenario(&self, key: ScenarioKey) -> Scenario {
        match key {
            ScenarioKey::FounderFriendly => FOUNDER_FRIENDLY,
            ScenarioKey::VcFriendly => VC_FRIENDLY,
            ScenarioKey::Balanced => BALANCED,
            ScenarioKey::Custom => self.custom,
        }
    }

    pub fn current(&self) -> Scenario {
        self.scenario(self.active)
    }

    /// Every scenario in display order, custom last.
    pub fn entries(&self) -> Vec<(ScenarioKey, Scenario)> {
        ScenarioKey::ALL
            .into_iter()
            .map(|key| (key, self.scenario(key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ScenarioError;
    use serde_json::json;

    #[test]
    fn starts_on_custom_with_default_values() {
        let store = ScenarioStore::new();
        assert_eq!(store.active_key(), ScenarioKey::Custom);
        assert_eq!(store.current(), DEFAULT_CUSTOM);
    }

    #[test]
    fn presets_are_valid_scenarios() {
        for scenario in [FOUNDER_FRIENDLY, VC_FRIENDLY, BALANCED, DEFAULT_CUSTOM] {
            scenario.validate().expect("preset must validate");
        }
    }

    #[test]
    fn select_switches_current_to_preset() {
        let mut store = ScenarioStore::new();
        let key = store.select("vcFriendly").expect("known key");
        assert_eq!(key, ScenarioKey::VcFriendly);
        assert_eq!(store.current(), VC_FRIENDLY);
    }

    #[test]
    fn select_rejects_unknown_key_and_keeps_selection() {
        let mut store = ScenarioStore::new();
        store.select_key(ScenarioKey::Balanced);
        let err = store.select("aggressive").expect_err("unknown key");
        assert_eq!(err, ScenarioError::UnknownScenario("aggressive".to_string()));
        assert_eq!(store.active_key(), ScenarioKey::Balanced);
    }

    #[test]
    fn edit_does_not_auto_select_custom_or_touch_presets() {
        let mut store = ScenarioStore::new();
        store.select_key(ScenarioKey::FounderFriendly);
        store
            .edit_custom_field(ScenarioEdit::OwnershipPercentage(42.0))
            .expect("valid edit");

        assert_eq!(store.active_key(), ScenarioKey::FounderFriendly);
        assert_eq!(store.current(), FOUNDER_FRIENDLY);
        assert_eq!(store.custom().ownership_percentage, 42.0);
    }

    #[test]
    fn custom_edits_survive_round_trip_through_a_preset() {
        let mut store = ScenarioStore::new();
        store
            .edit_custom_field(ScenarioEdit::InvestmentAmount(35_000_000.0))
            .expect("valid edit");
        store
            .edit_custom_field(ScenarioEdit::HasParticipation(true))
            .expect("valid edit");

        store.select("balanced").expect("known key");
        assert_eq!(store.current(), BALANCED);
        store.select("custom").expect("known key");

        let current = store.current();
        assert_eq!(current.investment_amount, 35_000_000.0);
        assert!(current.has_participation);
        assert_eq!(current.multiple, DEFAULT_CUSTOM.multiple);
        assert_eq!(current.ownership_percentage, DEFAULT_CUSTOM.ownership_percentage);
    }

    #[test]
    fn rejected_edit_leaves_custom_unchanged() {
        let mut store = ScenarioStore::new();
        assert!(store
            .edit_custom_field(ScenarioEdit::Multiple(0.2))
            .is_err());
        assert_eq!(store.custom(), DEFAULT_CUSTOM);
    }

    #[test]
    fn edit_custom_field_json_rejects_unknown_field() {
        let mut store = ScenarioStore::new();
        let err = store
            .edit_custom_field_json("discountRate", &json!(0.1))
            .expect_err("unknown field");
        assert_eq!(err, ScenarioError::UnknownField("discountRate".to_string()));

        let updated = store
            .edit_custom_field_json("multiple", &json!(2.5))
            .expect("valid edit");
        assert_eq!(updated.multiple, 2.5);
    }

    #[test]
    fn entries_list_all_keys_in_display_order() {
        let store = ScenarioStore::new();
        let keys = store
            .entries()
            .into_iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        assert_eq!(keys, ScenarioKey::ALL.to_vec());
    }
}
