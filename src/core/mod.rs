mod engine;
mod error;
mod format;
mod store;
mod types;

pub use engine::{
    EXIT_RANGE_INVESTMENT_MULTIPLE, MIN_EXIT_RANGE, SAMPLE_INTERVALS, compute_payout,
    max_exit_value, max_payout_value, sample, try_compute_payout, try_sample,
};
pub use error::{Result, ScenarioError};
pub use format::{ScenarioSummary, format_currency};
pub use store::{BALANCED, DEFAULT_CUSTOM, FOUNDER_FRIENDLY, ScenarioStore, VC_FRIENDLY};
pub use types::{
    Payout, SamplePoint, Scenario, ScenarioEdit, ScenarioField, ScenarioKey, SliderRange,
};
