use crate::revolving::PaymentPolicy;

/// Default cap on simulated revolving months (100 years).
pub const DEFAULT_MAX_REVOLVING_MONTHS: u32 = 1200;

/// Default repayment timeline horizon (30 years).
pub const DEFAULT_TIMELINE_HORIZON_MONTHS: u32 = 360;

/// Tunables shared by every evaluation.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Minimum-payment rule for revolving debts that do not carry their own.
    pub revolving_policy: PaymentPolicy,
    pub max_revolving_months: u32,
    pub timeline_horizon_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            revolving_policy: PaymentPolicy::default(),
            max_revolving_months: DEFAULT_MAX_REVOLVING_MONTHS,
            timeline_horizon_months: DEFAULT_TIMELINE_HORIZON_MONTHS,
        }
    }
}

impl EngineConfig {
    pub fn with_revolving_policy(mut self, policy: PaymentPolicy) -> Self {
        self.revolving_policy = policy;
        self
    }

    pub fn with_max_revolving_months(mut self, months: u32) -> Self {
        self.max_revolving_months = months;
        self
    }

    pub fn with_timeline_horizon(mut self, months: u32) -> Self {
        self.timeline_horizon_months = months;
        self
    }
}
