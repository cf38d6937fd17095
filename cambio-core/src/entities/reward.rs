/// Whether the reward interaction has been completed for this checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardState {
    pub earned: bool,
}

impl RewardState {
    pub const EARNED: Self = Self { earned: true };
}
