/// Tuning knobs for the placement engine.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Hard cap on how many bookings a single day may receive.
    pub max_daily_slots: u32,
    /// Share of `max_daily_slots` available to each priority tier,
    /// indexed by priority − 1. Keeps one tier from monopolizing a day.
    pub priority_quotas: [f64; 5],
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_daily_slots: 10,
            priority_quotas: [1.00, 0.80, 0.60, 0.50, 0.40],
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_daily_slots(mut self, max: u32) -> Self {
        self.max_daily_slots = max;
        self
    }

    pub fn with_priority_quota(mut self, priority: u8, quota: f64) -> Self {
        if let Some(slot) = usize::from(priority)
            .checked_sub(1)
            .and_then(|index| self.priority_quotas.get_mut(index))
        {
            *slot = quota;
        }
        self
    }

    /// Daily booking allowance for a priority tier, in (fractional) slots.
    pub fn daily_quota(&self, priority: u8) -> f64 {
        let share = usize::from(priority)
            .checked_sub(1)
            .and_then(|index| self.priority_quotas.get(index))
            .copied()
            .unwrap_or(0.1);
        f64::from(self.max_daily_slots) * share
    }
}
