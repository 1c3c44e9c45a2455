use crate::ledger::Ledger;
use crate::models::period::{PeriodMode, WeekKey};
use uuid::Uuid;

/// One run of the program: its ledger and the current display mode.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub ledger: Ledger,
    pub mode: PeriodMode,
}

impl Session {
    pub fn new(mode: PeriodMode, week_key: WeekKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            ledger: Ledger::with_week_key(week_key),
            mode,
        }
    }

    pub fn set_mode(&mut self, mode: PeriodMode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "switched display mode");
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> PeriodMode {
        self.set_mode(self.mode.toggle());
        self.mode
    }
}
