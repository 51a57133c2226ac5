//! Neglect penalty: too long without any player input costs trust and bond.
//!
//! Time here is the engine's own elapsed-milliseconds counter, advanced by
//! frames, so tests drive it without a wall clock.

use crate::{
    config::{InactivityConfig, StatKind},
    event::SimEvent,
    subject::Subject,
    types::Turn,
};

#[derive(Debug, Clone, Default)]
pub struct InactivityMonitor {
    last_input_ms: f64,
}

impl InactivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any player input resets the idle timer.
    pub fn register_input(&mut self, now_ms: f64) {
        self.last_input_ms = now_ms;
    }

    pub fn idle_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.last_input_ms).max(0.0)
    }

    /// Apply the neglect penalty once the threshold is exceeded, then
    /// restart the timer.
    pub fn poll(
        &mut self,
        now_ms:  f64,
        subject: &mut Subject,
        rules:   &InactivityConfig,
        turn:    Turn,
    ) -> Option<SimEvent> {
        if self.idle_ms(now_ms) <= rules.threshold_ms {
            return None;
        }
        subject.add(StatKind::Trust, -rules.trust_penalty);
        subject.add(StatKind::Bond, -rules.bond_penalty);
        subject.add(StatKind::MentalHealth, -rules.mental_health_penalty);
        subject.add(StatKind::Anxiety, rules.anxiety_penalty);
        self.last_input_ms = now_ms;
        log::info!("turn={turn} neglect penalty applied after {:.0} ms idle", rules.threshold_ms);
        Some(SimEvent::Neglected { turn })
    }
}
