//! Simulation clock — owns tick/turn state, pause, and the in-game calendar.
//!
//! Two scales run side by side: frames produce a fractional `dt` for
//! progressive drift (see `engine.rs`), while ticks are counted here and
//! roll over into turns every `ticks_per_turn`.

use crate::types::{Tick, Turn};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Turn 0 falls on this date (a Monday).
pub const EPOCH: (i32, u32, u32) = (2025, 1, 6);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub turn:           Turn,
    /// Ticks elapsed inside the current turn.
    pub tick_in_turn:   u32,
    /// Ticks elapsed since the session started.
    pub total_ticks:    Tick,
    pub ticks_per_turn: u32,
    pub paused:         bool,
}

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub tick:          Tick,
    pub turn:          Turn,
    pub turn_boundary: bool,
}

impl SimClock {
    pub fn new(ticks_per_turn: u32) -> Self {
        Self {
            turn: 0,
            tick_in_turn: 0,
            total_ticks: 0,
            ticks_per_turn: ticks_per_turn.max(1),
            paused: false,
        }
    }

    /// Advance one tick. Rolls into the next turn when the sub-turn
    /// counter reaches `ticks_per_turn`.
    /// Panics if called while paused — callers must check.
    pub fn advance_tick(&mut self) -> TickOutcome {
        assert!(!self.paused, "advance_tick() called on paused clock");
        self.total_ticks += 1;
        self.tick_in_turn += 1;
        let turn_boundary = self.tick_in_turn >= self.ticks_per_turn;
        if turn_boundary {
            self.turn += 1;
            self.tick_in_turn = 0;
        }
        TickOutcome { tick: self.total_ticks, turn: self.turn, turn_boundary }
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn date(&self) -> GameDate {
        GameDate::for_turn(self.turn)
    }
}

/// Calendar view of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDate {
    /// 1-based day counter (turn + 1).
    pub day:          u64,
    /// ISO weekday number: Monday = 1 … Sunday = 7.
    pub weekday:      u32,
    pub weekday_name: String,
    /// Day of the month, 1..=31.
    pub date:         u32,
    pub month:        u32,
    pub year:         i32,
}

impl GameDate {
    pub fn for_turn(turn: Turn) -> Self {
        let (y, m, d) = EPOCH;
        let epoch = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let today = epoch
            .checked_add_signed(Duration::days(turn as i64))
            .unwrap_or(NaiveDate::MAX);
        let weekday = today.weekday();
        Self {
            day:          turn + 1,
            weekday:      weekday.number_from_monday(),
            weekday_name: weekday_name(weekday).to_string(),
            date:         today.day(),
            month:        today.month(),
            year:         today.year(),
        }
    }

    /// Saturday and Sunday are the only non-workdays.
    pub fn is_workday(&self) -> bool {
        (1..=5).contains(&self.weekday)
    }

    pub fn label(&self) -> String {
        format!("Day {} ({})", self.day, self.weekday_name)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_rolls_over_after_configured_ticks() {
        let mut clock = SimClock::new(3);
        assert!(!clock.advance_tick().turn_boundary);
        assert!(!clock.advance_tick().turn_boundary);
        let third = clock.advance_tick();
        assert!(third.turn_boundary);
        assert_eq!(third.turn, 1);
        assert_eq!(clock.tick_in_turn, 0);
        assert_eq!(clock.total_ticks, 3);
    }

    #[test]
    fn epoch_is_a_monday_and_weekends_are_not_workdays() {
        let monday = GameDate::for_turn(0);
        assert_eq!(monday.weekday, 1);
        assert_eq!(monday.label(), "Day 1 (Monday)");
        assert!(monday.is_workday());

        let saturday = GameDate::for_turn(5);
        assert_eq!(saturday.weekday, 6);
        assert!(!saturday.is_workday());
        assert!(!GameDate::for_turn(6).is_workday());
        assert!(GameDate::for_turn(7).is_workday());
    }

    #[test]
    fn calendar_date_rolls_into_next_month() {
        // 2025-01-06 + 26 days = 2025-02-01
        let first_of_feb = GameDate::for_turn(26);
        assert_eq!((first_of_feb.month, first_of_feb.date), (2, 1));
    }
}
