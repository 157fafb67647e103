//! Shift clock: maps wall-clock time to the shift occurrence that scans
//! are grouped and deduplicated by.
//!
//! | hours        | shift       | shift date |
//! |--------------|-------------|------------|
//! | 06:00–13:59  | `Day`       | today      |
//! | 14:00–21:59  | `Afternoon` | today      |
//! | 22:00–23:59  | `Night`     | today      |
//! | 00:00–05:59  | `Night`     | yesterday  |
//!
//! The night shift that starts at 22:00 stays open past midnight, so the
//! early-morning hours belong to the previous calendar date.

use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

const DAY_START: u32 = 6;
const AFTERNOON_START: u32 = 14;
const NIGHT_START: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Day,
    Afternoon,
    Night,
}

impl Shift {
    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Shift::Day => "DAY",
            Shift::Afternoon => "AFTERNOON",
            Shift::Night => "NIGHT",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A specific `(shift, shift_date)` pair. The unit of deduplication for
/// inventory scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftOccurrence {
    pub shift: Shift,
    /// Calendar date the occurrence belongs to (time truncated).
    pub date: NaiveDate,
}

impl ShiftOccurrence {
    /// Compute the occurrence active at the given local time.
    pub fn at(now: NaiveDateTime) -> Self {
        let today = now.date();
        let hour = now.hour();

        let (shift, date) = if (DAY_START..AFTERNOON_START).contains(&hour) {
            (Shift::Day, today)
        } else if (AFTERNOON_START..NIGHT_START).contains(&hour) {
            (Shift::Afternoon, today)
        } else if hour >= NIGHT_START {
            (Shift::Night, today)
        } else {
            (Shift::Night, today.pred_opt().unwrap_or(today))
        };

        Self { shift, date }
    }
}

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn current_occurrence(&self) -> ShiftOccurrence {
        ShiftOccurrence::at(self.now())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Reads the host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Used to drive shift boundaries
/// deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, minute, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn day_hours_map_to_day_today() {
        for hour in 6..14 {
            let occ = ShiftOccurrence::at(at(today(), hour, 30));
            assert_eq!(occ.shift, Shift::Day, "hour {hour}");
            assert_eq!(occ.date, today(), "hour {hour}");
        }
    }

    #[test]
    fn afternoon_hours_map_to_afternoon_today() {
        for hour in 14..22 {
            let occ = ShiftOccurrence::at(at(today(), hour, 0));
            assert_eq!(occ.shift, Shift::Afternoon, "hour {hour}");
            assert_eq!(occ.date, today(), "hour {hour}");
        }
    }

    #[test]
    fn late_evening_is_night_today() {
        for hour in 22..24 {
            let occ = ShiftOccurrence::at(at(today(), hour, 59));
            assert_eq!(occ.shift, Shift::Night, "hour {hour}");
            assert_eq!(occ.date, today(), "hour {hour}");
        }
    }

    #[test]
    fn early_morning_belongs_to_previous_night() {
        // Crosses a month boundary: March 1st early morning is Feb 28th's night.
        let yesterday = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        for hour in 0..6 {
            let occ = ShiftOccurrence::at(at(today(), hour, 15));
            assert_eq!(occ.shift, Shift::Night, "hour {hour}");
            assert_eq!(occ.date, yesterday, "hour {hour}");
        }
    }

    #[test]
    fn boundaries_are_exclusive_at_the_top() {
        assert_eq!(ShiftOccurrence::at(at(today(), 13, 59)).shift, Shift::Day);
        assert_eq!(
            ShiftOccurrence::at(at(today(), 14, 0)).shift,
            Shift::Afternoon
        );
        assert_eq!(
            ShiftOccurrence::at(at(today(), 21, 59)).shift,
            Shift::Afternoon
        );
        assert_eq!(ShiftOccurrence::at(at(today(), 22, 0)).shift, Shift::Night);
        assert_eq!(ShiftOccurrence::at(at(today(), 5, 59)).shift, Shift::Night);
        assert_eq!(ShiftOccurrence::at(at(today(), 6, 0)).shift, Shift::Day);
    }

    #[test]
    fn night_spans_midnight_as_one_occurrence() {
        let before = ShiftOccurrence::at(at(today(), 23, 30));
        let after = ShiftOccurrence::at(at(today().succ_opt().unwrap(), 1, 0));
        assert_eq!(before, after);
    }

    #[test]
    fn manual_clock_moves_across_boundaries() {
        let clock = ManualClock::new(at(today(), 21, 0));
        assert_eq!(clock.current_occurrence().shift, Shift::Afternoon);

        clock.advance(TimeDelta::hours(1));
        assert_eq!(clock.current_occurrence().shift, Shift::Night);

        clock.set(at(today(), 7, 0));
        assert_eq!(clock.current_occurrence().shift, Shift::Day);
    }

    #[test]
    fn shift_labels() {
        assert_eq!(Shift::Day.to_string(), "DAY");
        assert_eq!(Shift::Afternoon.to_string(), "AFTERNOON");
        assert_eq!(Shift::Night.to_string(), "NIGHT");
    }
}
