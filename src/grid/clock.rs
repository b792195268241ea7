//! Simulation clock over a 7-day week with hourly resolution.

use serde::{Deserialize, Serialize};

/// Number of days in the simulated week.
pub const DAYS_PER_WEEK: u8 = 7;
/// Number of hours per simulated day.
pub const HOURS_PER_DAY: u8 = 24;

/// A day/hour clock driving which (day, hour) snapshot the grid operates on.
///
/// Days run 1-7 and hours 0-23. Advancing past hour 23 rolls over to hour 0
/// of the next day, and past day 7 back to day 1.
///
/// # Examples
///
/// ```
/// use microgrid_sim::grid::SimClock;
///
/// let mut clock = SimClock::new(7, 23);
/// clock.advance();
/// assert_eq!((clock.day, clock.hour), (1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimClock {
    /// Current day (1-7).
    pub day: u8,
    /// Current hour (0-23).
    pub hour: u8,
    /// Whether the simulation auto-advances.
    pub is_running: bool,
}

impl SimClock {
    /// Creates a clock at the given day and hour.
    ///
    /// # Panics
    ///
    /// Panics if `day` is outside 1-7 or `hour` outside 0-23.
    pub fn new(day: u8, hour: u8) -> Self {
        assert!((1..=DAYS_PER_WEEK).contains(&day), "day must be 1-7");
        assert!(hour < HOURS_PER_DAY, "hour must be 0-23");
        Self {
            day,
            hour,
            is_running: false,
        }
    }

    /// Advances the clock by one hour, wrapping hour 24 to 0 and day 8 to 1.
    pub fn advance(&mut self) {
        self.hour += 1;
        if self.hour == HOURS_PER_DAY {
            self.hour = 0;
            self.day += 1;
            if self.day > DAYS_PER_WEEK {
                self.day = 1;
            }
        }
    }

    /// The (day, hour) slot `offset` hours ahead of the current one.
    ///
    /// The forecast day is not wrapped past 7: a forecast reaching beyond the
    /// simulated week simply points at a day with no stored data.
    pub fn forecast_slot(&self, offset: u8) -> (u8, u8) {
        let total = self.hour as u32 + offset as u32;
        let hour = (total % HOURS_PER_DAY as u32) as u8;
        let day = self.day + (total / HOURS_PER_DAY as u32) as u8;
        (day, hour)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_within_day() {
        let mut clock = SimClock::new(2, 10);
        clock.advance();
        assert_eq!((clock.day, clock.hour), (2, 11));
    }

    #[test]
    fn advance_wraps_hour_into_next_day() {
        let mut clock = SimClock::new(3, 23);
        clock.advance();
        assert_eq!((clock.day, clock.hour), (4, 0));
    }

    #[test]
    fn advance_wraps_week() {
        let mut clock = SimClock::new(7, 23);
        clock.advance();
        assert_eq!((clock.day, clock.hour), (1, 0));
    }

    #[test]
    fn forecast_slot_same_day() {
        let clock = SimClock::new(1, 8);
        assert_eq!(clock.forecast_slot(1), (1, 9));
        assert_eq!(clock.forecast_slot(6), (1, 14));
    }

    #[test]
    fn forecast_slot_crosses_midnight_without_week_wrap() {
        let clock = SimClock::new(7, 22);
        assert_eq!(clock.forecast_slot(3), (8, 1));
    }

    #[test]
    #[should_panic]
    fn day_zero_panics() {
        SimClock::new(0, 0);
    }

    #[test]
    #[should_panic]
    fn hour_out_of_range_panics() {
        SimClock::new(1, 24);
    }
}
