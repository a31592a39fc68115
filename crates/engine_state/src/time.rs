//! The game clock.
//!
//! `total_minutes` since [`EPOCH_YEAR`]-01-01 00:00 is the source of truth.
//! The calendar fields are a cache recomputed whenever the clock moves, so
//! systems can read the date without doing calendar math every tick.

use serde::Serialize;

/// Year of the simulation epoch (January 1st, 00:00).
pub const EPOCH_YEAR: i32 = 2001;

pub const MINUTES_PER_HOUR: i64 = 60;
pub const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Days from 1970-01-01 to the epoch.
const EPOCH_UNIX_DAYS: i64 = 11_323;

pub const MIN_SPEED_LEVEL: u8 = 1;
pub const MAX_SPEED_LEVEL: u8 = 5;

/// A calendar date and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CalendarDate {
    /// The date `total_minutes` after the epoch.
    #[must_use]
    pub fn from_minutes(total_minutes: i64) -> Self {
        let days = total_minutes.div_euclid(MINUTES_PER_DAY);
        let minute_of_day = total_minutes.rem_euclid(MINUTES_PER_DAY);
        let (year, month, day) = civil_from_days(days + EPOCH_UNIX_DAYS);
        Self {
            year,
            month,
            day,
            hour: (minute_of_day / MINUTES_PER_HOUR) as u32,
            minute: (minute_of_day % MINUTES_PER_HOUR) as u32,
        }
    }
}

impl CalendarDate {
    /// Whole days from the epoch to this date.
    #[must_use]
    pub fn days_since_epoch(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day) - EPOCH_UNIX_DAYS
    }
}

/// Days since 1970-01-01 for a Gregorian date.
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let m = i64::from(month);
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Gregorian date from days since 1970-01-01 (Howard Hinnant's algorithm).
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month, day)
}

/// Simulation time, speed and pause state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeComponent {
    total_minutes: i64,
    date: CalendarDate,
    speed_level: u8,
    is_paused: bool,
    /// Real seconds not yet converted into game minutes.
    accumulator: f64,
}

impl Default for TimeComponent {
    fn default() -> Self {
        Self {
            total_minutes: 0,
            date: CalendarDate::from_minutes(0),
            speed_level: MIN_SPEED_LEVEL,
            is_paused: false,
            accumulator: 0.0,
        }
    }
}

impl TimeComponent {
    /// Clock at the epoch, speed 1, running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minutes elapsed since the epoch.
    #[must_use]
    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    /// Cached calendar view of [`TimeComponent::total_minutes`].
    #[must_use]
    pub fn date(&self) -> CalendarDate {
        self.date
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year
    }

    /// Month, 1-12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.date.month
    }

    /// Day of the month, from 1.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.date.day
    }

    /// Hour of the day, 0-23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.date.hour
    }

    /// Minute of the hour, 0-59.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.date.minute
    }

    /// Whole days elapsed since the epoch.
    #[must_use]
    pub fn days_elapsed(&self) -> i64 {
        self.total_minutes.div_euclid(MINUTES_PER_DAY)
    }

    /// `YYYY-MM-DD HH:MM`, for display.
    #[must_use]
    pub fn date_string(&self) -> String {
        let d = self.date;
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}",
            d.year, d.month, d.day, d.hour, d.minute
        )
    }

    /// Current speed level, 1-5.
    #[must_use]
    pub fn speed_level(&self) -> u8 {
        self.speed_level
    }

    /// Set the speed level, clamped to 1–5.
    pub fn set_speed_level(&mut self, level: i64) {
        self.speed_level =
            level.clamp(i64::from(MIN_SPEED_LEVEL), i64::from(MAX_SPEED_LEVEL)) as u8;
    }

    /// Whether the clock is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Pause or resume the clock.
    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    /// Real seconds carried over that do not yet make a whole game minute.
    #[must_use]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Add `seconds` of real time and take out as many whole game minutes as
    /// fit when one game day lasts `seconds_per_day`. The remainder stays
    /// accumulated. The clock itself is not moved; see
    /// [`TimeComponent::advance_minutes`].
    pub fn accumulate(&mut self, seconds: f64, seconds_per_day: f64) -> i64 {
        self.accumulator += seconds;
        if seconds_per_day <= 0.0 {
            return 0;
        }
        let per_day = MINUTES_PER_DAY as f64;
        let minutes = (self.accumulator * per_day / seconds_per_day).floor();
        if minutes < 1.0 {
            return 0;
        }
        self.accumulator -= minutes * seconds_per_day / per_day;
        // Rounding can leave a hair below zero.
        self.accumulator = self.accumulator.max(0.0);
        minutes as i64
    }

    /// Move the clock forward and refresh the cached calendar fields.
    pub fn advance_minutes(&mut self, minutes: i64) {
        if minutes <= 0 {
            return;
        }
        self.total_minutes += minutes;
        self.date = CalendarDate::from_minutes(self.total_minutes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch() {
        let time = TimeComponent::new();
        assert_eq!(time.date_string(), "2001-01-01 00:00");
        assert_eq!(time.speed_level(), 1);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_advance_across_month_and_year() {
        let mut time = TimeComponent::new();
        time.advance_minutes(31 * MINUTES_PER_DAY + 90);
        assert_eq!(time.date_string(), "2001-02-01 01:30");

        let mut time = TimeComponent::new();
        time.advance_minutes(365 * MINUTES_PER_DAY);
        assert_eq!(time.date_string(), "2002-01-01 00:00");
        assert_eq!(time.days_elapsed(), 365);
    }

    #[test]
    fn test_leap_day() {
        // 2004 is a leap year: 2001..=2003 are 3 * 365 days.
        let feb_29 = (3 * 365 + 31 + 28) * MINUTES_PER_DAY;
        let date = CalendarDate::from_minutes(feb_29);
        assert_eq!((date.year, date.month, date.day), (2004, 2, 29));
    }

    #[test]
    fn test_days_since_epoch_inverts_from_minutes() {
        for days in [0, 30, 59, 365, 1154, 4000] {
            let date = CalendarDate::from_minutes(days * MINUTES_PER_DAY + 17);
            assert_eq!(date.days_since_epoch(), days);
        }
    }

    #[test]
    fn test_speed_clamped() {
        let mut time = TimeComponent::new();
        time.set_speed_level(9);
        assert_eq!(time.speed_level(), 5);
        time.set_speed_level(-3);
        assert_eq!(time.speed_level(), 1);
    }

    #[test]
    fn test_accumulate_keeps_remainder() {
        let mut time = TimeComponent::new();
        // One real second per game minute.
        assert_eq!(time.accumulate(0.5, 1440.0), 0);
        assert_eq!(time.accumulate(2.0, 1440.0), 2);
        assert!((time.accumulator() - 0.5).abs() < 1e-9);
        assert_eq!(time.total_minutes(), 0);
    }
}
