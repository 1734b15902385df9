//! Calendar breakdown of Unix time
//!
//! Proleptic Gregorian calendar, UTC plus whatever offset the caller has
//! already applied. No time zone database.

use core::fmt::{self, Write};

use heapless::String;

use super::UnixTime;

const SECS_PER_DAY: u64 = 86_400;

/// Longest formatted line ("Wednesday, September 30 2026 23:59:59" is 37)
pub const MAX_LINE_LEN: usize = 48;

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Full English name
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

/// Month of the year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Full English name
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Month number, 1..=12
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Broken-down calendar time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u32,
    pub month: Month,
    /// Day of the month, 1..=31
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
}

impl DateTime {
    /// Break a Unix timestamp into calendar fields
    pub fn from_unix(time: UnixTime) -> Self {
        let secs = time.as_secs();
        let days = secs / SECS_PER_DAY;
        let rem = secs % SECS_PER_DAY;

        // Days-to-civil over 400-year eras, with years starting in March
        let z = days + 719_468;
        let era = z / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 2 } else { mp - 10 };
        let year = yoe + era * 400 + u64::from(month <= 1);

        Self {
            year: year as u32,
            month: Month::ALL[month as usize],
            day: day as u8,
            hour: (rem / 3600) as u8,
            minute: (rem / 60 % 60) as u8,
            second: (rem % 60) as u8,
            // 1970-01-01 was a Thursday
            weekday: Weekday::ALL[((days + 4) % 7) as usize],
        }
    }

    /// Format as "Sunday, October 18 2026 14:03:07"
    pub fn to_line(&self) -> String<MAX_LINE_LEN> {
        let mut line = String::new();
        // Cannot overflow for any year representable in u32
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {:02} {} {:02}:{:02}:{:02}",
            self.weekday.name(),
            self.month.name(),
            self.day,
            self.year,
            self.hour,
            self.minute,
            self.second
        )
    }
}
