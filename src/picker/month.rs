use super::OutOfTimeError;
use std::fmt;
use time::{Date, Month};

/// The year & month that a picker's grid currently displays
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct RefMonth {
    year: i32,
    month: Month,
}

impl RefMonth {
    pub(crate) fn new(year: i32, month: Month) -> RefMonth {
        RefMonth { year, month }
    }

    pub(crate) fn of(date: Date) -> RefMonth {
        RefMonth::new(date.year(), date.month())
    }

    /// Normalize a 1-based month number that may lie outside `1..=12`,
    /// carrying whole years into `year`.  Month 13 becomes January of the
    /// following year, and month 0 becomes December of the previous year.
    pub(crate) fn normalized(year: i32, month: i64) -> RefMonth {
        RefMonth::from_total((i64::from(year) * 12).saturating_add(month.saturating_sub(1)))
    }

    /// Move `delta` months forwards (or backwards, if negative)
    pub(crate) fn offset(self, delta: i32) -> RefMonth {
        RefMonth::normalized(self.year, i64::from(self.number()) + i64::from(delta))
    }

    /// The month as a number from 1 to 12
    pub(crate) fn number(self) -> u8 {
        self.month.into()
    }

    pub(crate) fn days(self) -> u8 {
        self.month.length(self.year)
    }

    pub(crate) fn first_day(self) -> Result<Date, OutOfTimeError> {
        Date::from_calendar_date(self.year, self.month, 1).map_err(|_| OutOfTimeError)
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    // `total` counts months since January of year 0
    fn from_total(total: i64) -> RefMonth {
        let year = total.div_euclid(12);
        let year = i32::try_from(year).unwrap_or(if year < 0 { i32::MIN } else { i32::MAX });
        let month = u8::try_from(total.rem_euclid(12)).unwrap_or_default();
        RefMonth::new(year, Month::January.nth_next(month))
    }
}

impl fmt::Display for RefMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.year, self.number())
    }
}
