mod board;
mod grid;
mod month;
mod placement;
mod popup;
pub(crate) use self::board::Board;
pub(crate) use self::placement::Margins;
pub(crate) use self::popup::{CursorMove, Popup};
use self::grid::week_number;
use std::fmt;
use thiserror::Error;
use time::Date;

/// The two widget families.  At most one popup of each family is open at a
/// time.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum PickerKind {
    Day,
    Week,
}

/// A week of a month as reported to a week picker's callback
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct WeekPick {
    pub(crate) year: i32,
    /// 1 through 12
    pub(crate) month: u8,
    /// 1-based; week 1 is the week containing the first of the month
    pub(crate) week: u8,
}

impl WeekPick {
    pub(crate) fn of(date: Date) -> WeekPick {
        WeekPick {
            year: date.year(),
            month: date.month().into(),
            week: week_number(date),
        }
    }
}

impl fmt::Display for WeekPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02} week {}", self.year, self.month, self.week)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Selection {
    Day(Date),
    Week(WeekPick),
}

impl Selection {
    pub(crate) fn kind(&self) -> PickerKind {
        match self {
            Selection::Day(_) => PickerKind::Day,
            Selection::Week(_) => PickerKind::Week,
        }
    }
}

/// Format a date the way day pickers report it: `YYYY-MM-DD`
pub(crate) fn ymd(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;
