use super::month::RefMonth;
use super::{OutOfTimeError, PickerKind, Selection, WeekPick};
use std::iter::successors;
use time::{Date, Duration, Weekday};

pub(super) const DAYS_IN_WEEK: usize = 7;

/// Number of rows shown by a day picker regardless of the month's shape
pub(super) const DAY_MODE_ROWS: usize = 6;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct CalendarCell {
    /// `None` for the blank padding cells of a week picker
    pub(crate) date: Option<Date>,
    pub(crate) is_today: bool,
    pub(crate) is_sunday: bool,
    pub(crate) other_month: bool,
}

impl CalendarCell {
    fn padding() -> CalendarCell {
        CalendarCell {
            other_month: true,
            ..CalendarCell::default()
        }
    }

    fn dated(date: Date, month: RefMonth, today: Date) -> CalendarCell {
        CalendarCell {
            date: Some(date),
            is_today: date == today,
            is_sunday: date.weekday() == Weekday::Sunday,
            other_month: !month.contains(date),
        }
    }

    pub(crate) fn day(&self) -> Option<u8> {
        self.date.map(Date::day)
    }

    fn in_month_date(&self) -> Option<Date> {
        self.date.filter(|_| !self.other_month)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct WeekRow {
    pub(crate) cells: [CalendarCell; DAYS_IN_WEEK],
    /// The week of the row's first in-month day; `None` if the row has no
    /// days of the displayed month, in which case the row cannot be selected
    pub(crate) week: Option<WeekPick>,
}

impl WeekRow {
    fn new(cells: [CalendarCell; DAYS_IN_WEEK]) -> WeekRow {
        let week = cells
            .iter()
            .find_map(CalendarCell::in_month_date)
            .map(WeekPick::of);
        WeekRow { cells, week }
    }

    pub(crate) fn is_selectable(&self) -> bool {
        self.week.is_some()
    }
}

/// Render description of one month as shown by a picker popup
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    pub(crate) kind: PickerKind,
    pub(crate) month: RefMonth,
    pub(crate) rows: Vec<WeekRow>,
}

impl MonthGrid {
    pub(crate) fn build(
        kind: PickerKind,
        month: RefMonth,
        today: Date,
    ) -> Result<MonthGrid, OutOfTimeError> {
        let rows = match kind {
            PickerKind::Week => week_rows(month, today)?,
            PickerKind::Day => day_rows(month, today)?,
        };
        Ok(MonthGrid { kind, month, rows })
    }

    pub(crate) fn cell(&self, row: usize, col: usize) -> Option<&CalendarCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// What choosing the given cell selects, if anything.  In week mode the
    /// whole row is chosen; in day mode every dated cell is choosable,
    /// including days of the neighboring months.
    pub(crate) fn selection_at(&self, row: usize, col: usize) -> Option<Selection> {
        match self.kind {
            PickerKind::Week => self.rows.get(row)?.week.map(Selection::Week),
            PickerKind::Day => self.cell(row, col)?.date.map(Selection::Day),
        }
    }

    /// Grid coordinates of `date`, if it is shown as a day of the displayed
    /// month
    pub(crate) fn position_of(&self, date: Date) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(i, row)| {
            row.cells
                .iter()
                .position(|c| c.in_month_date() == Some(date))
                .map(|j| (i, j))
        })
    }

    /// Grid coordinates of the first day of the displayed month
    pub(crate) fn first_position(&self) -> (usize, usize) {
        self.rows
            .iter()
            .enumerate()
            .find_map(|(i, row)| {
                row.cells
                    .iter()
                    .position(|c| c.in_month_date().is_some())
                    .map(|j| (i, j))
            })
            .unwrap_or_default()
    }
}

/// 1-based index of the week of its month that `date` falls in, counting the
/// week containing the 1st as week 1 no matter how many of its days belong to
/// the previous month
pub(crate) fn week_number(date: Date) -> u8 {
    let offset = (date.day() - 1) % 7;
    let first_weekday = (date.weekday().number_days_from_sunday() + 7 - offset) % 7;
    (date.day() + first_weekday).div_ceil(7)
}

// Leading blanks up to the 1st, then each day of the month, then trailing
// blanks out to the end of the last week
fn week_rows(month: RefMonth, today: Date) -> Result<Vec<WeekRow>, OutOfTimeError> {
    let first = month.first_day()?;
    let lead = usize::from(first.weekday().number_days_from_sunday());
    let slots = lead + usize::from(month.days());
    let mut rows = vec![[CalendarCell::padding(); DAYS_IN_WEEK]; slots.div_ceil(DAYS_IN_WEEK)];
    for (slot, date) in (lead..).zip(iter_days_from(first).take(usize::from(month.days()))) {
        if let Some(cell) = grid_slot(&mut rows, slot) {
            *cell = CalendarCell::dated(date, month, today);
        }
    }
    Ok(rows.into_iter().map(WeekRow::new).collect())
}

// Six full weeks starting from the Sunday on or before the 1st
fn day_rows(month: RefMonth, today: Date) -> Result<Vec<WeekRow>, OutOfTimeError> {
    let first = month.first_day()?;
    let lead = first.weekday().number_days_from_sunday();
    let start = first
        .checked_sub(Duration::days(lead.into()))
        .ok_or(OutOfTimeError)?;
    let total = DAY_MODE_ROWS * DAYS_IN_WEEK;
    let mut rows = vec![[CalendarCell::padding(); DAYS_IN_WEEK]; DAY_MODE_ROWS];
    let mut filled = 0;
    for (slot, date) in iter_days_from(start).take(total).enumerate() {
        if let Some(cell) = grid_slot(&mut rows, slot) {
            *cell = CalendarCell::dated(date, month, today);
            filled += 1;
        }
    }
    if filled < total {
        return Err(OutOfTimeError);
    }
    Ok(rows.into_iter().map(WeekRow::new).collect())
}

fn grid_slot(
    rows: &mut [[CalendarCell; DAYS_IN_WEEK]],
    slot: usize,
) -> Option<&mut CalendarCell> {
    rows.get_mut(slot / DAYS_IN_WEEK)
        .and_then(|r| r.get_mut(slot % DAYS_IN_WEEK))
}

fn iter_days_from(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day())
}
