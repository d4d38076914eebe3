use super::grid::{CalendarCell, MonthGrid, DAYS_IN_WEEK};
use super::placement::{place, Margins, Opening, Placement};
use super::{PickerKind, Selection};
use crate::theme::popup::{
    CURSOR_STYLE, NAV_STYLE, OTHER_MONTH_STYLE, POPUP_STYLE, SUNDAY_STYLE, TITLE_STYLE,
    TODAY_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Margin, Position, Rect, Size},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Clear, StatefulWidget, Widget},
};
use time::Date;

static WEEKDAYS: [&str; DAYS_IN_WEEK] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Number of columns per day of week
const CELL_WIDTH: u16 = 3;

/// Width of the popup's interior, i.e., not counting the border
const INNER_WIDTH: u16 = CELL_WIDTH * 7;

const POPUP_WIDTH: u16 = INNER_WIDTH + 2;

/// Lines above the first week inside the border: the navigation line and the
/// weekday header
const HEADER_LINES: u16 = 2;

/// Lines taken up by everything but the weeks
const CHROME_LINES: u16 = HEADER_LINES + 2;

const PREV_LABEL: &str = " ‹ ";
const NEXT_LABEL: &str = " › ";

/// What a click inside an open popup landed on
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PopupHit {
    Previous,
    Next,
    Cell { row: usize, col: usize },
    /// Border, title, weekday header, and other inert parts of the popup
    Inside,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CursorMove {
    Left,
    Right,
    Up,
    Down,
}

/// An open popup: the grid it shows, where it is, and the keyboard cursor
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PopupView {
    grid: MonthGrid,
    placement: Placement,
    cursor: (usize, usize),
}

impl PopupView {
    /// Lay out a freshly built grid next to `anchor`.  Placement has to wait
    /// until the grid exists because the popup's height depends on its
    /// number of weeks.
    pub(crate) fn new(grid: MonthGrid, anchor: Rect, margins: Margins, today: Date) -> PopupView {
        let cursor = grid
            .position_of(today)
            .unwrap_or_else(|| grid.first_position());
        let placement = place(anchor, popup_size(&grid), margins);
        PopupView {
            grid,
            placement,
            cursor,
        }
    }

    /// Replace the grid after navigating to another month, keeping the
    /// popup at the same anchor
    pub(crate) fn rerender(&mut self, grid: MonthGrid, anchor: Rect, margins: Margins) {
        self.cursor = grid.first_position();
        self.grid = grid;
        self.relocate(anchor, margins);
    }

    pub(crate) fn relocate(&mut self, anchor: Rect, margins: Margins) {
        self.placement = place(anchor, popup_size(&self.grid), margins);
    }

    pub(crate) fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub(crate) fn area(&self) -> Rect {
        self.placement.area
    }

    pub(crate) fn selection_at_cursor(&self) -> Option<Selection> {
        self.grid.selection_at(self.cursor.0, self.cursor.1)
    }

    /// Returns `false` if the cursor could not move in the given direction
    pub(crate) fn move_cursor(&mut self, mv: CursorMove) -> bool {
        let (row, col) = self.cursor;
        let moved = match (mv, self.grid.kind) {
            (CursorMove::Up, _) => row.checked_sub(1).map(|r| (r, col)),
            (CursorMove::Down, _) => Some(row + 1)
                .filter(|&r| r < self.grid.rows.len())
                .map(|r| (r, col)),
            (CursorMove::Left | CursorMove::Right, PickerKind::Week) => None,
            (CursorMove::Left, PickerKind::Day) => col.checked_sub(1).map(|c| (row, c)),
            (CursorMove::Right, PickerKind::Day) => Some(col + 1)
                .filter(|&c| c < DAYS_IN_WEEK)
                .map(|c| (row, c)),
        };
        match moved {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    pub(crate) fn hit(&self, pos: Position) -> Option<PopupHit> {
        let area = self.placement.area;
        if !area.contains(pos) {
            return None;
        }
        let inner = area.inner(Margin::new(1, 1));
        if !inner.contains(pos) {
            return Some(PopupHit::Inside);
        }
        let x = pos.x - inner.x;
        let y = pos.y - inner.y;
        let hit = if y == 0 {
            if x < CELL_WIDTH {
                PopupHit::Previous
            } else if x >= INNER_WIDTH - CELL_WIDTH {
                PopupHit::Next
            } else {
                PopupHit::Inside
            }
        } else if let Some(row) = y.checked_sub(HEADER_LINES) {
            PopupHit::Cell {
                row: usize::from(row),
                col: usize::from(x / CELL_WIDTH),
            }
        } else {
            PopupHit::Inside
        };
        Some(hit)
    }
}

fn popup_size(grid: &MonthGrid) -> Size {
    let weeks = u16::try_from(grid.rows.len()).unwrap_or(u16::MAX);
    Size::new(POPUP_WIDTH, CHROME_LINES.saturating_add(weeks))
}

/// Renders a [`PopupView`] at the position it was placed at.  The `area`
/// passed to `render()` is the whole screen, to which drawing is clipped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Popup;

impl StatefulWidget for Popup {
    type State = PopupView;

    /*
     * ┌─────── Week ────────┐
     * │ ‹     2025.10     › │
     * │ Su Mo Tu We Th Fr Sa│
     * │           1  2  3  4│
     * │  5  6  7  8  9 10 11│
     * │ ...                 │
     * └─────────────────▾───┘
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let outer = state.placement.area;
        let clip = outer.intersection(area);
        if clip.is_empty() {
            return;
        }
        Clear.render(clip, buf);
        let title = match state.grid.kind {
            PickerKind::Day => " Day ",
            PickerKind::Week => " Week ",
        };
        let mut block = Block::new()
            .borders(visible_borders(outer, clip))
            .style(POPUP_STYLE);
        if clip.y == outer.y {
            block = block
                .title(title)
                .title_alignment(Alignment::Center)
                .title_style(TITLE_STYLE);
        }
        block.render(clip, buf);
        let mut canvas = PopupCanvas {
            origin: outer,
            clip,
            buf,
        };
        canvas.draw_notch(state.placement.opening);
        canvas.draw_nav(&state.grid.month.to_string());
        canvas.draw_weekdays();
        for (i, row) in state.grid.rows.iter().enumerate() {
            let is_cursor_row = i == state.cursor.0;
            if is_cursor_row && state.grid.kind == PickerKind::Week && row.is_selectable() {
                canvas.fill_row(i, CURSOR_STYLE);
            }
            for (j, cell) in row.cells.iter().enumerate() {
                let mut style = cell_style(cell);
                if is_cursor_row && (state.grid.kind == PickerKind::Week || j == state.cursor.1) {
                    style = style.patch(CURSOR_STYLE);
                }
                canvas.draw_cell(i, j, cell, style);
            }
        }
    }
}

// Only the sides of the popup that are onscreen get a border
fn visible_borders(outer: Rect, clip: Rect) -> Borders {
    let mut borders = Borders::NONE;
    if clip.y == outer.y {
        borders |= Borders::TOP;
    }
    if clip.bottom() == outer.bottom() {
        borders |= Borders::BOTTOM;
    }
    if clip.x == outer.x {
        borders |= Borders::LEFT;
    }
    if clip.right() == outer.right() {
        borders |= Borders::RIGHT;
    }
    borders
}

fn cell_style(cell: &CalendarCell) -> Style {
    let mut style = POPUP_STYLE;
    if cell.other_month {
        style = style.patch(OTHER_MONTH_STYLE);
    } else if cell.is_sunday {
        style = style.patch(SUNDAY_STYLE);
    }
    if cell.is_today {
        style = style.patch(TODAY_STYLE);
    }
    style
}

#[derive(Debug)]
struct PopupCanvas<'a> {
    /// The popup's full area, including any part of it that is offscreen
    origin: Rect,
    /// The visible portion of `origin`
    clip: Rect,
    buf: &'a mut Buffer,
}

impl PopupCanvas<'_> {
    fn draw_notch(&mut self, opening: Opening) {
        // Point at the trigger, which is right-aligned with the popup
        let x = self.origin.width.saturating_sub(CELL_WIDTH + 1);
        match opening {
            Opening::Upwards => {
                let y = self.origin.height.saturating_sub(1);
                self.print(y, x, "▾", POPUP_STYLE);
            }
            Opening::Downwards => self.print(0, x, "▴", POPUP_STYLE),
        }
    }

    fn draw_nav(&mut self, title: &str) {
        self.print(1, 1, PREV_LABEL, NAV_STYLE);
        let width = u16::try_from(title.chars().count()).unwrap_or(INNER_WIDTH);
        self.print(1, 1 + INNER_WIDTH.saturating_sub(width) / 2, title, TITLE_STYLE);
        self.print(1, 1 + INNER_WIDTH - CELL_WIDTH, NEXT_LABEL, NAV_STYLE);
    }

    fn draw_weekdays(&mut self) {
        for (x, label) in std::iter::zip((1..).step_by(CELL_WIDTH.into()), WEEKDAYS) {
            let style = if label == "Su" {
                POPUP_STYLE.patch(SUNDAY_STYLE)
            } else {
                POPUP_STYLE
            };
            self.print(2, x + 1, label, style);
        }
    }

    fn fill_row(&mut self, row: usize, style: Style) {
        let y = week_line(row);
        self.print(y, 1, " ".repeat(INNER_WIDTH.into()), style);
    }

    fn draw_cell(&mut self, row: usize, col: usize, cell: &CalendarCell, style: Style) {
        let y = week_line(row);
        let x = 1 + CELL_WIDTH * u16::try_from(col).unwrap_or(u16::MAX / CELL_WIDTH);
        let text = match cell.day() {
            Some(d) => format!(" {d:>2}"),
            None => "   ".into(),
        };
        self.print(y, x, text, style);
    }

    // `y` and `x` are relative to the popup's top-left corner
    fn print<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        let pos = Position::new(self.origin.x.saturating_add(x), self.origin.y.saturating_add(y));
        if self.clip.contains(pos) {
            let width = self.clip.right() - pos.x;
            Span::styled(s.as_ref(), style).render(Rect::new(pos.x, pos.y, width, 1), self.buf);
        }
    }
}

fn week_line(row: usize) -> u16 {
    u16::try_from(row)
        .unwrap_or(u16::MAX)
        .saturating_add(1 + HEADER_LINES)
}
