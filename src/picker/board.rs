use super::grid::MonthGrid;
use super::month::RefMonth;
use super::placement::Margins;
use super::popup::{CursorMove, PopupHit, PopupView};
use super::{ymd, OutOfTimeError, PickerKind, Selection, WeekPick};
use ratatui::layout::{Position, Rect};
use std::fmt;
use time::Date;

/// Handle to a picker attached to a [`Board`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct PickerId(usize);

enum OnSelect {
    Day(Box<dyn FnMut(String)>),
    Week(Box<dyn FnMut(WeekPick)>),
}

impl OnSelect {
    fn kind(&self) -> PickerKind {
        match self {
            OnSelect::Day(_) => PickerKind::Day,
            OnSelect::Week(_) => PickerKind::Week,
        }
    }
}

impl fmt::Debug for OnSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OnSelect::Day(_) => "Day",
            OnSelect::Week(_) => "Week",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PickerState {
    reference: RefMonth,
    /// The trigger's rectangle while the picker is open
    anchor: Option<Rect>,
}

#[derive(Debug)]
struct Picker {
    trigger: String,
    state: PickerState,
    on_select: OnSelect,
}

impl Picker {
    fn kind(&self) -> PickerKind {
        self.on_select.kind()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct OpenPopup {
    owner: PickerId,
    view: PopupView,
}

/// The single popup of each widget family.  A family's popup is reused by
/// every picker of that kind, so at most one of them can be open.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Slots {
    day: Option<OpenPopup>,
    week: Option<OpenPopup>,
}

impl Slots {
    fn get(&self, kind: PickerKind) -> Option<&OpenPopup> {
        match kind {
            PickerKind::Day => self.day.as_ref(),
            PickerKind::Week => self.week.as_ref(),
        }
    }

    fn get_mut(&mut self, kind: PickerKind) -> &mut Option<OpenPopup> {
        match kind {
            PickerKind::Day => &mut self.day,
            PickerKind::Week => &mut self.week,
        }
    }

    // In drawing order; later popups are drawn over earlier ones
    fn iter(&self) -> impl Iterator<Item = &OpenPopup> {
        self.day.iter().chain(self.week.iter())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut OpenPopup> {
        self.day.iter_mut().chain(self.week.iter_mut())
    }
}

/// A screen of trigger controls with date & week pickers attached to them
#[derive(Debug)]
pub(crate) struct Board {
    today: Date,
    margins: Margins,
    triggers: Vec<(String, Rect)>,
    pickers: Vec<Picker>,
    popups: Slots,
    /// The most recently opened picker that is still open; receives keyboard
    /// input
    active: Option<PickerId>,
}

impl Board {
    pub(crate) fn new(today: Date, margins: Margins) -> Board {
        Board {
            today,
            margins,
            triggers: Vec::new(),
            pickers: Vec::new(),
            popups: Slots::default(),
            active: None,
        }
    }

    /// Change the date that pickers treat as today.  Takes effect the next
    /// time a picker is opened or navigated.
    pub(crate) fn set_today(&mut self, today: Date) {
        if today != self.today {
            log::info!("Date changed from {} to {today}", self.today);
            self.today = today;
        }
    }

    /// Register a trigger control.  Its position is set later by
    /// [`Board::move_trigger()`] once the screen has been laid out.
    pub(crate) fn add_trigger(&mut self, id: &str) {
        if self.trigger_rect(id).is_none() {
            self.triggers.push((id.to_owned(), Rect::default()));
        }
    }

    pub(crate) fn move_trigger(&mut self, id: &str, rect: Rect) {
        if let Some(slot) = self.triggers.iter_mut().find(|(tid, _)| tid == id) {
            slot.1 = rect;
        }
    }

    pub(crate) fn trigger_rect(&self, id: &str) -> Option<Rect> {
        self.triggers
            .iter()
            .find_map(|(tid, rect)| (tid == id).then_some(*rect))
    }

    pub(crate) fn attach_day<F>(&mut self, trigger: &str, on_select: F) -> Option<PickerId>
    where
        F: FnMut(String) + 'static,
    {
        self.attach(trigger, OnSelect::Day(Box::new(on_select)))
    }

    pub(crate) fn attach_week<F>(&mut self, trigger: &str, on_select: F) -> Option<PickerId>
    where
        F: FnMut(WeekPick) + 'static,
    {
        self.attach(trigger, OnSelect::Week(Box::new(on_select)))
    }

    // A trigger that does not exist is not an error; the picker is simply
    // not attached.
    fn attach(&mut self, trigger: &str, on_select: OnSelect) -> Option<PickerId> {
        if self.trigger_rect(trigger).is_none() {
            log::debug!("No trigger {trigger:?} on board; not attaching picker");
            return None;
        }
        let kind = on_select.kind();
        if let Some(i) = self
            .pickers
            .iter()
            .position(|p| p.trigger == trigger && p.kind() == kind)
        {
            log::debug!("Replacing callback of {kind:?} picker on {trigger:?}");
            if let Some(picker) = self.pickers.get_mut(i) {
                picker.on_select = on_select;
            }
            return Some(PickerId(i));
        }
        let id = PickerId(self.pickers.len());
        self.pickers.push(Picker {
            trigger: trigger.to_owned(),
            state: PickerState {
                reference: RefMonth::of(self.today),
                anchor: None,
            },
            on_select,
        });
        log::debug!("Attached {kind:?} picker to {trigger:?}");
        Some(id)
    }

    /// The pickers attached to `trigger`, in the order they were attached
    pub(crate) fn pickers_for(&self, trigger: &str) -> Vec<PickerId> {
        self.pickers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.trigger == trigger)
            .map(|(i, _)| PickerId(i))
            .collect()
    }

    pub(crate) fn is_open(&self, id: PickerId) -> bool {
        self.pickers
            .get(id.0)
            .and_then(|p| self.popups.get(p.kind()))
            .is_some_and(|popup| popup.owner == id)
    }

    pub(crate) fn any_open(&self) -> bool {
        self.popups.iter().next().is_some()
    }

    pub(crate) fn active(&self) -> Option<PickerId> {
        self.active
    }

    /// Open a picker on the current month, closing whatever other picker of
    /// the same kind was open
    pub(crate) fn open(&mut self, id: PickerId) -> Result<(), OutOfTimeError> {
        let Some(picker) = self.pickers.get(id.0) else {
            return Ok(());
        };
        let kind = picker.kind();
        let anchor = self.trigger_rect(&picker.trigger).unwrap_or_default();
        let reference = RefMonth::of(self.today);
        let grid = MonthGrid::build(kind, reference, self.today)?;
        if let Some(other) = self
            .popups
            .get(kind)
            .map(|p| p.owner)
            .filter(|&owner| owner != id)
        {
            self.close(other);
        }
        let view = PopupView::new(grid, anchor, self.margins, self.today);
        if let Some(picker) = self.pickers.get_mut(id.0) {
            picker.state = PickerState {
                reference,
                anchor: Some(anchor),
            };
            log::debug!(
                "Opened {kind:?} picker on {:?} showing {reference}",
                picker.trigger
            );
        }
        *self.popups.get_mut(kind) = Some(OpenPopup { owner: id, view });
        self.active = Some(id);
        Ok(())
    }

    pub(crate) fn close(&mut self, id: PickerId) {
        let Some(picker) = self.pickers.get_mut(id.0) else {
            return;
        };
        picker.state.anchor = None;
        let slot = self.popups.get_mut(picker.kind());
        if slot.as_ref().is_some_and(|p| p.owner == id) {
            *slot = None;
            log::debug!("Closed {:?} picker on {:?}", picker.kind(), picker.trigger);
        }
        if self.active == Some(id) {
            self.active = self.popups.iter().map(|p| p.owner).last();
        }
    }

    pub(crate) fn close_all(&mut self) {
        let owners = self.popups.iter().map(|p| p.owner).collect::<Vec<_>>();
        for id in owners {
            self.close(id);
        }
    }

    /// Activation of a picker's trigger: opens the picker if it is closed and
    /// closes it if it is open
    pub(crate) fn activate(&mut self, id: PickerId) -> Result<(), OutOfTimeError> {
        if self.is_open(id) {
            self.close(id);
            Ok(())
        } else {
            self.open(id)
        }
    }

    /// Activation of a trigger control: toggles every picker attached to it.
    /// Returns `false` if no picker is attached to the trigger.
    pub(crate) fn activate_trigger(&mut self, trigger: &str) -> Result<bool, OutOfTimeError> {
        let ids = self.pickers_for(trigger);
        for &id in &ids {
            self.activate(id)?;
        }
        Ok(!ids.is_empty())
    }

    /// Show the month `delta` months away from the one currently shown.  Does
    /// nothing if the picker is not open.
    pub(crate) fn navigate(&mut self, id: PickerId, delta: i32) -> Result<(), OutOfTimeError> {
        let Some(picker) = self.pickers.get_mut(id.0) else {
            return Ok(());
        };
        let Some(popup) = self
            .popups
            .get_mut(picker.kind())
            .as_mut()
            .filter(|p| p.owner == id)
        else {
            return Ok(());
        };
        let reference = picker.state.reference.offset(delta);
        let grid = MonthGrid::build(picker.kind(), reference, self.today)?;
        picker.state.reference = reference;
        let anchor = picker.state.anchor.unwrap_or_default();
        // The new month may have a different number of weeks, so placement
        // has to be redone as well.
        popup.view.rerender(grid, anchor, self.margins);
        log::debug!("{:?} picker on {:?} now shows {reference}", picker.kind(), picker.trigger);
        Ok(())
    }

    /// Report `selection` to the picker's callback and then close the picker.
    /// Returns `false` if the selection is of the wrong kind for the picker.
    pub(crate) fn select(&mut self, id: PickerId, selection: Selection) -> bool {
        let Some(picker) = self.pickers.get_mut(id.0) else {
            return false;
        };
        match (&mut picker.on_select, selection) {
            (OnSelect::Day(callback), Selection::Day(date)) => callback(ymd(date)),
            (OnSelect::Week(callback), Selection::Week(week)) => callback(week),
            (on_select, _) => {
                log::debug!(
                    "Ignoring {:?} selection for {:?} picker",
                    selection.kind(),
                    on_select.kind()
                );
                return false;
            }
        }
        log::debug!("{:?} picker on {:?} selected {selection:?}", picker.kind(), picker.trigger);
        self.close(id);
        true
    }

    /// Dispatch a mouse click.
    ///
    /// A click inside an open popup goes to that popup alone.  Otherwise,
    /// every open popup whose trigger was not clicked is closed, and if a
    /// trigger was clicked, each picker attached to it is toggled.
    pub(crate) fn click(&mut self, pos: Position) -> Result<(), OutOfTimeError> {
        let inside = self
            .popups
            .iter()
            .filter_map(|p| p.view.hit(pos).map(|hit| (p.owner, hit)))
            .last();
        if let Some((owner, hit)) = inside {
            return self.dispatch(owner, hit);
        }
        let targets = self.pickers_at(pos);
        let outside = self
            .popups
            .iter()
            .map(|p| p.owner)
            .filter(|owner| !targets.contains(owner))
            .collect::<Vec<_>>();
        for id in outside {
            self.close(id);
        }
        for id in targets {
            self.activate(id)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, owner: PickerId, hit: PopupHit) -> Result<(), OutOfTimeError> {
        match hit {
            PopupHit::Previous => self.navigate(owner, -1),
            PopupHit::Next => self.navigate(owner, 1),
            PopupHit::Cell { row, col } => {
                let selection = self
                    .view_of(owner)
                    .and_then(|view| view.grid().selection_at(row, col));
                if let Some(selection) = selection {
                    self.select(owner, selection);
                }
                Ok(())
            }
            PopupHit::Inside => Ok(()),
        }
    }

    // The pickers of the first trigger at `pos` that has any
    fn pickers_at(&self, pos: Position) -> Vec<PickerId> {
        self.triggers
            .iter()
            .filter(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| self.pickers_for(id))
            .find(|ids| !ids.is_empty())
            .unwrap_or_default()
    }

    fn view_of(&self, id: PickerId) -> Option<&PopupView> {
        self.popups
            .iter()
            .find(|p| p.owner == id)
            .map(|p| &p.view)
    }

    /// Move the keyboard cursor of the active popup.  Returns `false` if
    /// there is no active popup or the cursor is already at the edge.
    pub(crate) fn move_cursor(&mut self, mv: CursorMove) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        self.popups
            .iter_mut()
            .find(|p| p.owner == id)
            .is_some_and(|p| p.view.move_cursor(mv))
    }

    /// Select whatever is under the active popup's cursor.  Returns `false`
    /// if there is nothing selectable there.
    pub(crate) fn choose(&mut self) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        match self.view_of(id).and_then(PopupView::selection_at_cursor) {
            Some(selection) => self.select(id, selection),
            None => false,
        }
    }

    pub(crate) fn navigate_active(&mut self, delta: i32) -> Result<(), OutOfTimeError> {
        match self.active {
            Some(id) => self.navigate(id, delta),
            None => Ok(()),
        }
    }

    pub(crate) fn close_active(&mut self) -> bool {
        match self.active {
            Some(id) => {
                self.close(id);
                true
            }
            None => false,
        }
    }

    /// Re-place every open popup after the triggers have moved
    pub(crate) fn relayout(&mut self) {
        for popup in self.popups.iter_mut() {
            let Some(picker) = self.pickers.get_mut(popup.owner.0) else {
                continue;
            };
            let anchor = self
                .triggers
                .iter()
                .find_map(|(tid, rect)| (*tid == picker.trigger).then_some(*rect))
                .unwrap_or_default();
            if picker.state.anchor != Some(anchor) {
                picker.state.anchor = Some(anchor);
                popup.view.relocate(anchor, self.margins);
            }
        }
    }

    pub(crate) fn views_mut(&mut self) -> impl Iterator<Item = &mut PopupView> {
        self.popups.iter_mut().map(|p| &mut p.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use time::{macros::date, Month};

    const TODAY: Date = date!(2025 - 10 - 19);

    #[derive(Debug, Default)]
    struct Record {
        weeks: Vec<WeekPick>,
        days: Vec<String>,
    }

    fn board() -> (Board, Rc<RefCell<Record>>) {
        let mut board = Board::new(TODAY, Margins::default());
        for (id, rect) in [
            ("week-btn", Rect::new(40, 20, 10, 1)),
            ("week-btn-2", Rect::new(40, 22, 10, 1)),
            ("day-btn", Rect::new(60, 20, 10, 1)),
        ] {
            board.add_trigger(id);
            board.move_trigger(id, rect);
        }
        (board, Rc::new(RefCell::new(Record::default())))
    }

    fn attach_week(board: &mut Board, record: &Rc<RefCell<Record>>, trigger: &str) -> PickerId {
        let record = Rc::clone(record);
        board
            .attach_week(trigger, move |w| record.borrow_mut().weeks.push(w))
            .unwrap()
    }

    fn attach_day(board: &mut Board, record: &Rc<RefCell<Record>>, trigger: &str) -> PickerId {
        let record = Rc::clone(record);
        board
            .attach_day(trigger, move |d| record.borrow_mut().days.push(d))
            .unwrap()
    }

    fn open_count(board: &Board) -> usize {
        board.popups.iter().count()
    }

    // Screen position of a grid cell of an open popup
    fn cell_pos(board: &Board, id: PickerId, row: u16, col: u16) -> Position {
        let area = board.view_of(id).unwrap().area();
        Position::new(area.x + 2 + col * 3, area.y + 3 + row)
    }

    #[test]
    fn test_attach_missing_trigger() {
        let (mut board, _) = board();
        assert_eq!(board.attach_week("no-such-btn", |_| ()), None);
        assert!(board.pickers.is_empty());
        assert!(board.pickers_for("no-such-btn").is_empty());
    }

    #[test]
    fn test_picker_debug() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        assert_eq!(format!("{:?}", board.pickers[id.0].on_select), "Day");
    }

    #[test]
    fn test_reattach_replaces_callback() {
        let (mut board, record) = board();
        let first = board.attach_week("week-btn", |_| panic!("replaced callback called")).unwrap();
        let second = attach_week(&mut board, &record, "week-btn");
        assert_eq!(first, second);
        assert_eq!(board.pickers.len(), 1);
        board.open(second).unwrap();
        assert!(board.choose());
        assert_eq!(record.borrow().weeks.len(), 1);
    }

    #[test]
    fn test_toggle() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        assert!(!board.is_open(id));
        board.activate(id).unwrap();
        assert!(board.is_open(id));
        assert_eq!(board.active(), Some(id));
        board.activate(id).unwrap();
        assert!(!board.is_open(id));
        assert_eq!(board.active(), None);
        assert_eq!(board.pickers[id.0].state.anchor, None);
    }

    #[test]
    fn test_open_resets_to_current_month() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.open(id).unwrap();
        board.navigate(id, -3).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::July)
        );
        board.close(id);
        board.open(id).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::October)
        );
        assert_eq!(
            board.view_of(id).unwrap().grid().month,
            RefMonth::new(2025, Month::October)
        );
    }

    #[test]
    fn test_open_follows_date_change() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        board.open(id).unwrap();
        board.close(id);
        board.set_today(date!(2025 - 11 - 01));
        board.open(id).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::November)
        );
        let today = board
            .view_of(id)
            .unwrap()
            .grid()
            .rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|c| c.is_today)
            .map(|c| c.date)
            .collect::<Vec<_>>();
        assert_eq!(today, [Some(date!(2025 - 11 - 01))]);
    }

    #[test]
    fn test_one_popup_per_family() {
        let (mut board, record) = board();
        let a = attach_week(&mut board, &record, "week-btn");
        let b = attach_week(&mut board, &record, "week-btn-2");
        board.open(a).unwrap();
        board.open(b).unwrap();
        assert!(!board.is_open(a));
        assert!(board.is_open(b));
        assert_eq!(open_count(&board), 1);
        assert_eq!(board.pickers[a.0].state.anchor, None);
    }

    #[test]
    fn test_families_independent() {
        let (mut board, record) = board();
        let w = attach_week(&mut board, &record, "week-btn");
        let d = attach_day(&mut board, &record, "day-btn");
        board.open(w).unwrap();
        board.open(d).unwrap();
        assert!(board.is_open(w));
        assert!(board.is_open(d));
        assert_eq!(board.active(), Some(d));
        board.close(d);
        assert_eq!(board.active(), Some(w));
    }

    #[test]
    fn test_click_outside_closes() {
        let (mut board, record) = board();
        let w = attach_week(&mut board, &record, "week-btn");
        let d = attach_day(&mut board, &record, "day-btn");
        board.open(w).unwrap();
        board.open(d).unwrap();
        board.click(Position::new(0, 0)).unwrap();
        assert!(!board.any_open());
        assert_eq!(board.active(), None);
    }

    #[test]
    fn test_click_trigger_toggles() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.click(Position::new(45, 20)).unwrap();
        assert!(board.is_open(id));
        board.click(Position::new(45, 20)).unwrap();
        assert!(!board.is_open(id));
    }

    #[test]
    fn test_shared_trigger_toggles_every_picker() {
        let (mut board, record) = board();
        let w = attach_week(&mut board, &record, "week-btn");
        let d = attach_day(&mut board, &record, "week-btn");
        assert_ne!(w, d);
        assert_eq!(board.pickers_for("week-btn"), [w, d]);
        board.click(Position::new(45, 20)).unwrap();
        assert!(board.is_open(w));
        assert!(board.is_open(d));
        assert_eq!(board.active(), Some(d));
        board.click(Position::new(45, 20)).unwrap();
        assert!(!board.any_open());
        assert_eq!(board.activate_trigger("week-btn"), Ok(true));
        assert_eq!(open_count(&board), 2);
        assert_eq!(board.activate_trigger("week-btn"), Ok(true));
        assert_eq!(open_count(&board), 0);
        assert_eq!(board.activate_trigger("day-btn"), Ok(false));
    }

    #[test]
    fn test_click_other_trigger_swaps() {
        let (mut board, record) = board();
        let a = attach_week(&mut board, &record, "week-btn");
        let b = attach_week(&mut board, &record, "week-btn-2");
        let d = attach_day(&mut board, &record, "day-btn");
        board.click(Position::new(45, 20)).unwrap();
        board.click(Position::new(45, 22)).unwrap();
        assert!(!board.is_open(a));
        assert!(board.is_open(b));
        // Clicking another family's trigger is an outside click for this one
        board.click(Position::new(65, 20)).unwrap();
        assert!(!board.is_open(b));
        assert!(board.is_open(d));
        assert_eq!(open_count(&board), 1);
    }

    #[test]
    fn test_click_inside_keeps_open() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.open(id).unwrap();
        let area = board.view_of(id).unwrap().area();
        // Weekday header
        board.click(Position::new(area.x + 5, area.y + 2)).unwrap();
        assert!(board.is_open(id));
        assert!(record.borrow().weeks.is_empty());
    }

    #[test]
    fn test_navigation_replaces_popup() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.open(id).unwrap();
        // October 2025 has five weeks, so the popup is 9 lines tall and sits
        // a line above the trigger
        assert_eq!(board.view_of(id).unwrap().area(), Rect::new(27, 10, 23, 9));
        let next = Position::new(47, 11);
        board.click(next).unwrap();
        assert!(board.is_open(id));
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::November)
        );
        // November 2025 has six
        assert_eq!(board.view_of(id).unwrap().area(), Rect::new(27, 9, 23, 10));
        let prev = Position::new(29, 10);
        board.click(prev).unwrap();
        board.click(Position::new(29, 11)).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::September)
        );
    }

    #[test]
    fn test_navigation_wraps_years() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        board.open(id).unwrap();
        board.navigate(id, 3).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2026, Month::January)
        );
        board.navigate(id, -1).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::December)
        );
    }

    #[test]
    fn test_navigate_closed_is_noop() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.navigate(id, 1).unwrap();
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::October)
        );
        assert!(!board.is_open(id));
    }

    #[test]
    fn test_navigate_out_of_time() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        board.open(id).unwrap();
        assert_eq!(board.navigate(id, 12 * 8000), Err(OutOfTimeError));
        assert_eq!(
            board.pickers[id.0].state.reference,
            RefMonth::new(2025, Month::October)
        );
        assert!(board.is_open(id));
    }

    #[test]
    fn test_week_selection_end_to_end() {
        // October 2025 begins on a Wednesday
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        let week = |week| WeekPick {
            year: 2025,
            month: 10,
            week,
        };
        // Row 0 holds the 1st through the 4th
        board.click(Position::new(45, 20)).unwrap();
        board.click(cell_pos(&board, id, 0, 4)).unwrap();
        assert!(!board.is_open(id));
        // Clicking a blank leading cell still picks the row
        board.click(Position::new(45, 20)).unwrap();
        board.click(cell_pos(&board, id, 0, 0)).unwrap();
        // Row 1 holds the 5th & 6th
        board.click(Position::new(45, 20)).unwrap();
        board.click(cell_pos(&board, id, 1, 0)).unwrap();
        board.click(Position::new(45, 20)).unwrap();
        board.click(cell_pos(&board, id, 1, 1)).unwrap();
        assert_eq!(
            record.borrow().weeks,
            [week(1), week(1), week(2), week(2)]
        );
    }

    #[test]
    fn test_day_selection() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        board.click(Position::new(65, 20)).unwrap();
        // Row 1, Thursday: 2025-10-09
        board.click(cell_pos(&board, id, 1, 4)).unwrap();
        assert!(!board.is_open(id));
        board.click(Position::new(65, 20)).unwrap();
        // Row 0, Sunday: 2025-09-28, shown from the previous month
        board.click(cell_pos(&board, id, 0, 0)).unwrap();
        assert_eq!(record.borrow().days, ["2025-10-09", "2025-09-28"]);
    }

    #[test]
    fn test_select_wrong_kind() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        board.open(id).unwrap();
        let pick = WeekPick {
            year: 2025,
            month: 10,
            week: 1,
        };
        assert!(!board.select(id, Selection::Week(pick)));
        assert!(board.is_open(id));
        assert!(board.select(id, Selection::Day(date!(2025 - 10 - 02))));
        assert!(!board.is_open(id));
        assert_eq!(record.borrow().days, ["2025-10-02"]);
    }

    #[test]
    fn test_keyboard_choose() {
        let (mut board, record) = board();
        let id = attach_day(&mut board, &record, "day-btn");
        assert!(!board.choose());
        board.open(id).unwrap();
        assert!(board.move_cursor(CursorMove::Right));
        assert!(board.move_cursor(CursorMove::Down));
        assert!(board.choose());
        assert!(!board.is_open(id));
        assert_eq!(record.borrow().days, ["2025-10-27"]);
    }

    #[test]
    fn test_keyboard_navigate_and_close() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.open(id).unwrap();
        board.navigate_active(1).unwrap();
        assert_eq!(board.active, Some(id));
        assert!(board.choose());
        assert_eq!(
            record.borrow().weeks,
            [WeekPick {
                year: 2025,
                month: 11,
                week: 1
            }]
        );
        assert!(!board.close_active());
        board.open(id).unwrap();
        assert!(board.close_active());
        assert!(!board.any_open());
    }

    #[test]
    fn test_relayout_follows_trigger() {
        let (mut board, record) = board();
        let id = attach_week(&mut board, &record, "week-btn");
        board.open(id).unwrap();
        board.move_trigger("week-btn", Rect::new(40, 5, 10, 1));
        board.relayout();
        assert_eq!(board.view_of(id).unwrap().area(), Rect::new(27, 7, 23, 9));
        assert_eq!(board.pickers[id.0].state.anchor, Some(Rect::new(40, 5, 10, 1)));
    }
}
