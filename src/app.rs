use crate::help::{Help, Notice};
use crate::logo::Logo;
use crate::picker::{Board, CursorMove, Margins, Popup, WeekPick};
use crate::session::{
    check_login, logout, CurrentUser, GateOutcome, LogoutOutcome, RoleHint, SessionService,
};
use crate::theme::dialog::{ALERT_STYLE, DIALOG_STYLE};
use crate::theme::{
    BASE_STYLE, FOCUSED_TRIGGER_STYLE, LABEL_STYLE, PLACEHOLDER_STYLE, STATUS_STYLE,
    TRIGGER_STYLE, VALUE_STYLE,
};
use crossterm::event::{
    poll, read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    text::{Line, Text},
    widgets::{Paragraph, StatefulWidget, Widget},
    DefaultTerminal,
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};
use time::Date;

/// How long to wait for input between animation frames
const FRAME: Duration = Duration::from_millis(33);

/// Values filled in by the pickers
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct FormValues {
    pub(crate) week: Option<WeekPick>,
    pub(crate) from: Option<String>,
    pub(crate) to: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Field {
    trigger: &'static str,
    label: &'static str,
    button: &'static str,
}

static FIELDS: [Field; 3] = [
    Field {
        trigger: "week",
        label: "Production week",
        button: "[ week ▾ ]",
    },
    Field {
        trigger: "from",
        label: "From",
        button: "[ date ▾ ]",
    },
    Field {
        trigger: "to",
        label: "To",
        button: "[ date ▾ ]",
    },
];

#[derive(Debug)]
pub(crate) struct App {
    board: Board,
    form: Rc<RefCell<FormValues>>,
    focus: usize,
    view: View,
    state: AppState,
    session: Option<Box<dyn SessionService>>,
    required_role: Option<String>,
    role_hint: RoleHint,
    user: Option<CurrentUser>,
    logo: Logo,
    logo_area: Rect,
    /// Source of the current date; `None` when the date is fixed
    clock: Option<fn() -> Option<Date>>,
}

impl App {
    pub(crate) fn new(today: Date, margins: Margins) -> App {
        let mut board = Board::new(today, margins);
        for field in &FIELDS {
            board.add_trigger(field.trigger);
        }
        let form = Rc::new(RefCell::new(FormValues::default()));
        let sink = Rc::clone(&form);
        board.attach_week("week", move |pick| sink.borrow_mut().week = Some(pick));
        let sink = Rc::clone(&form);
        board.attach_day("from", move |ymd| sink.borrow_mut().from = Some(ymd));
        let sink = Rc::clone(&form);
        board.attach_day("to", move |ymd| sink.borrow_mut().to = Some(ymd));
        App {
            board,
            form,
            focus: 0,
            view: View::Form,
            state: AppState::Normal,
            session: None,
            required_role: None,
            role_hint: RoleHint::default(),
            user: None,
            logo: Logo::new(),
            logo_area: Rect::default(),
            clock: None,
        }
    }

    /// Follow the date reported by `clock` instead of keeping the date passed
    /// to [`App::new()`] for the whole run
    pub(crate) fn with_clock(mut self, clock: fn() -> Option<Date>) -> App {
        self.clock = Some(clock);
        self
    }

    /// Put the form behind a session check
    pub(crate) fn with_session(
        mut self,
        service: Box<dyn SessionService>,
        required_role: Option<String>,
    ) -> App {
        self.session = Some(service);
        self.required_role = required_role;
        self.check_gate();
        self
    }

    pub(crate) fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
        while !self.quitting() {
            self.logo.tick(Instant::now());
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        // Only block indefinitely when nothing is moving
        if self.logo.is_animating() && !poll(FRAME)? {
            return Ok(());
        }
        let event = read()?;
        // The date may have changed while waiting for input
        self.refresh_today();
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Mouse(mouse) = event {
            if !self.handle_mouse(mouse, Instant::now()) {
                self.beep()?;
            }
        } else if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Normal => match self.view {
                View::Form => self.handle_form_key(key),
                View::Login | View::Home => self.handle_gate_key(key),
            },
            AppState::Helping | AppState::Alert(_) => {
                self.state = AppState::Normal;
                true
            }
            AppState::ConfirmLogout => match key {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.state = AppState::Normal;
                    self.confirm_logout();
                    true
                }
                KeyCode::Char('n' | 'q') | KeyCode::Esc => {
                    self.state = AppState::Normal;
                    true
                }
                _ => false,
            },
            AppState::Quitting => false,
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) -> bool {
        let popup_open = self.board.active().is_some();
        match key {
            KeyCode::Char('q') => {
                self.state = AppState::Quitting;
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            KeyCode::Char('L') if self.session.is_some() => {
                self.state = AppState::ConfirmLogout;
                true
            }
            KeyCode::Tab => {
                self.move_focus(1);
                true
            }
            KeyCode::BackTab => {
                self.move_focus(FIELDS.len() - 1);
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if popup_open {
                    self.board.choose()
                } else {
                    self.activate_focused()
                }
            }
            KeyCode::Left if popup_open => self.board.move_cursor(CursorMove::Left),
            KeyCode::Right if popup_open => self.board.move_cursor(CursorMove::Right),
            KeyCode::Up if popup_open => self.board.move_cursor(CursorMove::Up),
            KeyCode::Down if popup_open => self.board.move_cursor(CursorMove::Down),
            KeyCode::Up => {
                self.move_focus(FIELDS.len() - 1);
                true
            }
            KeyCode::Down => {
                self.move_focus(1);
                true
            }
            KeyCode::Char('h') | KeyCode::PageUp if popup_open => {
                self.board.navigate_active(-1).is_ok()
            }
            KeyCode::Char('l') | KeyCode::PageDown if popup_open => {
                self.board.navigate_active(1).is_ok()
            }
            KeyCode::Esc => self.board.close_active(),
            _ => false,
        }
    }

    fn handle_gate_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('r') => {
                self.check_gate();
                true
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            _ => false,
        }
    }

    // Returns `false` if the click did something invalid
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                self.logo.hover(self.logo_area.contains(pos), now);
                true
            }
            MouseEventKind::Down(MouseButton::Left) => match self.state {
                AppState::Normal if self.view == View::Form => {
                    if let Some(i) = FIELDS.iter().position(|f| {
                        self.board
                            .trigger_rect(f.trigger)
                            .is_some_and(|r| r.contains(pos))
                    }) {
                        self.focus = i;
                    }
                    self.board.click(pos).is_ok()
                }
                AppState::Helping | AppState::Alert(_) => {
                    self.state = AppState::Normal;
                    true
                }
                _ => true,
            },
            _ => true,
        }
    }

    fn refresh_today(&mut self) {
        if let Some(today) = self.clock.and_then(|clock| clock()) {
            self.board.set_today(today);
        }
    }

    fn move_focus(&mut self, step: usize) {
        self.focus = (self.focus + step) % FIELDS.len();
    }

    fn activate_focused(&mut self) -> bool {
        let Some(field) = FIELDS.get(self.focus) else {
            return false;
        };
        matches!(self.board.activate_trigger(field.trigger), Ok(true))
    }

    fn check_gate(&mut self) {
        let Some(service) = self.session.as_deref_mut() else {
            return;
        };
        match check_login(service, self.required_role.as_deref()) {
            GateOutcome::Proceed(user) => {
                self.role_hint.set(user.role.clone());
                self.user = Some(user);
                self.show(View::Form);
            }
            GateOutcome::LoginRequired => {
                self.user = None;
                self.show(View::Login);
            }
            GateOutcome::Unreachable => {
                self.user = None;
                self.show(View::Login);
                self.alert("Unable to reach the session service.".into());
            }
            GateOutcome::AccessDenied(user) => {
                self.role_hint.set(user.role.clone());
                self.user = Some(user);
                self.show(View::Home);
                self.alert("You do not have permission to use this page.".into());
            }
        }
    }

    fn confirm_logout(&mut self) {
        let Some(service) = self.session.as_deref_mut() else {
            return;
        };
        match logout(service, &mut self.role_hint) {
            LogoutOutcome::LoggedOut => {
                self.user = None;
                self.show(View::Login);
                self.alert("You have been logged out.".into());
            }
            LogoutOutcome::Failed(e) => self.alert(format!("Logout failed: {e}")),
        }
    }

    fn show(&mut self, view: View) {
        if view != View::Form {
            self.board.close_all();
        }
        self.view = view;
    }

    fn alert(&mut self, message: String) {
        self.state = AppState::Alert(message);
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn field_value(&self, field: &Field) -> Option<String> {
        let form = self.form.borrow();
        match field.trigger {
            "week" => form.week.map(|w| w.to_string()),
            "from" => form.from.clone(),
            "to" => form.to.clone(),
            _ => None,
        }
    }

    fn status_text(&self) -> String {
        match (&self.user, self.view) {
            (_, View::Form) if self.board.any_open() => String::from(
                " ARROWS move  ·  ENTER choose  ·  h/l previous/next month  ·  ESC close",
            ),
            (Some(user), View::Form) => {
                format!(
                    " {} ({})  ·  L log out  ·  ? help  ·  q quit",
                    user.username,
                    self.role_hint.get().unwrap_or("no role")
                )
            }
            (None, View::Form) => String::from(" No session  ·  ? help  ·  q quit"),
            _ => String::from(" r retry  ·  ? help  ·  q quit"),
        }
    }

    fn render_form(&mut self, area: Rect, buf: &mut Buffer) {
        let rows = (area.y..area.bottom()).step_by(2);
        for (i, (field, y)) in FIELDS.iter().zip(rows).enumerate() {
            let row = Rect::new(area.x, y, area.width, 1);
            let [_, label_area, trigger_area, _, value_area] = Layout::horizontal([
                Constraint::Length(2),
                Constraint::Length(18),
                Constraint::Length(10),
                Constraint::Length(2),
                Constraint::Fill(1),
            ])
            .areas(row);
            Line::styled(field.label, LABEL_STYLE).render(label_area, buf);
            let style = if i == self.focus {
                FOCUSED_TRIGGER_STYLE
            } else {
                TRIGGER_STYLE
            };
            Line::styled(field.button, style).render(trigger_area, buf);
            match self.field_value(field) {
                Some(value) => Line::styled(value, VALUE_STYLE).render(value_area, buf),
                None => Line::styled("not set", PLACEHOLDER_STYLE).render(value_area, buf),
            }
            self.board.move_trigger(field.trigger, trigger_area);
        }
        self.board.relayout();
    }

    fn render_gate(&self, area: Rect, buf: &mut Buffer) {
        let lines = match (self.view, &self.user) {
            (View::Home, Some(user)) => vec![
                Line::raw(format!("Signed in as {}.", user.username)),
                Line::raw(format!(
                    "This page requires the {} role.",
                    self.required_role.as_deref().unwrap_or("proper")
                )),
            ],
            _ => vec![
                Line::raw("You are not logged in."),
                Line::raw("Log in through the PPMS web client, then press r to retry."),
            ],
        };
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .style(LABEL_STYLE)
            .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let (_, logo_height) = Logo::size();
        let [logo_area, _, body_area, status_area] = Layout::vertical([
            Constraint::Length(logo_height),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);
        self.logo.render(logo_area, buf);
        self.logo_area = logo_area;
        match self.view {
            View::Form => self.render_form(body_area, buf),
            View::Login | View::Home => self.render_gate(body_area, buf),
        }
        Line::styled(self.status_text(), STATUS_STYLE).render(status_area, buf);
        for view in self.board.views_mut() {
            Popup.render(area, buf, view);
        }
        match &self.state {
            AppState::Helping => Help(DIALOG_STYLE).render(area, buf),
            AppState::ConfirmLogout => Notice {
                title: " Log out ",
                message: "Log out of PPMS?",
                prompt: "y: log out   n: cancel",
                style: DIALOG_STYLE,
            }
            .render(area, buf),
            AppState::Alert(message) => Notice {
                title: " Notice ",
                message,
                prompt: "Press any key to continue.",
                style: ALERT_STYLE,
            }
            .render(area, buf),
            AppState::Normal | AppState::Quitting => (),
        }
    }
}

/// Which screen is showing under any dialog
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum View {
    Form,
    Login,
    /// Where a logged-in user without the required role is sent
    Home,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Normal,
    Helping,
    ConfirmLogout,
    Alert(String),
    Quitting,
}
