use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const LABEL_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const TRIGGER_STYLE: Style = BASE_STYLE.fg(Color::LightCyan);

pub(crate) const FOCUSED_TRIGGER_STYLE: Style = TRIGGER_STYLE.add_modifier(Modifier::REVERSED);

pub(crate) const VALUE_STYLE: Style = BASE_STYLE.fg(Color::LightGreen);

pub(crate) const PLACEHOLDER_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const LOGO_STYLE: Style = BASE_STYLE.fg(Color::LightBlue).add_modifier(Modifier::BOLD);

pub(crate) const LOGO_GLITCH_STYLE: Style = BASE_STYLE.fg(Color::LightMagenta);

pub(crate) mod popup {
    use super::*;

    pub(crate) const POPUP_STYLE: Style = BASE_STYLE;

    pub(crate) const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

    pub(crate) const NAV_STYLE: Style = Style::new().fg(Color::LightCyan);

    pub(crate) const SUNDAY_STYLE: Style = Style::new().fg(Color::LightRed);

    pub(crate) const OTHER_MONTH_STYLE: Style = Style::new().fg(Color::DarkGray);

    pub(crate) const TODAY_STYLE: Style = Style::new()
        .fg(Color::LightYellow)
        .add_modifier(Modifier::BOLD);

    pub(crate) const CURSOR_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);
}

pub(crate) mod dialog {
    use super::*;

    pub(crate) const DIALOG_STYLE: Style = BASE_STYLE;

    pub(crate) const ALERT_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);
}
