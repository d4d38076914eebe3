use ratatui::{
    buffer::Buffer,
    layout::Flex,
    layout::{Alignment, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "TAB, SHIFT-TAB  Move between fields\n",
    "ENTER, SPACE    Open the focused picker\n",
    "ARROWS          Move within the open picker\n",
    "ENTER, SPACE    Choose the day or week\n",
    "h, PAGE UP      Previous month\n",
    "l, PAGE DOWN    Next month\n",
    "ESC             Close the open picker\n",
    "L               Log out\n",
    "?               Show this help\n",
    "q               Quit\n",
    "\n",
    "Pickers also respond to mouse clicks.\n",
    "\n",
    "Press the Any Key to dismiss.\n",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = TEXT.iter().map(|&s| Line::raw(s)).collect::<Vec<_>>();
        render_dialog(" Commands ", Text::from(lines), self.0, area, buf);
    }
}

/// A blocking message box, centered on the screen
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Notice<'a> {
    pub(crate) title: &'a str,
    pub(crate) message: &'a str,
    pub(crate) prompt: &'a str,
    pub(crate) style: Style,
}

impl Widget for Notice<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from(vec![
            Line::raw(self.message),
            Line::raw(""),
            Line::raw(self.prompt),
        ]);
        render_dialog(self.title, text, self.style, area, buf);
    }
}

fn render_dialog(title: &str, text: Text<'_>, style: Style, area: Rect, buf: &mut Buffer) {
    let height = u16::try_from(text.height())
        .unwrap_or(u16::MAX)
        .min(area.height)
        .saturating_add(2);
    let width = u16::try_from(text.width())
        .unwrap_or(u16::MAX)
        .max(u16::try_from(title.len()).unwrap_or(u16::MAX))
        .min(area.width)
        .saturating_add(2);
    let para = Paragraph::new(text)
        .block(
            Block::bordered()
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .style(style);
    let [dialog_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [dialog_area] = Layout::vertical([height])
        .flex(Flex::Center)
        .areas(dialog_area);
    let outer_area = Rect {
        x: dialog_area.x.saturating_sub(1),
        y: dialog_area.y,
        width: dialog_area.width.saturating_add(2),
        height: dialog_area.height,
    };
    Clear.render(outer_area, buf);
    Block::new().style(style).render(outer_area, buf);
    para.render(dialog_area, buf);
}
