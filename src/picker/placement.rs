use ratatui::layout::{Rect, Size};

/// Spacing used when positioning a popup next to its trigger
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Margins {
    /// Distance between the trigger and the near edge of the popup
    pub(crate) gap: u16,
    /// Minimum distance between the left edge of the screen and the popup
    pub(crate) edge: u16,
}

impl Margins {
    pub(crate) const fn new(gap: u16, edge: u16) -> Margins {
        Margins { gap, edge }
    }
}

impl Default for Margins {
    fn default() -> Margins {
        Margins::new(1, 1)
    }
}

/// Which way a popup extends from its trigger
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Opening {
    Upwards,
    Downwards,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Placement {
    pub(crate) area: Rect,
    pub(crate) opening: Opening,
}

/// Position a popup of the given size relative to `anchor`.
///
/// The popup goes above the anchor when there is more than its height plus
/// the gap available above it, and below the anchor otherwise.  It is
/// right-aligned with the anchor but never starts left of `margins.edge`.
pub(crate) fn place(anchor: Rect, popup: Size, margins: Margins) -> Placement {
    let x = anchor
        .right()
        .saturating_sub(popup.width)
        .max(margins.edge);
    let (y, opening) = if anchor.y > popup.height.saturating_add(margins.gap) {
        (anchor.y - popup.height - margins.gap, Opening::Upwards)
    } else {
        (anchor.bottom().saturating_add(margins.gap), Opening::Downwards)
    };
    Placement {
        area: Rect::new(x, y, popup.width, popup.height),
        opening,
    }
}
