use crate::theme::{LOGO_GLITCH_STYLE, LOGO_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    text::Line,
    widgets::Widget,
};
use std::time::{Duration, Instant};

static BANNER: [&str; 2] = ["█▀█ █▀█ █▀▄▀█ █▀", "█▀▀ █▀▀ █ ▀ █ ▄█"];

const BANNER_WIDTH: u16 = 16;

/// Resting value of both glitch parameters
const REST: f32 = 0.000_001;

/// Pause between runs of the glitch sequence
const REPEAT_DELAY: Duration = Duration::from_secs(2);

/// Starting `at` into the sequence, move to `target` over `tween`.  A zero
/// `tween` sets the value immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Keyframe {
    at: Duration,
    target: f32,
    tween: Duration,
}

const fn key(at_ms: u64, target: f32, tween_ms: u64) -> Keyframe {
    Keyframe {
        at: Duration::from_millis(at_ms),
        target,
        tween: Duration::from_millis(tween_ms),
    }
}

// Keyframes must be in order of `at` and must not overlap
static X_KEYS: [Keyframe; 4] = [
    key(0, 0.5, 100),
    key(200, REST, 0),
    key(400, 0.4, 200),
    key(600, REST, 0),
];

static Y_KEYS: [Keyframe; 4] = [
    key(100, 0.02, 100),
    key(200, REST, 0),
    key(400, 0.002, 200),
    key(600, REST, 0),
];

fn sample_track(keys: &[Keyframe], t: Duration) -> f32 {
    let mut value = REST;
    for k in keys {
        let Some(into) = t.checked_sub(k.at) else {
            break;
        };
        value = if into >= k.tween {
            k.target
        } else {
            let frac = into.as_secs_f32() / k.tween.as_secs_f32();
            (k.target - value).mul_add(frac, value)
        };
    }
    value
}

/// Distortion applied to the logo, as horizontal & vertical intensities
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Glitch {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Default for Glitch {
    fn default() -> Glitch {
        Glitch { x: REST, y: REST }
    }
}

/// The glitch sequence, repeating with a pause for as long as it is playing
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Timeline {
    started: Option<Instant>,
}

impl Timeline {
    pub(crate) fn restart(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub(crate) fn pause(&mut self) {
        self.started = None;
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    pub(crate) fn sample(&self, now: Instant) -> Glitch {
        match self.started {
            Some(start) => sample_at(now.saturating_duration_since(start)),
            None => Glitch::default(),
        }
    }
}

fn cycle_length() -> Duration {
    X_KEYS
        .iter()
        .chain(Y_KEYS.iter())
        .map(|k| k.at + k.tween)
        .max()
        .unwrap_or_default()
}

/// Value of the glitch `elapsed` after the timeline was (re)started
fn sample_at(elapsed: Duration) -> Glitch {
    let period = (cycle_length() + REPEAT_DELAY).as_nanos();
    let pos = u64::try_from(elapsed.as_nanos() % period).unwrap_or_default();
    let pos = Duration::from_nanos(pos);
    Glitch {
        x: sample_track(&X_KEYS, pos),
        y: sample_track(&Y_KEYS, pos),
    }
}

/// The PPMS logo, glitching while the pointer is over it
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Logo {
    timeline: Timeline,
    current: Glitch,
    hovered: bool,
}

impl Logo {
    pub(crate) fn new() -> Logo {
        Logo::default()
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.timeline.is_playing()
    }

    /// Track the pointer.  Entering the logo restarts the sequence; leaving
    /// it stops the sequence and clears the distortion.
    pub(crate) fn hover(&mut self, over: bool, now: Instant) {
        match (self.hovered, over) {
            (false, true) => self.timeline.restart(now),
            (true, false) => {
                self.timeline.pause();
                self.current = Glitch::default();
            }
            _ => (),
        }
        self.hovered = over;
    }

    pub(crate) fn tick(&mut self, now: Instant) {
        self.current = self.timeline.sample(now);
    }

    pub(crate) fn size() -> (u16, u16) {
        (BANNER_WIDTH, 2)
    }
}

impl Widget for &Logo {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [area] = Layout::horizontal([BANNER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let shift = if self.current.x > 0.3 {
            2
        } else if self.current.x > 0.05 {
            1
        } else {
            0
        };
        let (style, fill) = if self.current.y > 0.01 {
            (LOGO_GLITCH_STYLE, Some('▓'))
        } else if self.current.y > 0.001 {
            (LOGO_STYLE, Some('▓'))
        } else {
            (LOGO_STYLE, None)
        };
        for (i, text) in std::iter::zip(0u16.., BANNER) {
            if i >= area.height {
                break;
            }
            // Alternate lines are pushed in opposite directions
            let x = if i % 2 == 0 {
                area.x.saturating_add(shift)
            } else {
                area.x.saturating_sub(shift)
            };
            let text = match fill {
                Some(ch) if i % 2 == 1 => text.replace('█', &ch.to_string()),
                _ => text.to_owned(),
            };
            let right = buf.area.right();
            let width = right.saturating_sub(x).min(BANNER_WIDTH);
            Line::styled(text, style).render(Rect::new(x, area.y + i, width, 1), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_cycle_length() {
        assert_eq!(cycle_length(), Duration::from_millis(600));
    }

    #[test]
    fn test_sample_sequence() {
        let at = |ms| sample_at(Duration::from_millis(ms));
        assert!(approx(at(0).x, REST));
        assert!(approx(at(50).x, 0.25));
        assert!(approx(at(100).x, 0.5));
        assert!(approx(at(100).y, REST));
        assert!(approx(at(150).y, 0.01));
        assert!(approx(at(150).x, 0.5));
        assert!(approx(at(199).y, 0.0198));
        assert!(approx(at(250).x, REST));
        assert!(approx(at(250).y, REST));
        assert!(approx(at(500).x, 0.2));
        assert!(approx(at(500).y, 0.001));
        assert!(approx(at(700).x, REST));
        assert!(approx(at(2500).y, REST));
    }

    #[test]
    fn test_sample_repeats() {
        let first = sample_at(Duration::from_millis(50));
        let second = sample_at(Duration::from_millis(2650));
        assert!(approx(first.x, second.x));
        assert!(approx(first.y, second.y));
    }

    #[test]
    fn test_hover() {
        let start = Instant::now();
        let mut logo = Logo::new();
        logo.tick(start + Duration::from_millis(50));
        assert_eq!(logo.current, Glitch::default());
        logo.hover(true, start);
        assert!(logo.is_animating());
        logo.tick(start + Duration::from_millis(100));
        assert!(approx(logo.current.x, 0.5));
        // Staying over the logo does not restart the sequence
        logo.hover(true, start + Duration::from_millis(100));
        logo.tick(start + Duration::from_millis(150));
        assert!(approx(logo.current.y, 0.01));
        logo.hover(false, start + Duration::from_millis(160));
        assert!(!logo.is_animating());
        assert_eq!(logo.current, Glitch::default());
    }

    fn render(logo: &Logo) -> Buffer {
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        logo.render(area, &mut buf);
        buf
    }

    #[test]
    fn test_render_rest() {
        let buf = render(&Logo::new());
        let mut expected =
            Buffer::with_lines(["  █▀█ █▀█ █▀▄▀█ █▀  ", "  █▀▀ █▀▀ █ ▀ █ ▄█  "]);
        expected.set_style(Rect::new(2, 0, 16, 2), LOGO_STYLE);
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_render_glitched() {
        let mut logo = Logo::new();
        logo.current = Glitch { x: 0.5, y: 0.02 };
        let buf = render(&logo);
        let lines = (0..2u16)
            .map(|y| {
                (0..20u16)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        assert_eq!(lines[0], "    █▀█ █▀█ █▀▄▀█ █▀");
        assert_eq!(lines[1], "▓▀▀ ▓▀▀ ▓ ▀ ▓ ▄▓    ");
        assert_eq!(Some(buf[(4u16, 0u16)].fg), LOGO_GLITCH_STYLE.fg);
    }
}
