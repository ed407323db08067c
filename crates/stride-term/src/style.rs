// SPDX-License-Identifier: MIT
//
// SGR styling — paired on/off attribute codes, colored variants, and the
// combined fg/bg application used by renderers.
//
// Every style is a (start, end) code pair rather than a blanket `ESC[0m`
// reset: the full reset would also clear any styling an outer wrapper
// applied, so each attribute ends with its own specific off code.

use bitflags::bitflags;

use crate::caps::{self, ColorSupport};
use crate::color::Color;
use crate::csi::CSI;
use crate::gradient::{Paint, Progress};

// ─── Sgr ─────────────────────────────────────────────────────────────────────

/// A paired SGR attribute: the code that turns it on and the one that
/// turns it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sgr {
    pub start: u8,
    pub end: u8,
}

impl Sgr {
    #[inline]
    #[must_use]
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Wrap `text` in the on/off pair.
    #[must_use]
    pub fn wrap(self, text: &str) -> String {
        format!("{CSI}{}m{text}{CSI}{}m", self.start, self.end)
    }
}

pub const BOLD: Sgr = Sgr::new(1, 22);
pub const FAINT: Sgr = Sgr::new(2, 22);
pub const ITALIC: Sgr = Sgr::new(3, 23);
pub const UNDERLINE: Sgr = Sgr::new(4, 24);
pub const SLOW_BLINK: Sgr = Sgr::new(5, 25);
pub const FAST_BLINK: Sgr = Sgr::new(6, 25);
pub const INVERSE: Sgr = Sgr::new(7, 27);
pub const STRIKE_THROUGH: Sgr = Sgr::new(9, 29);
pub const GOTHIC: Sgr = Sgr::new(20, 10);
pub const DOUBLE_UNDERLINE: Sgr = Sgr::new(21, 24);
pub const FRAMED: Sgr = Sgr::new(51, 54);
pub const ENCIRCLED: Sgr = Sgr::new(52, 54);
pub const OVERLINE: Sgr = Sgr::new(53, 55);

// ─── SgrColor ────────────────────────────────────────────────────────────────

/// A colored SGR attribute: the on code carries the color payload as its
/// second argument (`ESC[38;5;196m`).
///
/// Built via [`Color::fg`], [`Color::bg`], and [`Color::underline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgrColor {
    pub color: Color,
    pub start: u8,
    pub end: u8,
}

impl SgrColor {
    #[inline]
    #[must_use]
    pub const fn new(color: Color, start: u8, end: u8) -> Self {
        Self { color, start, end }
    }

    /// Wrap `text` at an explicit support level.
    ///
    /// When the color resolves to no payload the text comes back
    /// untouched, with no escape bytes at all.
    #[must_use]
    pub fn wrap_with(&self, text: &str, support: ColorSupport) -> String {
        match self.color.ansi(support) {
            Some(payload) => {
                format!("{CSI}{};{payload}m{text}{CSI}{}m", self.start, self.end)
            }
            None => text.to_string(),
        }
    }

    /// Wrap `text` at the process-wide cached support level.
    #[must_use]
    pub fn wrap(&self, text: &str) -> String {
        self.wrap_with(text, caps::color_support())
    }
}

// ─── Attrs ───────────────────────────────────────────────────────────────────

bitflags! {
    /// A composable set of SGR attributes.
    ///
    /// [`Attrs::apply`] emits one combined start sequence instead of one
    /// escape per attribute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attrs: u16 {
        const BOLD = 1 << 0;
        const FAINT = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const SLOW_BLINK = 1 << 4;
        const FAST_BLINK = 1 << 5;
        const INVERSE = 1 << 6;
        const STRIKE_THROUGH = 1 << 7;
        const GOTHIC = 1 << 8;
        const DOUBLE_UNDERLINE = 1 << 9;
        const FRAMED = 1 << 10;
        const ENCIRCLED = 1 << 11;
        const OVERLINE = 1 << 12;
    }
}

// Flag-to-pair table in bit order.
const ATTR_PAIRS: [(Attrs, Sgr); 13] = [
    (Attrs::BOLD, BOLD),
    (Attrs::FAINT, FAINT),
    (Attrs::ITALIC, ITALIC),
    (Attrs::UNDERLINE, UNDERLINE),
    (Attrs::SLOW_BLINK, SLOW_BLINK),
    (Attrs::FAST_BLINK, FAST_BLINK),
    (Attrs::INVERSE, INVERSE),
    (Attrs::STRIKE_THROUGH, STRIKE_THROUGH),
    (Attrs::GOTHIC, GOTHIC),
    (Attrs::DOUBLE_UNDERLINE, DOUBLE_UNDERLINE),
    (Attrs::FRAMED, FRAMED),
    (Attrs::ENCIRCLED, ENCIRCLED),
    (Attrs::OVERLINE, OVERLINE),
];

impl Attrs {
    /// Wrap `text` in one combined start sequence and one combined end
    /// sequence. Shared off codes (bold/faint, the blinks, the underline
    /// variants) are emitted once.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }

        let mut starts: Vec<String> = Vec::new();
        let mut ends: Vec<u8> = Vec::new();
        for (flag, sgr) in ATTR_PAIRS {
            if self.contains(flag) {
                starts.push(sgr.start.to_string());
                if !ends.contains(&sgr.end) {
                    ends.push(sgr.end);
                }
            }
        }
        let ends: Vec<String> = ends.into_iter().map(|c| c.to_string()).collect();
        format!("{CSI}{}m{text}{CSI}{}m", starts.join(";"), ends.join(";"))
    }
}

// ─── apply_colors ────────────────────────────────────────────────────────────

/// Apply foreground and background paint to `text` for a render pass.
///
/// With neither paint set the text is returned unchanged. Without a
/// `percentage` the static fallback colors apply instead of the paints.
/// Otherwise both paints resolve at `percentage / 100` and wrap the text,
/// foreground innermost, background outermost.
#[must_use]
#[allow(clippy::similar_names)]
pub fn apply_colors(
    text: &str,
    percentage: Option<f64>,
    fg: Option<&Paint>,
    bg: Option<&Paint>,
    fg_none: Option<&Color>,
    bg_none: Option<&Color>,
    support: ColorSupport,
) -> String {
    if fg.is_none() && bg.is_none() {
        return text.to_string();
    }

    let mut text = text.to_string();
    match percentage {
        None => {
            if let Some(color) = fg_none {
                text = color.fg().wrap_with(&text, support);
            }
            if let Some(color) = bg_none {
                text = color.bg().wrap_with(&text, support);
            }
        }
        Some(percentage) => {
            let progress = Progress::from(percentage * 0.01);
            if let Some(paint) = fg {
                text = paint.at(progress).fg().wrap_with(&text, support);
            }
            if let Some(paint) = bg {
                text = paint.at(progress).bg().wrap_with(&text, support);
            }
        }
    }
    text
}

// ─── Tests ───────────────────────────────────────────────────────────────────
