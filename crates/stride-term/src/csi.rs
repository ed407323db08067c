// SPDX-License-Identifier: MIT
//
// CSI escape sequence builders.
//
// Pure string formatting — no state, no decisions about when to emit; the
// stream layer decides that. A `Csi` knows its final byte and its default
// arguments, and renders `ESC [ args code` with `;`-joined arguments. A
// `CsiFixed` carries its argument bytes baked into the code and ignores
// call-time arguments entirely (`?25l` and friends).
//
// ANSI coordinates are 1-indexed; these builders pass arguments through
// untouched, so callers supply 1-based values.

use std::fmt::{self, Write};

/// Control Sequence Introducer prefix: `ESC [`.
pub const CSI: &str = "\x1b[";

// ─── Builders ────────────────────────────────────────────────────────────────

/// A parametrized CSI sequence: final byte plus default arguments.
///
/// ```
/// use stride_term::csi::{Csi, UP};
///
/// assert_eq!(UP.seq(&[]), "\x1b[1A");     // defaults
/// assert_eq!(UP.seq(&[4]), "\x1b[4A");    // explicit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Csi {
    code: &'static str,
    defaults: &'static [u16],
}

impl Csi {
    /// Build a sequence definition from its final byte and default arguments.
    #[must_use]
    pub const fn new(code: &'static str, defaults: &'static [u16]) -> Self {
        Self { code, defaults }
    }

    /// Render the sequence, falling back to the defaults when `args` is empty.
    #[must_use]
    pub fn seq(&self, args: &[u16]) -> String {
        let args = if args.is_empty() { self.defaults } else { args };
        let mut out = String::from(CSI);
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            // Writing a u16 into a String cannot fail.
            let _ = write!(out, "{arg}");
        }
        out.push_str(self.code);
        out
    }
}

impl fmt::Display for Csi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.seq(&[]))
    }
}

/// A fixed CSI sequence with no argument slot.
///
/// The argument bytes (if any) are part of the code itself — `?25l` et al.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsiFixed {
    code: &'static str,
}

impl CsiFixed {
    /// Build a fixed sequence from its complete code.
    #[must_use]
    pub const fn new(code: &'static str) -> Self {
        Self { code }
    }

    /// Render the sequence. Always identical output.
    #[must_use]
    pub fn seq(&self) -> String {
        let mut out = String::from(CSI);
        out.push_str(self.code);
        out
    }
}

impl fmt::Display for CsiFixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CSI)?;
        f.write_str(self.code)
    }
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Cursor Position `[row;column]` (CUP, default `[1;1]`).
pub const CUP: Csi = Csi::new("H", &[1, 1]);

/// Cursor Up n times (CUU, default 1).
pub const UP: Csi = Csi::new("A", &[1]);

/// Cursor Down n times (CUD, default 1).
pub const DOWN: Csi = Csi::new("B", &[1]);

/// Cursor Forward n times (CUF, default 1).
pub const RIGHT: Csi = Csi::new("C", &[1]);

/// Cursor Backward n times (CUB, default 1).
pub const LEFT: Csi = Csi::new("D", &[1]);

/// Cursor Next Line n times (CNL, default 1).
pub const NEXT_LINE: Csi = Csi::new("E", &[1]);

/// Cursor Preceding Line n times (CPL, default 1).
pub const PREVIOUS_LINE: Csi = Csi::new("F", &[1]);

/// Cursor Character Absolute `[column]` (CHA, default 1).
pub const COLUMN: Csi = Csi::new("G", &[1]);

/// Save Cursor Position (SCP).
pub const SAVE_CURSOR: CsiFixed = CsiFixed::new("s");

/// Restore Cursor Position (RCP).
pub const RESTORE_CURSOR: CsiFixed = CsiFixed::new("u");

/// Hide the cursor (DECTCEM reset).
pub const HIDE_CURSOR: CsiFixed = CsiFixed::new("?25l");

/// Show the cursor (DECTCEM set).
pub const SHOW_CURSOR: CsiFixed = CsiFixed::new("?25h");

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Erase in Display (ED, default 0: till end of screen).
pub const CLEAR_SCREEN: Csi = Csi::new("J", &[0]);

/// Erase from cursor till end of screen.
pub const CLEAR_SCREEN_TILL_END: CsiFixed = CsiFixed::new("0J");

/// Erase from cursor till start of screen.
pub const CLEAR_SCREEN_TILL_START: CsiFixed = CsiFixed::new("1J");

/// Erase the whole screen.
pub const CLEAR_SCREEN_ALL: CsiFixed = CsiFixed::new("2J");

/// Erase the whole screen and the scrollback buffer.
pub const CLEAR_SCREEN_ALL_AND_HISTORY: CsiFixed = CsiFixed::new("3J");

/// Scroll up n lines (SU).
pub const SCROLL_UP: Csi = Csi::new("S", &[]);

/// Scroll down n lines (SD).
pub const SCROLL_DOWN: Csi = Csi::new("T", &[]);

// ─── Line ────────────────────────────────────────────────────────────────────

/// Erase in Line (EL, no default sub-code).
pub const CLEAR_LINE_ALL: Csi = Csi::new("K", &[]);

/// Erase from cursor to end of line.
pub const CLEAR_LINE_RIGHT: CsiFixed = CsiFixed::new("0K");

/// Erase from cursor to beginning of line.
pub const CLEAR_LINE_LEFT: CsiFixed = CsiFixed::new("1K");

/// Erase the line containing the cursor.
pub const CLEAR_LINE: CsiFixed = CsiFixed::new("2K");

/// Move `n` lines up, erase that line, and move back down.
///
/// The workhorse for clearing a progress line that scrolled behind
/// ordinary output.
#[must_use]
pub fn clear_line(n: u16) -> String {
    let mut out = UP.seq(&[n]);
    out.push_str(&CLEAR_LINE_ALL.seq(&[]));
    out.push_str(&DOWN.seq(&[n]));
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
