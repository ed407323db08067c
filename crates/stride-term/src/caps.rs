// SPDX-License-Identifier: MIT
//
// Terminal capability detection — color depth from the environment, ANSI
// terminal recognition, and the process-wide support cache.
//
// Detection is environment-driven rather than probe-driven: querying the
// terminal directly requires a round-trip through raw mode, while the
// conventional variables (`TERM`, `COLORTERM`, the force flags) are what
// every terminal and CI system actually sets.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use regex::Regex;

use crate::stream::TermStream;

/// Env override for ANSI color regardless of what the terminal reports.
pub const ENV_ENABLE_COLORS: &str = "STRIDE_ENABLE_COLORS";

/// Env override for terminal-ness regardless of the TTY self-report.
pub const ENV_IS_TERMINAL: &str = "STRIDE_IS_TERMINAL";

// ─── ColorSupport ────────────────────────────────────────────────────────────

/// Color depth a terminal supports.
///
/// Variants are declared in increasing capability order so the derived
/// `Ord` makes "keep the best signal seen so far" a plain `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ColorSupport {
    /// No color output at all.
    #[default]
    None = 0,
    /// The classic 16-color palette.
    Xterm = 1,
    /// The 256-color xterm palette.
    Xterm256 = 2,
    /// 24-bit RGB.
    TrueColor = 3,
}

impl ColorSupport {
    /// Number of distinct colors at this depth.
    #[inline]
    #[must_use]
    pub const fn colors(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Xterm => 16,
            Self::Xterm256 => 256,
            Self::TrueColor => 16_777_216,
        }
    }

    const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::Xterm,
            2 => Self::Xterm256,
            3 => Self::TrueColor,
            _ => Self::None,
        }
    }

    /// Detect color support from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(env)
    }

    /// Detect color support through an injected variable lookup.
    ///
    /// Jupyter kernels pipe output through a frontend that always renders
    /// truecolor, so its markers short-circuit everything else. Otherwise
    /// the force flags, `COLORTERM`, and `TERM` are scanned in order and
    /// the best depth seen wins: an exact `truecolor`/`24bit` value
    /// short-circuits, a `256` substring raises the running maximum to
    /// 256 colors, an exact `xterm` raises it to 16.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let marker_set = |name: &str| lookup(name).is_some_and(|value| !value.is_empty());
        if marker_set("JUPYTER_COLUMNS") || marker_set("JUPYTER_LINES") {
            return Self::TrueColor;
        }

        let mut support = Self::None;
        for variable in ["FORCE_COLOR", ENV_ENABLE_COLORS, "COLORTERM", "TERM"] {
            let Some(value) = lookup(variable) else {
                continue;
            };
            match value.as_str() {
                "truecolor" | "24bit" => return Self::TrueColor,
                value if value.contains("256") => support = support.max(Self::Xterm256),
                "xterm" => support = support.max(Self::Xterm),
                _ => {}
            }
        }
        support
    }
}

// ─── Process-wide cache ──────────────────────────────────────────────────────
//
// Detection runs once and the result is cached so every styled write does
// not rescan the environment. The sentinel marks "not yet detected".

const UNDETECTED: u8 = u8::MAX;

static COLOR_SUPPORT: AtomicU8 = AtomicU8::new(UNDETECTED);

/// The cached color support, detecting from the environment on first use.
#[must_use]
pub fn color_support() -> ColorSupport {
    let tag = COLOR_SUPPORT.load(Ordering::Relaxed);
    if tag == UNDETECTED {
        detect_color_support()
    } else {
        ColorSupport::from_tag(tag)
    }
}

/// Override the cached color support.
pub fn set_color_support(support: ColorSupport) {
    COLOR_SUPPORT.store(support as u8, Ordering::Relaxed);
}

/// Re-detect from the environment, replacing any cached or overridden value.
pub fn detect_color_support() -> ColorSupport {
    let support = ColorSupport::from_env();
    set_color_support(support);
    support
}

// ─── Terminal recognition ────────────────────────────────────────────────────

// TERM values of terminal families with working CSI/SGR handling.
const ANSI_TERM_PATTERN: &str =
    r"(?i)^(([xe]|bv)term|(sco)?ansi|cygwin|konsole|linux|rxvt|screen|tmux|vt(10[02]|220|320))";

fn ansi_term_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; compilation cannot fail at runtime.
    RE.get_or_init(|| match Regex::new(ANSI_TERM_PATTERN) {
        Ok(re) => re,
        Err(_) => unreachable!("invalid ANSI terminal pattern"),
    })
}

/// Whether `stream` is attached to an ANSI-capable terminal.
#[must_use]
pub fn is_ansi_terminal<S: TermStream + ?Sized>(stream: &S) -> bool {
    is_ansi_terminal_with(stream.is_tty(), env)
}

/// ANSI terminal check with the TTY report and env lookup injected.
///
/// Jupyter frontends and PyCharm-hosted consoles render ANSI even though
/// the stream is a pipe, so their markers count as terminals outright
/// (except while pytest is driving the hosted console, where output is
/// captured). For a real TTY the `TERM` value must also match a known
/// ANSI-capable family. The Windows `ANSICON` shim injects ANSI handling
/// at the console level, so its presence counts regardless of the TTY
/// report.
#[must_use]
pub fn is_ansi_terminal_with(is_tty: bool, lookup: impl Fn(&str) -> Option<String>) -> bool {
    if lookup("JPY_PARENT_PID").is_some() {
        return true;
    }
    if lookup("PYCHARM_HOSTED").as_deref() == Some("1")
        && lookup("PYTEST_CURRENT_TEST").is_none()
    {
        return true;
    }

    if is_tty && lookup("TERM").is_some_and(|term| ansi_term_re().is_match(&term)) {
        return true;
    }
    lookup("ANSICON").is_some()
}

/// Whether `stream` should be treated as a terminal.
///
/// An explicit `user_override` wins. Otherwise ANSI recognition implies
/// terminal, the `STRIDE_IS_TERMINAL` flag decides next, and the stream's
/// own TTY report is the fallback.
#[must_use]
pub fn is_terminal<S: TermStream + ?Sized>(stream: &S, user_override: Option<bool>) -> bool {
    is_terminal_with(stream.is_tty(), user_override, env)
}

/// Terminal check with the TTY report and env lookup injected.
#[must_use]
pub fn is_terminal_with(
    is_tty: bool,
    user_override: Option<bool>,
    lookup: impl Fn(&str) -> Option<String>,
) -> bool {
    if let Some(flag) = user_override {
        return flag;
    }
    if is_ansi_terminal_with(is_tty, &lookup) {
        return true;
    }
    if let Some(flag) = env_flag_with(ENV_IS_TERMINAL, &lookup) {
        return flag;
    }
    is_tty
}

// ─── Env flags ───────────────────────────────────────────────────────────────

/// Parse a boolean environment flag.
///
/// Accepts the usual spellings case-insensitively; anything else (including
/// an unset variable) is `None` so callers can layer their own default.
#[must_use]
pub fn env_flag(name: &str) -> Option<bool> {
    env_flag_with(name, env)
}

/// Boolean flag parse through an injected variable lookup.
#[must_use]
pub fn env_flag_with(name: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<bool> {
    match lookup(name)?.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
