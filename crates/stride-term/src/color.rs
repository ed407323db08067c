// SPDX-License-Identifier: MIT
//
// Color model — RGB and HLS value types, named colors, and the
// capability-gated ANSI payload.
//
// Single-character variable names (r, g, b, h, l, s) are the standard
// mathematical convention in color science.
#![allow(clippy::many_single_char_names)]
//
// Terminals speak three dialects: 4-bit indexed (the classic 16 colors),
// 8-bit indexed (the xterm 256 palette: 16 base colors, a 6×6×6 cube, a
// gray ramp), and 24-bit truecolor. This module stores every color as full
// RGB and downsamples on demand, so a single gradient definition renders
// correctly at whatever depth the terminal actually supports.
//
// Downsampling is deliberately the simple linear mapping, not a perceptual
// nearest-match: a progress bar is glanced at, not color-calibrated, and
// the linear formulas are branch-free and allocation-free.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::caps::{self, ColorSupport};
use crate::style::SgrColor;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// An 8-bit-per-channel RGB triple.
///
/// No validation beyond the channel type: the `u8` range is the contract.
/// All derived forms (hex, ANSI indices) are pure functions of the channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// Build an RGB triple.
    #[inline]
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Lowercase zero-padded hex form: `#rrggbb`.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// CSS-style form: `rgb(r, g, b)`.
    #[must_use]
    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    /// Downsample to a 4-bit ANSI index.
    ///
    /// Each channel collapses to one bit by truncating division (only a
    /// channel at full 255 survives), packed as `(b << 2) | (g << 1) | r` —
    /// the classic IRGB bit layout. Truncation maps slightly better than
    /// rounding for typical palette colors.
    #[inline]
    #[must_use]
    pub const fn to_ansi_16(self) -> u8 {
        let red = self.red / 255;
        let green = self.green / 255;
        let blue = self.blue / 255;
        (blue << 2) | (green << 1) | red
    }

    /// Downsample to an 8-bit ANSI index inside the 6×6×6 color cube.
    ///
    /// Channels scale to 0–5 with rounding, then index as
    /// `16 + 36r + 6g + b`.
    #[must_use]
    pub fn to_ansi_256(self) -> u8 {
        let scale = |c: u8| -> u8 {
            // The scaled value is in 0.0..=5.0; the cast cannot truncate.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = (f64::from(c) / 255.0 * 5.0).round() as u8;
            v
        };
        16 + 36 * scale(self.red) + 6 * scale(self.green) + scale(self.blue)
    }

    /// Linear interpolation toward `end` at `step` ∈ [0, 1].
    ///
    /// Channel results truncate toward zero; `step` outside the unit range
    /// produces clamped (saturated) channels rather than wrapping.
    #[must_use]
    pub fn interpolate(self, end: Self, step: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lerp = |a: u8, b: u8, t: f64| -> u8 {
            // f64 → u8 casts saturate, matching the "visually wrong but
            // never crashing" policy for out-of-range steps.
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t) as u8
        };
        Self {
            red: lerp(self.red, end.red, step),
            green: lerp(self.green, end.green, step),
            blue: lerp(self.blue, end.blue, step),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

// ─── Hls ─────────────────────────────────────────────────────────────────────

/// A hue/lightness/saturation triple, each channel in [0, 1].
///
/// Interpolating in HLS keeps perceived lightness steadier than raw RGB
/// interpolation across hue boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hls {
    pub hue: f64,
    pub lightness: f64,
    pub saturation: f64,
}

impl Hls {
    /// Build an HLS triple.
    #[inline]
    #[must_use]
    pub const fn new(hue: f64, lightness: f64, saturation: f64) -> Self {
        Self {
            hue,
            lightness,
            saturation,
        }
    }

    /// Convert from RGB via the standard RGB↔HLS transform.
    ///
    /// Channels are normalized to [0, 1] first; achromatic input yields
    /// hue 0 and saturation 0.
    #[must_use]
    pub fn from_rgb(rgb: Rgb) -> Self {
        let r = f64::from(rgb.red) / 255.0;
        let g = f64::from(rgb.green) / 255.0;
        let b = f64::from(rgb.blue) / 255.0;

        let maxc = r.max(g).max(b);
        let minc = r.min(g).min(b);
        let lightness = (minc + maxc) / 2.0;

        let delta = maxc - minc;
        if delta < f64::EPSILON {
            return Self::new(0.0, lightness, 0.0);
        }

        let saturation = if lightness <= 0.5 {
            delta / (maxc + minc)
        } else {
            delta / (2.0 - maxc - minc)
        };

        let rc = (maxc - r) / delta;
        let gc = (maxc - g) / delta;
        let bc = (maxc - b) / delta;

        let hue = if (r - maxc).abs() < f64::EPSILON {
            bc - gc
        } else if (g - maxc).abs() < f64::EPSILON {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        Self::new((hue / 6.0).rem_euclid(1.0), lightness, saturation)
    }

    /// Linear interpolation toward `end` at `step` ∈ [0, 1].
    #[must_use]
    pub fn interpolate(self, end: Self, step: f64) -> Self {
        let lerp = |a: f64, b: f64| a + (b - a) * step;
        Self {
            hue: lerp(self.hue, end.hue),
            lightness: lerp(self.lightness, end.lightness),
            saturation: lerp(self.saturation, end.saturation),
        }
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A color with optional metadata: HLS cache, name, preassigned xterm index.
///
/// Equality and hashing consider **only** the RGB value — name and xterm
/// index are metadata carried along for rendering and registry lookups.
///
/// A preassigned `xterm` index is authoritative at the indexed color depths:
/// the curated palette index looks better than a downsampled approximation.
#[derive(Debug, Clone)]
pub struct Color {
    pub rgb: Rgb,
    pub hls: Option<Hls>,
    pub name: Option<Cow<'static, str>>,
    pub xterm: Option<u8>,
}

impl Color {
    /// A plain color from RGB alone.
    #[inline]
    #[must_use]
    pub const fn new(rgb: Rgb) -> Self {
        Self {
            rgb,
            hls: None,
            name: None,
            xterm: None,
        }
    }

    /// A named color with a preassigned xterm palette index.
    #[inline]
    #[must_use]
    pub const fn named(name: &'static str, rgb: Rgb, xterm: u8) -> Self {
        Self {
            rgb,
            hls: None,
            name: Some(Cow::Borrowed(name)),
            xterm: Some(xterm),
        }
    }

    /// The HLS form, computed from RGB when not preassigned.
    #[must_use]
    pub fn hls(&self) -> Hls {
        self.hls.unwrap_or_else(|| Hls::from_rgb(self.rgb))
    }

    /// The SGR color payload for a given support level.
    ///
    /// - Truecolor → `2;R;G;B`
    /// - 256-color → `5;<xterm index, or the 6×6×6 cube downsample>`
    /// - 16-color  → `5;<xterm index, or the 4-bit downsample>`
    /// - No support → `None`; no payload is ever emitted without support.
    #[must_use]
    pub fn ansi(&self, support: ColorSupport) -> Option<String> {
        match support {
            ColorSupport::TrueColor => Some(format!(
                "2;{};{};{}",
                self.rgb.red, self.rgb.green, self.rgb.blue
            )),
            ColorSupport::Xterm256 => {
                let index = self.xterm.unwrap_or_else(|| self.rgb.to_ansi_256());
                Some(format!("5;{index}"))
            }
            ColorSupport::Xterm => {
                let index = self.xterm.unwrap_or_else(|| self.rgb.to_ansi_16());
                Some(format!("5;{index}"))
            }
            ColorSupport::None => None,
        }
    }

    /// The SGR color payload at the process-wide cached support level.
    #[must_use]
    pub fn ansi_auto(&self) -> Option<String> {
        self.ansi(caps::color_support())
    }

    /// Interpolate toward `end` at `step` ∈ [0, 1].
    ///
    /// RGB and HLS interpolate linearly; `name` and `xterm` are discrete and
    /// switch from start to end at the midpoint (ties go to the end color).
    #[must_use]
    pub fn interpolate(&self, end: &Self, step: f64) -> Self {
        let (name, xterm) = if step < 0.5 {
            (self.name.clone(), self.xterm)
        } else {
            (end.name.clone(), end.xterm)
        };
        Self {
            rgb: self.rgb.interpolate(end.rgb, step),
            hls: Some(self.hls().interpolate(end.hls(), step)),
            name,
            xterm,
        }
    }

    /// A foreground style bound to this color (SGR 38/39).
    #[must_use]
    pub fn fg(&self) -> SgrColor {
        SgrColor::new(self.clone(), 38, 39)
    }

    /// A background style bound to this color (SGR 48/49).
    #[must_use]
    pub fn bg(&self) -> SgrColor {
        SgrColor::new(self.clone(), 48, 49)
    }

    /// An underline-color style bound to this color (SGR 58/59).
    #[must_use]
    pub fn underline(&self) -> SgrColor {
        SgrColor::new(self.clone(), 58, 59)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgb.hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str(&self.rgb.hex()),
        }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::new(rgb)
    }
}

// ─── Standard palette ────────────────────────────────────────────────────────
//
// The 16 base colors with their widely-used xterm default RGB values.
// Individual terminals may override these, but for downsampling and the
// builtin registry they provide a stable reference.

pub const BLACK: Color = Color::named("black", Rgb::new(0, 0, 0), 0);
pub const RED: Color = Color::named("red", Rgb::new(128, 0, 0), 1);
pub const GREEN: Color = Color::named("green", Rgb::new(0, 128, 0), 2);
pub const YELLOW: Color = Color::named("yellow", Rgb::new(128, 128, 0), 3);
pub const BLUE: Color = Color::named("blue", Rgb::new(0, 0, 128), 4);
pub const MAGENTA: Color = Color::named("magenta", Rgb::new(128, 0, 128), 5);
pub const CYAN: Color = Color::named("cyan", Rgb::new(0, 128, 128), 6);
pub const WHITE: Color = Color::named("white", Rgb::new(192, 192, 192), 7);
pub const BRIGHT_BLACK: Color = Color::named("bright_black", Rgb::new(128, 128, 128), 8);
pub const BRIGHT_RED: Color = Color::named("bright_red", Rgb::new(255, 0, 0), 9);
pub const BRIGHT_GREEN: Color = Color::named("bright_green", Rgb::new(0, 255, 0), 10);
pub const BRIGHT_YELLOW: Color = Color::named("bright_yellow", Rgb::new(255, 255, 0), 11);
pub const BRIGHT_BLUE: Color = Color::named("bright_blue", Rgb::new(0, 0, 255), 12);
pub const BRIGHT_MAGENTA: Color = Color::named("bright_magenta", Rgb::new(255, 0, 255), 13);
pub const BRIGHT_CYAN: Color = Color::named("bright_cyan", Rgb::new(0, 255, 255), 14);
pub const BRIGHT_WHITE: Color = Color::named("bright_white", Rgb::new(255, 255, 255), 15);

/// The standard palette in xterm index order.
pub const STANDARD_PALETTE: [Color; 16] = [
    BLACK,
    RED,
    GREEN,
    YELLOW,
    BLUE,
    MAGENTA,
    CYAN,
    WHITE,
    BRIGHT_BLACK,
    BRIGHT_RED,
    BRIGHT_GREEN,
    BRIGHT_YELLOW,
    BRIGHT_BLUE,
    BRIGHT_MAGENTA,
    BRIGHT_CYAN,
    BRIGHT_WHITE,
];

// ─── ColorRegistry ───────────────────────────────────────────────────────────

/// Multi-index color registry.
///
/// Duplicate names and RGB values are allowed: each key maps to an
/// insertion-ordered sequence. The xterm index is unique — the last
/// registration for an index wins.
///
/// Explicitly constructed; there is no process-wide registry.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    by_name: HashMap<Cow<'static, str>, Vec<Color>>,
    by_lowername: HashMap<String, Vec<Color>>,
    by_hex: HashMap<String, Vec<Color>>,
    by_rgb: HashMap<Rgb, Vec<Color>>,
    by_xterm: HashMap<u8, Color>,
}

impl ColorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the 16 standard xterm colors.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for color in STANDARD_PALETTE {
            registry.insert(color);
        }
        registry
    }

    /// Register a color from its parts and return it.
    pub fn register(
        &mut self,
        rgb: Rgb,
        hls: Option<Hls>,
        name: Option<Cow<'static, str>>,
        xterm: Option<u8>,
    ) -> Color {
        let color = Color {
            rgb,
            hls,
            name,
            xterm,
        };
        self.insert(color.clone());
        color
    }

    /// Register an existing color under all applicable indexes.
    pub fn insert(&mut self, color: Color) {
        if let Some(name) = &color.name {
            self.by_name
                .entry(name.clone())
                .or_default()
                .push(color.clone());
            self.by_lowername
                .entry(name.to_lowercase())
                .or_default()
                .push(color.clone());
        }

        self.by_hex
            .entry(color.rgb.hex())
            .or_default()
            .push(color.clone());
        self.by_rgb
            .entry(color.rgb)
            .or_default()
            .push(color.clone());

        if let Some(xterm) = color.xterm {
            self.by_xterm.insert(xterm, color);
        }
    }

    /// All colors registered under `name`, in insertion order.
    #[must_use]
    pub fn by_name(&self, name: &str) -> &[Color] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Case-insensitive name lookup.
    #[must_use]
    pub fn by_lowername(&self, name: &str) -> &[Color] {
        self.by_lowername
            .get(&name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// All colors with the given `#rrggbb` hex form.
    #[must_use]
    pub fn by_hex(&self, hex: &str) -> &[Color] {
        self.by_hex.get(hex).map_or(&[], Vec::as_slice)
    }

    /// All colors with the given RGB value.
    #[must_use]
    pub fn by_rgb(&self, rgb: Rgb) -> &[Color] {
        self.by_rgb.get(&rgb).map_or(&[], Vec::as_slice)
    }

    /// The color preassigned to an xterm index, if any.
    #[must_use]
    pub fn by_xterm(&self, index: u8) -> Option<&Color> {
        self.by_xterm.get(&index)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
