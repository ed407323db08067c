// SPDX-License-Identifier: MIT
//
// Color gradients over a progress fraction.
//
// A gradient is the color policy of a renderer: given "how far along are
// we", hand back the color to paint with. Progress itself is a tri-state
// value because a bar may not know its total yet, and both unknown states
// render with the gradient's starting color.

use std::fmt;

use crate::color::Color;

// ─── Progress ────────────────────────────────────────────────────────────────

/// How far along a running operation is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Progress {
    /// Nothing has been measured yet.
    #[default]
    Undefined,
    /// Running, but the total is unknowable.
    UnknownLength,
    /// A fraction in [0, 1]; out-of-range values clamp at the gradient ends.
    Value(f64),
}

impl From<f64> for Progress {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::UnknownLength => f.write_str("unknown length"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

// ─── remap ───────────────────────────────────────────────────────────────────

/// Linearly remap `value` from one range onto another.
///
/// No clamping: values outside the source range land proportionally
/// outside the target range.
#[inline]
#[must_use]
pub fn remap(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    new_min + (value - old_min) * (new_max - new_min) / (old_max - old_min)
}

// ─── ColorGradient ───────────────────────────────────────────────────────────

/// Interpolation strategy between two adjacent gradient colors.
pub type ColorInterpolator = fn(&Color, &Color, f64) -> Color;

fn default_interpolator(start: &Color, end: &Color, step: f64) -> Color {
    start.interpolate(end, step)
}

/// An ordered, non-empty sequence of colors mapped over [0, 1].
///
/// With interpolation (the default) the gradient is continuous; without
/// it, progress snaps to the nearest color.
#[derive(Debug, Clone)]
pub struct ColorGradient {
    colors: Vec<Color>,
    interpolator: Option<ColorInterpolator>,
}

impl ColorGradient {
    /// An interpolating gradient. `None` when `colors` is empty.
    #[must_use]
    pub fn new(colors: Vec<Color>) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }
        Some(Self {
            colors,
            interpolator: Some(default_interpolator),
        })
    }

    /// A stepped gradient that snaps to the nearest color.
    #[must_use]
    pub fn stepped(colors: Vec<Color>) -> Option<Self> {
        let mut gradient = Self::new(colors)?;
        gradient.interpolator = None;
        Some(gradient)
    }

    /// Replace the interpolation strategy.
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: ColorInterpolator) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    /// The colors in gradient order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// The color at `progress`.
    ///
    /// Both unknown progress states and values at or below zero give the
    /// first color; values at or above one give the last. In between, the
    /// fraction selects a segment and interpolates its two bounding colors
    /// (or snaps to the nearest color for a stepped gradient).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn get_color(&self, progress: Progress) -> Color {
        let value = match progress {
            Progress::Undefined | Progress::UnknownLength => return self.colors[0].clone(),
            Progress::Value(value) => value,
        };
        if value <= 0.0 {
            return self.colors[0].clone();
        }
        if value >= 1.0 {
            return self.colors[self.colors.len() - 1].clone();
        }

        let max_index = self.colors.len() - 1;
        if max_index == 0 {
            return self.colors[0].clone();
        }

        match self.interpolator {
            Some(interpolate) => {
                // Segment index first, then the position inside it.
                let index =
                    remap(value, 0.0, 1.0, 0.0, (max_index - 1) as f64).round() as usize;
                let step = remap(
                    value,
                    index as f64 / max_index as f64,
                    (index + 1) as f64 / max_index as f64,
                    0.0,
                    1.0,
                );
                interpolate(&self.colors[index], &self.colors[index + 1], step)
            }
            None => {
                let index = remap(value, 0.0, 1.0, 0.0, max_index as f64).round() as usize;
                self.colors[index].clone()
            }
        }
    }
}

// ─── Paint ───────────────────────────────────────────────────────────────────

/// A renderer's color source: a fixed color or a full gradient.
#[derive(Debug, Clone)]
pub enum Paint {
    Solid(Color),
    Gradient(ColorGradient),
}

impl Paint {
    /// A gradient paint. `None` when `colors` is empty.
    #[must_use]
    pub fn gradient(colors: Vec<Color>) -> Option<Self> {
        ColorGradient::new(colors).map(Self::Gradient)
    }

    /// The color at `progress`.
    #[must_use]
    pub fn at(&self, progress: Progress) -> Color {
        match self {
            Self::Solid(color) => color.clone(),
            Self::Gradient(gradient) => gradient.get_color(progress),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl From<ColorGradient> for Paint {
    fn from(gradient: ColorGradient) -> Self {
        Self::Gradient(gradient)
    }
}

/// Resolve an optional paint at `progress`.
#[must_use]
pub fn resolve_color(progress: Progress, paint: Option<&Paint>) -> Option<Color> {
    paint.map(|paint| paint.at(progress))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::color::Rgb;

    fn black() -> Color {
        Color::new(Rgb::new(0, 0, 0))
    }

    fn white() -> Color {
        Color::new(Rgb::new(255, 255, 255))
    }

    fn bw() -> ColorGradient {
        ColorGradient::new(vec![black(), white()]).expect("two colors")
    }

    #[test]
    fn remap_basic() {
        assert_eq!(remap(0.5, 0.0, 1.0, 0.0, 100.0), 50.0);
        assert_eq!(remap(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
        // No clamping.
        assert_eq!(remap(2.0, 0.0, 1.0, 0.0, 10.0), 20.0);
    }

    #[test]
    fn empty_gradient_is_rejected() {
        assert!(ColorGradient::new(vec![]).is_none());
        assert!(Paint::gradient(vec![]).is_none());
    }

    #[test]
    fn unknown_progress_gives_first_color() {
        let gradient = bw();
        assert_eq!(gradient.get_color(Progress::Undefined).rgb, black().rgb);
        assert_eq!(gradient.get_color(Progress::UnknownLength).rgb, black().rgb);
    }

    #[test]
    fn out_of_range_values_clamp_to_the_ends() {
        let gradient = bw();
        assert_eq!(gradient.get_color(Progress::Value(0.0)).rgb, black().rgb);
        assert_eq!(gradient.get_color(Progress::Value(-3.0)).rgb, black().rgb);
        assert_eq!(gradient.get_color(Progress::Value(1.0)).rgb, white().rgb);
        assert_eq!(gradient.get_color(Progress::Value(7.0)).rgb, white().rgb);
    }

    #[test]
    fn single_color_gradient_is_constant() {
        let gradient = ColorGradient::new(vec![black()]).expect("one color");
        for progress in [
            Progress::Undefined,
            Progress::Value(0.3),
            Progress::Value(0.9),
        ] {
            assert_eq!(gradient.get_color(progress).rgb, black().rgb);
        }
    }

    #[test]
    fn two_color_gradient_interpolates_linearly() {
        let gradient = bw();
        assert_eq!(
            gradient.get_color(Progress::Value(0.5)).rgb,
            Rgb::new(127, 127, 127)
        );
        assert_eq!(
            gradient.get_color(Progress::Value(0.25)).rgb,
            Rgb::new(63, 63, 63)
        );
    }

    #[test]
    fn three_color_gradient_selects_the_right_segment() {
        let red = Color::new(Rgb::new(255, 0, 0));
        let gradient =
            ColorGradient::new(vec![black(), red.clone(), white()]).expect("three colors");
        // Segment boundaries land exactly on the middle color.
        assert_eq!(gradient.get_color(Progress::Value(0.5)).rgb, red.rgb);
        // Quarter of the way: halfway through the first segment.
        assert_eq!(
            gradient.get_color(Progress::Value(0.25)).rgb,
            Rgb::new(127, 0, 0)
        );
        // Three quarters: halfway through the second segment.
        assert_eq!(
            gradient.get_color(Progress::Value(0.75)).rgb,
            Rgb::new(255, 127, 127)
        );
    }

    #[test]
    fn stepped_gradient_snaps_to_nearest() {
        let gradient = ColorGradient::stepped(vec![black(), white()]).expect("two colors");
        assert_eq!(gradient.get_color(Progress::Value(0.4)).rgb, black().rgb);
        assert_eq!(gradient.get_color(Progress::Value(0.6)).rgb, white().rgb);
    }

    #[test]
    fn custom_interpolator_is_used() {
        fn always_start(start: &Color, _end: &Color, _step: f64) -> Color {
            start.clone()
        }
        let gradient = bw().with_interpolator(always_start);
        assert_eq!(gradient.get_color(Progress::Value(0.7)).rgb, black().rgb);
    }

    #[test]
    fn gradient_color_renders_indexed_payload_end_to_end() {
        use crate::caps::ColorSupport;
        use crate::color::{BRIGHT_GREEN, RED};

        let gradient = ColorGradient::new(vec![RED, BRIGHT_GREEN]).expect("two colors");
        let color = gradient.get_color(Progress::Value(0.3));

        // Below the midpoint the start color's palette index carries over,
        // so the indexed depths render from it.
        let payload = color.ansi(ColorSupport::Xterm256).expect("payload");
        assert!(payload.starts_with("5;"));
        assert_eq!(payload, "5;1");

        // No support, no payload, xterm index or not.
        assert_eq!(color.ansi(ColorSupport::None), None);
    }

    #[test]
    fn paint_resolution() {
        let solid = Paint::from(black());
        assert_eq!(solid.at(Progress::Value(0.9)).rgb, black().rgb);

        let paint = Paint::gradient(vec![black(), white()]).expect("two colors");
        assert_eq!(paint.at(Progress::Value(1.0)).rgb, white().rgb);

        assert_eq!(resolve_color(Progress::Undefined, None), None);
        assert_eq!(
            resolve_color(Progress::Undefined, Some(&paint)).map(|c| c.rgb),
            Some(black().rgb)
        );
    }
}
