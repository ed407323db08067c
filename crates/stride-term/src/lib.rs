// SPDX-License-Identifier: MIT
//
// stride-term — Terminal color and capability layer for stride.
//
// Everything a live progress renderer needs to know about the terminal
// it is drawing on: cursor-control escape sequences, an RGB/HLS color
// model that downsamples to whatever depth the terminal supports,
// progress-driven gradients, paired SGR styling, and environment-driven
// capability detection.
//
// This crate intentionally avoids TUI frameworks in favor of direct
// ANSI escape sequences: a progress bar redraws one line, not a screen,
// and every escape code it emits is one this crate formatted itself.

pub mod caps;
pub mod color;
pub mod csi;
pub mod gradient;
pub mod stream;
pub mod style;
pub mod util;

pub use caps::ColorSupport;
pub use color::{Color, ColorRegistry, Hls, Rgb};
pub use gradient::{ColorGradient, Paint, Progress};
pub use stream::{StderrStream, StdoutStream, TermStream};
pub use style::{Attrs, Sgr, SgrColor, apply_colors};
