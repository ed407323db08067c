// SPDX-License-Identifier: MIT
//
// stride-stream — stdout/stderr interception for live terminal renders.
//
// A renderer that redraws a line in place cannot share the terminal with
// ordinary printing: any stray write lands mid-bar and corrupts the
// frame. This crate puts a ref-counted buffering shim over the process
// streams, notifies the renderer when captured output needs the region
// cleared, and flushes everything back out on unwrap, at drop, and from
// a panic hook so no output is ever lost.

pub mod offset;
pub mod wrap;
pub mod wrapper;

pub use offset::{LastLineStream, LineOffsetWriter};
pub use wrap::{ListenerId, Listeners, RenderListener, WrappingIO};
pub use wrapper::{StdStream, StreamWrapper, streams};
