// SPDX-License-Identifier: MIT
//
// Stream capability trait — the minimal surface a renderer needs from an
// output stream: write, flush, a TTY report, and close.
#![allow(unsafe_code)]

use std::io::{self, Write};

/// An output stream a terminal renderer can target.
///
/// `is_tty` is a self-report, not a guarantee; detection layers combine
/// it with environment signals. `close` is terminal: the stream must not
/// be written to afterwards.
pub trait TermStream: Write {
    /// Whether the stream is attached to a TTY.
    fn is_tty(&self) -> bool;

    /// Flush and release the stream.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<T: TermStream + ?Sized> TermStream for Box<T> {
    fn is_tty(&self) -> bool {
        (**self).is_tty()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// An in-memory sink. Never a TTY; the test double of choice.
impl TermStream for Vec<u8> {
    fn is_tty(&self) -> bool {
        false
    }
}

#[cfg(unix)]
fn fd_is_tty(fd: std::os::fd::RawFd) -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(fd) == 1 }
}

// ─── Process streams ─────────────────────────────────────────────────────────

/// The process stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutStream;

impl StdoutStream {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Write for StdoutStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl TermStream for StdoutStream {
    #[cfg(unix)]
    fn is_tty(&self) -> bool {
        fd_is_tty(libc::STDOUT_FILENO)
    }

    #[cfg(not(unix))]
    fn is_tty(&self) -> bool {
        false
    }
}

/// The process stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrStream;

impl StderrStream {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Write for StderrStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl TermStream for StderrStream {
    #[cfg(unix)]
    fn is_tty(&self) -> bool {
        fd_is_tty(libc::STDERR_FILENO)
    }

    #[cfg(not(unix))]
    fn is_tty(&self) -> bool {
        false
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
