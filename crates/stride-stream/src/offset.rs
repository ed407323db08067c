// SPDX-License-Identifier: MIT
//
// Auxiliary stream adapters for multi-line layouts.
//
// LineOffsetWriter lets several writers share one terminal by giving each
// a fixed line above the cursor; LastLineStream is a sink that remembers
// only the newest completed line, for surfaces that show a single status
// line (window titles, one-line widgets).

use std::io::{self, Write};

use stride_term::TermStream;
use stride_term::csi::{DOWN, PREVIOUS_LINE};

// ─── LineOffsetWriter ────────────────────────────────────────────────────────

/// Writes each chunk `lines` rows above the current cursor position.
///
/// Every write moves the cursor up, rewrites the row from column one, and
/// moves back down, so the wrapped stream's own cursor position is
/// undisturbed. Trailing newlines are stripped from the chunk; a newline
/// would scroll and shift every offset row.
pub struct LineOffsetWriter<T: TermStream> {
    target: T,
    lines: u16,
}

impl<T: TermStream> LineOffsetWriter<T> {
    #[must_use]
    pub fn new(target: T, lines: u16) -> Self {
        Self { target, lines }
    }

    /// The row offset above the cursor.
    #[must_use]
    pub const fn lines(&self) -> u16 {
        self.lines
    }

    /// Write `data` on the offset row and flush.
    pub fn write(&mut self, data: &str) -> io::Result<()> {
        for _ in 0..self.lines {
            self.target.write_all(PREVIOUS_LINE.seq(&[]).as_bytes())?;
        }
        self.target.write_all(b"\r")?;
        self.target
            .write_all(data.trim_end_matches(['\r', '\n']).as_bytes())?;
        for _ in 0..self.lines {
            self.target.write_all(DOWN.seq(&[]).as_bytes())?;
        }
        self.target.flush()
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

// ─── LastLineStream ──────────────────────────────────────────────────────────

/// A sink that retains only the most recently completed line.
///
/// Incomplete input (no trailing newline) stays pending and is promoted
/// once its newline arrives. Never a TTY; not seekable.
#[derive(Debug, Default)]
pub struct LastLineStream {
    line: String,
    pending: String,
}

impl LastLineStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last completed line, without its newline.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Text written since the last newline.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn write_str(&mut self, data: &str) {
        self.pending.push_str(data);
        while let Some(newline) = self.pending.find('\n') {
            let rest = self.pending.split_off(newline + 1);
            let completed = std::mem::replace(&mut self.pending, rest);
            let completed = completed.trim_end_matches(['\r', '\n']);
            if !completed.is_empty() {
                self.line.clear();
                self.line.push_str(completed);
            }
        }
    }
}

impl Write for LastLineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TermStream for LastLineStream {
    fn is_tty(&self) -> bool {
        false
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn offset_writer_moves_up_and_back() {
        let mut writer = LineOffsetWriter::new(Vec::new(), 2);
        writer.write("status").expect("write");
        let out = String::from_utf8(writer.into_target()).expect("utf8");
        assert_eq!(out, "\x1b[1F\x1b[1F\rstatus\x1b[1B\x1b[1B");
    }

    #[test]
    fn offset_writer_strips_trailing_newlines() {
        let mut writer = LineOffsetWriter::new(Vec::new(), 1);
        writer.write("done\r\n").expect("write");
        let out = String::from_utf8(writer.into_target()).expect("utf8");
        assert_eq!(out, "\x1b[1F\rdone\x1b[1B");
    }

    #[test]
    fn zero_offset_rewrites_the_current_line() {
        let mut writer = LineOffsetWriter::new(Vec::new(), 0);
        writer.write("here").expect("write");
        let out = String::from_utf8(writer.into_target()).expect("utf8");
        assert_eq!(out, "\rhere");
    }

    #[test]
    fn last_line_keeps_only_the_newest_complete_line() {
        let mut stream = LastLineStream::new();
        stream.write_str("first\nsecond\n");
        assert_eq!(stream.line(), "second");
        assert_eq!(stream.pending(), "");
    }

    #[test]
    fn incomplete_line_stays_pending() {
        let mut stream = LastLineStream::new();
        stream.write_str("partial");
        assert_eq!(stream.line(), "");
        assert_eq!(stream.pending(), "partial");

        stream.write_str(" done\n");
        assert_eq!(stream.line(), "partial done");
        assert_eq!(stream.pending(), "");
    }

    #[test]
    fn blank_lines_do_not_erase_the_last_line() {
        let mut stream = LastLineStream::new();
        stream.write_str("kept\n\n\n");
        assert_eq!(stream.line(), "kept");
    }

    #[test]
    fn crlf_is_trimmed() {
        let mut stream = LastLineStream::new();
        stream.write_str("windows\r\n");
        assert_eq!(stream.line(), "windows");
    }

    #[test]
    fn io_write_and_term_stream_surface() {
        use std::io::Write as _;
        let mut stream = LastLineStream::new();
        stream.write_all(b"bytes\n").expect("write");
        assert_eq!(stream.line(), "bytes");
        assert!(!stream.is_tty());
        assert!(stream.close().is_ok());
    }
}
