// SPDX-License-Identifier: MIT
//
// ANSI stripping and width measurement.
//
// Renderers need the *visible* width of styled text to lay out a line;
// escape bytes are zero-width. Stripping recognizes CSI sequences only
// (`ESC [ … final-byte`), which is exactly what this crate emits; lone,
// non-CSI, and unterminated escapes pass through untouched.

use std::borrow::Cow;
use std::time::Duration;

use unicode_width::UnicodeWidthStr;

const ESC: char = '\x1b';

// CSI sequences terminate at the first byte in `@` through `~`.
const fn is_csi_final(c: char) -> bool {
    matches!(c, '@'..='~')
}

/// Remove CSI escape sequences from `text`.
///
/// Zero-copy when the text contains none.
#[must_use]
pub fn no_color(text: &str) -> Cow<'_, str> {
    if !text.contains(ESC) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC && chars.peek() == Some(&'[') {
            chars.next();
            let mut params = String::new();
            let mut terminated = false;
            for c in chars.by_ref() {
                if is_csi_final(c) {
                    terminated = true;
                    break;
                }
                params.push(c);
            }
            // A sequence with no final byte is not a sequence; keep it.
            if !terminated {
                out.push(ESC);
                out.push('[');
                out.push_str(&params);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Byte-level variant of [`no_color`], for data not known to be UTF-8.
#[must_use]
pub fn no_color_bytes(data: &[u8]) -> Cow<'_, [u8]> {
    if !data.contains(&0x1b) {
        return Cow::Borrowed(data);
    }

    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == 0x1b && data.get(i + 1) == Some(&b'[') {
            let start = i;
            i += 2;
            let mut terminated = false;
            while i < data.len() {
                let byte = data[i];
                i += 1;
                if (0x40..=0x7e).contains(&byte) {
                    terminated = true;
                    break;
                }
            }
            if !terminated {
                out.extend_from_slice(&data[start..]);
            }
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    Cow::Owned(out)
}

/// Visible display width of `text` with CSI sequences ignored.
#[must_use]
pub fn len_color(text: &str) -> usize {
    no_color(text).width()
}

/// First defined delta as fractional seconds.
#[must_use]
pub fn coalesce_seconds(deltas: &[Option<Duration>]) -> Option<f64> {
    deltas
        .iter()
        .find_map(|delta| delta.map(|d| d.as_secs_f64()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_text_borrows() {
        let text = "no escapes here";
        assert!(matches!(no_color(text), Cow::Borrowed(_)));
        assert!(matches!(no_color_bytes(text.as_bytes()), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_sgr_sequences() {
        assert_eq!(no_color("\x1b[31mred\x1b[39m"), "red");
        assert_eq!(no_color("\x1b[38;5;196mdeep\x1b[0m red"), "deep red");
    }

    #[test]
    fn strips_cursor_movement() {
        assert_eq!(no_color("\x1b[2Aup\x1b[K"), "up");
        assert_eq!(no_color("a\x1b[1;1Hb"), "ab");
    }

    #[test]
    fn lone_escape_passes_through() {
        assert_eq!(no_color("a\x1bb"), "a\x1bb");
        // Non-CSI escape (charset selection) is untouched.
        assert_eq!(no_color("\x1b(Bx"), "\x1b(Bx");
        // Trailing ESC at end of input.
        assert_eq!(no_color("end\x1b"), "end\x1b");
    }

    #[test]
    fn unterminated_csi_is_left_intact() {
        // Without a final byte there is no sequence to strip.
        assert_eq!(no_color("a\x1b[38;5"), "a\x1b[38;5");
        assert_eq!(no_color("a\x1b["), "a\x1b[");
        assert_eq!(no_color_bytes(b"a\x1b[38;5").as_ref(), b"a\x1b[38;5");
    }

    #[test]
    fn bytes_variant_matches_text_variant() {
        let styled = "\x1b[1mbold\x1b[22m and \x1b[31mred\x1b[39m";
        assert_eq!(
            no_color_bytes(styled.as_bytes()).as_ref(),
            no_color(styled).as_bytes()
        );
    }

    #[test]
    fn bytes_variant_handles_non_utf8() {
        let data = b"\x1b[31m\xff\xfe\x1b[39m";
        assert_eq!(no_color_bytes(data).as_ref(), b"\xff\xfe");
    }

    #[test]
    fn len_color_ignores_escapes() {
        assert_eq!(len_color("\x1b[31mred\x1b[39m"), 3);
        assert_eq!(len_color("plain"), 5);
        // Wide characters count double.
        assert_eq!(len_color("\x1b[1m漢字\x1b[22m"), 4);
    }

    #[test]
    fn coalesce_seconds_takes_the_first_defined() {
        assert_eq!(coalesce_seconds(&[]), None);
        assert_eq!(coalesce_seconds(&[None, None]), None);
        assert_eq!(
            coalesce_seconds(&[None, Some(Duration::from_millis(1500)), Some(Duration::ZERO)]),
            Some(1.5)
        );
    }
}
