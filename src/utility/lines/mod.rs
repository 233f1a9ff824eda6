// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Line splitting of subprocess output.
//!
//! ```text
//! vswhere -utf8            --> UTF-8
//! chcp 65001 & vcvarsall   --> UTF-8
//!
//! LineBuffer: raw chunks --> complete lines --> String
//! ```
//!
//! Every child is made to write UTF-8. Invalid sequences become U+FFFD.

/// Accumulates raw output and yields complete, decoded lines.
///
/// ```
/// use msvc_fix::utility::lines::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
/// buffer.add(b"INCLUDE=C:\\inc\r\nPATH=C:\\bin");
///
/// let lines: Vec<String> = buffer.next_lines(true).collect();
/// assert_eq!(lines, ["INCLUDE=C:\\inc", "PATH=C:\\bin"]);
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    /// Offset of the first byte not yet returned as part of a line
    consumed: usize,
}

const fn is_break(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

impl LineBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            consumed: 0,
        }
    }

    pub fn add(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Returns an iterator over lines that haven't been returned yet.
    ///
    /// With `finished == false`, bytes after the last line break are held back
    /// for a later call, so a multi-byte character split across chunks is
    /// decoded whole. Empty lines are skipped; LF and CRLF both end a line.
    pub fn next_lines(&mut self, finished: bool) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.next_line(finished))
    }

    fn next_line(&mut self, finished: bool) -> Option<String> {
        let rest = &self.bytes[self.consumed..];
        let start = rest.iter().position(|&b| !is_break(b))?;
        let len = match rest[start..].iter().position(|&b| is_break(b)) {
            Some(len) => len,
            None if finished => rest.len() - start,
            None => {
                self.consumed += start;
                return None;
            }
        };

        let line = String::from_utf8_lossy(&rest[start..start + len]).into_owned();
        self.consumed += start + len;
        Some(line)
    }
}

#[cfg(test)]
mod tests;
