// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::LineBuffer;

fn all_lines(input: &[u8]) -> Vec<String> {
    let mut buffer = LineBuffer::new();
    buffer.add(input);
    buffer.next_lines(true).collect()
}

#[test]
fn test_utf8_passthrough() {
    let lines = all_lines("Hello, 世界!".as_bytes());
    insta::assert_snapshot!(lines.join("\n"), @"Hello, 世界!");
}

#[test]
fn test_invalid_utf8_is_replaced() {
    insta::assert_snapshot!(all_lines(b"caf\xe9").join("\n"), @"caf�");
}

#[test]
fn test_crlf_and_lf() {
    assert_eq!(all_lines(b"line1\r\nline2\nline3"), ["line1", "line2", "line3"]);
}

#[test]
fn test_empty_lines_skipped() {
    assert_eq!(all_lines(b"\r\nline1\n\n\nline2\n"), ["line1", "line2"]);
}

#[test]
fn test_incremental() {
    let mut buffer = LineBuffer::new();

    buffer.add(b"line1\n");
    let phase1: Vec<String> = buffer.next_lines(false).collect();

    buffer.add(b"line2\npar");
    let phase2: Vec<String> = buffer.next_lines(false).collect();

    buffer.add(b"tial");
    let phase3: Vec<String> = buffer.next_lines(true).collect();

    assert_eq!(phase1, ["line1"]);
    assert_eq!(phase2, ["line2"]);
    assert_eq!(phase3, ["partial"]);
}

#[test]
fn test_multibyte_char_split_across_chunks() {
    let text = "USERPROFILE=C:\\Users\\Zoë\r\n".as_bytes();
    let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;

    let mut buffer = LineBuffer::new();
    buffer.add(&text[..split]);
    let partial: Vec<String> = buffer.next_lines(false).collect();
    buffer.add(&text[split..]);
    let rest: Vec<String> = buffer.next_lines(true).collect();

    assert!(partial.is_empty());
    assert_eq!(rest, ["USERPROFILE=C:\\Users\\Zoë"]);
}
