// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Removal of terminal escape sequences from runner output.

use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

// Cursor save and restore, CSI sequences (7-bit `ESC [` and the 8-bit
// introducer) and OSC-style sequences terminated by BEL or ST. `ESC 7` and
// `ESC 8` come first so the text after them is not read as a CSI final byte.
static ANSI_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1B[78]|",
        r"[\x1B\x{9B}][\[\]()#;?]*",
        r"(?:(?:(?:(?:;[-a-zA-Z0-9/#&.:=?%@~_]+)*|[a-zA-Z0-9]+(?:;[-a-zA-Z0-9/#&.:=?%@~_]*)*)?(?:\x07|\x1B\x5C|\x{9C}))",
        r"|(?:(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-PR-TZcf-nq-uy=><~]))",
    ))
    .expect("ANSI sequence pattern is valid")
});

// Cursor movement and mode switches that the pattern above leaves behind.
static ESCAPE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1B(?:8|7|H|>|\[(?:\?[0-9]+(?:h|l)|[0-2]?(?:K|J)|[0-9]*(?:A|B|C|D|E|F|G|g|i|m|n|S|s|T|u)",
        r"|1000D[0-9]+|[0-9]*;[0-9]*(?:f|H|r|m)|[0-9]+;[0-9]+;[0-9]+m))",
    ))
    .expect("escape code pattern is valid")
});

/// Strips terminal escape sequences from `input`.
///
/// Absent input sanitizes to the empty string. The result contains no
/// sequences the patterns recognize, so sanitizing twice is the same as
/// sanitizing once.
pub fn sanitize(input: Option<&str>) -> String {
    match input {
        Some(input) => strip_escapes(input).into_owned(),
        None => String::new(),
    }
}

/// Strips terminal escape sequences from `input`, borrowing if there were none.
pub fn strip_escapes(input: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(input);
    // Removing one sequence can join the pieces of another, so repeat until
    // nothing changes.
    loop {
        let stripped = strip_once(&current);
        if stripped == current {
            return current;
        }
        current = Cow::Owned(stripped);
    }
}

fn strip_once(input: &str) -> String {
    let without_sequences = ANSI_SEQUENCE.replace_all(input, "");
    ESCAPE_CODE.replace_all(&without_sequences, "").into_owned()
}
