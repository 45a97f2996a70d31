// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping of execution records by issue key.

use crate::record::{GroupedResults, TitledRecord};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// The default pattern for extracting an issue key from a test title.
pub const DEFAULT_ISSUE_KEY_PATTERN: &str = r"^(.+?) \| ";

static DEFAULT_ISSUE_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_ISSUE_KEY_PATTERN).expect("default issue key pattern is valid")
});

/// Extracts issue keys from test titles such as `ABC-123 | logs in`.
///
/// The key is the first capture group of the pattern.
#[derive(Clone, Debug)]
pub struct IssueKeyPattern {
    regex: Regex,
}

impl IssueKeyPattern {
    /// Creates a pattern from a compiled regex.
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// Returns the issue key of `title`, if it has one.
    pub fn issue_key<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.regex
            .captures(title)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|key| !key.is_empty())
    }
}

impl Default for IssueKeyPattern {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUE_KEY_REGEX.clone())
    }
}

/// Groups titled records by issue key, in the order keys and records arrive.
///
/// Records whose title has no issue key are dropped.
pub fn group_by_issue_key(
    records: impl IntoIterator<Item = TitledRecord>,
    pattern: &IssueKeyPattern,
) -> GroupedResults {
    let mut grouped = GroupedResults::new();
    for TitledRecord { title, result } in records {
        match pattern.issue_key(&title) {
            Some(key) => grouped.entry(key.to_owned()).or_default().push(result),
            None => debug!("ignoring `{title}`: no issue key"),
        }
    }
    grouped
}
