// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Options that control a conversion.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use xray_report::Dialect;

/// The step categories that are reported by default.
pub const DEFAULT_STEP_CATEGORIES: [&str; 3] = ["expect", "pw:api", "test.step"];

/// The default pattern used to extract the actual value from a failed step.
///
/// The first capture group is the value.
pub const DEFAULT_RECEIVED_PATTERN: &str = r#"Received string: "(.*?)"\n"#;

static DEFAULT_RECEIVED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_RECEIVED_PATTERN).expect("default received pattern is valid")
});

/// Which kinds of attachment are uploaded as evidence.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct UploadFlags {
    /// Upload attachments whose name contains `screenshot`.
    pub screenshot: bool,

    /// Upload attachments whose name contains `trace`.
    pub trace: bool,

    /// Upload attachments whose name contains `video`.
    pub video: bool,
}

impl UploadFlags {
    /// Returns true if an attachment with this name should be uploaded.
    pub fn selects(&self, attachment_name: &str) -> bool {
        (self.screenshot && attachment_name.contains("screenshot"))
            || (self.trace && attachment_name.contains("trace"))
            || (self.video && attachment_name.contains("video"))
    }
}

/// Options that control a single conversion.
#[derive(Clone, Debug)]
pub struct ConversionOptions {
    dialect: Dialect,
    step_categories: Vec<String>,
    received_pattern: Regex,
    upload: UploadFlags,
    status_mapping: IndexMap<String, String>,
    flaky_marker: Option<String>,
}

impl ConversionOptions {
    /// Creates options with the defaults for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            step_categories: DEFAULT_STEP_CATEGORIES
                .iter()
                .map(|&c| c.to_owned())
                .collect(),
            received_pattern: DEFAULT_RECEIVED_REGEX.clone(),
            upload: UploadFlags::default(),
            status_mapping: IndexMap::new(),
            flaky_marker: None,
        }
    }

    /// Sets the dialect.
    pub fn set_dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Replaces the step categories that are reported.
    pub fn set_step_categories(
        &mut self,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.step_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the pattern used to extract actual values from failed steps.
    pub fn set_received_pattern(&mut self, pattern: Regex) -> &mut Self {
        self.received_pattern = pattern;
        self
    }

    /// Sets which attachments are uploaded.
    pub fn set_upload(&mut self, upload: UploadFlags) -> &mut Self {
        self.upload = upload;
        self
    }

    /// Overrides the Xray status a runner status maps to.
    pub fn add_status_mapping(
        &mut self,
        status: impl Into<String>,
        xray_status: impl Into<String>,
    ) -> &mut Self {
        self.status_mapping.insert(status.into(), xray_status.into());
        self
    }

    /// Sets the status that flaky tests are reported with.
    pub fn set_flaky_marker(&mut self, marker: impl Into<String>) -> &mut Self {
        self.flaky_marker = Some(marker.into());
        self
    }

    /// Returns the dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the step categories that are reported.
    pub fn step_categories(&self) -> &[String] {
        &self.step_categories
    }

    /// Returns the pattern used to extract actual values from failed steps.
    pub fn received_pattern(&self) -> &Regex {
        &self.received_pattern
    }

    /// Returns which attachments are uploaded.
    pub fn upload(&self) -> UploadFlags {
        self.upload
    }

    /// Returns the status overrides, keyed by runner status.
    pub fn status_mapping(&self) -> &IndexMap<String, String> {
        &self.status_mapping
    }

    /// Returns the status flaky tests are reported with, if one is set.
    pub fn flaky_marker(&self) -> Option<&str> {
        self.flaky_marker.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(UploadFlags { screenshot: true, ..Default::default() }, "screenshot", true ; "screenshot enabled")]
    #[test_case(UploadFlags { screenshot: true, ..Default::default() }, "trace", false ; "trace disabled")]
    #[test_case(UploadFlags { trace: true, ..Default::default() }, "trace-1", true ; "name contains trace")]
    #[test_case(UploadFlags { video: true, trace: true, screenshot: true }, "xray-metadata", false ; "unrelated name")]
    #[test_case(UploadFlags::default(), "video", false ; "nothing enabled")]
    fn upload_selection(flags: UploadFlags, name: &str, expected: bool) {
        assert_eq!(flags.selects(name), expected);
    }

    #[test]
    fn default_received_pattern() {
        let options = ConversionOptions::new(Dialect::Cloud);
        let captures = options
            .received_pattern()
            .captures("Expected: \"a\"\nReceived string: \"b\"\n")
            .unwrap();
        assert_eq!(&captures[1], "b");
    }
}
