// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run statistics and flaky-test detection.

use crate::{
    errors::{ConvertError, WriteRunResultError},
    status::StatusResolver,
};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;
use tracing::debug;
use xray_report::{Report, RunStatus, XrayTest};

/// Counts of test outcomes in a report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// The number of tests in the report, counting every issue key once.
    pub total: usize,

    /// Tests that passed on every attempt.
    pub passed: usize,

    /// Tests that failed.
    pub failed: usize,

    /// Tests that passed after failing at least once.
    pub flaky: usize,

    /// Tests that were skipped.
    pub skipped: usize,
}

impl RunSummary {
    /// Counts the outcomes of the tests in `report`.
    ///
    /// If `flaky_marker` is set, the status of every flaky test is replaced
    /// with it. Tests with a status outside the resolved passed, failed and
    /// skipped tokens are counted in `total` only.
    pub fn collect(
        report: &mut Report,
        resolver: &StatusResolver<'_>,
        flaky_marker: Option<&str>,
    ) -> Result<Self, ConvertError> {
        let passed = resolver.resolve(&RunStatus::Passed)?;
        let failed = resolver.resolve(&RunStatus::Failed)?;
        let timed_out = resolver.resolve(&RunStatus::TimedOut)?;
        let skipped = resolver.resolve(&RunStatus::Skipped)?;

        let mut summary = RunSummary {
            total: report.tests.len(),
            ..Default::default()
        };
        for test in &mut report.tests {
            if test.status == skipped {
                summary.skipped += 1;
            } else if test.status == passed {
                if is_flaky(test, &failed, &timed_out) {
                    debug!("{} is flaky", test.test_key);
                    summary.flaky += 1;
                    if let Some(marker) = flaky_marker {
                        test.status = marker.to_owned();
                    }
                } else {
                    summary.passed += 1;
                }
            } else if test.status == failed {
                summary.failed += 1;
            }
        }
        Ok(summary)
    }
}

fn is_flaky(test: &XrayTest, failed: &str, timed_out: &str) -> bool {
    test.iterations().is_some_and(|iterations| {
        iterations
            .iter()
            .any(|iteration| iteration.status == failed || iteration.status == timed_out)
    })
}

/// The run result written at the end of a run, for consumption by other tools.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// The browser the tests ran in, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    /// The test plan the run belongs to.
    pub test_plan: String,

    /// The duration of the run, in milliseconds.
    pub test_duration: i64,

    /// The number of tests in the report.
    pub tests_run: usize,

    /// Tests that passed on every attempt.
    pub tests_passed: usize,

    /// Tests that failed.
    pub tests_failed: usize,

    /// Tests that passed after failing at least once.
    pub flaky_tests: usize,

    /// Tests that were skipped.
    pub skipped_tests: usize,
}

impl RunResult {
    /// Creates a run result for `report` from its summary.
    pub fn new(report: &Report, summary: &RunSummary) -> Self {
        Self {
            browser: None,
            test_plan: report.info.test_plan_key.clone(),
            test_duration: (report.info.finish_date - report.info.start_date).num_milliseconds(),
            tests_run: summary.total,
            tests_passed: summary.passed,
            tests_failed: summary.failed,
            flaky_tests: summary.flaky,
            skipped_tests: summary.skipped,
        }
    }

    /// Sets the browser the tests ran in.
    pub fn set_browser(&mut self, browser: impl Into<String>) -> &mut Self {
        self.browser = Some(browser.into());
        self
    }

    /// Writes this run result to `path` as JSON.
    pub fn write(&self, path: &Utf8Path) -> Result<(), WriteRunResultError> {
        let json = serde_json::to_vec(self).map_err(WriteRunResultError::Serialize)?;
        std::fs::write(path, json).map_err(|error| WriteRunResultError::Write {
            path: path.to_owned(),
            error,
        })
    }
}

/// A run duration formatted as hours, minutes and seconds, e.g. `1h 2m 3s`.
///
/// Zero components are left out, and durations under a second format as an
/// empty string.
#[derive(Clone, Copy, Debug)]
pub struct DisplayRunDuration(pub i64);

impl fmt::Display for DisplayRunDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.0.max(0) / 1000;
        let minutes = seconds / 60;
        let hours = (minutes / 60) % 24;
        let (minutes, seconds) = (minutes % 60, seconds % 60);

        let mut parts = Vec::new();
        if hours != 0 {
            parts.push(format!("{hours}h"));
        }
        if minutes != 0 {
            parts.push(format!("{minutes}m"));
        }
        if seconds != 0 {
            parts.push(format!("{seconds}s"));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use xray_report::{Dialect, Iteration, Parameter, ReportInfo, TestResults};

    fn iteration(status: &str) -> Iteration {
        Iteration {
            parameters: vec![Parameter::new("iteration", "1")],
            status: status.to_owned(),
            steps: vec![],
        }
    }

    fn report(dialect: Dialect, tests: Vec<(&str, &str, TestResults)>) -> Report {
        let start = Utc.timestamp_millis_opt(1_733_418_651_192).unwrap();
        let finish = Utc.timestamp_millis_opt(1_733_418_653_925).unwrap();
        let mut report = Report::new(
            dialect,
            ReportInfo::new("run", "ABC", "ABC-100", start, finish),
        );
        for (key, status, results) in tests {
            report.add_test(XrayTest::new(key, dialect, status, start, finish, results));
        }
        report
    }

    #[test]
    fn counts_and_marks_flaky() {
        let mut report = report(
            Dialect::Cloud,
            vec![
                ("ABC-1", "PASSED", TestResults::Steps(vec![])),
                (
                    "ABC-2",
                    "PASSED",
                    TestResults::Iterations(vec![iteration("FAILED"), iteration("PASSED")]),
                ),
                ("ABC-3", "FAILED", TestResults::Steps(vec![])),
                ("ABC-4", "SKIPPED", TestResults::Steps(vec![])),
                ("ABC-5", "ABORTED", TestResults::Steps(vec![])),
            ],
        );
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Cloud, &overrides);

        let summary = RunSummary::collect(&mut report, &resolver, Some("FLAKY")).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                total: 5,
                passed: 1,
                failed: 1,
                flaky: 1,
                skipped: 1,
            }
        );
        assert_eq!(report.tests[1].status, "FLAKY");
        assert_eq!(report.tests[0].status, "PASSED");
    }

    #[test]
    fn flaky_without_marker_keeps_status() {
        let mut report = report(
            Dialect::Server,
            vec![(
                "ABC-2",
                "PASS",
                TestResults::Iterations(vec![iteration("FAIL"), iteration("PASS")]),
            )],
        );
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Server, &overrides);

        let summary = RunSummary::collect(&mut report, &resolver, None).unwrap();
        assert_eq!(summary.flaky, 1);
        assert_eq!(report.tests[0].status, "PASS");
    }

    #[test]
    fn run_result_json() {
        let report = report(Dialect::Cloud, vec![]);
        let summary = RunSummary {
            total: 4,
            passed: 1,
            failed: 1,
            flaky: 1,
            skipped: 1,
        };
        let mut result = RunResult::new(&report, &summary);
        result.set_browser("Chromium");

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "browser": "Chromium",
                "testPlan": "ABC-100",
                "testDuration": 2733,
                "testsRun": 4,
                "testsPassed": 1,
                "testsFailed": 1,
                "flakyTests": 1,
                "skippedTests": 1,
            })
        );
    }

    #[test_case(0, "" ; "zero")]
    #[test_case(999, "" ; "under a second")]
    #[test_case(2_733, "2s" ; "seconds")]
    #[test_case(3_723_000, "1h 2m 3s" ; "all components")]
    #[test_case(3_600_000, "1h" ; "hours only")]
    fn run_duration(millis: i64, expected: &str) {
        assert_eq!(DisplayRunDuration(millis).to_string(), expected);
    }
}
