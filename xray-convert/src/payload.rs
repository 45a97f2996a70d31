// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the import payload.

use chrono::{DateTime, TimeDelta, Utc};
use xray_report::{Dialect, Report, ReportInfo, XrayTest};

/// Run-level information for the payload, usually read from configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReportSettings {
    /// The key of the Jira project.
    pub project_key: String,

    /// The test plan the execution belongs to.
    pub test_plan: String,

    /// The test execution to update, if any.
    pub test_execution: Option<String>,

    /// The summary of the test execution. Defaults to a dated summary.
    pub summary: Option<String>,

    /// The description of the test execution.
    pub description: Option<String>,

    /// The version under test.
    pub version: Option<String>,

    /// The revision under test.
    pub revision: Option<String>,

    /// The user who performed the run.
    pub user: Option<String>,

    /// The user every test is attributed to.
    pub executed_by: Option<String>,

    /// The environments the run covered.
    pub test_environments: Vec<String>,
}

/// Returns the summary used when none is configured.
pub fn default_summary(now: DateTime<Utc>) -> String {
    format!(
        "[{}] - Automated run",
        now.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Wraps converted tests into an import payload.
#[derive(Clone, Debug)]
pub struct PayloadBuilder<'a> {
    dialect: Dialect,
    settings: &'a ReportSettings,
    now: DateTime<Utc>,
    total_duration: TimeDelta,
}

impl<'a> PayloadBuilder<'a> {
    /// Creates a new builder. `now` is the instant used when there are no tests.
    pub fn new(dialect: Dialect, settings: &'a ReportSettings, now: DateTime<Utc>) -> Self {
        Self {
            dialect,
            settings,
            now,
            total_duration: TimeDelta::zero(),
        }
    }

    /// Adds the duration of an execution to the run.
    ///
    /// The finish date of the run is its start date plus every execution's
    /// duration.
    pub fn add_duration_millis(&mut self, millis: u64) -> &mut Self {
        let millis = i64::try_from(millis).unwrap_or(i64::MAX);
        let delta = TimeDelta::try_milliseconds(millis).unwrap_or(TimeDelta::MAX);
        self.total_duration = self
            .total_duration
            .checked_add(&delta)
            .unwrap_or(TimeDelta::MAX);
        self
    }

    /// Builds the payload around `tests`.
    pub fn build(&self, mut tests: Vec<XrayTest>) -> Report {
        let settings = self.settings;
        if let Some(executed_by) = &settings.executed_by {
            for test in &mut tests {
                test.set_executed_by(executed_by.clone());
            }
        }

        let start = tests.iter().map(|t| t.start).min().unwrap_or(self.now);
        let finish = start
            .checked_add_signed(self.total_duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let summary = settings
            .summary
            .clone()
            .unwrap_or_else(|| default_summary(self.now));
        let mut info = ReportInfo::new(
            summary,
            settings.project_key.clone(),
            settings.test_plan.clone(),
            start,
            finish,
        );
        if let Some(description) = &settings.description {
            info.set_description(description.clone());
        }
        if let Some(version) = &settings.version {
            info.set_version(version.clone());
        }
        if let Some(user) = &settings.user {
            info.set_user(user.clone());
        }
        if let Some(revision) = &settings.revision {
            info.set_revision(revision.clone());
        }
        info.add_test_environments(settings.test_environments.iter().cloned());

        let mut report = Report::new(self.dialect, info);
        if let Some(key) = &settings.test_execution {
            report.set_test_execution_key(key.clone());
        }
        report.add_tests(tests);
        report
    }
}
