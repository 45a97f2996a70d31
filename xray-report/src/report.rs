// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Dialect, SerializeError, serialize::serialize_report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;

/// The root of an Xray execution import: run information plus the tests.
#[derive(Clone, Debug)]
pub struct Report {
    /// The dialect the report is laid out for.
    pub dialect: Dialect,

    /// The test execution to update. If unset, Xray creates a new execution.
    pub test_execution_key: Option<String>,

    /// Information about the run as a whole.
    pub info: ReportInfo,

    /// One entry per issue key.
    pub tests: Vec<XrayTest>,
}

impl Report {
    /// Creates a new, empty `Report`.
    pub fn new(dialect: Dialect, info: ReportInfo) -> Self {
        Self {
            dialect,
            test_execution_key: None,
            info,
            tests: vec![],
        }
    }

    /// Sets the test execution that this report updates.
    pub fn set_test_execution_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.test_execution_key = Some(key.into());
        self
    }

    /// Adds a test to this report.
    pub fn add_test(&mut self, test: XrayTest) -> &mut Self {
        self.tests.push(test);
        self
    }

    /// Adds several tests to this report.
    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = XrayTest>) -> &mut Self {
        self.tests.extend(tests);
        self
    }

    /// Serialize this report to the given writer as pretty-printed JSON.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_report(self, writer)
    }

    /// Serialize this report to a pretty-printed string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Returns the number of bytes this report occupies as compact JSON, which is
    /// the form it is uploaded in.
    pub fn wire_size(&self) -> Result<usize, SerializeError> {
        Ok(serde_json::to_vec(self)?.len())
    }
}

/// Information about a test run.
#[derive(Clone, Debug)]
pub struct ReportInfo {
    /// A short summary for the test execution issue.
    pub summary: String,

    /// The key of the Jira project the execution belongs to.
    pub project: String,

    /// The test plan the execution is associated with.
    pub test_plan_key: String,

    /// The instant the run started.
    pub start_date: DateTime<Utc>,

    /// The instant the run finished.
    pub finish_date: DateTime<Utc>,

    /// A description for the test execution issue.
    pub description: Option<String>,

    /// The version the run was performed against.
    pub version: Option<String>,

    /// The user who performed the run.
    pub user: Option<String>,

    /// The source code revision under test.
    pub revision: Option<String>,

    /// Test environments, e.g. browsers or operating systems.
    pub test_environments: Vec<String>,
}

impl ReportInfo {
    /// Creates a new `ReportInfo` for a run between the given instants.
    pub fn new(
        summary: impl Into<String>,
        project: impl Into<String>,
        test_plan_key: impl Into<String>,
        start_date: DateTime<Utc>,
        finish_date: DateTime<Utc>,
    ) -> Self {
        Self {
            summary: summary.into(),
            project: project.into(),
            test_plan_key: test_plan_key.into(),
            start_date,
            finish_date,
            description: None,
            version: None,
            user: None,
            revision: None,
            test_environments: vec![],
        }
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the version.
    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the user.
    pub fn set_user(&mut self, user: impl Into<String>) -> &mut Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the revision.
    pub fn set_revision(&mut self, revision: impl Into<String>) -> &mut Self {
        self.revision = Some(revision.into());
        self
    }

    /// Adds test environments.
    pub fn add_test_environments(
        &mut self,
        environments: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.test_environments
            .extend(environments.into_iter().map(Into::into));
        self
    }
}

/// A single report entry: everything Xray learns about one test issue.
///
/// An entry either carries the steps of a single execution, or one iteration
/// per execution when several executions share the issue key. Never both.
#[derive(Clone, Debug)]
pub struct XrayTest {
    /// The issue key of the test, e.g. `ABC-123`.
    pub test_key: String,

    /// The dialect this entry is laid out for.
    pub dialect: Dialect,

    /// The status token, in the vocabulary of the dialect (or a custom mapping).
    pub status: String,

    /// The instant the first execution started.
    pub start: DateTime<Utc>,

    /// The instant the last execution finished.
    pub finish: DateTime<Utc>,

    /// Failure diagnostics, if any were captured.
    pub comment: Option<String>,

    /// The user the execution is attributed to.
    pub executed_by: Option<String>,

    /// Steps or iterations.
    pub results: TestResults,

    /// Screenshots, traces and videos attached to this entry.
    ///
    /// Serialized as `evidence` for cloud and `evidences` for server.
    pub evidence: Vec<Evidence>,
}

impl XrayTest {
    /// Creates a new report entry.
    pub fn new(
        test_key: impl Into<String>,
        dialect: Dialect,
        status: impl Into<String>,
        start: DateTime<Utc>,
        finish: DateTime<Utc>,
        results: TestResults,
    ) -> Self {
        Self {
            test_key: test_key.into(),
            dialect,
            status: status.into(),
            start,
            finish,
            comment: None,
            executed_by: None,
            results,
            evidence: vec![],
        }
    }

    /// Sets the comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the user the execution is attributed to.
    pub fn set_executed_by(&mut self, executed_by: impl Into<String>) -> &mut Self {
        self.executed_by = Some(executed_by.into());
        self
    }

    /// Adds evidence to this entry.
    pub fn add_evidence(&mut self, evidence: impl IntoIterator<Item = Evidence>) -> &mut Self {
        self.evidence.extend(evidence);
        self
    }

    /// Returns the steps, if this entry describes a single execution.
    pub fn steps(&self) -> Option<&[Step]> {
        match &self.results {
            TestResults::Steps(steps) => Some(steps),
            TestResults::Iterations(_) => None,
        }
    }

    /// Returns the iterations, if this entry describes several executions.
    pub fn iterations(&self) -> Option<&[Iteration]> {
        match &self.results {
            TestResults::Steps(_) => None,
            TestResults::Iterations(iterations) => Some(iterations),
        }
    }

    /// Returns the formatted start instant, as it appears in the JSON.
    pub fn formatted_start(&self) -> String {
        self.dialect.adapter().format_instant(self.start)
    }

    /// Returns the formatted finish instant, as it appears in the JSON.
    pub fn formatted_finish(&self) -> String {
        self.dialect.adapter().format_instant(self.finish)
    }
}

/// The detail recorded for a report entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestResults {
    /// The steps of a single execution.
    Steps(Vec<Step>),

    /// One iteration per execution.
    Iterations(Vec<Iteration>),
}

/// One execution inside a report entry that groups several executions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    /// The parameters of this iteration. The first is always `iteration`.
    pub parameters: Vec<Parameter>,

    /// The status token of this iteration.
    pub status: String,

    /// The steps of this iteration.
    pub steps: Vec<Step>,
}

/// A named parameter value of an iteration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// The name of the parameter.
    pub name: String,

    /// The value of the parameter.
    pub value: String,
}

impl Parameter {
    /// Creates a new `Parameter` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Parameter
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Parameter::new(k, v)
    }
}

/// The result of one step of an execution.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// The status token of this step.
    pub status: String,

    /// The failure text, or empty if the step passed.
    pub comment: String,

    /// The value the step actually observed, if the failure text named one.
    pub actual_result: String,
}

/// A file attached to a report entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// The file contents, base64-encoded.
    pub data: String,

    /// The name the file is shown under.
    pub filename: String,

    /// The MIME type of the file.
    pub content_type: String,
}
