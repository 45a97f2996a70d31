// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw execution records, as reported by the test runner.

use crate::errors::ReadRecordsError;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use xray_report::RunStatus;

/// One outcome of running a test once.
///
/// Retries and data-driven cases each produce their own record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// The status of this execution.
    pub status: RunStatus,

    /// The instant this execution started.
    pub start_time: DateTime<Utc>,

    /// How long this execution ran for, in milliseconds.
    #[serde(rename = "duration")]
    pub duration_millis: u64,

    /// Files and inline bodies attached during the execution, in attachment order.
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// The steps the execution went through.
    #[serde(default)]
    pub steps: Vec<RecordStep>,

    /// Errors raised by the execution.
    #[serde(default)]
    pub errors: Vec<RecordError>,

    /// The retry index. The first attempt is 0.
    #[serde(rename = "retry", default)]
    pub retry_index: u32,
}

impl ExecutionRecord {
    /// Creates a new record with no attachments, steps or errors.
    pub fn new(status: RunStatus, start_time: DateTime<Utc>, duration_millis: u64) -> Self {
        Self {
            status,
            start_time,
            duration_millis,
            attachments: vec![],
            steps: vec![],
            errors: vec![],
            retry_index: 0,
        }
    }

    /// Returns the instant this execution finished.
    pub fn finish_time(&self) -> DateTime<Utc> {
        let duration = i64::try_from(self.duration_millis)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        self.start_time
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A file or inline body attached to an execution.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The name of the attachment, e.g. `screenshot` or `xray-metadata`.
    pub name: String,

    /// The MIME type of the attachment.
    pub content_type: String,

    /// The file the attachment is stored in.
    #[serde(default)]
    pub path: Option<Utf8PathBuf>,

    /// The inline contents of the attachment.
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Option<Vec<u8>>,
}

impl Attachment {
    /// Creates an attachment stored in a file.
    pub fn from_path(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            path: Some(path.into()),
            body: None,
        }
    }

    /// Creates an attachment with inline contents.
    pub fn from_body(
        name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            path: None,
            body: Some(body.into()),
        }
    }
}

fn deserialize_body<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(String::into_bytes))
}

/// A step an execution went through.
#[derive(Clone, Debug, Deserialize)]
pub struct RecordStep {
    /// The category of the step, e.g. `expect`, `pw:api` or `test.step`.
    pub category: String,

    /// The title of the step.
    pub title: String,

    /// The error the step failed with, if it failed.
    #[serde(default)]
    pub error: Option<RecordError>,
}

/// An error raised by an execution or a step.
///
/// The serialized form of a list of these is what ends up in report comments,
/// so the field order here is significant.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct RecordError {
    /// The error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// Where the error was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ErrorLocation>,

    /// The source snippet around the location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A position in a source file.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct ErrorLocation {
    /// The file path.
    pub file: String,

    /// The 1-based column.
    pub column: u32,

    /// The 1-based line.
    pub line: u32,
}

/// Execution records grouped by issue key, in the order the keys were first seen.
///
/// The order of records within a group determines iteration numbering.
pub type GroupedResults = IndexMap<String, Vec<ExecutionRecord>>;

/// An execution record together with the title of the test that produced it.
#[derive(Clone, Debug, Deserialize)]
pub struct TitledRecord {
    /// The full title of the test, e.g. `ABC-123 | logs in`.
    pub title: String,

    /// The execution record.
    pub result: ExecutionRecord,
}

/// Reads a JSON array of titled execution records from `path`.
pub fn read_titled_records(path: &Utf8Path) -> Result<Vec<TitledRecord>, ReadRecordsError> {
    let contents = std::fs::read_to_string(path).map_err(|error| ReadRecordsError::Read {
        path: path.to_owned(),
        error,
    })?;
    let mut de = serde_json::Deserializer::from_str(&contents);
    serde_path_to_error::deserialize(&mut de).map_err(|error| ReadRecordsError::Parse {
        path: path.to_owned(),
        error,
    })
}
