// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.
//!
//! Field names, status tokens and timestamps depend on the dialect, so the
//! report types implement `Serialize` by hand and consult the schema adapter.

use crate::{Dialect, Report, ReportInfo, SerializeError, TestResults, XrayTest};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::io;

pub(crate) fn serialize_report(
    report: &Report,
    mut writer: impl io::Write,
) -> Result<(), SerializeError> {
    serde_json::to_writer_pretty(&mut writer, report)?;

    // Add a trailing newline.
    writer.write_all(b"\n")?;
    Ok(())
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Use the destructuring syntax to ensure that all fields are handled.
        let Report {
            dialect,
            test_execution_key,
            info,
            tests,
        } = self;

        let mut map = serializer.serialize_map(None)?;
        if let Some(key) = test_execution_key {
            map.serialize_entry("testExecutionKey", key)?;
        }
        map.serialize_entry(
            "info",
            &InfoView {
                info,
                dialect: *dialect,
            },
        )?;
        map.serialize_entry("tests", tests)?;
        map.end()
    }
}

struct InfoView<'a> {
    info: &'a ReportInfo,
    dialect: Dialect,
}

impl Serialize for InfoView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ReportInfo {
            summary,
            project,
            test_plan_key,
            start_date,
            finish_date,
            description,
            version,
            user,
            revision,
            test_environments,
        } = self.info;
        let adapter = self.dialect.adapter();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("summary", summary)?;
        map.serialize_entry("project", project)?;
        if let Some(description) = description {
            map.serialize_entry("description", description)?;
        }
        if let Some(version) = version {
            map.serialize_entry("version", version)?;
        }
        if let Some(user) = user {
            map.serialize_entry("user", user)?;
        }
        if let Some(revision) = revision {
            map.serialize_entry("revision", revision)?;
        }
        map.serialize_entry("startDate", &adapter.format_instant(*start_date))?;
        map.serialize_entry("finishDate", &adapter.format_instant(*finish_date))?;
        map.serialize_entry("testPlanKey", test_plan_key)?;
        if !test_environments.is_empty() {
            map.serialize_entry("testEnvironments", test_environments)?;
        }
        map.end()
    }
}

impl Serialize for XrayTest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let XrayTest {
            test_key,
            dialect,
            status,
            start: _,
            finish: _,
            comment,
            executed_by,
            results,
            evidence,
        } = self;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("testKey", test_key)?;
        map.serialize_entry("start", &self.formatted_start())?;
        map.serialize_entry("finish", &self.formatted_finish())?;
        map.serialize_entry("status", status)?;
        if let Some(comment) = comment {
            map.serialize_entry("comment", comment)?;
        }
        if let Some(executed_by) = executed_by {
            map.serialize_entry("executedBy", executed_by)?;
        }
        match results {
            TestResults::Steps(steps) => map.serialize_entry("steps", steps)?,
            TestResults::Iterations(iterations) => {
                map.serialize_entry("iterations", iterations)?
            }
        }
        map.serialize_entry(dialect.adapter().evidence_field(), evidence)?;
        map.end()
    }
}
