// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of grouped execution records into report entries.

use crate::{
    ansi::sanitize,
    errors::ConvertError,
    evidence::collect_evidence,
    metadata::recover_iteration_parameters,
    options::ConversionOptions,
    record::{ErrorLocation, ExecutionRecord, GroupedResults, RecordError},
    status::StatusResolver,
    steps::extract_steps,
};
use tracing::debug;
use xray_report::{Iteration, Parameter, TestResults, XrayTest};

/// Converts execution records grouped by issue key into one report entry per key.
///
/// Entries are returned in the order of `grouped`. A key with a single record
/// becomes an entry with steps; a key with several records becomes an entry
/// with one iteration per record, whether the records are retries or
/// data-driven cases.
pub fn convert(
    grouped: &GroupedResults,
    options: &ConversionOptions,
) -> Result<Vec<XrayTest>, ConvertError> {
    let resolver = StatusResolver::new(options.dialect(), options.status_mapping());
    let mut tests = Vec::with_capacity(grouped.len());
    for (issue_key, records) in grouped {
        match convert_group(issue_key, records, options, &resolver)? {
            Some(test) => tests.push(test),
            None => debug!("skipping {issue_key}: no execution records"),
        }
    }
    Ok(tests)
}

fn convert_group(
    issue_key: &str,
    records: &[ExecutionRecord],
    options: &ConversionOptions,
    resolver: &StatusResolver<'_>,
) -> Result<Option<XrayTest>, ConvertError> {
    if records.is_empty() {
        return Ok(None);
    }
    let status = resolver.resolve(&StatusResolver::aggregate(records))?;

    let test = match records {
        [record] => {
            debug!(
                "converting {issue_key}: single execution with status {}",
                record.status
            );
            let steps = extract_steps(record, options, resolver)?;
            let mut test = XrayTest::new(
                issue_key,
                options.dialect(),
                status,
                record.start_time,
                record.finish_time(),
                TestResults::Steps(steps),
            );
            if let Some(comment) = error_comment(&record.errors) {
                test.set_comment(comment);
            }
            test.add_evidence(collect_evidence(record, options.upload(), None)?);
            test
        }
        [first, rest @ ..] => {
            debug!(
                "converting {issue_key}: {} executions as iterations",
                records.len()
            );
            // Start and finish are computed independently: the earliest
            // start and the latest finish need not belong to the same record.
            let start = rest
                .iter()
                .map(|r| r.start_time)
                .fold(first.start_time, |a, b| a.min(b));
            let finish = rest
                .iter()
                .map(ExecutionRecord::finish_time)
                .fold(first.finish_time(), |a, b| a.max(b));

            let mut iterations = Vec::with_capacity(records.len());
            let mut comments = Vec::new();
            let mut evidence = Vec::new();
            for (index, record) in records.iter().enumerate() {
                let number = index + 1;
                let mut parameters = vec![Parameter::new("iteration", number.to_string())];
                parameters.extend(recover_iteration_parameters(record)?);
                iterations.push(Iteration {
                    parameters,
                    status: resolver.resolve(&record.status)?,
                    steps: extract_steps(record, options, resolver)?,
                });

                if let Some(comment) = error_comment(&record.errors) {
                    comments.push(format!("Iteration {number}: {comment}"));
                }

                let prefix = format!("iteration_{number}_");
                evidence.extend(collect_evidence(record, options.upload(), Some(&prefix))?);
            }

            let mut test = XrayTest::new(
                issue_key,
                options.dialect(),
                status,
                start,
                finish,
                TestResults::Iterations(iterations),
            );
            if !comments.is_empty() {
                test.set_comment(comments.join("\n"));
            }
            test.add_evidence(evidence);
            test
        }
        [] => return Ok(None),
    };
    Ok(Some(test))
}

/// Returns the comment describing `errors`, or `None` if there are none.
///
/// The comment is the JSON array of the errors with escape sequences removed
/// from every string and escaped backslashes collapsed.
pub fn error_comment(errors: &[RecordError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }

    let sanitized: Vec<RecordError> = errors.iter().map(sanitize_error).collect();
    // Serializing plain strings and integers cannot fail.
    let serialized = serde_json::to_string(&sanitized).unwrap_or_default();
    Some(serialized.replace("\\\\", "\\"))
}

fn sanitize_error(error: &RecordError) -> RecordError {
    let sanitize_opt = |s: &Option<String>| s.as_deref().map(|s| sanitize(Some(s)));
    RecordError {
        message: sanitize_opt(&error.message),
        stack: sanitize_opt(&error.stack),
        location: error.location.as_ref().map(|location| ErrorLocation {
            file: sanitize(Some(&location.file)),
            column: location.column,
            line: location.line,
        }),
        snippet: sanitize_opt(&error.snippet),
    }
}
