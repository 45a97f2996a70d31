// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step extraction.

use crate::{
    ansi::sanitize, errors::ConvertError, options::ConversionOptions, record::ExecutionRecord,
    status::StatusResolver,
};
use xray_report::{RunStatus, Step};

/// Turns the reported steps of an execution into Xray steps.
///
/// A step is reported if one of the configured categories contains its
/// category. Steps that are not reported never surface as failures.
pub fn extract_steps(
    record: &ExecutionRecord,
    options: &ConversionOptions,
    resolver: &StatusResolver<'_>,
) -> Result<Vec<Step>, ConvertError> {
    let mut steps = Vec::new();
    for step in &record.steps {
        if !options
            .step_categories()
            .iter()
            .any(|category| category.contains(step.category.as_str()))
        {
            continue;
        }

        let step = match &step.error {
            Some(error) => {
                let stack = sanitize(error.stack.as_deref());
                let actual_result = options
                    .received_pattern()
                    .captures(&stack)
                    .and_then(|captures| captures.get(1))
                    .map(|m| m.as_str().to_owned())
                    .unwrap_or_default();
                Step {
                    status: resolver.resolve(&RunStatus::Failed)?,
                    comment: stack,
                    actual_result,
                }
            }
            None => Step {
                status: resolver.resolve(&RunStatus::Passed)?,
                comment: String::new(),
                actual_result: String::new(),
            },
        };
        steps.push(step);
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordError, RecordStep};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use xray_report::Dialect;

    fn step(category: &str, stack: Option<&str>) -> RecordStep {
        RecordStep {
            category: category.to_owned(),
            title: format!("{category} step"),
            error: stack.map(|stack| RecordError {
                message: Some("failed".to_owned()),
                stack: Some(stack.to_owned()),
                ..Default::default()
            }),
        }
    }

    fn record(steps: Vec<RecordStep>) -> ExecutionRecord {
        let start = Utc.timestamp_millis_opt(1_733_418_651_192).unwrap();
        let mut record = ExecutionRecord::new(RunStatus::Failed, start, 5);
        record.steps = steps;
        record
    }

    #[test]
    fn filters_by_category() {
        let record = record(vec![
            step("hook", Some("hook failed")),
            step("expect", None),
            step("pw:api", None),
            step("fixture", None),
            step("test.step", None),
        ]);
        let options = ConversionOptions::new(Dialect::Cloud);
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Cloud, &overrides);

        let steps = extract_steps(&record, &options, &resolver).unwrap();
        assert_eq!(steps.len(), 3, "hook and fixture are dropped");
        assert!(steps.iter().all(|s| s.status == "PASSED"));
    }

    #[test]
    fn configured_category_may_contain_step_category() {
        let record = record(vec![step("api", None), step("expect", None)]);
        let mut options = ConversionOptions::new(Dialect::Cloud);
        options.set_step_categories(["pw:api"]);
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Cloud, &overrides);

        let steps = extract_steps(&record, &options, &resolver).unwrap();
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn failed_step_extracts_received_value() {
        let stack = "Error: \u{1b}[2mexpect(\u{1b}[22mreceived).toBe(expected)\n\nReceived string: \"Hello\"\n    at tests/a.spec.ts:4:5";
        let record = record(vec![step("expect", Some(stack))]);
        let options = ConversionOptions::new(Dialect::Server);
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Server, &overrides);

        let steps = extract_steps(&record, &options, &resolver).unwrap();
        assert_eq!(
            steps,
            vec![Step {
                status: "FAIL".to_owned(),
                comment: "Error: expect(received).toBe(expected)\n\nReceived string: \"Hello\"\n    at tests/a.spec.ts:4:5".to_owned(),
                actual_result: "Hello".to_owned(),
            }]
        );
    }

    #[test]
    fn failed_step_without_received_value() {
        let record = record(vec![step("expect", Some("Error: timed out"))]);
        let options = ConversionOptions::new(Dialect::Cloud);
        let overrides = IndexMap::new();
        let resolver = StatusResolver::new(Dialect::Cloud, &overrides);

        let steps = extract_steps(&record, &options, &resolver).unwrap();
        assert_eq!(steps[0].status, "FAILED");
        assert_eq!(steps[0].comment, "Error: timed out");
        assert_eq!(steps[0].actual_result, "");
    }
}
