// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping runner statuses to Xray statuses.

use crate::{errors::ConvertError, record::ExecutionRecord};
use indexmap::IndexMap;
use xray_report::{Dialect, RunStatus};

/// Translates runner statuses into Xray status tokens.
///
/// Overrides take precedence status by status; anything without an override
/// falls back to the dialect's default table.
#[derive(Clone, Copy, Debug)]
pub struct StatusResolver<'a> {
    dialect: Dialect,
    overrides: &'a IndexMap<String, String>,
}

impl<'a> StatusResolver<'a> {
    /// Creates a new resolver.
    pub fn new(dialect: Dialect, overrides: &'a IndexMap<String, String>) -> Self {
        Self { dialect, overrides }
    }

    /// Returns the Xray token for `status`.
    pub fn resolve(&self, status: &RunStatus) -> Result<String, ConvertError> {
        if let Some(token) = self.overrides.get(status.as_str()) {
            return Ok(token.clone());
        }
        self.dialect
            .adapter()
            .default_status(status)
            .map(str::to_owned)
            .ok_or_else(|| ConvertError::UnknownStatusMapping {
                status: status.to_string(),
                dialect: self.dialect,
            })
    }

    /// Returns the status a group of executions is reported with.
    ///
    /// A test that passed on any attempt counts as passed, even if other
    /// attempts failed.
    pub fn aggregate(records: &[ExecutionRecord]) -> RunStatus {
        if records.iter().all(|r| r.status.is_failure()) {
            RunStatus::Failed
        } else if records.iter().any(|r| r.status == RunStatus::Interrupted) {
            RunStatus::Interrupted
        } else if records.iter().all(|r| r.status == RunStatus::Skipped) {
            RunStatus::Skipped
        } else {
            RunStatus::Passed
        }
    }
}
