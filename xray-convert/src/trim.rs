// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeping the serialized report under the upload size limit.

use tracing::warn;
use xray_report::{Report, SerializeError};

/// The default ceiling for the serialized report, in bytes.
pub const DEFAULT_EVIDENCE_SIZE_LIMIT: usize = 104_857_600;

/// Settings for [`trim_evidence`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrimSettings {
    /// The serialized report must be smaller than this many bytes.
    pub limit: usize,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EVIDENCE_SIZE_LIMIT,
        }
    }
}

/// Removes evidence from failing tests until the serialized report is under the limit.
///
/// Tests are visited from last to second; the first test and tests whose
/// status contains `PASS` keep their evidence. Returns the keys of the tests
/// whose evidence was removed, in the order they were visited.
pub fn trim_evidence(
    report: &mut Report,
    settings: TrimSettings,
) -> Result<Vec<String>, SerializeError> {
    let mut trimmed = Vec::new();
    if report.wire_size()? < settings.limit {
        return Ok(trimmed);
    }

    for index in (1..report.tests.len()).rev() {
        let test = &mut report.tests[index];
        if test.status.contains("PASS") {
            continue;
        }
        warn!("removing evidence from {}", test.test_key);
        test.evidence.clear();
        trimmed.push(test.test_key.clone());

        if report.wire_size()? < settings.limit {
            break;
        }
    }
    Ok(trimmed)
}
