// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};

/// The outcome of a single test execution, as reported by the test runner.
///
/// Runners occasionally grow new outcomes. Those are kept around as
/// [`RunStatus::Unknown`] so that a status mapping can still translate them,
/// rather than failing at deserialization time.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum RunStatus {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed,

    /// The test ran past its timeout.
    TimedOut,

    /// The test was not run.
    Skipped,

    /// The run was interrupted before the test finished.
    Interrupted,

    /// A status this crate does not know about.
    Unknown(String),
}

impl RunStatus {
    /// The statuses every runner is expected to report.
    pub const KNOWN: [RunStatus; 5] = [
        RunStatus::Passed,
        RunStatus::Failed,
        RunStatus::TimedOut,
        RunStatus::Skipped,
        RunStatus::Interrupted,
    ];

    /// Returns the name of this status as the runner spells it.
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::TimedOut => "timedOut",
            RunStatus::Skipped => "skipped",
            RunStatus::Interrupted => "interrupted",
            RunStatus::Unknown(status) => status,
        }
    }

    /// Returns true if this status counts as a failed execution.
    ///
    /// Timeouts are failures.
    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failed | RunStatus::TimedOut)
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        match s {
            "passed" => RunStatus::Passed,
            "failed" => RunStatus::Failed,
            "timedOut" => RunStatus::TimedOut,
            "skipped" => RunStatus::Skipped,
            "interrupted" => RunStatus::Interrupted,
            other => RunStatus::Unknown(other.to_owned()),
        }
    }
}

impl FromStr for RunStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.as_str().into())
    }
}
