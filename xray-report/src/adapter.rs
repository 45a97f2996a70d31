// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two Xray flavors and the differences between them.

use crate::{DialectParseError, RunStatus};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The flavor of Xray a report is produced for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Xray for Jira Cloud.
    Cloud,

    /// Xray for Jira Server and Data Center.
    Server,
}

impl Dialect {
    /// Returns the schema adapter for this dialect.
    pub fn adapter(self) -> &'static dyn SchemaAdapter {
        match self {
            Dialect::Cloud => &CloudAdapter,
            Dialect::Server => &ServerAdapter,
        }
    }

    /// Returns the name of this dialect, as used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Cloud => "cloud",
            Dialect::Server => "server",
        }
    }

    /// Returns the names of all known dialects.
    pub fn variants() -> &'static [&'static str] {
        &["cloud", "server"]
    }
}

impl FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cloud" => Ok(Dialect::Cloud),
            "server" => Ok(Dialect::Server),
            other => Err(DialectParseError::new(other)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that differs between the cloud and server import formats.
///
/// An adapter is selected once per conversion through [`Dialect::adapter`];
/// code that lays out a report asks the adapter instead of matching on the
/// dialect itself.
pub trait SchemaAdapter: fmt::Debug + Send + Sync {
    /// The name of the field holding a test's evidence list.
    fn evidence_field(&self) -> &'static str;

    /// The status token Xray expects for a runner status, if there is one.
    fn default_status(&self, status: &RunStatus) -> Option<&'static str>;

    /// Formats an instant for `start`, `finish`, `startDate` and `finishDate`.
    fn format_instant(&self, instant: DateTime<Utc>) -> String;
}

/// The Jira Cloud import format.
#[derive(Copy, Clone, Debug, Default)]
pub struct CloudAdapter;

impl SchemaAdapter for CloudAdapter {
    fn evidence_field(&self) -> &'static str {
        "evidence"
    }

    fn default_status(&self, status: &RunStatus) -> Option<&'static str> {
        match status {
            RunStatus::Passed => Some("PASSED"),
            RunStatus::Failed | RunStatus::TimedOut => Some("FAILED"),
            RunStatus::Skipped => Some("SKIPPED"),
            RunStatus::Interrupted => Some("ABORTED"),
            RunStatus::Unknown(_) => None,
        }
    }

    // UTC with millisecond precision, e.g. 2024-12-05T17:10:51.192Z.
    fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// The Jira Server and Data Center import format.
#[derive(Copy, Clone, Debug, Default)]
pub struct ServerAdapter;

impl SchemaAdapter for ServerAdapter {
    fn evidence_field(&self) -> &'static str {
        "evidences"
    }

    fn default_status(&self, status: &RunStatus) -> Option<&'static str> {
        match status {
            RunStatus::Passed => Some("PASS"),
            RunStatus::Failed | RunStatus::TimedOut => Some("FAIL"),
            RunStatus::Skipped => Some("SKIPPED"),
            RunStatus::Interrupted => Some("ABORTED"),
            RunStatus::Unknown(_) => None,
        }
    }

    // Local offset with second precision, e.g. 2024-12-05T18:10:51+01:00.
    fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&Local)
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case(Dialect::Cloud, RunStatus::Passed, "PASSED")]
    #[test_case(Dialect::Cloud, RunStatus::TimedOut, "FAILED")]
    #[test_case(Dialect::Cloud, RunStatus::Interrupted, "ABORTED")]
    #[test_case(Dialect::Server, RunStatus::Passed, "PASS")]
    #[test_case(Dialect::Server, RunStatus::Failed, "FAIL")]
    #[test_case(Dialect::Server, RunStatus::TimedOut, "FAIL")]
    #[test_case(Dialect::Server, RunStatus::Skipped, "SKIPPED")]
    fn default_status_tables(dialect: Dialect, status: RunStatus, expected: &str) {
        assert_eq!(dialect.adapter().default_status(&status), Some(expected));
    }

    #[test]
    fn unknown_status_has_no_default() {
        for dialect in [Dialect::Cloud, Dialect::Server] {
            assert_eq!(
                dialect
                    .adapter()
                    .default_status(&RunStatus::Unknown("flaky".to_owned())),
                None,
                "{dialect} has no default for unknown statuses"
            );
        }
    }

    #[test]
    fn cloud_instants_are_utc_millis() {
        let instant = Utc.timestamp_millis_opt(1_733_418_651_192).unwrap();
        assert_eq!(
            Dialect::Cloud.adapter().format_instant(instant),
            "2024-12-05T17:10:51.192Z"
        );
    }

    #[test]
    fn server_instants_use_local_offset() {
        let instant = Utc.timestamp_millis_opt(1_733_418_651_192).unwrap();
        let formatted = Dialect::Server.adapter().format_instant(instant);

        // The offset depends on the machine running the tests, so check the
        // shape and that the instant survives.
        let parsed = DateTime::parse_from_rfc3339(&formatted).expect("server format is RFC 3339");
        assert_eq!(parsed.timestamp(), instant.timestamp());
        assert!(!formatted.contains('.'), "no sub-second precision: {formatted}");
        assert!(!formatted.ends_with('Z'), "numeric offset: {formatted}");
    }

    #[test]
    fn parse_dialect() {
        assert_eq!("cloud".parse::<Dialect>().unwrap(), Dialect::Cloud);
        assert_eq!("server".parse::<Dialect>().unwrap(), Dialect::Server);
        let error = "datacenter".parse::<Dialect>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "unrecognized Jira type: datacenter\n(known values: cloud, server)"
        );
    }
}
