// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for xray-import.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    grouping::IssueKeyPattern,
    options::{ConversionOptions, DEFAULT_STEP_CATEGORIES, UploadFlags},
    payload::ReportSettings,
    trim::TrimSettings,
};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;
use xray_report::{Dialect, RunStatus};

/// Overall configuration for a conversion.
///
/// Read from a TOML file layered over [`XrayConfig::DEFAULT_CONFIG`], and
/// resolved into the pieces each stage of the conversion needs.
#[derive(Clone, Debug)]
pub struct XrayConfig {
    conversion: ConversionOptions,
    report: ReportSettings,
    trim: TrimSettings,
    issue_key_pattern: IssueKeyPattern,
    unknown_keys: BTreeSet<String>,
}

impl XrayConfig {
    /// Contains the default config as a TOML file.
    ///
    /// User configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file`, layered over the default config.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_file(config_file: &Utf8Path) -> Result<Self, ConfigParseError> {
        let builder = Self::make_default_config()
            .add_source(File::new(config_file.as_str(), FileFormat::Toml));
        Self::from_builder(config_file, &builder)
    }

    /// Parses the config from TOML text, layered over the default config.
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml_str(origin: &Utf8Path, toml: &str) -> Result<Self, ConfigParseError> {
        let builder = Self::make_default_config().add_source(File::from_str(toml, FileFormat::Toml));
        Self::from_builder(origin, &builder)
    }

    /// Returns the options for converting execution records.
    pub fn conversion_options(&self) -> &ConversionOptions {
        &self.conversion
    }

    /// Returns the run-level settings for the payload.
    pub fn report_settings(&self) -> &ReportSettings {
        &self.report
    }

    /// Returns the evidence trimming settings.
    pub fn trim_settings(&self) -> TrimSettings {
        self.trim
    }

    /// Returns the pattern that extracts issue keys from test titles.
    pub fn issue_key_pattern(&self) -> &IssueKeyPattern {
        &self.issue_key_pattern
    }

    /// Returns the keys in the config that were not recognized.
    pub fn unknown_keys(&self) -> &BTreeSet<String> {
        &self.unknown_keys
    }

    /// Overrides the dialect read from the config.
    pub fn set_dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.conversion.set_dialect(dialect);
        self
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn from_builder(
        config_file: &Utf8Path,
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigParseError> {
        let (deserialized, unknown_keys) = Self::build_and_deserialize_config(builder)
            .map_err(|kind| ConfigParseError::new(config_file, kind))?;

        for key in &unknown_keys {
            warn!("ignoring unknown configuration key in {config_file}: {key}");
        }

        deserialized
            .resolve(unknown_keys)
            .map_err(|kind| ConfigParseError::new(config_file, kind))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(XrayConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: XrayConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // serde_path_to_error already reports the key, so drop it
                // from the config error.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct XrayConfigDeserialize {
    jira: JiraDeserialize,
    #[serde(default)]
    report: ReportDeserialize,
    upload: UploadDeserialize,
    conversion: ConversionDeserialize,
    #[serde(default)]
    status_mapping: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct JiraDeserialize {
    #[serde(rename = "type")]
    dialect: Dialect,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportDeserialize {
    project_key: Option<String>,
    test_plan: Option<String>,
    test_execution: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    version: Option<String>,
    revision: Option<String>,
    user: Option<String>,
    executed_by: Option<String>,
    #[serde(default)]
    test_environments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UploadDeserialize {
    screenshot: bool,
    trace: bool,
    video: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConversionDeserialize {
    #[serde(default = "default_step_categories")]
    step_categories: Vec<String>,
    received_pattern: String,
    mark_flaky_with: Option<String>,
    limit_evidence_size: usize,
    issue_key_pattern: String,
}

fn default_step_categories() -> Vec<String> {
    DEFAULT_STEP_CATEGORIES.iter().map(|&c| c.to_owned()).collect()
}

impl XrayConfigDeserialize {
    fn resolve(self, unknown_keys: BTreeSet<String>) -> Result<XrayConfig, ConfigParseErrorKind> {
        // Use the destructuring syntax to ensure that all fields are handled.
        let XrayConfigDeserialize {
            jira,
            report,
            upload,
            conversion,
            status_mapping,
        } = self;

        let received_pattern = compile("conversion.received-pattern", &conversion.received_pattern)?;
        let issue_key_pattern = compile("conversion.issue-key-pattern", &conversion.issue_key_pattern)?;

        let mut options = ConversionOptions::new(jira.dialect);
        options
            .set_step_categories(conversion.step_categories)
            .set_received_pattern(received_pattern)
            .set_upload(UploadFlags {
                screenshot: upload.screenshot,
                trace: upload.trace,
                video: upload.video,
            });
        for (status, xray_status) in status_mapping {
            options.add_status_mapping(canonical_status_name(status), xray_status);
        }
        if let Some(marker) = conversion.mark_flaky_with {
            options.set_flaky_marker(marker);
        }

        let report = ReportSettings {
            project_key: report
                .project_key
                .ok_or(ConfigParseErrorKind::MissingKey {
                    key: "report.project-key",
                })?,
            test_plan: report
                .test_plan
                .ok_or(ConfigParseErrorKind::MissingKey {
                    key: "report.test-plan",
                })?,
            test_execution: report.test_execution,
            summary: report.summary,
            description: report.description,
            version: report.version,
            revision: report.revision,
            user: report.user,
            executed_by: report.executed_by,
            test_environments: report.test_environments,
        };

        Ok(XrayConfig {
            conversion: options,
            report,
            trim: TrimSettings {
                limit: conversion.limit_evidence_size,
            },
            issue_key_pattern: IssueKeyPattern::new(issue_key_pattern),
            unknown_keys,
        })
    }
}

// Config keys may lose their case on the way in, so known statuses are
// matched case-insensitively.
fn canonical_status_name(name: String) -> String {
    RunStatus::KNOWN
        .iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(&name))
        .map_or(name, |status| status.as_str().to_owned())
}

fn compile(key: &'static str, pattern: &str) -> Result<Regex, ConfigParseErrorKind> {
    Regex::new(pattern).map_err(|error| ConfigParseErrorKind::InvalidRegex {
        key,
        error: Box::new(error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trim::DEFAULT_EVIDENCE_SIZE_LIMIT;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn parse(toml: &str) -> Result<XrayConfig, ConfigParseError> {
        XrayConfig::from_toml_str(Utf8Path::new("xray.toml"), toml)
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(indoc! {r#"
            [report]
            project-key = "ABC"
            test-plan = "ABC-100"
        "#})
        .unwrap();

        let options = config.conversion_options();
        assert_eq!(options.dialect(), Dialect::Cloud);
        assert_eq!(options.step_categories(), ["expect", "pw:api", "test.step"]);
        assert_eq!(options.upload(), UploadFlags::default());
        assert_eq!(options.flaky_marker(), None);
        assert!(options.status_mapping().is_empty());
        assert_eq!(
            options.received_pattern().as_str(),
            r#"Received string: "(.*?)"\n"#
        );
        assert_eq!(config.trim_settings().limit, DEFAULT_EVIDENCE_SIZE_LIMIT);
        assert_eq!(
            config.issue_key_pattern().issue_key("ABC-1 | test"),
            Some("ABC-1")
        );
        assert_eq!(
            config.report_settings(),
            &ReportSettings {
                project_key: "ABC".to_owned(),
                test_plan: "ABC-100".to_owned(),
                ..Default::default()
            }
        );
        assert!(config.unknown_keys().is_empty());
    }

    #[test]
    fn full_config() {
        let config = parse(indoc! {r#"
            [jira]
            type = "server"

            [report]
            project-key = "ABC"
            test-plan = "ABC-100"
            test-execution = "ABC-200"
            summary = "Nightly"
            description = "main branch"
            version = "1.2.3"
            revision = "abc123"
            user = "jdoe"
            executed-by = "qa-bot"
            test-environments = ["chromium", "linux"]

            [upload]
            screenshot = true
            video = true

            [conversion]
            step-categories = ["test.step"]
            received-pattern = 'Got: (\w+)'
            mark-flaky-with = "FLAKY"
            limit-evidence-size = 1024
            issue-key-pattern = '^\[(\w+-\d+)\]'

            [status-mapping]
            passed = "OK"
            failed = "NOK"
            timedout = "TIMEOUT"
        "#})
        .unwrap();

        let options = config.conversion_options();
        assert_eq!(options.dialect(), Dialect::Server);
        assert_eq!(options.step_categories(), ["test.step"]);
        assert_eq!(
            options.upload(),
            UploadFlags {
                screenshot: true,
                trace: false,
                video: true,
            }
        );
        assert_eq!(options.flaky_marker(), Some("FLAKY"));
        assert_eq!(
            options.status_mapping().get(RunStatus::Failed.as_str()),
            Some(&"NOK".to_owned())
        );
        assert_eq!(
            options.status_mapping().get("timedOut"),
            Some(&"TIMEOUT".to_owned())
        );
        assert_eq!(config.trim_settings().limit, 1024);
        assert_eq!(
            config.issue_key_pattern().issue_key("[ABC-7] logs in"),
            Some("ABC-7")
        );

        let report = config.report_settings();
        assert_eq!(report.test_execution.as_deref(), Some("ABC-200"));
        assert_eq!(report.executed_by.as_deref(), Some("qa-bot"));
        assert_eq!(report.test_environments, ["chromium", "linux"]);
    }

    #[test]
    fn unknown_keys_are_collected() {
        let config = parse(indoc! {r#"
            [report]
            project-key = "ABC"
            test-plan = "ABC-100"
            proxy = "http://localhost"

            [upload]
            screenshots = true
        "#})
        .unwrap();

        let unknown: Vec<_> = config.unknown_keys().iter().map(String::as_str).collect();
        assert_eq!(unknown, ["report.proxy", "upload.screenshots"]);
    }

    #[test_case(
        "[report]\ntest-plan = \"ABC-100\"\n",
        "required key `report.project-key` is not set"
        ; "missing project key"
    )]
    #[test_case(
        "[report]\nproject-key = \"ABC\"\n",
        "required key `report.test-plan` is not set"
        ; "missing test plan"
    )]
    #[test_case(
        "[report]\nproject-key = \"ABC\"\ntest-plan = \"ABC-100\"\n[conversion]\nreceived-pattern = '(unclosed'\n",
        "invalid regex for `conversion.received-pattern`"
        ; "invalid regex"
    )]
    fn invalid_config(toml: &str, expected: &str) {
        let error = parse(toml).unwrap_err();
        assert_eq!(error.to_string(), "failed to parse Xray config at `xray.toml`");
        assert_eq!(error.kind().to_string(), expected);
    }

    #[test]
    fn invalid_dialect_names_the_key() {
        let error = parse(indoc! {r#"
            [jira]
            type = "datacenter"

            [report]
            project-key = "ABC"
            test-plan = "ABC-100"
        "#})
        .unwrap_err();

        match error.kind() {
            ConfigParseErrorKind::DeserializeError(error) => {
                assert_eq!(error.path().to_string(), "jira.type");
            }
            other => panic!("expected a deserialize error, found {other:?}"),
        }
    }

    #[test]
    fn default_config_has_no_unknown_keys() {
        let config = XrayConfig::make_default_config()
            .set_override("report.project-key", "ABC")
            .and_then(|builder| builder.set_override("report.test-plan", "ABC-1"))
            .unwrap();
        let (_, unknown) = XrayConfig::build_and_deserialize_config(&config).unwrap();
        assert!(unknown.is_empty(), "unknown keys in default config: {unknown:?}");
    }
}
