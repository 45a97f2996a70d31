// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    errors::XrayImportExitCode,
    output::{OutputContext, OutputOpts, OutputWriter, StderrStyles},
};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use std::io::{BufWriter, Write};
use tracing::{info, warn};
use xray_convert::{
    config::XrayConfig,
    convert::convert,
    grouping::group_by_issue_key,
    payload::PayloadBuilder,
    record::read_titled_records,
    status::StatusResolver,
    summary::{DisplayRunDuration, RunResult, RunSummary},
    trim::trim_evidence,
};
use xray_report::{Dialect, Report};

/// Convert Playwright results into Xray JSON execution imports.
#[derive(Debug, Parser)]
#[command(
    version,
    bin_name = "xray-import",
    styles = crate::output::clap_styles::style(),
    max_term_width = 100
)]
pub struct XrayImportApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl XrayImportApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Convert(opts) => opts.exec(output, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert execution records into an Xray import payload
    ///
    /// Records are read from a JSON array of `{"title": ..., "result": ...}`
    /// objects. Each title must start with an issue key, e.g.
    /// `ABC-123 | logs in`; records without one are ignored.
    Convert(ConvertOpts),
}

#[derive(Debug, Args)]
struct ConvertOpts {
    /// JSON file with the titled execution records
    #[arg(long, short, value_name = "PATH")]
    input: Utf8PathBuf,

    /// TOML config file
    #[arg(long, short, value_name = "PATH", env = "XRAY_IMPORT_CONFIG")]
    config: Utf8PathBuf,

    /// Write the payload to this file [default: stdout]
    #[arg(long, short, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    /// Jira deployment to convert for, overriding `jira.type` in the config
    #[arg(long, value_enum, value_name = "TYPE")]
    dialect: Option<DialectOpt>,

    /// Write a run-result summary as JSON to this file
    #[arg(long, value_name = "PATH")]
    run_result: Option<Utf8PathBuf>,

    /// Browser recorded in the run-result summary
    #[arg(long, value_name = "NAME", requires = "run_result")]
    browser: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum DialectOpt {
    Cloud,
    Server,
}

impl From<DialectOpt> for Dialect {
    fn from(opt: DialectOpt) -> Self {
        match opt {
            DialectOpt::Cloud => Dialect::Cloud,
            DialectOpt::Server => Dialect::Server,
        }
    }
}

impl ConvertOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let mut config = XrayConfig::from_file(&self.config)?;
        if let Some(dialect) = self.dialect {
            config.set_dialect(dialect.into());
        }
        let options = config.conversion_options();
        let dialect = options.dialect();

        let records = read_titled_records(&self.input)?;
        let grouped = group_by_issue_key(records, config.issue_key_pattern());
        let tests = convert(&grouped, options)?;

        let mut builder = PayloadBuilder::new(dialect, config.report_settings(), Utc::now());
        for record in grouped.values().flatten() {
            builder.add_duration_millis(record.duration_millis);
        }
        let mut report = builder.build(tests);

        let resolver = StatusResolver::new(dialect, options.status_mapping());
        let summary = RunSummary::collect(&mut report, &resolver, options.flaky_marker())?;

        let trimmed = trim_evidence(&mut report, config.trim_settings())?;
        if !trimmed.is_empty() {
            warn!(
                "removed evidence from {} tests to stay under the size limit",
                trimmed.len()
            );
        }

        self.write_payload(&report, output_writer)?;

        if let Some(path) = &self.run_result {
            let mut run_result = RunResult::new(&report, &summary);
            if let Some(browser) = &self.browser {
                run_result.set_browser(browser.clone());
            }
            run_result.write(path)?;
        }

        log_summary(&report, &summary, &output.stderr_styles());
        Ok(XrayImportExitCode::OK)
    }

    fn write_payload(&self, report: &Report, output_writer: &mut OutputWriter) -> Result<()> {
        match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path).map_err(|err| {
                    ExpectedError::CreateOutputError {
                        path: path.clone(),
                        err,
                    }
                })?;
                let mut writer = BufWriter::new(file);
                report
                    .serialize(&mut writer)
                    .and_then(|()| writer.flush().map_err(Into::into))
                    .map_err(|err| ExpectedError::write_payload(Some(path.clone()), err))?;
                info!("wrote Xray payload to {}", path);
            }
            None => {
                let mut writer = output_writer.stdout_writer();
                report
                    .serialize(&mut writer)
                    .and_then(|()| writer.flush().map_err(Into::into))
                    .map_err(|err| ExpectedError::write_payload(None, err))?;
            }
        }
        Ok(())
    }
}

fn log_summary(report: &Report, summary: &RunSummary, styles: &StderrStyles) {
    let duration = report.info.finish_date - report.info.start_date;
    info!(
        "converted {} tests for {}: {} passed, {} failed, {} flaky, {} skipped",
        summary.total.style(styles.bold),
        report.info.test_plan_key.style(styles.bold),
        summary.passed.style(styles.pass),
        summary.failed.style(styles.fail),
        summary.flaky.style(styles.flaky),
        summary.skipped.style(styles.skip),
    );
    if duration.num_seconds() > 0 {
        info!(
            "run took {}",
            DisplayRunDuration(duration.num_milliseconds())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const CONFIG: &str = indoc! {r#"
        [jira]
        type = "cloud"

        [report]
        project-key = "ABC"
        test-plan = "ABC-100"
        test-execution = "ABC-200"
        summary = "Nightly run"

        [conversion]
        mark-flaky-with = "FLAKY"
    "#};

    const RECORDS: &str = indoc! {r#"
        [
            {
                "title": "ABC-1 | logs in",
                "result": {"status": "passed", "startTime": "2024-12-05T17:10:51.192Z", "duration": 14}
            },
            {
                "title": "ABC-2 | logs out",
                "result": {"status": "failed", "startTime": "2024-12-05T17:10:52.000Z", "duration": 20,
                           "errors": [{"message": "boom"}]}
            },
            {
                "title": "ABC-2 | logs out",
                "result": {"status": "passed", "startTime": "2024-12-05T17:10:53.000Z", "duration": 6, "retry": 1}
            },
            {
                "title": "untracked test",
                "result": {"status": "passed", "startTime": "2024-12-05T17:10:54.000Z", "duration": 100}
            }
        ]
    "#};

    fn setup() -> Utf8TempDir {
        let dir = camino_tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("xray.toml"), CONFIG).unwrap();
        std::fs::write(dir.path().join("records.json"), RECORDS).unwrap();
        dir
    }

    fn run(dir: &Utf8Path, extra: &[&str]) -> (Result<i32>, OutputWriter) {
        let config = dir.join("xray.toml");
        let input = dir.join("records.json");
        let mut args = vec![
            "xray-import",
            "--color",
            "never",
            "convert",
            "--config",
            config.as_str(),
            "--input",
            input.as_str(),
        ];
        args.extend_from_slice(extra);

        let app = XrayImportApp::try_parse_from(args).unwrap();
        let output = app.init_output();
        let mut writer = OutputWriter::new_test();
        let result = app.exec(output, &mut writer);
        (result, writer)
    }

    #[test]
    fn convert_to_stdout() {
        let dir = setup();
        let (result, writer) = run(dir.path(), &[]);
        assert_eq!(result.unwrap(), XrayImportExitCode::OK);

        let payload: Value = serde_json::from_slice(writer.stdout().unwrap()).unwrap();
        assert_eq!(payload["testExecutionKey"], "ABC-200");
        assert_eq!(payload["info"]["summary"], "Nightly run");
        assert_eq!(payload["info"]["project"], "ABC");
        assert_eq!(payload["info"]["testPlanKey"], "ABC-100");
        assert_eq!(payload["info"]["startDate"], "2024-12-05T17:10:51.192Z");
        assert_eq!(payload["info"]["finishDate"], "2024-12-05T17:10:51.232Z");

        let tests = payload["tests"].as_array().unwrap();
        let keys: Vec<_> = tests.iter().map(|t| t["testKey"].clone()).collect();
        assert_eq!(keys, [json!("ABC-1"), json!("ABC-2")]);
        assert_eq!(tests[0]["status"], "PASSED");
        assert_eq!(tests[1]["status"], "FLAKY");
        assert_eq!(tests[1]["iterations"][0]["status"], "FAILED");
        assert_eq!(
            tests[1]["comment"],
            r#"Iteration 1: [{"message":"boom"}]"#
        );
    }

    #[test]
    fn convert_to_files_with_server_override() {
        let dir = setup();
        let payload_path = dir.path().join("payload.json");
        let run_result_path = dir.path().join("run-result.json");
        let (result, writer) = run(
            dir.path(),
            &[
                "--dialect",
                "server",
                "--output",
                payload_path.as_str(),
                "--run-result",
                run_result_path.as_str(),
                "--browser",
                "chromium",
            ],
        );
        assert_eq!(result.unwrap(), XrayImportExitCode::OK);
        assert_eq!(writer.stdout(), Some(&[][..]), "nothing written to stdout");

        let payload: Value =
            serde_json::from_str(&std::fs::read_to_string(&payload_path).unwrap()).unwrap();
        assert_eq!(payload["tests"][0]["status"], "PASS");
        assert!(payload["tests"][0].get("evidences").is_some());

        let run_result: Value =
            serde_json::from_str(&std::fs::read_to_string(&run_result_path).unwrap()).unwrap();
        assert_eq!(
            run_result,
            json!({
                "browser": "chromium",
                "testPlan": "ABC-100",
                "testDuration": 40,
                "testsRun": 2,
                "testsPassed": 1,
                "testsFailed": 0,
                "flakyTests": 1,
                "skippedTests": 0,
            })
        );
    }

    #[test]
    fn environment_variables_share_a_prefix() {
        use clap::CommandFactory;

        let command = XrayImportApp::command();
        let convert = command
            .find_subcommand("convert")
            .expect("convert subcommand exists");
        let mut env_vars: Vec<_> = command
            .get_arguments()
            .chain(convert.get_arguments())
            .filter_map(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
            .collect();
        env_vars.push(crate::output::LOG_ENV.to_owned());
        env_vars.sort();
        env_vars.dedup();

        assert_eq!(
            env_vars,
            [
                "XRAY_IMPORT_COLOR",
                "XRAY_IMPORT_CONFIG",
                "XRAY_IMPORT_LOG",
                "XRAY_IMPORT_VERBOSE",
            ]
        );
    }

    #[test]
    fn missing_input_is_an_input_error() {
        let dir = setup();
        std::fs::remove_file(dir.path().join("records.json")).unwrap();
        let (result, _) = run(dir.path(), &[]);
        let error = result.unwrap_err();
        assert!(
            matches!(error, ExpectedError::ReadRecordsError { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.process_exit_code(), XrayImportExitCode::INPUT_ERROR);
    }

    #[test]
    fn invalid_config_is_a_setup_error() {
        let dir = setup();
        std::fs::write(dir.path().join("xray.toml"), "[jira]\ntype = \"datacenter\"\n").unwrap();
        let (result, _) = run(dir.path(), &[]);
        let error = result.unwrap_err();
        assert_eq!(error.process_exit_code(), XrayImportExitCode::SETUP_ERROR);
    }
}
