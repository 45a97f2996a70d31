// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use xray_convert::errors::{ConfigParseError, ConvertError, ReadRecordsError, WriteRunResultError};
use xray_report::SerializeError;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `xray-import` failures.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum XrayImportExitCode {}

impl XrayImportExitCode {
    /// No errors occurred and the payload was written.
    pub const OK: i32 = 0;

    /// The config file could not be read or was invalid.
    pub const SETUP_ERROR: i32 = 96;

    /// The input records could not be read.
    pub const INPUT_ERROR: i32 = 97;

    /// The records could not be converted into an import payload.
    pub const CONVERSION_FAILED: i32 = 100;

    /// Writing the payload or the run result produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// The #[error()] strings are short placeholders: errors are meant to be
// printed with display_to_stderr, which colorizes them.

/// An expected failure of an `xray-import` command.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("error reading records")]
    ReadRecordsError {
        #[from]
        err: ReadRecordsError,
    },
    #[error("conversion error")]
    ConvertError {
        #[from]
        err: ConvertError,
    },
    #[error("error serializing payload")]
    SerializeError {
        #[from]
        err: SerializeError,
    },
    #[error("error creating output file")]
    CreateOutputError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("error writing payload")]
    WritePayloadError {
        path: Option<Utf8PathBuf>,
        #[source]
        err: SerializeError,
    },
    #[error("error writing run result")]
    WriteRunResultError {
        #[from]
        err: WriteRunResultError,
    },
}

impl ExpectedError {
    pub(crate) fn write_payload(path: Option<Utf8PathBuf>, err: SerializeError) -> Self {
        Self::WritePayloadError { path, err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } => XrayImportExitCode::SETUP_ERROR,
            Self::ReadRecordsError { .. } => XrayImportExitCode::INPUT_ERROR,
            Self::ConvertError { .. } | Self::SerializeError { .. } => {
                XrayImportExitCode::CONVERSION_FAILED
            }
            Self::CreateOutputError { .. }
            | Self::WritePayloadError { .. }
            | Self::WriteRunResultError { .. } => XrayImportExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::ReadRecordsError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ConvertError { err } => {
                error!("failed to convert execution records");
                Some(err as &dyn Error)
            }
            Self::SerializeError { err } => {
                error!("failed to serialize the import payload");
                Some(err as &dyn Error)
            }
            Self::CreateOutputError { path, err } => {
                error!("failed to create `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::WritePayloadError { path, err } => {
                match path {
                    Some(path) => error!("failed to write payload to `{}`", path.style(styles.bold)),
                    None => error!("failed to write payload to stdout"),
                }
                Some(err as &dyn Error)
            }
            Self::WriteRunResultError { err } => {
                error!("{err}");
                err.source()
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn exit_codes() {
        let config_error = xray_convert::config::XrayConfig::from_toml_str(
            Utf8Path::new("xray.toml"),
            "[report]\nproject-key = \"ABC\"\n",
        )
        .unwrap_err();
        assert_eq!(
            ExpectedError::from(config_error).process_exit_code(),
            XrayImportExitCode::SETUP_ERROR
        );

        let convert_error = ConvertError::MissingAttachmentPath {
            attachment: "trace".to_owned(),
        };
        assert_eq!(
            ExpectedError::from(convert_error).process_exit_code(),
            XrayImportExitCode::CONVERSION_FAILED
        );

        let write_error = ExpectedError::CreateOutputError {
            path: "out/payload.json".into(),
            err: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(
            write_error.process_exit_code(),
            XrayImportExitCode::WRITE_OUTPUT_ERROR
        );
    }
}
