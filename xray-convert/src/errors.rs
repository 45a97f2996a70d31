// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the conversion engine.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::io;
use thiserror::Error;
use xray_report::Dialect;

/// An error that occurred while converting execution records into report entries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A runner status has neither an override nor a default mapping.
    #[error("status `{status}` has no mapping for Jira type `{dialect}`")]
    UnknownStatusMapping {
        /// The runner status that could not be mapped.
        status: String,

        /// The dialect that was being converted to.
        dialect: Dialect,
    },

    /// An attachment selected for upload does not point to a file.
    #[error("attachment `{attachment}` selected for upload has no file path")]
    MissingAttachmentPath {
        /// The name of the attachment.
        attachment: String,
    },

    /// An attachment file could not be read.
    #[error("failed to read attachment at `{path}`")]
    AttachmentRead {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An `xray-metadata` attachment did not hold the expected JSON object.
    #[error("invalid xray-metadata attachment")]
    InvalidMetadata {
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse Xray config at `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The config sources could not be merged.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// The merged config did not deserialize.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// A required key was not set.
    #[error("required key `{key}` is not set")]
    MissingKey {
        /// The dotted path of the key.
        key: &'static str,
    },

    /// A key holding a regular expression could not be compiled.
    #[error("invalid regex for `{key}`")]
    InvalidRegex {
        /// The dotted path of the key.
        key: &'static str,

        /// The underlying error.
        #[source]
        error: Box<regex::Error>,
    },
}

/// An error that occurred while reading titled execution records from disk.
#[derive(Debug, Error)]
pub enum ReadRecordsError {
    /// The file could not be read.
    #[error("failed to read execution records from `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The file did not contain an array of titled execution records.
    #[error("failed to parse execution records in `{path}`")]
    Parse {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error, along with the JSON path it occurred at.
        #[source]
        error: serde_path_to_error::Error<serde_json::Error>,
    },
}

/// An error that occurred while writing a run result.
#[derive(Debug, Error)]
pub enum WriteRunResultError {
    /// The run result could not be encoded.
    #[error("failed to serialize run result")]
    Serialize(#[source] serde_json::Error),

    /// The run result could not be written to disk.
    #[error("failed to write run result to `{path}`")]
    Write {
        /// The path that was written.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}
