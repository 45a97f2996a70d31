// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Dialect;
use thiserror::Error;

/// An error that occurs while serializing a [`Report`](crate::Report).
///
/// Returned by [`Report::serialize`](crate::Report::serialize) and
/// [`Report::to_string`](crate::Report::to_string).
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The report could not be encoded as JSON.
    #[error("error serializing Xray report")]
    Json(#[from] serde_json::Error),

    /// The encoded report could not be written out.
    #[error("error writing Xray report")]
    Io(#[from] std::io::Error),
}

/// Error returned while parsing a [`Dialect`] from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized Jira type: {input}\n(known values: {})",
    Dialect::variants().join(", "),
)]
pub struct DialectParseError {
    input: String,
}

impl DialectParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}
