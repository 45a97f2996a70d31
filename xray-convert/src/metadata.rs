// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Xray metadata attached to executions by the tests themselves.
//!
//! A data-driven test can attach a JSON object such as
//! `{"parameters": {"user": "Bob"}}` under the name [`METADATA_ATTACHMENT`].
//! The parameters become the iteration parameters of that execution.

use crate::{errors::ConvertError, record::ExecutionRecord};
use indexmap::IndexMap;
use serde::Deserialize;
use std::borrow::Cow;
use xray_report::Parameter;

/// The name of the attachment holding Xray metadata.
pub const METADATA_ATTACHMENT: &str = "xray-metadata";

#[derive(Debug, Default, Deserialize)]
struct XrayMetadata {
    #[serde(default)]
    parameters: IndexMap<String, String>,
}

/// Returns the iteration parameters recorded in the execution's metadata
/// attachment, in the order the metadata lists them.
///
/// Executions without metadata have no extra parameters.
pub fn recover_iteration_parameters(
    record: &ExecutionRecord,
) -> Result<Vec<Parameter>, ConvertError> {
    let Some(attachment) = record
        .attachments
        .iter()
        .find(|attachment| attachment.name == METADATA_ATTACHMENT)
    else {
        return Ok(vec![]);
    };

    let body: Cow<'_, [u8]> = match (&attachment.body, &attachment.path) {
        (Some(body), _) => Cow::Borrowed(body),
        (None, Some(path)) => {
            let contents =
                std::fs::read(path).map_err(|error| ConvertError::AttachmentRead {
                    path: path.clone(),
                    error,
                })?;
            Cow::Owned(contents)
        }
        (None, None) => return Ok(vec![]),
    };

    let metadata: XrayMetadata = serde_json::from_slice(&body)
        .map_err(|error| ConvertError::InvalidMetadata { error })?;
    Ok(metadata
        .parameters
        .into_iter()
        .map(|(name, value)| Parameter::new(name, value))
        .collect())
}
