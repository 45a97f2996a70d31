// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evidence collection from execution attachments.

use crate::{
    errors::ConvertError,
    options::UploadFlags,
    record::{Attachment, ExecutionRecord},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use tracing::debug;
use xray_report::Evidence;

/// Collects the attachments of an execution that are selected for upload.
///
/// Evidence is returned in attachment order, at most one item per attachment.
/// Filenames are the basename of the attachment path, preceded by `prefix`.
pub fn collect_evidence(
    record: &ExecutionRecord,
    upload: UploadFlags,
    prefix: Option<&str>,
) -> Result<Vec<Evidence>, ConvertError> {
    record
        .attachments
        .iter()
        .filter(|attachment| upload.selects(&attachment.name))
        .map(|attachment| read_evidence(attachment, prefix.unwrap_or_default()))
        .collect()
}

fn read_evidence(attachment: &Attachment, prefix: &str) -> Result<Evidence, ConvertError> {
    let path = attachment
        .path
        .as_ref()
        .ok_or_else(|| ConvertError::MissingAttachmentPath {
            attachment: attachment.name.clone(),
        })?;
    let contents = std::fs::read(path).map_err(|error| ConvertError::AttachmentRead {
        path: path.clone(),
        error,
    })?;
    debug!(
        "collected attachment `{}` from {path} ({} bytes)",
        attachment.name,
        contents.len()
    );

    let basename = path.file_name().unwrap_or(path.as_str());
    Ok(Evidence {
        data: BASE64.encode(contents),
        filename: format!("{prefix}{basename}"),
        content_type: attachment.content_type.clone(),
    })
}
