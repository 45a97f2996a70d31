// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Playwright execution records into Xray execution imports.
//!
//! The flow of a conversion:
//!
//! 1. Titled records are grouped by issue key with [`grouping::group_by_issue_key`].
//! 2. [`convert::convert`] turns every group into an [`XrayTest`](xray_report::XrayTest),
//!    with iterations if the group has more than one record.
//! 3. [`payload::PayloadBuilder`] wraps the tests into a [`Report`](xray_report::Report).
//! 4. [`summary::RunSummary::collect`] counts outcomes and marks flaky tests.
//! 5. [`trim::trim_evidence`] keeps the serialized report under the upload limit.
//!
//! Options for every stage can be read from TOML with [`config::XrayConfig`].

#![warn(missing_docs)]

pub mod ansi;
pub mod config;
pub mod convert;
pub mod errors;
pub mod evidence;
pub mod grouping;
pub mod metadata;
pub mod options;
pub mod payload;
pub mod record;
pub mod status;
pub mod steps;
pub mod summary;
pub mod trim;
