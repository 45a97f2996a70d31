// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build and serialize Xray JSON execution imports in Rust.
//!
//! Xray ships in two flavors, Jira Cloud and Jira Server/Data Center, which
//! accept nearly the same import document with a handful of differences in
//! field names, status vocabulary and timestamp format. The types in this
//! crate describe the document once; the [`Dialect`] chosen for each
//! [`XrayTest`] decides how it is laid out on the wire.

#![warn(missing_docs)]

mod adapter;
mod errors;
mod report;
mod serialize;
mod status;

pub use adapter::*;
pub use errors::*;
pub use report::*;
pub use status::*;
