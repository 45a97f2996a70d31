// Copyright (c) The xray-import Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Convert Playwright results into Xray JSON execution imports.
//!
//! `xray-import convert` reads a JSON array of `{title, result}` records,
//! groups them by the issue key in each title, and writes the import payload
//! for Jira Cloud or Jira Server. Delivering the payload to Xray is left to
//! other tools: this binary never talks to the network.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter};
