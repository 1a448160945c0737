// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! IPC protocol between the `kz` CLI and the `kzd` daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod query;
mod request;
mod response;
mod types;
mod wire;

pub use query::Query;
pub use request::Request;
pub use response::Response;
pub use types::IdentitySummary;
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
pub use wire::{read_request, read_response, write_request, write_response};

#[cfg(test)]
mod property_tests;
