// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! kz-adapters: HTTP-facing edges of the presence watchdog.
//!
//! Three concerns, one module each: sampling the presence stream, resolving
//! usernames against the profile directory, and delivering webhook POSTs.
//! Each trait ships a Fake behind `test-support` for other crates' tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod directory;
pub mod presence;
pub mod webhook;

pub use directory::{DirectoryAdapter, DirectoryError, HttpDirectoryAdapter, ProfileRecord};
pub use presence::{HttpPresenceAdapter, PresenceAdapter, PresenceError, StatusSample};
pub use webhook::{HttpWebhookAdapter, WebhookAdapter, WebhookError};

#[cfg(any(test, feature = "test-support"))]
pub use directory::FakeDirectoryAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use presence::FakePresenceAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use webhook::{FakeWebhookAdapter, WebhookCall};
