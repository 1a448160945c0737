// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! kz-store: durable SQLite record store for tracked identities.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod store;

pub use store::{Store, StoreError};
