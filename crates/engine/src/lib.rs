// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! kz-engine: the presence watch loop.
//!
//! One cycle walks every pollable identity, takes a single sample from the
//! provider, and compares it against the last status this process observed.
//! A change becomes a [`Transition`]: the in-memory cache is updated first,
//! the snapshot is persisted, and the update fans out to IPC subscribers and
//! the identity's webhook. Failures stay contained to the identity (or cycle)
//! they happened in; the loop itself only stops on cancellation.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cache;
mod detect;
mod dispatch;
mod poller;

pub use cache::StatusCache;
pub use detect::{detect_transition, Transition};
pub use dispatch::Dispatcher;
pub use poller::Poller;
