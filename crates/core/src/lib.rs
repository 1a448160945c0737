// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kz-core: domain types for the kibitz presence watchdog.

pub mod macros;

pub mod clock;
pub mod event;
pub mod id;
pub mod identity;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::PresenceUpdate;
pub use id::{short, IdentityId};
pub use identity::TrackedIdentity;
#[cfg(any(test, feature = "test-support"))]
pub use identity::TrackedIdentityBuilder;
pub use time_fmt::{humanize_opt, humanize_since, rfc3339_from_epoch_ms};
