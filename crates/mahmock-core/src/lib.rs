// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the mahmock gateway.
//!
//! Provides the shared error type, protocol identifiers, and the
//! [`CommandHandler`] trait that injected command catalogues implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MahError;
pub use traits::{handler_fn, CommandHandler};
pub use types::{AccountId, ChannelMode, ConnectionId, HealthStatus, SessionToken};
