// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message data model for the mahmock gateway.
//!
//! - [`segment`]: the flat segment shapes and their text renderings.
//! - [`registry`]: discriminator → factory table used for parsing.
//! - [`chain`]: ordered segment containers with typed queries.
//! - [`event`]: plain platform event records.

pub mod chain;
pub mod error;
pub mod event;
pub mod registry;
pub mod resource;
pub mod segment;

pub use chain::MessageChain;
pub use error::{RegistryError, SegmentError};
pub use event::Event;
pub use registry::SegmentRegistry;
pub use resource::{Nullable, RemoteResource};
pub use segment::{Segment, SegmentKind};
