// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for message chain parsing and registry setup.

use thiserror::Error;

/// Why a raw segment list could not be turned into a [`MessageChain`](crate::MessageChain).
///
/// Every element-level variant carries the index of the offending element.
/// A chain is only ever returned when every element parsed.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The raw chain was not a JSON array.
    #[error("message chain must be a JSON array")]
    NotAList,

    /// An element of the array was not a JSON object.
    #[error("segment {index} is not a JSON object")]
    NotAnObject { index: usize },

    /// The element has no string `type` discriminator.
    #[error("segment {index} has no `type` discriminator")]
    MissingType { index: usize },

    /// The discriminator is not registered.
    #[error("segment {index} has unknown type `{kind}`")]
    UnknownType { index: usize, kind: String },

    /// The discriminator is known but the fields do not match its shape.
    #[error("segment {index} (`{kind}`) is malformed: {source}")]
    InvalidShape {
        index: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// A `Source` marker appeared anywhere but index 0.
    #[error("`Source` marker at index {index}; only index 0 may carry it")]
    MisplacedSource { index: usize },
}

impl SegmentError {
    /// Index of the offending element, if the error is element-level.
    pub fn index(&self) -> Option<usize> {
        match self {
            SegmentError::NotAList => None,
            SegmentError::NotAnObject { index }
            | SegmentError::MissingType { index }
            | SegmentError::UnknownType { index, .. }
            | SegmentError::InvalidShape { index, .. }
            | SegmentError::MisplacedSource { index } => Some(*index),
        }
    }
}

/// Errors raised while assembling a [`SegmentRegistry`](crate::SegmentRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The discriminator already has a factory.
    #[error("segment type `{0}` is already registered")]
    DuplicateKind(String),

    /// A process-wide registry was already installed or already used.
    #[error("a global segment registry is already installed")]
    AlreadyInstalled,
}
