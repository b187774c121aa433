// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered message chains.
//!
//! A chain received from the platform usually starts with a [`Source`]
//! marker carrying the message id and timestamp. Content-oriented access
//! ([`MessageChain::iter`], typed queries, [`MessageChain::to_text`]) skips
//! that marker; raw access ([`MessageChain::get`], indexing, `len`) does not.

use std::fmt;
use std::ops::Index;

use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SegmentError;
use crate::registry::SegmentRegistry;
use crate::segment::{Quote, Segment, SegmentKind, Source};

/// Ordered sequence of segments making up one message.
///
/// Invariant: a `Source` segment, if present, sits at index 0 and nowhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageChain {
    segments: Vec<Segment>,
}

impl MessageChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from segments, enforcing the `Source` placement invariant.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, SegmentError> {
        if let Some(index) = segments
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(i, s)| s.is_source().then_some(i))
        {
            return Err(SegmentError::MisplacedSource { index });
        }
        Ok(Self { segments })
    }

    /// Parse a raw JSON array with the process-wide registry.
    pub fn parse(raw: &Value) -> Result<Self, SegmentError> {
        SegmentRegistry::global().parse_chain(raw)
    }

    /// Render back to the raw JSON array form.
    pub fn render(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Raw length, counting a leading `Source`.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Raw indexed access; index 0 may be the `Source` marker.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// All segments, `Source` included.
    pub fn raw(&self) -> &[Segment] {
        &self.segments
    }

    fn content(&self) -> &[Segment] {
        match self.segments.first() {
            Some(first) if first.is_source() => &self.segments[1..],
            _ => &self.segments,
        }
    }

    /// Iterate content segments (a leading `Source` is skipped).
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.content().iter()
    }

    pub fn source(&self) -> Option<&Source> {
        self.segments.first().and_then(Source::from_segment)
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.first::<Quote>()
    }

    /// First content segment of kind `T`.
    pub fn first<T: SegmentKind>(&self) -> Option<&T> {
        self.iter().find_map(T::from_segment)
    }

    /// Every content segment of kind `T`.
    ///
    /// Each call starts a fresh scan, so the result can be re-requested freely.
    pub fn all<'a, T: SegmentKind + 'a>(&'a self) -> impl Iterator<Item = &'a T> {
        self.iter().filter_map(T::from_segment)
    }

    /// First content segment whose discriminator is `kind`.
    pub fn first_kind(&self, kind: &str) -> Option<&Segment> {
        self.iter().find(|s| s.kind() == kind)
    }

    /// Every content segment whose discriminator is `kind`.
    pub fn all_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.iter().filter(move |s| s.kind() == kind)
    }

    /// Whether any segment, `Source` included, is of kind `T`.
    pub fn contains<T: SegmentKind>(&self) -> bool {
        self.segments.iter().any(|s| T::from_segment(s).is_some())
    }

    /// Append one segment in place.
    ///
    /// A `Source` can only be appended to an empty chain.
    pub fn append(&mut self, segment: impl Into<Segment>) -> Result<&mut Self, SegmentError> {
        let segment = segment.into();
        if segment.is_source() && !self.segments.is_empty() {
            return Err(SegmentError::MisplacedSource {
                index: self.segments.len(),
            });
        }
        self.segments.push(segment);
        Ok(self)
    }

    /// Append the content segments of `other` in place (its `Source` is dropped).
    pub fn append_chain(&mut self, other: &MessageChain) -> &mut Self {
        self.segments.extend(other.iter().cloned());
        self
    }

    /// A new chain holding `self` followed by the content of `other`.
    ///
    /// Neither input is modified.
    pub fn concat(&self, other: &MessageChain) -> MessageChain {
        let mut out = self.clone();
        out.append_chain(other);
        out
    }

    /// Concatenate each content segment's own rendering.
    pub fn to_text(&self) -> String {
        self.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for MessageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.iter() {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Index<usize> for MessageChain {
    type Output = Segment;

    fn index(&self, index: usize) -> &Segment {
        &self.segments[index]
    }
}

impl<'a> IntoIterator for &'a MessageChain {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for MessageChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.segments.len()))?;
        for segment in &self.segments {
            seq.serialize_element(segment)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for MessageChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Value>::deserialize(deserializer)?;
        SegmentRegistry::global()
            .parse_list(raw)
            .map_err(D::Error::custom)
    }
}
