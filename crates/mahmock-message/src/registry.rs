// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discriminator → segment factory registry.
//!
//! The payload vocabulary is defined upstream and keeps growing, so parsing
//! goes through a runtime table instead of a fixed match. Every builtin kind
//! is pre-registered; new kinds are added with [`SegmentRegistry::register`]
//! or [`SegmentRegistry::register_extension`] before first use.
//!
//! A process can install one registry globally with
//! [`SegmentRegistry::install_global`]. Serde deserialization of
//! [`MessageChain`] (inside events, command payloads, quotes) uses it, and
//! falls back to [`SegmentRegistry::builtin`] when none was installed.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::chain::MessageChain;
use crate::error::{RegistryError, SegmentError};
use crate::segment::{
    App, At, AtAll, Dice, Extension, Face, File, FlashImage, Forward, Image, Json, MusicShare,
    Plain, Poke, Quote, Segment, SegmentKind, Source, Voice, Xml,
};

/// Builds a [`Segment`] from the raw object (discriminator included).
pub type SegmentFactory = Arc<dyn Fn(Value) -> Result<Segment, serde_json::Error> + Send + Sync>;

static GLOBAL: OnceLock<SegmentRegistry> = OnceLock::new();

/// Registry mapping a `type` discriminator to the factory for its shape.
#[derive(Clone)]
pub struct SegmentRegistry {
    factories: HashMap<String, SegmentFactory>,
}

impl fmt::Debug for SegmentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Default for SegmentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn typed<T>(raw: Value) -> Result<Segment, serde_json::Error>
where
    T: SegmentKind + DeserializeOwned + Into<Segment>,
{
    serde_json::from_value::<T>(raw).map(Into::into)
}

impl SegmentRegistry {
    /// A registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with every compiled-in kind registered.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert_builtin::<Source>();
        registry.insert_builtin::<Plain>();
        registry.insert_builtin::<At>();
        registry.insert_builtin::<AtAll>();
        registry.insert_builtin::<Face>();
        registry.insert_builtin::<Image>();
        registry.insert_builtin::<FlashImage>();
        registry.insert_builtin::<Voice>();
        registry.insert_builtin::<Xml>();
        registry.insert_builtin::<Json>();
        registry.insert_builtin::<App>();
        registry.insert_builtin::<Poke>();
        registry.insert_builtin::<Dice>();
        registry.insert_builtin::<MusicShare>();
        registry.insert_builtin::<File>();
        registry.insert_builtin::<Quote>();
        registry.insert_builtin::<Forward>();
        registry
    }

    fn insert_builtin<T>(&mut self)
    where
        T: SegmentKind + DeserializeOwned + Into<Segment> + 'static,
    {
        self.factories
            .insert(T::KIND.to_string(), Arc::new(typed::<T>));
    }

    /// Register a factory for a new discriminator.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(Value) -> Result<Segment, serde_json::Error> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.contains_key(&kind) {
            return Err(RegistryError::DuplicateKind(kind));
        }
        tracing::debug!(kind = %kind, "registering segment kind");
        self.factories.insert(kind, Arc::new(factory));
        Ok(())
    }

    /// Register an extension kind validated against the shape `T`.
    ///
    /// The raw fields must deserialize into `T`; the parsed segment keeps the
    /// raw fields (so rendering is lossless) and uses `T`'s `Display` as text.
    pub fn register_extension<T>(&mut self, kind: impl Into<String>) -> Result<(), RegistryError>
    where
        T: DeserializeOwned + fmt::Display + 'static,
    {
        let kind = kind.into();
        let ext_kind = kind.clone();
        self.register(kind, move |raw: Value| {
            let shape: T = serde_json::from_value(raw.clone())?;
            let mut fields = match raw {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            fields.remove("type");
            Ok(Segment::Extension(Extension {
                kind: ext_kind.clone(),
                fields,
                text: Some(shape.to_string()),
            }))
        })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered discriminators, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Parse one raw element; `index` is only used for error reporting.
    pub fn parse_segment(&self, raw: Value, index: usize) -> Result<Segment, SegmentError> {
        let kind = match &raw {
            Value::Object(map) => match map.get("type") {
                Some(Value::String(kind)) => kind.clone(),
                _ => return Err(SegmentError::MissingType { index }),
            },
            _ => return Err(SegmentError::NotAnObject { index }),
        };
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| SegmentError::UnknownType {
                index,
                kind: kind.clone(),
            })?;
        factory(raw).map_err(|source| SegmentError::InvalidShape {
            index,
            kind,
            source,
        })
    }

    /// Parse a raw JSON array into a chain. Fails atomically.
    pub fn parse_chain(&self, raw: &Value) -> Result<MessageChain, SegmentError> {
        match raw {
            Value::Array(items) => self.parse_list(items.iter().cloned()),
            _ => Err(SegmentError::NotAList),
        }
    }

    /// Parse an already-split list of raw elements into a chain.
    pub fn parse_list<I>(&self, items: I) -> Result<MessageChain, SegmentError>
    where
        I: IntoIterator<Item = Value>,
    {
        let segments = items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| self.parse_segment(raw, index))
            .collect::<Result<Vec<_>, _>>()?;
        MessageChain::from_segments(segments)
    }

    /// Install this registry as the process-wide one.
    ///
    /// Must happen before anything deserializes a chain; fails if a global
    /// registry was already installed or already lazily initialized.
    pub fn install_global(self) -> Result<(), RegistryError> {
        GLOBAL.set(self).map_err(|_| RegistryError::AlreadyInstalled)
    }

    /// The process-wide registry (builtin kinds unless one was installed).
    pub fn global() -> &'static SegmentRegistry {
        GLOBAL.get_or_init(SegmentRegistry::builtin)
    }
}
