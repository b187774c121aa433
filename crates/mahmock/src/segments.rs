// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment kinds the binary registers on top of the builtin set.

use std::fmt;

use serde::Deserialize;

use mahmock_message::{RegistryError, SegmentRegistry};

/// Store sticker.
#[derive(Debug, Deserialize)]
pub struct MarketFace {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for MarketFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[mirai:marketface:{},{}]", self.id, self.name)
    }
}

/// Raw mirai code, rendered verbatim.
#[derive(Debug, Deserialize)]
pub struct MiraiCode {
    pub code: String,
}

impl fmt::Display for MiraiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Builtin kinds plus `MarketFace` and `MiraiCode`.
pub fn registry() -> Result<SegmentRegistry, RegistryError> {
    let mut registry = SegmentRegistry::builtin();
    registry.register_extension::<MarketFace>("MarketFace")?;
    registry.register_extension::<MiraiCode>("MiraiCode")?;
    Ok(registry)
}
