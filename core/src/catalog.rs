//! Static catalog of selectable Whisper model variants.
//!
//! Pure data: every variant pairs a stable identifier with its approximate
//! ggml weight size. Entry order is display order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier for a selectable model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    Tiny,
    TinyEn,
    #[default]
    Base,
    BaseEn,
    Small,
    SmallEn,
    Medium,
    MediumEn,
    LargeV3,
    LargeV3Turbo,
}

/// One catalog row: an identifier and its approximate size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: ModelId,
    pub size_bytes: u64,
}

const fn entry(id: ModelId) -> ModelEntry {
    ModelEntry {
        id,
        size_bytes: id.size_bytes(),
    }
}

static ENTRIES: [ModelEntry; 10] = [
    entry(ModelId::Tiny),
    entry(ModelId::TinyEn),
    entry(ModelId::Base),
    entry(ModelId::BaseEn),
    entry(ModelId::Small),
    entry(ModelId::SmallEn),
    entry(ModelId::Medium),
    entry(ModelId::MediumEn),
    entry(ModelId::LargeV3),
    entry(ModelId::LargeV3Turbo),
];

/// All catalog entries, in display order. Read-only process-wide data.
pub fn entries() -> &'static [ModelEntry] {
    &ENTRIES
}

impl ModelId {
    /// Stable kebab-case name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            ModelId::Tiny => "tiny",
            ModelId::TinyEn => "tiny-en",
            ModelId::Base => "base",
            ModelId::BaseEn => "base-en",
            ModelId::Small => "small",
            ModelId::SmallEn => "small-en",
            ModelId::Medium => "medium",
            ModelId::MediumEn => "medium-en",
            ModelId::LargeV3 => "large-v3",
            ModelId::LargeV3Turbo => "large-v3-turbo",
        }
    }

    /// Approximate size of the ggml weights in bytes.
    pub const fn size_bytes(&self) -> u64 {
        match self {
            ModelId::Tiny => 77_691_713,
            ModelId::TinyEn => 77_704_715,
            ModelId::Base => 147_951_465,
            ModelId::BaseEn => 147_964_211,
            ModelId::Small => 487_601_967,
            ModelId::SmallEn => 487_614_201,
            ModelId::Medium => 1_533_774_781,
            ModelId::MediumEn => 1_533_774_781,
            ModelId::LargeV3 => 3_094_623_691,
            ModelId::LargeV3Turbo => 1_624_592_891,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        entries()
            .iter()
            .map(|e| e.id)
            .find(|id| id.name() == s)
            .ok_or_else(|| Error::InvalidModel(s.to_string()))
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
