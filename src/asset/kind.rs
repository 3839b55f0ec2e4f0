//! Asset kind definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request type of a preloaded asset.
///
/// Serialized lowercase, matching the `as=` values of a preload link.
/// `None` serializes as an empty string and is what a missing `type`
/// field decodes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Audio,
    Font,
    Image,
    Script,
    Style,
    Track,
    Video,
    /// No explicit request type (e.g. `<link rel="import">`).
    #[default]
    #[serde(rename = "")]
    None,
}

impl AssetKind {
    /// Value used in the `as=` parameter, empty for [`AssetKind::None`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Font => "font",
            Self::Image => "image",
            Self::Script => "script",
            Self::Style => "style",
            Self::Track => "track",
            Self::Video => "video",
            Self::None => "",
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
