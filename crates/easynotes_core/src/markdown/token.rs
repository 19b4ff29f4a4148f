//! Toolbar style tokens and their markdown markers.

use serde::{Deserialize, Serialize};

/// Markdown style exposed as a toolbar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleToken {
    Bold,
    Italic,
    InlineCode,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
}

/// Canonical markdown syntax for one [`StyleToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Inline token wrapping a character range.
    Wrap {
        open: &'static str,
        close: &'static str,
    },
    /// Block token prefixed to a whole line.
    ///
    /// `NumberedList` renumbers per line; the stored prefix is the first item.
    LinePrefix(&'static str),
}

impl StyleToken {
    pub const ALL: [StyleToken; 8] = [
        StyleToken::Bold,
        StyleToken::Italic,
        StyleToken::InlineCode,
        StyleToken::Heading1,
        StyleToken::Heading2,
        StyleToken::Heading3,
        StyleToken::BulletList,
        StyleToken::NumberedList,
    ];

    /// Returns the canonical marker for this token.
    pub fn marker(self) -> Marker {
        match self {
            Self::Bold => Marker::Wrap {
                open: "**",
                close: "**",
            },
            Self::Italic => Marker::Wrap {
                open: "*",
                close: "*",
            },
            Self::InlineCode => Marker::Wrap {
                open: "`",
                close: "`",
            },
            Self::Heading1 => Marker::LinePrefix("# "),
            Self::Heading2 => Marker::LinePrefix("## "),
            Self::Heading3 => Marker::LinePrefix("### "),
            Self::BulletList => Marker::LinePrefix("- "),
            Self::NumberedList => Marker::LinePrefix("1. "),
        }
    }

    /// Returns whether this token operates on whole lines.
    pub fn is_block(self) -> bool {
        matches!(self.marker(), Marker::LinePrefix(_))
    }
}
