//! Video reaction types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use vidshare_core::AppError;

/// Reaction a viewer can leave on a video. A viewer holds at most one of each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    /// Thumbs up.
    Like,
    /// Heart.
    Love,
    /// Laughing.
    Haha,
    /// Angry.
    Angry,
    /// Sad.
    Sad,
}

impl ReactionType {
    /// Return the reaction as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Haha => "haha",
            Self::Angry => "angry",
            Self::Sad => "sad",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "love" => Ok(Self::Love),
            "haha" => Ok(Self::Haha),
            "angry" => Ok(Self::Angry),
            "sad" => Ok(Self::Sad),
            _ => Err(AppError::validation(format!(
                "Invalid reaction type: '{s}'. Expected one of: like, love, haha, angry, sad"
            ))),
        }
    }
}

/// Outcome of toggling a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReactionToggle {
    /// The viewer did not hold this reaction; it was added.
    Added {
        /// The reaction added.
        reaction: ReactionType,
    },
    /// The viewer already held this reaction; it was removed.
    Removed {
        /// The reaction that was removed.
        reaction: ReactionType,
    },
}

impl ReactionToggle {
    /// Whether the video owner should hear about this toggle.
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}
