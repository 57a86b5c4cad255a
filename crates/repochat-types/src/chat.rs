//! Chat turn types for per-repository conversations.
//!
//! A session is an ordered, append-only sequence of [`ChatTurn`]s keyed by
//! repository. The serde shape matches the remote chat endpoint's wire
//! format: `{"user": "You" | "Bot", "text": "..."}`.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Who produced a chat turn.
///
/// Serializes to the wire names the answering service expects: `"You"` for
/// the user, `"Bot"` for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "You")]
    User,
    #[serde(rename = "Bot")]
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "You"),
            Speaker::Bot => write!(f, "Bot"),
        }
    }
}

impl FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "you" | "user" => Ok(Speaker::User),
            "bot" => Ok(Speaker::Bot),
            other => Err(format!("invalid speaker: '{other}'")),
        }
    }
}

/// A single turn within a repository's chat session.
///
/// Immutable once appended; insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(rename = "user")]
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    /// A turn spoken by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// A turn spoken by the answering service.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}
