// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Motivational message returned to the dashboard.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Model identifier used for rule-based messages.
pub const FALLBACK_MODEL: &str = "fallback";

/// Tone of a motivational message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Encouraging,
    Celebratory,
    Challenging,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Encouraging, Tone::Celebratory, Tone::Challenging];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Encouraging => "encouraging",
            Tone::Celebratory => "celebratory",
            Tone::Challenging => "challenging",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str() == s)
            .ok_or_else(|| format!("unknown tone '{}'", s))
    }
}

/// A generated (or fallback) motivational message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MotivationalMessage {
    /// One or two sentences
    pub message: String,
    pub tone: Tone,
    #[serde(serialize_with = "serialize_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub generated_at: DateTime<Utc>,
    /// Model that produced the text, or "fallback"
    pub model: String,
    /// Whether this response was served from cache
    pub cached: bool,
}

impl MotivationalMessage {
    /// Whether this message came from the rule-based fallback.
    pub fn is_fallback(&self) -> bool {
        self.model == FALLBACK_MODEL
    }
}

fn serialize_rfc3339<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_utc_rfc3339(*date))
}
