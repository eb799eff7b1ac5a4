// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt construction for the motivational insight model.
//!
//! Everything here is pure: the same stats always produce the same prompt.

use crate::models::{ActivityStats, Tone};
use crate::time_utils::month_name;
use serde_json::{json, Value};

/// Name given to the structured output schema in the request.
pub const SCHEMA_NAME: &str = "motivational_message";

const SYSTEM_PROMPT: &str = "You are an upbeat fitness coach writing a short note for a user's \
activity dashboard. Reply with a JSON object containing exactly two fields: \"message\", one or \
two sentences of motivation grounded in the numbers you are given, and \"tone\", which must be \
one of \"encouraging\", \"celebratory\" or \"challenging\". Do not add any other fields, \
markdown or commentary.";

/// Instructions, user message and output schema for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBundle {
    pub system: String,
    pub user: String,
    pub schema: Value,
}

/// Build the prompt bundle for a month of stats.
pub fn build_prompt(stats: &ActivityStats) -> PromptBundle {
    PromptBundle {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_message(stats),
        schema: response_schema(),
    }
}

fn build_user_message(stats: &ActivityStats) -> String {
    let month = month_name(stats.month).unwrap_or("Unknown month");
    let distance = round2(stats.distance_in_unit());

    format!(
        "Activity summary for {month} {year}:\n\
         - Total activities: {total} ({runs} runs, {walks} walks, {mixed} mixed)\n\
         - Total distance: {distance:.2} {unit}\n\
         - Total time: {time}\n\
         - Progress: day {elapsed} of {days}, {remaining} days remaining\n\
         Write the motivational message for this user.",
        year = stats.year,
        total = stats.total_activities,
        runs = stats.run_count,
        walks = stats.walk_count,
        mixed = stats.mixed_count,
        unit = stats.distance_unit,
        time = format_compact_duration(stats.total_duration_seconds),
        elapsed = stats.days_elapsed,
        days = stats.total_days_in_month,
        remaining = stats.days_remaining,
    )
}

/// Strict JSON schema the model's reply must match.
pub fn response_schema() -> Value {
    let tones: Vec<&str> = Tone::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "message": {
                "type": "string",
                "description": "One or two sentences of motivation"
            },
            "tone": {
                "type": "string",
                "enum": tones
            }
        },
        "required": ["message", "tone"],
        "additionalProperties": false
    })
}

/// Render seconds compactly: `1h 30m`, `25m 10s`, `45s`.
///
/// Zero components are omitted and seconds are only shown when there are
/// no whole hours.
pub fn format_compact_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if hours == 0 && seconds > 0 {
        parts.push(format!("{}s", seconds));
    }

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
