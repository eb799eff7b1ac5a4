// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rule-based motivational messages.
//!
//! Used whenever the generation API is disabled, unreachable or returns
//! something unusable. No I/O; the same stats always give the same text.

use crate::models::{ActivityStats, MotivationalMessage, Tone, FALLBACK_MODEL};
use chrono::{DateTime, Utc};

/// Activity count that earns a celebratory message.
const CELEBRATE_THRESHOLD: u32 = 20;
/// Activity count that earns a count-citing encouragement.
const SOLID_THRESHOLD: u32 = 10;
/// More than this many days left counts as "plenty of time".
const PLENTY_OF_DAYS: u32 = 7;

/// Build a fallback message stamped with the current time.
pub fn fallback_message(stats: &ActivityStats) -> MotivationalMessage {
    fallback_message_at(stats, Utc::now())
}

/// Build a fallback message for the given stats and timestamp.
///
/// Branches are checked in order and the first match wins.
pub fn fallback_message_at(stats: &ActivityStats, now: DateTime<Utc>) -> MotivationalMessage {
    let (tone, message) = if stats.total_activities == 0 {
        (
            Tone::Encouraging,
            "Every journey starts with a single step. Log your first activity this month and get \
             moving!"
                .to_string(),
        )
    } else if stats.total_activities >= CELEBRATE_THRESHOLD {
        (
            Tone::Celebratory,
            format!(
                "Incredible work! {} activities this month shows real dedication. Keep the \
                 streak alive!",
                stats.total_activities
            ),
        )
    } else if stats.total_activities >= SOLID_THRESHOLD {
        (
            Tone::Encouraging,
            format!(
                "Great consistency with {} activities so far this month. You're building a \
                 strong habit!",
                stats.total_activities
            ),
        )
    } else if stats.days_remaining > PLENTY_OF_DAYS {
        (
            Tone::Challenging,
            format!(
                "You've logged {} {} so far and there are still {} days left. Plenty of time \
                 to push for more!",
                stats.total_activities,
                plural(stats.total_activities, "activity", "activities"),
                stats.days_remaining
            ),
        )
    } else {
        (
            Tone::Encouraging,
            format!(
                "{} {} logged this month. Finish strong over the last few days!",
                stats.total_activities,
                plural(stats.total_activities, "activity", "activities"),
            ),
        )
    };

    MotivationalMessage {
        message,
        tone,
        generated_at: now,
        model: FALLBACK_MODEL.to_string(),
        cached: false,
    }
}

fn plural<'a>(count: u32, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistanceUnit;

    fn stats(total: u32, days_remaining: u32) -> ActivityStats {
        ActivityStats {
            total_activities: total,
            run_count: total,
            walk_count: 0,
            mixed_count: 0,
            total_distance_meters: 0.0,
            total_duration_seconds: 0,
            total_duration: "PT0S".to_string(),
            month: 6,
            year: 2024,
            days_elapsed: 30 - days_remaining,
            days_remaining,
            total_days_in_month: 30,
            distance_unit: DistanceUnit::Km,
        }
    }

    #[test]
    fn test_no_activities_invites_start() {
        let msg = fallback_message(&stats(0, 20));
        assert_eq!(msg.tone, Tone::Encouraging);
        assert!(msg.message.contains("first activity"));
        assert_eq!(msg.model, "fallback");
        assert!(!msg.cached);
    }

    #[test]
    fn test_many_activities_celebrates() {
        let msg = fallback_message(&stats(25, 3));
        assert_eq!(msg.tone, Tone::Celebratory);
        assert!(msg.message.contains("25 activities"));

        assert_eq!(fallback_message(&stats(20, 25)).tone, Tone::Celebratory);
    }

    #[test]
    fn test_solid_month_cites_count() {
        let msg = fallback_message(&stats(12, 20));
        assert_eq!(msg.tone, Tone::Encouraging);
        assert!(msg.message.contains("12 activities"));

        assert_eq!(fallback_message(&stats(10, 0)).tone, Tone::Encouraging);
        assert_eq!(fallback_message(&stats(19, 0)).tone, Tone::Encouraging);
    }

    #[test]
    fn test_plenty_of_time_challenges() {
        let msg = fallback_message(&stats(3, 8));
        assert_eq!(msg.tone, Tone::Challenging);
        assert!(msg.message.contains("8 days left"));

        let single = fallback_message(&stats(1, 15));
        assert!(single.message.contains("1 activity so far"));
    }

    #[test]
    fn test_end_of_month_encourages() {
        let msg = fallback_message(&stats(3, 7));
        assert_eq!(msg.tone, Tone::Encouraging);
        assert!(msg.message.contains("Finish strong"));

        assert_eq!(fallback_message(&stats(9, 0)).tone, Tone::Encouraging);
    }

    #[test]
    fn test_deterministic_for_fixed_time() {
        let now = Utc::now();
        for total in [0, 1, 5, 10, 19, 20, 40] {
            for remaining in [0, 7, 8, 29] {
                let s = stats(total, remaining);
                assert_eq!(fallback_message_at(&s, now), fallback_message_at(&s, now));
            }
        }
    }
}
