// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Duration parsing for activity records.
//!
//! Durations arrive in whatever encoding the client used when the activity
//! was logged. Three encodings are accepted and normalized to seconds:
//! - colon form: `01:30:00` (or `MM:SS`)
//! - designator form: `PT1H30M`, `P1DT2H`, `PT12.5S`
//! - word form: `1 hour 30 minutes`, `1h 30m`, `2 hrs and 5 mins`

const SECS_PER_MINUTE: f64 = 60.0;
const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_DAY: f64 = 86_400.0;

/// Parse any supported duration encoding into whole seconds.
///
/// Returns `None` when the input matches none of the encodings.
pub fn parse_duration_seconds(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with(['P', 'p']) {
        parse_designator(trimmed)
    } else if trimmed.contains(':') {
        parse_colon(trimmed)
    } else {
        parse_words(trimmed)
    }
}

/// Encode seconds in designator form, e.g. `PT1H30M`. Zero is `PT0S`.
pub fn format_designator(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if total_seconds == 0 {
        return "PT0S".to_string();
    }

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}S", seconds));
    }
    out
}

fn parse_colon(input: &str) -> Option<u64> {
    let parts = input
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return None,
    };

    if parts.len() == 3 && minutes >= 60 {
        return None;
    }
    if seconds >= 60 {
        return None;
    }

    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn parse_designator(input: &str) -> Option<u64> {
    let upper = input.to_ascii_uppercase();
    let rest = upper.strip_prefix('P')?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total = 0.0;
    let mut components = sum_components(date_part, &[('D', SECS_PER_DAY)], &mut total)?;

    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        components += sum_components(
            time,
            &[('H', SECS_PER_HOUR), ('M', SECS_PER_MINUTE), ('S', 1.0)],
            &mut total,
        )?;
    }

    if components == 0 {
        return None;
    }
    Some(total as u64)
}

/// Sum `<number><unit>` pairs, e.g. `1H30M`. Returns the number of pairs.
fn sum_components(part: &str, units: &[(char, f64)], total: &mut f64) -> Option<usize> {
    let mut number = String::new();
    let mut count = 0;

    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            number.push(if c == ',' { '.' } else { c });
            continue;
        }

        let (_, factor) = units.iter().find(|(unit, _)| *unit == c)?;
        let value: f64 = number.parse().ok()?;
        *total += value * factor;
        number.clear();
        count += 1;
    }

    // Dangling number without a unit designator
    if !number.is_empty() {
        return None;
    }
    Some(count)
}

fn word_unit_factor(unit: &str) -> Option<f64> {
    match unit {
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(SECS_PER_HOUR),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(SECS_PER_MINUTE),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1.0),
        _ => None,
    }
}

fn parse_words(input: &str) -> Option<u64> {
    let lower = input.to_lowercase().replace(',', " ");
    let mut pending: Option<f64> = None;
    let mut total = 0.0;
    let mut components = 0;

    for token in lower.split_whitespace() {
        if token == "and" {
            continue;
        }

        let split = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(token.len());
        let (num, unit) = token.split_at(split);

        if !num.is_empty() {
            if pending.is_some() {
                return None;
            }
            pending = Some(num.parse().ok()?);
        }

        if !unit.is_empty() {
            let factor = word_unit_factor(unit)?;
            let value = pending.take()?;
            total += value * factor;
            components += 1;
        }
    }

    if pending.is_some() || components == 0 {
        return None;
    }
    Some(total as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_encodings_agree() {
        assert_eq!(parse_duration_seconds("01:30:00"), Some(5400));
        assert_eq!(parse_duration_seconds("PT1H30M"), Some(5400));
        assert_eq!(parse_duration_seconds("1 hour 30 minutes"), Some(5400));
    }

    #[test]
    fn test_colon_form() {
        assert_eq!(parse_duration_seconds("00:45:10"), Some(2710));
        assert_eq!(parse_duration_seconds("45:10"), Some(2710));
        assert_eq!(parse_duration_seconds("12:00:00"), Some(43_200));
        assert_eq!(parse_duration_seconds("01:75:00"), None);
        assert_eq!(parse_duration_seconds("1:2:3:4"), None);
        assert_eq!(parse_duration_seconds("aa:bb"), None);
    }

    #[test]
    fn test_colon_overflow_is_rejected() {
        assert_eq!(parse_duration_seconds("9999999999999999999:00:00"), None);
        assert_eq!(parse_duration_seconds("5124095576030432:00:00"), None);
        assert_eq!(parse_duration_seconds("5124095576030431:59:59"), None);
        assert_eq!(
            parse_duration_seconds("5124095576030431:00:00"),
            Some(5_124_095_576_030_431 * 3600)
        );
    }

    #[test]
    fn test_designator_form() {
        assert_eq!(parse_duration_seconds("PT45M"), Some(2700));
        assert_eq!(parse_duration_seconds("PT1H"), Some(3600));
        assert_eq!(parse_duration_seconds("PT20M15S"), Some(1215));
        assert_eq!(parse_duration_seconds("PT12.7S"), Some(12));
        assert_eq!(parse_duration_seconds("P1DT1H"), Some(90_000));
        assert_eq!(parse_duration_seconds("pt30m"), Some(1800));
        assert_eq!(parse_duration_seconds("PT"), None);
        assert_eq!(parse_duration_seconds("P"), None);
        assert_eq!(parse_duration_seconds("PT30"), None);
        assert_eq!(parse_duration_seconds("PT3X"), None);
    }

    #[test]
    fn test_word_form() {
        assert_eq!(parse_duration_seconds("45 minutes"), Some(2700));
        assert_eq!(parse_duration_seconds("1h 30m"), Some(5400));
        assert_eq!(parse_duration_seconds("2 hrs and 5 mins"), Some(7500));
        assert_eq!(parse_duration_seconds("1 Hour, 10 Seconds"), Some(3610));
        assert_eq!(parse_duration_seconds("1.5 hours"), Some(5400));
        assert_eq!(parse_duration_seconds("30"), None);
        assert_eq!(parse_duration_seconds("minutes"), None);
        assert_eq!(parse_duration_seconds("10 parsecs"), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("   "), None);
        assert_eq!(parse_duration_seconds("about an hour"), None);
    }

    #[test]
    fn test_format_designator() {
        assert_eq!(format_designator(0), "PT0S");
        assert_eq!(format_designator(5400), "PT1H30M");
        assert_eq!(format_designator(3600), "PT1H");
        assert_eq!(format_designator(59), "PT59S");
        assert_eq!(format_designator(90_061), "PT25H1M1S");
    }

    #[test]
    fn test_designator_reparses() {
        for secs in [0u64, 1, 61, 3599, 5400, 86_399] {
            let encoded = format_designator(secs);
            assert_eq!(parse_duration_seconds(&encoded), Some(secs), "{}", encoded);
        }
    }
}
