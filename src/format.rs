//! Human-facing strings derived from timestamps and journal moods.

use chrono::{NaiveDate, NaiveDateTime};

pub const NO_DATE: &str = "No date available";

/// Describes `target` relative to `now`. Both are local times in the server
/// timezone.
pub fn relative_time(now: NaiveDateTime, target: Option<NaiveDateTime>) -> String {
    let Some(target) = target else {
        return NO_DATE.to_string();
    };

    let future = target > now;
    let elapsed = if future { target - now } else { now - target };
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() % 24;
    let minutes = elapsed.num_minutes() % 60;

    if future {
        match days {
            0 if hours == 0 && minutes == 0 => "Due soon".to_string(),
            0 if hours == 0 => format!("Due in {minutes} min"),
            0 => format!("Due in {hours} hr"),
            1 => "Due tomorrow".to_string(),
            2..=6 => format!("Due in {days} days"),
            _ => format!("Due {}", short_date(target)),
        }
    } else {
        match days {
            0 if hours == 0 && minutes == 0 => "Just now".to_string(),
            0 if hours == 0 => format!("{minutes} min ago"),
            0 => format!("{hours} hr ago"),
            1 => "Yesterday".to_string(),
            2..=6 => format!("{days} days ago"),
            _ => short_date(target),
        }
    }
}

fn short_date(ts: NaiveDateTime) -> String {
    ts.format("%b %-d").to_string()
}

/// Accepts dates and timestamps as stored or submitted by forms. Empty input
/// and the all-zero placeholder dates yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("0000-00-00") {
        return None;
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn mood_emoji(mood: &str) -> String {
    let mood = mood.trim();
    if mood.chars().any(is_emoji) {
        return mood.to_string();
    }
    let emoji = match mood.to_ascii_lowercase().as_str() {
        "happy" => "😊",
        "neutral" => "😐",
        "sad" => "😔",
        "excited" => "🤩",
        "tired" => "😴",
        "peaceful" => "😌",
        "anxious" => "😰",
        "angry" => "😠",
        _ => "📝",
    };
    emoji.to_string()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F64F | 0x1F680..=0x1F6FF | 0x1F900..=0x1F9FF | 0x2600..=0x27BF
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn past_times() {
        let now = at("2024-01-10 10:00:00");
        assert_eq!(relative_time(now, Some(at("2024-01-10 09:45:00"))), "15 min ago");
        assert_eq!(relative_time(now, Some(at("2024-01-10 09:59:30"))), "Just now");
        assert_eq!(relative_time(now, Some(at("2024-01-10 07:10:00"))), "2 hr ago");
        assert_eq!(relative_time(now, Some(at("2024-01-09 08:00:00"))), "Yesterday");
        assert_eq!(relative_time(now, Some(at("2024-01-05 10:00:00"))), "5 days ago");
        assert_eq!(relative_time(now, Some(at("2024-01-03 09:00:00"))), "Jan 3");
    }

    #[test]
    fn future_times() {
        let now = at("2024-01-10 10:00:00");
        assert_eq!(relative_time(now, Some(at("2024-01-11 10:00:00"))), "Due tomorrow");
        assert_eq!(relative_time(now, Some(at("2024-01-10 10:00:20"))), "Due soon");
        assert_eq!(relative_time(now, Some(at("2024-01-10 10:40:00"))), "Due in 40 min");
        assert_eq!(relative_time(now, Some(at("2024-01-10 13:00:00"))), "Due in 3 hr");
        assert_eq!(relative_time(now, Some(at("2024-01-13 12:00:00"))), "Due in 3 days");
        assert_eq!(relative_time(now, Some(at("2024-02-01 00:00:00"))), "Due Feb 1");
    }

    #[test]
    fn missing_dates_use_placeholder() {
        let now = at("2024-01-10 10:00:00");
        assert_eq!(relative_time(now, None), NO_DATE);
        assert_eq!(relative_time(now, parse_timestamp("0000-00-00 00:00:00")), NO_DATE);
        assert_eq!(relative_time(now, parse_timestamp("")), NO_DATE);
    }

    #[test]
    fn parses_common_shapes() {
        assert_eq!(at("2024-01-10").to_string(), "2024-01-10 00:00:00");
        assert_eq!(at("2024-01-10T08:30").to_string(), "2024-01-10 08:30:00");
        assert_eq!(at("2024-01-10 08:30:15.250").date().to_string(), "2024-01-10");
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn moods_map_to_emoji() {
        assert_eq!(mood_emoji("happy"), "😊");
        assert_eq!(mood_emoji("Angry"), "😠");
        assert_eq!(mood_emoji("🤩"), "🤩");
        assert_eq!(mood_emoji(""), "📝");
    }
}
