use crate::models::DayBucket;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::AddAssign;

/// Trailing window used by every weekly view.
pub const WEEK_DAYS: u32 = 7;

/// Sums `observations` into one bucket per calendar day of the window
/// `end - (days - 1) ..= end`, oldest first. Days without observations carry
/// `V::default()`; observations outside the window are dropped.
pub fn daily_buckets<V, I>(end: NaiveDate, days: u32, observations: I) -> Vec<DayBucket<V>>
where
    V: Copy + Default + AddAssign,
    I: IntoIterator<Item = (NaiveDate, V)>,
{
    if days == 0 {
        return Vec::new();
    }
    let start = end - Duration::days(i64::from(days) - 1);

    let mut totals: BTreeMap<NaiveDate, V> = BTreeMap::new();
    for (date, value) in observations {
        if date < start || date > end {
            continue;
        }
        *totals.entry(date).or_default() += value;
    }

    let mut buckets = Vec::with_capacity(days as usize);
    for offset in 0..i64::from(days) {
        let date = start + Duration::days(offset);
        buckets.push(DayBucket {
            date,
            label: day_label(date),
            value: totals.get(&date).copied().unwrap_or_default(),
        });
    }
    buckets
}

/// Length of the run of consecutive successful days ending at `today`, or at
/// the day before when `today` has no success yet.
pub fn current_streak<I>(days: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = (NaiveDate, bool)>,
{
    let successes: BTreeSet<NaiveDate> = days
        .into_iter()
        .filter(|(date, success)| *success && *date <= today)
        .map(|(date, _)| date)
        .collect();

    let mut cursor = if successes.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while successes.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Share of days in the trailing `window` ending at `today` that appear in
/// `done_days`, as a percentage rounded to one decimal.
pub fn completion_rate<I>(done_days: I, today: NaiveDate, window: u32) -> f64
where
    I: IntoIterator<Item = NaiveDate>,
{
    if window == 0 {
        return 0.0;
    }
    let start = today - Duration::days(i64::from(window) - 1);
    let hits: BTreeSet<NaiveDate> = done_days
        .into_iter()
        .filter(|date| *date >= start && *date <= today)
        .collect();
    round1(hits.len() as f64 / f64::from(window) * 100.0)
}

/// Longest window a habit's completion rate looks back over.
pub const HABIT_RATE_WINDOW: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitScore {
    pub streak: u32,
    pub completion_rate: f64,
}

/// Scores a habit from its log: the current streak of completed days, and
/// the completion rate over the last 30 days or the habit's whole life when
/// younger.
pub fn habit_score(log: &[(NaiveDate, bool)], created: NaiveDate, today: NaiveDate) -> HabitScore {
    let age_days = (today - created).num_days().max(0) + 1;
    let window = age_days.min(HABIT_RATE_WINDOW) as u32;
    let done_days = log.iter().filter(|(_, done)| *done).map(|(date, _)| *date);
    HabitScore {
        streak: current_streak(log.iter().copied(), today),
        completion_rate: completion_rate(done_days, today, window),
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// Parses the `YYYY-MM-DD` keys SQLite's `date()` produces.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.get(..10)?, "%Y-%m-%d").ok()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
