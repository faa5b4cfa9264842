//! Availability intervals.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Earliest representable instant; the open start of an end-only `TimeSpan`.
pub const MINIMUM_TIME: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Latest representable instant; the open end of a begin-only `TimeSpan`.
pub const MAXIMUM_TIME: DateTime<Utc> = DateTime::<Utc>::MAX_UTC;

/// Parse a KML `dateTime`: full RFC 3339, a local date-time (read as UTC),
/// or a truncated `YYYY-MM-DD`, `YYYY-MM`, `YYYY` date.
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    let date = match text.len() {
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok(),
        4 => text
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        _ => None,
    };
    let parsed = date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc());
    if parsed.is_none() {
        tracing::debug!(value = text, "unrecognized dateTime");
    }
    parsed
}

/// A closed time interval. `start <= stop` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimeInterval {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, swapping the bounds if they arrive reversed.
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, stop: b }
        } else {
            Self { start: b, stop: a }
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn stop(&self) -> DateTime<Utc> {
        self.stop
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.stop
    }

    /// Smallest interval enclosing both.
    pub fn union(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }
}

/// Ordered intervals during which a feature is displayable.
///
/// An absent availability (`Option::None` on the record) means the feature
/// is always available; an `Availability` with intervals restricts it to
/// their union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Availability {
    intervals: Vec<TimeInterval>,
}

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(interval: TimeInterval) -> Self {
        Self {
            intervals: vec![interval],
        }
    }

    pub fn push(&mut self, interval: TimeInterval) {
        self.intervals.push(interval);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimeInterval> {
        self.intervals.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeInterval> {
        self.intervals.iter()
    }

    /// Earliest start across every interval.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.intervals.iter().map(TimeInterval::start).min()
    }

    /// Latest stop across every interval.
    pub fn stop(&self) -> Option<DateTime<Utc>> {
        self.intervals.iter().map(TimeInterval::stop).max()
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.intervals.iter().any(|i| i.contains(time))
    }

    /// Collapse every interval into the single one enclosing them all.
    pub fn merged(&self) -> Availability {
        match self.intervals.split_first() {
            Some((first, rest)) => {
                Availability::single(rest.iter().fold(*first, |acc, i| acc.union(i)))
            }
            None => Availability::new(),
        }
    }
}
