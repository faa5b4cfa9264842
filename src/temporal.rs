//! Feature availability from `TimeSpan` and `TimeStamp`.

use crate::model::{MAXIMUM_TIME, MINIMUM_TIME, TimeInterval, parse_datetime};
use crate::xml::Element;

/// The interval a feature declares for itself.
///
/// A span with one bound is open on the other side; a stamp is open-ended
/// from its instant onwards. Unparseable bounds count as missing.
pub fn availability(feature: &Element) -> Option<TimeInterval> {
    if let Some(span) = feature.child("TimeSpan") {
        let begin = span.child_text("begin").and_then(|t| parse_datetime(&t));
        let end = span.child_text("end").and_then(|t| parse_datetime(&t));
        return match (begin, end) {
            (Some(begin), Some(end)) => Some(TimeInterval::new(begin, end)),
            (Some(begin), None) => Some(TimeInterval::new(begin, MAXIMUM_TIME)),
            (None, Some(end)) => Some(TimeInterval::new(MINIMUM_TIME, end)),
            (None, None) => None,
        };
    }
    let when = feature
        .child("TimeStamp")?
        .child_text("when")
        .and_then(|t| parse_datetime(&t))?;
    Some(TimeInterval::new(when, MAXIMUM_TIME))
}
