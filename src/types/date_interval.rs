use chrono::{DateTime, Utc};
use std::fmt;

/// Wire format for the `start` and `end` query parameters.
pub(crate) const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A closed UTC time window used for a single measurement request.
///
/// Invariant: `start <= end`. Produced by [`crate::split_date_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub(crate) fn query_start(&self) -> String {
        self.start.format(QUERY_TIME_FORMAT).to_string()
    }

    pub(crate) fn query_end(&self) -> String {
        self.end.format(QUERY_TIME_FORMAT).to_string()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.query_start(), self.query_end())
    }
}
