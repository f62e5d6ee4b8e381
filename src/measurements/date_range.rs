use crate::error::TahmoError;
use crate::types::date_interval::DateInterval;
use crate::types::traits::any_datetime::AnyDateTime;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use log::debug;

const SECONDS_PER_DAY: i64 = 86_400;

/// Splits `[start, end]` into consecutive request windows of at most `max_period`.
///
/// Window boundaries are laid out every `max_period` starting at midnight (UTC) of the
/// start date, up to and including midnight of the end date. Each window ends one
/// second before the next boundary, but never before its own start. The first window
/// starts at `start` and the last one ends at `end`, exactly as given.
///
/// # Errors
///
/// Returns [`TahmoError::InvalidInput`] if either bound cannot be resolved to a
/// timestamp, if `start` lies after `end`, or if `max_period` is not a whole number of
/// days (at least one).
///
/// # Examples
///
/// ```
/// use tahmo::split_date_range;
/// use chrono::Duration;
///
/// let windows = split_date_range("2020-01-01", "2021-06-30 12:00:00", Duration::days(365))?;
/// assert_eq!(windows.len(), 2);
/// assert_eq!(windows[0].end.to_rfc3339(), "2020-12-30T23:59:59+00:00");
/// assert_eq!(windows[1].start.to_rfc3339(), "2020-12-31T00:00:00+00:00");
/// # Ok::<(), tahmo::TahmoError>(())
/// ```
pub fn split_date_range(
    start: impl AnyDateTime,
    end: impl AnyDateTime,
    max_period: Duration,
) -> Result<Vec<DateInterval>, TahmoError> {
    let start = start
        .to_utc_datetime()
        .ok_or_else(|| TahmoError::InvalidInput("Invalid start date".to_string()))?;
    let end = end
        .to_utc_datetime()
        .ok_or_else(|| TahmoError::InvalidInput("Invalid end date".to_string()))?;

    if start > end {
        return Err(TahmoError::InvalidInput(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    validate_max_period(max_period)?;

    let boundaries = boundaries(midnight(start), midnight(end), max_period);
    let intervals: Vec<DateInterval> = boundaries
        .iter()
        .enumerate()
        .map(|(i, &boundary)| {
            let window_start = if i == 0 { start } else { boundary };
            let window_end = boundaries
                .get(i + 1)
                .map(|&next| (next - Duration::seconds(1)).max(window_start))
                .unwrap_or(end);
            DateInterval {
                start: window_start,
                end: window_end,
            }
        })
        .collect();

    debug!(
        "Split {} .. {} into {} request window(s)",
        start,
        end,
        intervals.len()
    );
    Ok(intervals)
}

/// Boundaries are anchored at midnight, so only whole days keep every window within
/// `max_period`.
pub(crate) fn validate_max_period(max_period: Duration) -> Result<(), TahmoError> {
    if max_period < Duration::days(1) || max_period.num_seconds() % SECONDS_PER_DAY != 0 {
        return Err(TahmoError::InvalidInput(format!(
            "Maximum request period must be a whole number of days, got {}",
            max_period
        )));
    }
    Ok(())
}

fn midnight(datetime: DateTime<Utc>) -> DateTime<Utc> {
    datetime
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// `first`, `first + step`, ... while not past `last`. Never empty since `first <= last`.
fn boundaries(first: DateTime<Utc>, last: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    std::iter::successors(Some(first), |&b| Some(b + step))
        .take_while(|&b| b <= last)
        .collect()
}
