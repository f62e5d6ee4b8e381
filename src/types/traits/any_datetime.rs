use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Naive date-time layouts tried in order, after RFC 3339 fails.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts, resolved to midnight UTC.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y%m%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

/// Anything that can be resolved to a single UTC instant.
///
/// Implemented for the chrono date and time types as well as for strings,
/// which are parsed leniently: RFC 3339, ISO-8601 date-times with either a
/// `T` or a space separator, and a handful of plain date layouts. Naive
/// values are taken to be UTC and dates resolve to midnight.
///
/// # Examples
///
/// ```
/// use tahmo::AnyDateTime;
/// use chrono::{TimeZone, Utc};
///
/// let expected = Utc.with_ymd_and_hms(2021, 3, 4, 0, 0, 0).unwrap();
/// assert_eq!("2021-03-04".to_utc_datetime(), Some(expected));
/// assert_eq!("4 March 2021".to_utc_datetime(), Some(expected));
/// assert_eq!("not a date".to_utc_datetime(), None);
/// ```
pub trait AnyDateTime {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>>;
}

impl AnyDateTime for NaiveDateTime {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        Some(Utc.from_utc_datetime(&self))
    }
}

impl AnyDateTime for NaiveDate {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        self.and_time(NaiveTime::MIN).to_utc_datetime()
    }
}

impl AnyDateTime for DateTime<Utc> {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        Some(self)
    }
}

impl AnyDateTime for DateTime<FixedOffset> {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        Some(self.with_timezone(&Utc))
    }
}

impl AnyDateTime for DateTime<Local> {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        Some(self.with_timezone(&Utc))
    }
}

impl AnyDateTime for &str {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        let input = self.trim();
        if input.is_empty() {
            return None;
        }
        // Full timestamp with zone, e.g. 2021-03-04T10:00:00Z or +02:00
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return dt.to_utc_datetime();
        }
        if let Ok(dt) = input.parse::<DateTime<FixedOffset>>() {
            return dt.to_utc_datetime();
        }
        if let Some(naive_dt) = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        {
            return naive_dt.to_utc_datetime();
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
            .and_then(AnyDateTime::to_utc_datetime)
    }
}

impl AnyDateTime for &String {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        self.as_str().to_utc_datetime()
    }
}

impl AnyDateTime for String {
    fn to_utc_datetime(self) -> Option<DateTime<Utc>> {
        self.as_str().to_utc_datetime()
    }
}
