//! Defines the measurement stream kinds offered by the TAHMO measurement endpoint.

use std::fmt;

/// Selects which measurement stream of a station is requested.
///
/// The same station and variables are available in both streams; they differ
/// in whether quality control has been applied yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dataset {
    /// Measurements exactly as reported by the station, without validation.
    Raw,
    /// Measurements that went through TAHMO's quality checks.
    #[default]
    Controlled,
}

impl Dataset {
    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Dataset::Raw => "raw",
            Dataset::Controlled => "controlled",
        }
    }
}

/// Allows formatting a `Dataset` variant using its `path_segment`.
///
/// # Examples
///
/// ```
/// use tahmo::Dataset;
///
/// assert_eq!(format!("{}", Dataset::Raw), "raw");
/// assert_eq!(Dataset::Controlled.to_string(), "controlled");
/// ```
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
